//! Range query parameters and result pages.

use serde::{Deserialize, Serialize};

use pitwall_core::{QueryError, Sample};

/// Query-string values exactly as received, before any parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawQuery<'a> {
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
    pub limit: Option<&'a str>,
    pub cursor: Option<&'a str>,
}

/// Typed range query. `from` is inclusive, `to` exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

impl QueryParams {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Same query, continuing from `cursor`.
    pub fn after(&self, cursor: &str) -> Self {
        Self {
            cursor: Some(cursor.to_string()),
            ..self.clone()
        }
    }

    /// Parses raw values. A non-numeric or out-of-range limit and non-numeric
    /// timestamps are errors; the cursor is taken as-is.
    pub fn parse(raw: RawQuery<'_>, max_limit: u32) -> Result<Self, QueryError> {
        let limit = raw
            .limit
            .map(|value| {
                value
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| (1..=max_limit).contains(n))
                    .ok_or_else(|| QueryError::InvalidLimit {
                        value: value.to_string(),
                        max: max_limit,
                    })
            })
            .transpose()?;

        Ok(Self {
            from: parse_timestamp("from", raw.from)?,
            to: parse_timestamp("to", raw.to)?,
            limit,
            cursor: raw.cursor.map(str::to_string),
        })
    }
}

fn parse_timestamp(field: &'static str, value: Option<&str>) -> Result<Option<u64>, QueryError> {
    value
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| QueryError::InvalidTimestamp {
                    field,
                    value: v.to_string(),
                })
        })
        .transpose()
}

/// One page of a range query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage {
    pub samples: Vec<Sample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Size of the whole filtered set, not just this page.
    pub total_available: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_values() {
        let raw = RawQuery {
            from: Some("100"),
            to: Some(" 2000 "),
            limit: Some("50"),
            cursor: Some("abc"),
        };
        let params = QueryParams::parse(raw, 500).unwrap();
        assert_eq!(params.from, Some(100));
        assert_eq!(params.to, Some(2_000));
        assert_eq!(params.limit, Some(50));
        assert_eq!(params.cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_bad_limits() {
        for bad in ["0", "501", "-3", "ten", "1.5", ""] {
            let raw = RawQuery {
                limit: Some(bad),
                ..RawQuery::default()
            };
            assert_eq!(
                QueryParams::parse(raw, 500),
                Err(QueryError::InvalidLimit {
                    value: bad.to_string(),
                    max: 500
                }),
                "limit {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_non_numeric_timestamps() {
        let raw = RawQuery {
            to: Some("yesterday"),
            ..RawQuery::default()
        };
        assert!(matches!(
            QueryParams::parse(raw, 500),
            Err(QueryError::InvalidTimestamp { field: "to", .. })
        ));
    }

    #[test]
    fn omitted_values_stay_open() {
        let params = QueryParams::parse(RawQuery::default(), 500).unwrap();
        assert_eq!(params, QueryParams::default());
    }
}
