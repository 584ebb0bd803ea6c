//! Lap, sector and position bookkeeping.
//!
//! The path is a placeholder ellipse around the configured origin; a real
//! circuit outline can replace [`position`] without touching the tick order.

use std::f64::consts::TAU;

use crate::settings::EngineSettings;
use crate::state::EngineState;

const LAT_RADIUS_DEG: f64 = 0.0045;
const LON_RADIUS_DEG: f64 = 0.0075;

/// Step 11: advance along the lap, wrapping into the next one.
pub fn advance_distance(state: &mut EngineState, settings: &EngineSettings, dt_s: f64) {
    state.distance_m += state.speed_kph / 3.6 * dt_s;
    while state.distance_m >= settings.track_length_m {
        state.distance_m -= settings.track_length_m;
        state.lap += 1;
    }
    state.sector = sector_for(settings, state.distance_m);
}

pub fn sector_for(settings: &EngineSettings, distance_m: f64) -> u8 {
    let sector_length = settings.track_length_m / f64::from(settings.sector_count);
    let last = settings.sector_count - 1;
    let raw = (distance_m / sector_length).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as u64).min(u64::from(last)) as u8
    }
}

/// Step 12: latitude/longitude for a distance along the lap.
pub fn position(settings: &EngineSettings, distance_m: f64) -> (f64, f64) {
    let angle = TAU * distance_m / settings.track_length_m;
    (
        settings.origin_lat + LAT_RADIUS_DEG * angle.cos(),
        settings.origin_lon + LON_RADIUS_DEG * angle.sin(),
    )
}
