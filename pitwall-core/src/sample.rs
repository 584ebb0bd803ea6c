//! Telemetry readings and their invariants.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Highest gear of the reference vehicle; gear 0 is neutral.
pub const DEFAULT_MAX_GEAR: u8 = 6;

/// Tire surface temperatures in °C.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct TireTemps {
    pub fl: f64,
    pub fr: f64,
    pub rl: f64,
    pub rr: f64,
}

impl TireTemps {
    pub fn uniform(temp: f64) -> Self {
        Self {
            fl: temp,
            fr: temp,
            rl: temp,
            rr: temp,
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.fl, self.fr, self.rl, self.rr]
    }

    /// Hottest minus coldest tire.
    pub fn spread(&self) -> f64 {
        let temps = self.as_array();
        let max = temps.iter().copied().fold(f64::MIN, f64::max);
        let min = temps.iter().copied().fold(f64::MAX, f64::min);
        max - min
    }
}

/// An immutable telemetry reading at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Milliseconds, non-decreasing within one stream.
    pub timestamp: u64,
    pub vehicle_id: String,
    pub speed_kph: f64,
    pub rpm: f64,
    pub gear: u8,
    pub throttle_pct: f64,
    pub brake_pct: f64,
    pub steering_deg: f64,
    pub coolant_c: f64,
    pub oil_c: f64,
    pub battery_v: f64,
    pub state_of_charge: f64,
    pub tire_temps: TireTemps,
    pub latitude: f64,
    pub longitude: f64,
    pub lap: u32,
    pub sector: u8,
}

impl Sample {
    /// Checks shape and range invariants against a vehicle with `max_gear` gears.
    pub fn validate(&self, max_gear: u8) -> Result<(), ValidationError> {
        if self.vehicle_id.is_empty() {
            return Err(ValidationError::EmptyVehicleId);
        }

        let finite = [
            ("speedKph", self.speed_kph),
            ("rpm", self.rpm),
            ("throttlePct", self.throttle_pct),
            ("brakePct", self.brake_pct),
            ("steeringDeg", self.steering_deg),
            ("coolantC", self.coolant_c),
            ("oilC", self.oil_c),
            ("batteryV", self.battery_v),
            ("stateOfCharge", self.state_of_charge),
            ("tireTemps.FL", self.tire_temps.fl),
            ("tireTemps.FR", self.tire_temps.fr),
            ("tireTemps.RL", self.tire_temps.rl),
            ("tireTemps.RR", self.tire_temps.rr),
            ("latitude", self.latitude),
            ("longitude", self.longitude),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { field });
            }
        }

        check_range("throttlePct", self.throttle_pct, 0.0, 100.0)?;
        check_range("brakePct", self.brake_pct, 0.0, 100.0)?;
        check_range("stateOfCharge", self.state_of_charge, 0.0, 100.0)?;
        check_range("speedKph", self.speed_kph, 0.0, f64::MAX)?;
        check_range("rpm", self.rpm, 0.0, f64::MAX)?;

        if self.gear > max_gear {
            return Err(ValidationError::Gear {
                gear: self.gear,
                max_gear,
            });
        }
        Ok(())
    }

    pub fn is_valid(&self, max_gear: u8) -> bool {
        self.validate(max_gear).is_ok()
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
