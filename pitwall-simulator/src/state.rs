//! Mutable vehicle state owned by one simulation.

use serde::Serialize;

pub const IDLE_RPM: f64 = 900.0;

/// Continuous physical quantities plus the discrete drivetrain/lap counters.
///
/// Mutated exactly once per tick by the owning simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineState {
    pub throttle_pct: f64,
    pub brake_pct: f64,
    pub steering_deg: f64,
    pub speed_kph: f64,
    pub rpm: f64,
    pub gear: u8,
    pub coolant_c: f64,
    pub oil_c: f64,
    pub state_of_charge: f64,
    pub battery_v: f64,
    /// FL, FR, RL, RR.
    pub tire_temps: [f64; 4],
    pub distance_m: f64,
    pub lap: u32,
    pub sector: u8,
    pub latitude: f64,
    pub longitude: f64,
    /// Remaining ticks of an active coolant anomaly.
    pub anomaly_cooldown: u32,
}

impl EngineState {
    /// Stationary in first gear, engine idling and warm.
    pub fn initial(origin_lat: f64, origin_lon: f64) -> Self {
        Self {
            throttle_pct: 20.0,
            brake_pct: 0.0,
            steering_deg: 0.0,
            speed_kph: 0.0,
            rpm: IDLE_RPM,
            gear: 1,
            coolant_c: 85.0,
            oil_c: 90.0,
            state_of_charge: 80.0,
            battery_v: 11.8 + 0.8 * 1.6,
            tire_temps: [60.0; 4],
            distance_m: 0.0,
            lap: 0,
            sector: 0,
            latitude: origin_lat,
            longitude: origin_lon,
            anomaly_cooldown: 0,
        }
    }

    /// Engine load in `[0, 1]`, blending pedal demand and road speed.
    pub fn load_factor(&self) -> f64 {
        0.7 * self.throttle_pct / 100.0 + 0.3 * self.speed_kph / 320.0
    }
}
