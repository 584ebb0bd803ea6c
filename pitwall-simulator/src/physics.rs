//! Physics approximation for one tick.
//!
//! The functions here are called by [`crate::Simulation::advance`] in a fixed
//! order. Each one consumes random draws in a fixed order too; reordering
//! calls or draws changes every trace produced for a given seed.

use pitwall_core::DeterministicRng;

use crate::settings::EngineSettings;
use crate::state::{EngineState, IDLE_RPM};

pub const MAX_SPEED_KPH: f64 = 320.0;
/// Converts `speed_kph * ratio` into engine rpm.
pub const RPM_TUNING: f64 = 31.25;
const UPSHIFT_FRACTION: f64 = 0.94;
const DOWNSHIFT_RPM: f64 = 1_600.0;
const RPM_SMOOTHING: f64 = 0.25;

/// Steps 1-3: driver inputs drift.
pub fn drive_inputs(state: &mut EngineState, rng: &mut DeterministicRng) {
    state.throttle_pct = (state.throttle_pct + rng.approx_normal(0.0, 4.0)).clamp(5.0, 100.0);

    if rng.bernoulli(0.02) {
        state.brake_pct = (state.brake_pct + rng.approx_normal(20.0, 10.0)).clamp(0.0, 90.0);
    } else {
        state.brake_pct *= 0.85;
    }

    state.steering_deg = (state.steering_deg + rng.approx_normal(0.0, 3.0)).clamp(-45.0, 45.0);
}

/// Step 4: longitudinal speed.
pub fn integrate_speed(state: &mut EngineState, dt_s: f64) {
    let accel =
        (state.throttle_pct / 100.0 - state.brake_pct / 70.0) * 7.0 - 0.012 * state.speed_kph;
    state.speed_kph = (state.speed_kph + accel * dt_s * 3.6).clamp(0.0, MAX_SPEED_KPH);
}

/// Engine speed the drivetrain would impose in `gear` at `speed_kph`.
pub fn target_rpm(settings: &EngineSettings, speed_kph: f64, gear: u8) -> f64 {
    if gear == 0 {
        return IDLE_RPM;
    }
    let ratio = settings.gear_ratios[usize::from(gear)];
    (speed_kph * ratio * RPM_TUNING).max(IDLE_RPM)
}

/// Steps 5-6: at most one shift, then smooth rpm toward the new target.
pub fn drivetrain(state: &mut EngineState, settings: &EngineSettings) {
    let target = target_rpm(settings, state.speed_kph, state.gear);
    if target > UPSHIFT_FRACTION * settings.max_rpm && state.gear < settings.max_gear() {
        state.gear += 1;
    } else if target < DOWNSHIFT_RPM && state.gear > 1 {
        state.gear -= 1;
    }

    let target = target_rpm(settings, state.speed_kph, state.gear);
    state.rpm += (target - state.rpm) * RPM_SMOOTHING;
}

/// Step 7: coolant and oil approach load-dependent targets.
pub fn fluid_temperatures(state: &mut EngineState, rng: &mut DeterministicRng) {
    let load = state.load_factor();
    let coolant_target = 85.0 + load * 25.0;
    let oil_target = 90.0 + load * 30.0;

    state.coolant_c += (coolant_target - state.coolant_c) * 0.05 + rng.approx_normal(0.0, 0.3);
    state.oil_c += (oil_target - state.oil_c) * 0.04 + rng.approx_normal(0.0, 0.3);
}

/// Step 9: state of charge and terminal voltage.
pub fn battery(state: &mut EngineState, rng: &mut DeterministicRng) {
    let drain = state.load_factor() * 0.02;
    let regen = state.brake_pct / 100.0 * 0.03;
    state.state_of_charge = (state.state_of_charge - drain + regen).clamp(0.0, 100.0);
    state.battery_v =
        11.8 + state.state_of_charge / 100.0 * 1.6 + rng.approx_normal(0.0, 0.02);
}

/// Step 10: tires approach a speed/load baseline, fronts slightly hotter.
pub fn tire_temperatures(state: &mut EngineState, rng: &mut DeterministicRng) {
    let baseline = 55.0 + state.speed_kph * 0.12 + state.load_factor() * 25.0;
    for (index, temp) in state.tire_temps.iter_mut().enumerate() {
        let front_bias = if index < 2 { 3.0 } else { 0.0 };
        *temp += (baseline + front_bias - *temp) * 0.03 + rng.approx_normal(0.0, 0.4);
    }
}
