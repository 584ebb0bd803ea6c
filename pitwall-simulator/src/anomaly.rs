//! Anomaly injection.
//!
//! At most one anomaly is active at a time: an overheating episode that adds
//! a fixed bump to coolant temperature for 10-25 ticks. A new episode can only
//! be armed once the previous one has run out.

use pitwall_core::DeterministicRng;

use crate::state::EngineState;

pub const ANOMALY_PROBABILITY: f64 = 0.001;
pub const COOLANT_BUMP_C: f64 = 2.5;
pub const MIN_ANOMALY_TICKS: i64 = 10;
pub const MAX_ANOMALY_TICKS: i64 = 25;

/// Step 8. Returns `true` on the tick an episode is armed.
pub fn inject(state: &mut EngineState, rng: &mut DeterministicRng) -> bool {
    if state.anomaly_cooldown > 0 {
        state.coolant_c += COOLANT_BUMP_C;
        state.anomaly_cooldown -= 1;
        return false;
    }
    if rng.bernoulli(ANOMALY_PROBABILITY) {
        state.anomaly_cooldown = rng.integer(MIN_ANOMALY_TICKS, MAX_ANOMALY_TICKS) as u32;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_episode_bumps_coolant_without_drawing() {
        let mut rng = DeterministicRng::seed(1);
        let mut untouched = rng.clone();
        let mut state = EngineState::initial(0.0, 0.0);
        state.anomaly_cooldown = 3;

        for _ in 0..3 {
            assert!(!inject(&mut state, &mut rng));
        }
        assert_eq!(state.anomaly_cooldown, 0);
        assert!((state.coolant_c - (85.0 + 3.0 * COOLANT_BUMP_C)).abs() < 1e-9);
        assert_eq!(rng.next().to_bits(), untouched.next().to_bits());
    }

    #[test]
    fn episodes_never_overlap() {
        let mut rng = DeterministicRng::seed(2024);
        let mut state = EngineState::initial(0.0, 0.0);
        let mut armed = 0;
        for _ in 0..200_000 {
            let before = state.anomaly_cooldown;
            if inject(&mut state, &mut rng) {
                assert_eq!(before, 0);
                assert!((10..=25).contains(&state.anomaly_cooldown));
                armed += 1;
            }
        }
        assert!(armed > 0, "expected at least one episode in 200k ticks");
    }
}
