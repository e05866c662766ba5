//! Driver alertness state

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Alertness level derived from continuous eye closure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum AlertnessState {
    #[default]
    Awake,
    Drowsy,
    Asleep,
}

impl AlertnessState {
    /// Map a closed-eye duration onto a state and percentage.
    ///
    /// Both thresholds are inclusive on the upper side: `d == drowsy` is
    /// Drowsy at 0 %, `d == sleep` is Asleep at 100 %.
    pub fn from_closed_duration(
        closed: Duration,
        drowsy: Duration,
        sleep: Duration,
    ) -> (AlertnessState, f64) {
        if closed >= sleep {
            (AlertnessState::Asleep, 100.0)
        } else if closed >= drowsy {
            let window = (sleep - drowsy).as_secs_f64();
            let into = (closed - drowsy).as_secs_f64();
            (AlertnessState::Drowsy, into / window * 100.0)
        } else {
            (AlertnessState::Awake, 0.0)
        }
    }

    pub fn is_alert(&self) -> bool {
        !matches!(self, AlertnessState::Awake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DROWSY: Duration = Duration::from_secs(3);
    const SLEEP: Duration = Duration::from_secs(8);

    fn state_at(secs: f64) -> (AlertnessState, f64) {
        AlertnessState::from_closed_duration(Duration::from_secs_f64(secs), DROWSY, SLEEP)
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(state_at(2.999).0, AlertnessState::Awake);
        assert_eq!(state_at(3.0), (AlertnessState::Drowsy, 0.0));
        assert_eq!(state_at(7.999).0, AlertnessState::Drowsy);
        assert_eq!(state_at(8.0), (AlertnessState::Asleep, 100.0));
        assert_eq!(state_at(0.0), (AlertnessState::Awake, 0.0));
    }

    #[test]
    fn test_drowsy_percentage_is_linear() {
        let (state, percent) = state_at(5.5);
        assert_eq!(state, AlertnessState::Drowsy);
        assert!((percent - 50.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_state_matches_thresholds(ms in 0u64..20_000) {
            let d = Duration::from_millis(ms);
            let (state, percent) = AlertnessState::from_closed_duration(d, DROWSY, SLEEP);

            prop_assert_eq!(state == AlertnessState::Asleep, d >= SLEEP);
            prop_assert_eq!(state == AlertnessState::Drowsy, d >= DROWSY && d < SLEEP);
            prop_assert_eq!(state == AlertnessState::Awake, d < DROWSY);
            prop_assert!((0.0..=100.0).contains(&percent));
        }
    }
}
