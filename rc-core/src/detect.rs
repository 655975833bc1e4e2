//! Change detection: does the current Command State carry anything to send?

use rc_proto::CommandState;

/// True if any field other than `sequence` is away from its quiescent value.
///
/// The transmission gate sends exactly when this holds, so empty frames never
/// go out and every nonzero delta or active hold goes out on the tick it
/// appears.
#[inline]
#[must_use]
pub fn needs_transmit(state: &CommandState) -> bool {
    !state.is_quiescent()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_proto::{Action, Axis, Options};

    #[test]
    fn test_quiescent_state_is_suppressed() {
        assert!(!needs_transmit(&CommandState::quiescent()));

        let mut state = CommandState::quiescent();
        state.sequence = u32::MAX;
        assert!(!needs_transmit(&state));
    }

    #[test]
    fn test_each_field_triggers() {
        let mut cases = [CommandState::quiescent(); 6];
        cases[0].set_axis(Axis::Speed, -10, false);
        cases[1].set_axis(Axis::Speed, 0, true);
        cases[2].set_axis(Axis::Turn, 5, false);
        cases[3].set_axis(Axis::Turn, 0, true);
        cases[4].set_action(Action::Stop, true);
        cases[5].options = Options::HAZARD;

        for state in &cases {
            assert!(needs_transmit(state), "{state:?}");
        }
    }
}
