//! Test-provider lifecycle
//!
//! `idle → running → succeeded`. The external test driver moves the provider
//! into `running`; the first report received while running completes it.

use crate::error::ManagerError;
use serde::{Deserialize, Serialize};

/// Global test-provider state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TestProviderState {
    /// Nothing has run
    #[default]
    #[serde(rename = "test-provider-state:pending")]
    Idle,
    /// A test run is in progress
    #[serde(rename = "test-provider-state:running")]
    Running,
    /// The run completed
    #[serde(rename = "test-provider-state:succeeded")]
    Succeeded,
}

/// Validates a lifecycle transition
///
/// # Errors
/// `ManagerError::IllegalTransition` if `to` is not reachable from `from`
pub fn validate_transition(
    from: TestProviderState,
    to: TestProviderState,
) -> Result<(), ManagerError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(ManagerError::IllegalTransition { from, to })
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: TestProviderState) -> Vec<TestProviderState> {
    use TestProviderState::{Idle, Running, Succeeded};
    match from {
        Idle => vec![Running],
        Running => vec![Succeeded],
        Succeeded => vec![Running, Idle],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TestProviderState::{Idle, Running, Succeeded};

    #[test]
    fn lifecycle() {
        assert!(validate_transition(Idle, Running).is_ok());
        assert!(validate_transition(Running, Succeeded).is_ok());
        assert!(validate_transition(Succeeded, Running).is_ok());

        assert!(validate_transition(Idle, Succeeded).is_err());
        assert!(validate_transition(Running, Running).is_err());
        assert!(validate_transition(Succeeded, Succeeded).is_err());
    }

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_string(&Running).unwrap(),
            r#""test-provider-state:running""#
        );
    }
}
