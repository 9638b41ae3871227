//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// The state of the checkout flow.
///
/// State transitions:
/// ```text
/// Idle ──► Submitting ──┬──► Succeeded
///   │                   └──► Failed
///   └──────────────────────► Failed   (no credential, empty cart)
/// ```
///
/// `Succeeded` and `Failed` both allow a new submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// No submission has been made yet.
    #[default]
    Idle,

    /// An order request is in flight.
    Submitting,

    /// The last order was accepted and the cart was cleared (terminal state).
    Succeeded,

    /// The last attempt failed; the cart was left as it was (terminal state).
    Failed,
}

impl CheckoutState {
    /// Returns true if a new submission may start.
    pub fn can_submit(&self) -> bool {
        !matches!(self, CheckoutState::Submitting)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Succeeded | CheckoutState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "Idle",
            CheckoutState::Submitting => "Submitting",
            CheckoutState::Succeeded => "Succeeded",
            CheckoutState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
