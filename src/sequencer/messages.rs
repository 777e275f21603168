//! Failure-point message table
//!
//! Maps the index of the first failed step to the error card shown at the
//! end of a failed run. The table is keyed by position, not by step label:
//! reordering the configured steps changes which message a failure shows.

/// Title, short reason and user-facing sentence for a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureMessage {
    pub title: &'static str,
    pub reason: &'static str,
    pub detail: &'static str,
}

const INVALID_DETAILS: FailureMessage = FailureMessage {
    title: "Invalid Payment Details",
    reason: "payment information incorrect or incomplete",
    detail: "The payment information provided is incorrect or incomplete",
};

const SECURITY_CHECK: FailureMessage = FailureMessage {
    title: "Security Check Failed",
    reason: "transaction flagged by security system",
    detail: "Your transaction was flagged by our security system",
};

const PROCESSING_FAILED: FailureMessage = FailureMessage {
    title: "Payment Processing Failed",
    reason: "insufficient funds",
    detail: "Insufficient funds in your account",
};

const CONFIRMATION_FAILED: FailureMessage = FailureMessage {
    title: "Transaction Confirmation Failed",
    reason: "unable to confirm transaction, retry",
    detail: "Unable to confirm the transaction. Please try again",
};

/// Title used when the sequencer cannot start at all
pub const UNEXPECTED_ERROR_TITLE: &str = "An unexpected error occurred";

/// Reason used when the sequencer cannot start at all
pub const UNEXPECTED_ERROR_REASON: &str =
    "Please try again or contact support if the problem persists";

/// Look up the message for a failure at `step_index`.
///
/// Unknown indices fall back to the insufficient-funds entry.
pub fn failure_message(step_index: usize) -> &'static FailureMessage {
    match step_index {
        0 => &INVALID_DETAILS,
        1 => &SECURITY_CHECK,
        2 => &PROCESSING_FAILED,
        3 => &CONFIRMATION_FAILED,
        _ => &PROCESSING_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_indices() {
        assert_eq!(failure_message(0).title, "Invalid Payment Details");
        assert_eq!(
            failure_message(0).reason,
            "payment information incorrect or incomplete"
        );
        assert_eq!(failure_message(1).title, "Security Check Failed");
        assert_eq!(
            failure_message(1).reason,
            "transaction flagged by security system"
        );
        assert_eq!(failure_message(2).title, "Payment Processing Failed");
        assert_eq!(failure_message(2).reason, "insufficient funds");
        assert_eq!(failure_message(3).title, "Transaction Confirmation Failed");
        assert_eq!(
            failure_message(3).reason,
            "unable to confirm transaction, retry"
        );
    }

    #[test]
    fn test_unknown_index_falls_back_to_processing_failed() {
        assert_eq!(failure_message(4), failure_message(2));
        assert_eq!(failure_message(usize::MAX), failure_message(2));
    }
}
