//! Booking lifecycle as a pure transition function, decoupled from
//! persistence and transport.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::errors::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    ProviderEnroute,
    InProgress,
    Completed,
    Cancelled,
    RefundRequested,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Accept,
    Reject,
    Start,
    Complete,
    Cancel,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::ProviderEnroute => "provider_enroute",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::RefundRequested => "refund_requested",
            BookingStatus::Refunded => "refunded",
        }
    }

    /// No action leads out of a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Refunded)
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "provider_enroute" => Ok(BookingStatus::ProviderEnroute),
            "in_progress" => Ok(BookingStatus::InProgress),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "refund_requested" => Ok(BookingStatus::RefundRequested),
            "refunded" => Ok(BookingStatus::Refunded),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Accept => "accept",
            BookingAction::Reject => "reject",
            BookingAction::Start => "start",
            BookingAction::Complete => "complete",
            BookingAction::Cancel => "cancel",
        }
    }
}

impl FromStr for BookingAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(BookingAction::Accept),
            "reject" => Ok(BookingAction::Reject),
            "start" => Ok(BookingAction::Start),
            "complete" => Ok(BookingAction::Complete),
            "cancel" => Ok(BookingAction::Cancel),
            other => Err(format!("unknown booking action: {}", other)),
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the next status for `action` performed by `role`, or reject.
///
/// Terminal states reject every action. A defined edge attempted by the
/// wrong role is a role error, anything else is an invalid transition.
pub fn next_status(
    current: BookingStatus,
    action: BookingAction,
    role: Role,
) -> Result<BookingStatus, TransitionError> {
    use BookingAction::*;
    use BookingStatus::*;

    if current.is_terminal() {
        return Err(TransitionError::Terminal(current.as_str().into()));
    }

    let provider_ok = matches!(role, Role::Provider | Role::Admin);
    let customer_ok = matches!(role, Role::Customer | Role::Admin);

    match (current, action) {
        (Pending, Accept) if provider_ok => Ok(Confirmed),
        (Pending, Reject) if provider_ok => Ok(Cancelled),
        (Confirmed, Start) if provider_ok => Ok(InProgress),
        (ProviderEnroute, Start) if provider_ok => Ok(InProgress),
        (InProgress, Complete) if provider_ok => Ok(Completed),
        (Pending, Cancel) | (Confirmed, Cancel) if customer_ok => Ok(Cancelled),
        // Defined edge, wrong role
        (Pending, Accept) | (Pending, Reject) | (Confirmed, Start) | (ProviderEnroute, Start)
        | (InProgress, Complete) | (Pending, Cancel) | (Confirmed, Cancel) => {
            Err(TransitionError::WrongRole { role: role.to_string(), action: action.to_string() })
        }
        _ => Err(TransitionError::Invalid { from: current.to_string(), action: action.to_string() }),
    }
}

/// Administrative override path for the states no customer/provider action
/// produces. Explicit allowlist; everything else is rejected.
pub fn admin_override(
    current: BookingStatus,
    target: BookingStatus,
) -> Result<BookingStatus, TransitionError> {
    use BookingStatus::*;

    let allowed = matches!(
        (current, target),
        (Confirmed, ProviderEnroute)
            | (ProviderEnroute, InProgress)
            | (Completed, RefundRequested)
            | (RefundRequested, Refunded)
            | (RefundRequested, Completed)
    ) || (!current.is_terminal() && target == Cancelled && current != Cancelled);

    if allowed {
        Ok(target)
    } else if current.is_terminal() && !matches!((current, target), (Completed, RefundRequested)) {
        Err(TransitionError::Terminal(current.as_str().into()))
    } else {
        Err(TransitionError::Invalid { from: current.to_string(), action: format!("override:{}", target) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_happy_path() {
        assert_eq!(next_status(BookingStatus::Pending, BookingAction::Accept, Role::Provider).unwrap(), BookingStatus::Confirmed);
        assert_eq!(next_status(BookingStatus::Pending, BookingAction::Reject, Role::Provider).unwrap(), BookingStatus::Cancelled);
        assert_eq!(next_status(BookingStatus::Confirmed, BookingAction::Start, Role::Provider).unwrap(), BookingStatus::InProgress);
        assert_eq!(next_status(BookingStatus::InProgress, BookingAction::Complete, Role::Provider).unwrap(), BookingStatus::Completed);
    }

    #[test]
    fn terminal_states_reject_everything() {
        for terminal in [BookingStatus::Completed, BookingStatus::Cancelled, BookingStatus::Refunded] {
            for action in [
                BookingAction::Accept,
                BookingAction::Reject,
                BookingAction::Start,
                BookingAction::Complete,
                BookingAction::Cancel,
            ] {
                for role in [Role::Customer, Role::Provider, Role::Admin] {
                    assert_eq!(
                        next_status(terminal, action, role),
                        Err(TransitionError::Terminal(terminal.as_str().into())),
                        "{:?} --{:?}({:?})--> must be rejected",
                        terminal,
                        action,
                        role
                    );
                }
            }
        }
    }

    #[test]
    fn customer_cannot_accept_or_complete() {
        assert!(matches!(
            next_status(BookingStatus::Pending, BookingAction::Accept, Role::Customer),
            Err(TransitionError::WrongRole { .. })
        ));
        assert!(matches!(
            next_status(BookingStatus::InProgress, BookingAction::Complete, Role::Customer),
            Err(TransitionError::WrongRole { .. })
        ));
    }

    #[test]
    fn customer_and_admin_cancel_before_start() {
        assert_eq!(next_status(BookingStatus::Pending, BookingAction::Cancel, Role::Customer).unwrap(), BookingStatus::Cancelled);
        assert_eq!(next_status(BookingStatus::Confirmed, BookingAction::Cancel, Role::Admin).unwrap(), BookingStatus::Cancelled);
        // Work already underway cannot be cancelled from the customer side
        assert!(matches!(
            next_status(BookingStatus::InProgress, BookingAction::Cancel, Role::Customer),
            Err(TransitionError::Invalid { .. })
        ));
    }

    #[test]
    fn start_is_not_reachable_from_pending() {
        assert!(matches!(
            next_status(BookingStatus::Pending, BookingAction::Start, Role::Provider),
            Err(TransitionError::Invalid { .. })
        ));
    }

    #[test]
    fn override_allowlist() {
        assert_eq!(admin_override(BookingStatus::Confirmed, BookingStatus::ProviderEnroute).unwrap(), BookingStatus::ProviderEnroute);
        assert_eq!(admin_override(BookingStatus::Completed, BookingStatus::RefundRequested).unwrap(), BookingStatus::RefundRequested);
        assert_eq!(admin_override(BookingStatus::RefundRequested, BookingStatus::Refunded).unwrap(), BookingStatus::Refunded);
        assert_eq!(admin_override(BookingStatus::Pending, BookingStatus::Cancelled).unwrap(), BookingStatus::Cancelled);
        // Cancelled/refunded stay closed even to admins
        assert!(admin_override(BookingStatus::Cancelled, BookingStatus::Pending).is_err());
        assert!(admin_override(BookingStatus::Refunded, BookingStatus::Completed).is_err());
        // No skipping straight to refunded
        assert!(admin_override(BookingStatus::Completed, BookingStatus::Refunded).is_err());
    }
}
