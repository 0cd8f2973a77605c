//! Quote request lifecycle: request, offer, decision, close.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::errors::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Responded,
    Accepted,
    Rejected,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteAction {
    Respond,
    Accept,
    Reject,
    Close,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Responded => "responded",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Closed => "closed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QuoteStatus::Closed)
    }
}

impl FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(QuoteStatus::Pending),
            "responded" => Ok(QuoteStatus::Responded),
            "accepted" => Ok(QuoteStatus::Accepted),
            "rejected" => Ok(QuoteStatus::Rejected),
            "closed" => Ok(QuoteStatus::Closed),
            other => Err(format!("unknown quote status: {}", other)),
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QuoteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteAction::Respond => "respond",
            QuoteAction::Accept => "accept",
            QuoteAction::Reject => "reject",
            QuoteAction::Close => "close",
        }
    }
}

impl fmt::Display for QuoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// pending --respond--> responded (more offers may follow), responded
/// --accept/reject--> accepted/rejected, then close.
pub fn next_status(
    current: QuoteStatus,
    action: QuoteAction,
    role: Role,
) -> Result<QuoteStatus, TransitionError> {
    use QuoteAction::*;
    use QuoteStatus::*;

    if current.is_terminal() {
        return Err(TransitionError::Terminal(current.as_str().into()));
    }

    let provider_ok = matches!(role, Role::Provider | Role::Admin);
    let customer_ok = matches!(role, Role::Customer | Role::Admin);

    match (current, action) {
        (Pending, Respond) | (Responded, Respond) if provider_ok => Ok(Responded),
        (Responded, Accept) if customer_ok => Ok(Accepted),
        (Responded, Reject) if customer_ok => Ok(Rejected),
        (Accepted, Close) | (Rejected, Close) if customer_ok => Ok(Closed),
        (Pending, Respond) | (Responded, Respond) | (Responded, Accept) | (Responded, Reject)
        | (Accepted, Close) | (Rejected, Close) => {
            Err(TransitionError::WrongRole { role: role.to_string(), action: action.to_string() })
        }
        _ => Err(TransitionError::Invalid { from: current.to_string(), action: action.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_offer_accept_close() {
        assert_eq!(next_status(QuoteStatus::Pending, QuoteAction::Respond, Role::Provider).unwrap(), QuoteStatus::Responded);
        assert_eq!(next_status(QuoteStatus::Responded, QuoteAction::Respond, Role::Provider).unwrap(), QuoteStatus::Responded);
        assert_eq!(next_status(QuoteStatus::Responded, QuoteAction::Accept, Role::Customer).unwrap(), QuoteStatus::Accepted);
        assert_eq!(next_status(QuoteStatus::Responded, QuoteAction::Reject, Role::Customer).unwrap(), QuoteStatus::Rejected);
        assert_eq!(next_status(QuoteStatus::Accepted, QuoteAction::Close, Role::Customer).unwrap(), QuoteStatus::Closed);
    }

    #[test]
    fn cannot_accept_before_offer() {
        assert!(matches!(
            next_status(QuoteStatus::Pending, QuoteAction::Accept, Role::Customer),
            Err(TransitionError::Invalid { .. })
        ));
    }

    #[test]
    fn provider_cannot_decide() {
        assert!(matches!(
            next_status(QuoteStatus::Responded, QuoteAction::Accept, Role::Provider),
            Err(TransitionError::WrongRole { .. })
        ));
    }

    #[test]
    fn closed_is_terminal() {
        for action in [QuoteAction::Respond, QuoteAction::Accept, QuoteAction::Reject, QuoteAction::Close] {
            assert!(matches!(
                next_status(QuoteStatus::Closed, action, Role::Admin),
                Err(TransitionError::Terminal(_))
            ));
        }
    }
}
