//! Order fulfillment states with an enforced transition table.
//!
//! Transitions move forward through the fulfillment sequence only (skips
//! allowed); cancelled/returned are reachable from any pre-delivered state;
//! delivered, cancelled and returned are closed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    Processing,
    Packed,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Processing => "processing",
            OrderStatus::Packed => "packed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Returned => "returned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Returned)
    }

    /// Position in the forward fulfillment sequence; terminal side exits
    /// (cancelled/returned) have none.
    fn sequence_index(&self) -> Option<u8> {
        match self {
            OrderStatus::PendingPayment => Some(0),
            OrderStatus::Processing => Some(1),
            OrderStatus::Packed => Some(2),
            OrderStatus::Shipped => Some(3),
            OrderStatus::OutForDelivery => Some(4),
            OrderStatus::Delivered => Some(5),
            OrderStatus::Cancelled | OrderStatus::Returned => None,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(OrderStatus::PendingPayment),
            "processing" => Ok(OrderStatus::Processing),
            "packed" => Ok(OrderStatus::Packed),
            "shipped" => Ok(OrderStatus::Shipped),
            "out_for_delivery" => Ok(OrderStatus::OutForDelivery),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "returned" => Ok(OrderStatus::Returned),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a requested status change. Unlike bookings there is no action
/// vocabulary; fulfillment UIs ask for a target state directly.
pub fn check_transition(current: OrderStatus, next: OrderStatus) -> Result<(), TransitionError> {
    if current.is_terminal() {
        return Err(TransitionError::Terminal(current.as_str().into()));
    }
    if next == current {
        return Err(TransitionError::Invalid {
            from: current.to_string(),
            action: format!("set:{}", next),
        });
    }
    // Side exits are open until the parcel is delivered
    if matches!(next, OrderStatus::Cancelled | OrderStatus::Returned) {
        return Ok(());
    }
    match (current.sequence_index(), next.sequence_index()) {
        (Some(from), Some(to)) if to > from => Ok(()),
        _ => Err(TransitionError::Invalid {
            from: current.to_string(),
            action: format!("set:{}", next),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 8] = [
        OrderStatus::PendingPayment,
        OrderStatus::Processing,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
    ];

    #[test]
    fn forward_moves_allowed_backward_rejected() {
        assert!(check_transition(OrderStatus::PendingPayment, OrderStatus::Processing).is_ok());
        assert!(check_transition(OrderStatus::Processing, OrderStatus::Shipped).is_ok(), "skips allowed");
        assert!(check_transition(OrderStatus::Shipped, OrderStatus::Delivered).is_ok());
        assert!(check_transition(OrderStatus::Shipped, OrderStatus::Processing).is_err());
        assert!(check_transition(OrderStatus::Delivered, OrderStatus::OutForDelivery).is_err());
    }

    #[test]
    fn side_exits_open_until_delivery() {
        for from in [
            OrderStatus::PendingPayment,
            OrderStatus::Processing,
            OrderStatus::Packed,
            OrderStatus::Shipped,
            OrderStatus::OutForDelivery,
        ] {
            assert!(check_transition(from, OrderStatus::Cancelled).is_ok());
            assert!(check_transition(from, OrderStatus::Returned).is_ok());
        }
    }

    #[test]
    fn terminal_states_are_closed() {
        for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled, OrderStatus::Returned] {
            for next in ALL {
                assert_eq!(
                    check_transition(terminal, next),
                    Err(TransitionError::Terminal(terminal.as_str().into())),
                    "{:?} -> {:?} must be rejected",
                    terminal,
                    next
                );
            }
        }
    }

    #[test]
    fn self_transition_rejected() {
        assert!(check_transition(OrderStatus::Processing, OrderStatus::Processing).is_err());
    }

    #[test]
    fn status_round_trips_through_string() {
        for s in ALL {
            assert_eq!(s.as_str().parse::<OrderStatus>().unwrap(), s);
        }
        assert!("lost_in_transit".parse::<OrderStatus>().is_err());
    }
}
