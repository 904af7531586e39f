use crate::orders::OrderStatus;

/// Service for managing order status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → Paid, PaymentError
    /// - PaymentError → Paid (late confirmation / manual recovery)
    /// - Paid → (terminal)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        // Same status is always valid (idempotent)
        if from == to {
            return true;
        }

        match (from, to) {
            (OrderStatus::Pending, OrderStatus::Paid) => true,
            (OrderStatus::Pending, OrderStatus::PaymentError) => true,

            // A confirmation arriving after a recorded failure wins
            (OrderStatus::PaymentError, OrderStatus::Paid) => true,

            // Paid is terminal; a paid order never regresses
            (OrderStatus::Paid, _) => false,

            _ => false,
        }
    }

    /// Attempt to transition from one status to another
    ///
    /// # Returns
    /// `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(from: OrderStatus, to: OrderStatus) -> Result<OrderStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid status transition from {} to {}", from, to))
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn order_status_strategy() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::Pending),
            Just(OrderStatus::Paid),
            Just(OrderStatus::PaymentError),
        ]
    }

    /// Transitioning to the same status is always allowed
    #[test]
    fn prop_same_status_is_valid() {
        proptest!(|(status in order_status_strategy())| {
            prop_assert!(StatusMachine::is_valid_transition(status, status));
        });
    }

    /// Paid is reachable from every non-terminal state
    #[test]
    fn prop_paid_reachable_from_non_terminal() {
        proptest!(|(from in order_status_strategy())| {
            prop_assert!(StatusMachine::is_valid_transition(from, OrderStatus::Paid));
        });
    }

    /// transition() and is_valid_transition() agree
    #[test]
    fn prop_transition_consistency() {
        proptest!(|(
            from in order_status_strategy(),
            to in order_status_strategy()
        )| {
            let is_valid = StatusMachine::is_valid_transition(from, to);
            let result = StatusMachine::transition(from, to);

            if is_valid {
                prop_assert_eq!(result, Ok(to));
            } else {
                prop_assert!(result.is_err());
            }
        });
    }
}
