use crate::error::AppError;
use crate::models::delivery::DeliveryStatus;

impl DeliveryStatus {
    /// The single legal successor, or None for the terminal state.
    pub fn next(&self) -> Option<DeliveryStatus> {
        match self {
            DeliveryStatus::Posted => Some(DeliveryStatus::Accepted),
            DeliveryStatus::Accepted => Some(DeliveryStatus::PickedUp),
            DeliveryStatus::PickedUp => Some(DeliveryStatus::Delivered),
            DeliveryStatus::Delivered => None,
        }
    }
}

/// Checks that `from -> to` follows the fixed chain
/// posted -> accepted -> picked_up -> delivered. No skips, no reversals,
/// no self-loops. Both Accept and UpdateStatus go through here.
pub fn valid_transition(from: DeliveryStatus, to: DeliveryStatus) -> Result<(), AppError> {
    match from.next() {
        Some(next) if next == to => Ok(()),
        _ => Err(AppError::InvalidTransition { from, to }),
    }
}

#[cfg(test)]
mod tests {
    use super::valid_transition;
    use crate::models::delivery::DeliveryStatus::{self, Accepted, Delivered, PickedUp, Posted};

    const ALL: [DeliveryStatus; 4] = [Posted, Accepted, PickedUp, Delivered];

    #[test]
    fn only_the_designated_successor_is_allowed() {
        for from in ALL {
            for to in ALL {
                let allowed = matches!(
                    (from, to),
                    (Posted, Accepted) | (Accepted, PickedUp) | (PickedUp, Delivered)
                );
                assert_eq!(
                    valid_transition(from, to).is_ok(),
                    allowed,
                    "unexpected verdict for {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn self_loops_are_rejected() {
        for status in ALL {
            assert!(valid_transition(status, status).is_err());
        }
    }

    #[test]
    fn delivered_is_terminal() {
        for to in ALL {
            assert!(valid_transition(Delivered, to).is_err());
        }
    }
}
