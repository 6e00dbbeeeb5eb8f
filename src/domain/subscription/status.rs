//! Subscription status state machine.
//!
//! Statuses follow the gate lifecycle: a paid or granted subscription is
//! `Active`, the sweep demotes lapsed ones to `Expired`, and the gateway can
//! cancel at any point. Renewal payments reactivate in place, including a
//! record the sweep expired moments earlier.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Gateway reports the subscription as incomplete. No access.
    Pending,

    /// Paid or manually granted. Member of the group.
    Active,

    /// Canceled at the gateway. Terminal.
    Canceled,

    /// Billing period ended without renewal.
    Expired,
}

impl SubscriptionStatus {
    /// All statuses, in storage order.
    pub const ALL: [SubscriptionStatus; 4] = [
        SubscriptionStatus::Pending,
        SubscriptionStatus::Active,
        SubscriptionStatus::Canceled,
        SubscriptionStatus::Expired,
    ];

    /// Returns true if this status grants group membership.
    pub fn has_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }

    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Expired => "expired",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SubscriptionStatus::Pending),
            "active" => Some(SubscriptionStatus::Active),
            "canceled" | "cancelled" => Some(SubscriptionStatus::Canceled),
            "expired" => Some(SubscriptionStatus::Expired),
            _ => None,
        }
    }

    /// Maps a Stripe subscription status onto the gate lifecycle.
    ///
    /// `past_due` keeps access while Stripe retries the charge. Statuses with
    /// no gate meaning (for example `paused`) return `None` and leave the
    /// stored status untouched.
    pub fn from_gateway(status: &str) -> Option<Self> {
        match status {
            "active" | "trialing" | "past_due" => Some(SubscriptionStatus::Active),
            "canceled" | "unpaid" | "incomplete_expired" => Some(SubscriptionStatus::Canceled),
            "incomplete" => Some(SubscriptionStatus::Pending),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            (Pending, Active)
                | (Pending, Canceled)
                | (Pending, Expired)
                | (Active, Active) // Renewal
                | (Active, Canceled)
                | (Active, Expired)
                | (Expired, Active) // Late renewal after the sweep
                | (Expired, Canceled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Pending => vec![Active, Canceled, Expired],
            Active => vec![Active, Canceled, Expired],
            Expired => vec![Active, Canceled],
            Canceled => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_has_access() {
        assert!(SubscriptionStatus::Active.has_access());
        assert!(!SubscriptionStatus::Pending.has_access());
        assert!(!SubscriptionStatus::Canceled.has_access());
        assert!(!SubscriptionStatus::Expired.has_access());
    }

    #[test]
    fn active_can_renew_in_place() {
        let result = SubscriptionStatus::Active.transition_to(SubscriptionStatus::Active);
        assert_eq!(result, Ok(SubscriptionStatus::Active));
    }

    #[test]
    fn expired_can_be_reactivated_by_renewal() {
        assert!(SubscriptionStatus::Expired.can_transition_to(&SubscriptionStatus::Active));
    }

    #[test]
    fn canceled_is_terminal() {
        assert!(SubscriptionStatus::Canceled.is_terminal());
        assert!(SubscriptionStatus::Canceled
            .transition_to(SubscriptionStatus::Active)
            .is_err());
    }

    #[test]
    fn valid_transitions_agree_with_can_transition_to() {
        for from in SubscriptionStatus::ALL {
            for to in SubscriptionStatus::ALL {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn storage_representation_round_trips() {
        for status in SubscriptionStatus::ALL {
            assert_eq!(SubscriptionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SubscriptionStatus::parse("unknown"), None);
    }

    #[test]
    fn gateway_statuses_map_onto_lifecycle() {
        assert_eq!(
            SubscriptionStatus::from_gateway("past_due"),
            Some(SubscriptionStatus::Active)
        );
        assert_eq!(
            SubscriptionStatus::from_gateway("unpaid"),
            Some(SubscriptionStatus::Canceled)
        );
        assert_eq!(
            SubscriptionStatus::from_gateway("incomplete"),
            Some(SubscriptionStatus::Pending)
        );
        assert_eq!(SubscriptionStatus::from_gateway("paused"), None);
    }
}
