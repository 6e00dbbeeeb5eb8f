//! Subscription aggregate.
//!
//! One record per paid or granted access window. A user may accumulate many
//! historical records but at most one is `Active` at a time; the application
//! layer enforces that across records.
//!
//! # Invariants
//!
//! - Status transitions follow [`SubscriptionStatus`] state machine rules
//! - An `Active` record always carries a billing period
//! - Money is stored in minor units

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, StateMachine, SubscriptionId, TelegramUserId, Timestamp, UserId,
};

use super::{BillingPeriod, Money, SubscriptionStatus};

/// Stripe object ids linked to a paid subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRefs {
    pub subscription_id: Option<String>,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    pub price_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub telegram_user_id: TelegramUserId,
    pub gateway: GatewayRefs,
    pub status: SubscriptionStatus,
    pub price: Money,
    pub period: Option<BillingPeriod>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Creates an active subscription confirmed by a completed checkout.
    pub fn activate_paid(
        user_id: UserId,
        telegram_user_id: TelegramUserId,
        gateway: GatewayRefs,
        price: Money,
        period: BillingPeriod,
        now: Timestamp,
    ) -> Self {
        Self {
            id: SubscriptionId::new(),
            user_id,
            telegram_user_id,
            gateway,
            status: SubscriptionStatus::Active,
            price,
            period: Some(period),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an active subscription granted outside the payment flow.
    pub fn grant_manual(
        user_id: UserId,
        telegram_user_id: TelegramUserId,
        price: Money,
        period: BillingPeriod,
        now: Timestamp,
    ) -> Self {
        Self::activate_paid(
            user_id,
            telegram_user_id,
            GatewayRefs::default(),
            price,
            period,
            now,
        )
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// End of the current billing period, if one is known.
    pub fn period_end(&self) -> Option<Timestamp> {
        self.period.map(|p| p.end)
    }

    /// True when the record is active but its period ended before `now`.
    pub fn is_lapsed(&self, now: &Timestamp) -> bool {
        self.is_active() && self.period.map_or(false, |p| p.has_lapsed(now))
    }

    /// Sweep demotion: the period ran out without renewal.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.move_to(SubscriptionStatus::Expired, now)
    }

    /// Gateway cancellation.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.move_to(SubscriptionStatus::Canceled, now)
    }

    /// Successful recurring payment: reactivate with the new period.
    pub fn renew(&mut self, period: BillingPeriod, now: Timestamp) -> Result<(), DomainError> {
        self.move_to(SubscriptionStatus::Active, now)?;
        self.period = Some(period);
        Ok(())
    }

    /// Overwrites status and period with what the gateway reports.
    ///
    /// `status = None` means the gateway status has no gate meaning; only the
    /// period is refreshed. Reporting the current status again is a no-op
    /// transition.
    pub fn sync_from_gateway(
        &mut self,
        status: Option<SubscriptionStatus>,
        period: Option<BillingPeriod>,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        if let Some(target) = status {
            if target != self.status {
                self.move_to(target, now)?;
            }
        }
        if let Some(period) = period {
            self.period = Some(period);
        }
        self.updated_at = now;
        Ok(())
    }

    fn move_to(&mut self, target: SubscriptionStatus, now: Timestamp) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("subscription_id", self.id.to_string())
        })?;
        self.updated_at = now;
        Ok(())
    }
}
