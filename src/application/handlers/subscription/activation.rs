//! Keeps at most one active subscription per chat user.

use crate::domain::foundation::{DomainError, SubscriptionId, TelegramUserId, Timestamp};
use crate::ports::SubscriptionRepository;

/// Expires every active row of `user` except `keep`.
///
/// Run before a row becomes active so the new row is the only one. The
/// superseded rows get no side effects: the user keeps group access through
/// the row replacing them.
pub(crate) async fn supersede_active(
    subscriptions: &dyn SubscriptionRepository,
    user: TelegramUserId,
    keep: &SubscriptionId,
    now: Timestamp,
) -> Result<usize, DomainError> {
    let mut superseded = 0;
    for mut other in subscriptions.find_active_by_telegram_user(user).await? {
        if other.id == *keep {
            continue;
        }
        other.expire(now)?;
        subscriptions.update(&other).await?;
        superseded += 1;
        tracing::info!(
            subscription_id = %other.id,
            replaced_by = %keep,
            telegram_user_id = %user,
            "Superseded active subscription"
        );
    }
    Ok(superseded)
}
