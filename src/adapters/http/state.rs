//! Shared state handed to every HTTP handler.

use std::sync::Arc;

use crate::application::{
    GetSubscriptionStatsHandler, GrantSubscriptionHandler, HandlePaymentWebhookHandler,
    ListSubscribersHandler, StatusCheckHandler,
};

/// Application handlers behind the `/api` routes.
///
/// Cloned per request; every field is reference counted.
#[derive(Clone)]
pub struct ApiState {
    pub webhook: Arc<HandlePaymentWebhookHandler>,
    pub grant: Arc<GrantSubscriptionHandler>,
    pub subscribers: Arc<ListSubscribersHandler>,
    pub stats: Arc<GetSubscriptionStatsHandler>,
    pub status_checks: Arc<StatusCheckHandler>,
    /// Bearer token required on `/admin/*`. `None` leaves them open.
    pub admin_token: Option<Arc<str>>,
}
