//! Stripe webhook and admin endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AddSubscriberRequest, StatsResponse, SubscriberResponse, SubscribersResponse,
    SuccessResponse, TransactionResponse, WebhookAck,
};
pub use routes::subscription_routes;
