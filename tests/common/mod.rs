//! Shared wiring for the integration suites: the real composition root over
//! in-memory storage, a mock gateway and a mock chat platform.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use subscription_gate::adapters::http::api_router;
use subscription_gate::adapters::memory::{
    InMemoryStatusCheckRepository, InMemorySubscriptionRepository, InMemoryTransactionRepository,
    InMemoryUserRepository, InMemoryWebhookEventRepository, ManualClock,
};
use subscription_gate::adapters::stripe::MockPaymentProvider;
use subscription_gate::adapters::telegram::MockMessagingPlatform;
use subscription_gate::context::{AppContext, GateSettings, Ports};
use subscription_gate::domain::foundation::{TelegramUserId, Timestamp};
use subscription_gate::domain::subscription::{
    compute_signature_header, GroupAccess, Money, SubscriptionPlan,
};
use subscription_gate::ports::{BotUpdate, ButtonAction, ChatProfile, Clock};

pub const SECRET: &str = "whsec_integration";
pub const T0: i64 = 1_704_067_200;
pub const DAY: i64 = 86_400;
pub const GROUP: i64 = -1_001_234_567_890;
pub const INVITE: &str = "https://t.me/+integration";
pub const ADMIN: i64 = 42;

pub struct Harness {
    pub context: AppContext,
    pub users: Arc<InMemoryUserRepository>,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    pub transactions: Arc<InMemoryTransactionRepository>,
    pub webhook_events: Arc<InMemoryWebhookEventRepository>,
    pub payments: MockPaymentProvider,
    pub messaging: MockMessagingPlatform,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_admin_token(None)
    }

    pub fn with_admin_token(admin_token: Option<&str>) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let transactions = Arc::new(InMemoryTransactionRepository::new());
        let webhook_events = Arc::new(InMemoryWebhookEventRepository::new());
        let payments = MockPaymentProvider::new();
        let messaging = MockMessagingPlatform::new();
        let clock = Arc::new(ManualClock::new(Timestamp::from_unix_secs(T0).unwrap()));

        let ports = Ports {
            users: users.clone(),
            subscriptions: subscriptions.clone(),
            transactions: transactions.clone(),
            webhook_events: webhook_events.clone(),
            status_checks: Arc::new(InMemoryStatusCheckRepository::new()),
            payments: Arc::new(payments.clone()),
            messaging: Arc::new(messaging.clone()),
            clock: clock.clone(),
        };
        let settings = GateSettings {
            plan: SubscriptionPlan {
                price: Money::new(999, "UAH"),
                period_days: 30,
            },
            group: GroupAccess {
                group_id: GROUP,
                invite_link: INVITE.to_string(),
            },
            stripe_price_id: "price_integration".to_string(),
            webhook_secret: SECRET.to_string(),
            base_url: "https://gate.example.com".to_string(),
            admin_ids: vec![TelegramUserId::new(ADMIN)],
            admin_token: admin_token.map(str::to_string),
            event_retention_days: 30,
        };

        Self {
            context: AppContext::new(ports, settings),
            users,
            subscriptions,
            transactions,
            webhook_events,
            payments,
            messaging,
            clock,
        }
    }

    pub fn router(&self) -> Router {
        api_router(self.context.api.clone())
    }

    /// Sends `/start` from a user with the given username.
    pub async fn start(&self, tg: i64, username: &str) {
        self.context
            .bot
            .handle(BotUpdate::Command {
                chat_id: tg,
                from: profile(tg, username),
                command: "start".to_string(),
            })
            .await
            .unwrap();
    }

    /// Presses the subscribe button and returns the checkout session id.
    pub async fn subscribe(&self, tg: i64, username: &str) -> String {
        self.context
            .bot
            .handle(BotUpdate::Button {
                callback_id: format!("cb_{}", tg),
                chat_id: tg,
                message_id: 1,
                from: profile(tg, username),
                action: ButtonAction::Subscribe,
            })
            .await
            .unwrap();
        self.payments.last_checkout_session().unwrap().id
    }

    /// Signed webhook request for the given event.
    pub fn webhook_request(&self, id: &str, event_type: &str, object: Value) -> Request<Body> {
        let now = self.clock.now().as_unix_secs();
        let payload = serde_json::to_vec(&json!({
            "id": id,
            "type": event_type,
            "created": now,
            "livemode": false,
            "data": { "object": object }
        }))
        .unwrap();
        let signature = compute_signature_header(SECRET, now, &payload).unwrap();

        Request::builder()
            .method("POST")
            .uri("/api/stripe-webhook")
            .header("Content-Type", "application/json")
            .header("Stripe-Signature", signature)
            .body(Body::from(payload))
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

pub fn profile(tg: i64, username: &str) -> ChatProfile {
    ChatProfile {
        id: TelegramUserId::new(tg),
        username: Some(username.to_string()),
        first_name: Some("Test".to_string()),
        last_name: None,
    }
}

pub fn checkout_completed(session_id: &str, tg: i64, subscription_id: &str) -> Value {
    json!({
        "id": session_id,
        "object": "checkout.session",
        "customer": "cus_integration",
        "subscription": subscription_id,
        "metadata": { "telegram_user_id": tg.to_string() }
    })
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
