//! In-memory adapters.
//!
//! Process-local implementations of the storage ports and a controllable
//! clock, used by the test suites.

mod clock;
mod status_check_repository;
mod subscription_repository;
mod transaction_repository;
mod user_repository;
mod webhook_event_repository;

pub use clock::ManualClock;
pub use status_check_repository::InMemoryStatusCheckRepository;
pub use subscription_repository::InMemorySubscriptionRepository;
pub use transaction_repository::InMemoryTransactionRepository;
pub use user_repository::InMemoryUserRepository;
pub use webhook_event_repository::InMemoryWebhookEventRepository;
