//! User domain module.

mod aggregate;

pub use aggregate::{display_name, User};
