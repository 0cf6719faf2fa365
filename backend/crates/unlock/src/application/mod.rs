//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic, the in-memory session store and the
//! external collaborators.

pub mod claim_access;
pub mod config;
pub mod grant_access;
pub mod manage_resources;
pub mod open_session;
pub mod public_profile;
pub mod session_status;
pub mod session_store;
pub mod start_verification;
pub mod submit_code;

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
