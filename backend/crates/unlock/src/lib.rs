//! Unlock Engine
//!
//! Clean Architecture structure:
//! - `domain/` - Requirement evaluation, session state machine, ports
//! - `application/` - Use cases and the in-memory session store
//! - `infra/` - PostgreSQL, Supabase Storage and token identity adapters
//! - `presentation/` - HTTP handlers
//!
//! ## Security Model
//! - The server is the only place a requirement is evaluated; clients never see codes
//! - Unlock sessions are held in memory and bound to the User-Agent fingerprint
//! - Creators can only reference storage objects under their own `{creator_id}/` folder
//! - A session only reads as unlocked once a download link exists (fail closed)
//! - The unlock counter is incremented once per session, atomically in the database

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::UnlockConfig;
pub use application::session_store::UnlockSessionStore;
pub use error::{UnlockError, UnlockResult};
pub use infra::identity::SignedTokenIdentity;
pub use infra::memory::{InMemoryCreatorRepository, InMemoryResourceRepository};
pub use infra::postgres::{PgCreatorRepository, PgResourceRepository};
pub use infra::storage::{DEFAULT_BUCKET, StorageConfig, SupabaseStorage};
pub use presentation::handlers::UnlockAppState;
pub use presentation::router::{PgUnlockAppState, unlock_router, unlock_router_with_state};

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};
