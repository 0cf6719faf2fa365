//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - The unified [`error::app_error::AppError`] and its [`error::kind::ErrorKind`]
//! - Typed identifiers for resources, creators and unlock sessions
//!
//! Nothing here knows how a resource is unlocked; that lives in the `unlock` crate.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
