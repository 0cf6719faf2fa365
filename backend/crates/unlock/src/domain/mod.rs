//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Resource, UnlockSession)
//! - Domain value objects (UnlockMethod, UnlockRequirement, FileReference)
//! - Domain services (the unlock requirement evaluator)
//! - Repository and gateway traits (interfaces)

pub mod entities;
pub mod gateway;
pub mod repository;
pub mod services;
pub mod value_objects;
