//! Infrastructure Layer
//!
//! Adapters for the domain ports.

pub mod identity;
pub mod memory;
pub mod postgres;
pub mod storage;
