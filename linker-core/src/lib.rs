//! linker-core: Shared infrastructure for the donation linking batch service.
pub mod error;
pub mod observability;
pub mod retry;
pub mod tenant;
