//! Infrastructure layer: DTOs and concrete store implementations.

pub mod dto;
pub mod store;
