//! Request/response DTOs for the REST API.

pub mod links;
pub mod shorten;
pub mod stats;
