//! API layer: handlers, DTOs, middleware, and client metadata extraction.

pub mod client_meta;
pub mod dto;
pub mod handlers;
pub mod middleware;
