//! Application layer: services and operation interceptors.

pub mod interceptors;
pub mod services;
