//! API endpoint handlers, one module per resource.

pub mod appointments;
pub mod assistant;
pub mod chat;
pub mod doctors;
pub mod health;
