//! HTTP API handlers for trust-api

pub mod batch;
pub mod health;
pub mod sse;
pub mod user;

pub use batch::batch_routes;
pub use health::health_routes;
pub use sse::event_stream;
pub use user::user_routes;
