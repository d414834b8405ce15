//! Pumpwatch API Module
//! REST API for pump.fun token risk analysis and alerting

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
