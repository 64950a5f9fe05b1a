//! HTTP adapter - the REST surface over the application services.

mod dto;
mod handlers;
mod routes;

pub use handlers::AppState;
pub use routes::app_router;
