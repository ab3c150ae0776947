//! Gateway layer for Omnigate.
//!
//! # Architecture
//!
//! - [`session::SessionTable`] — registered clients and their capability bindings
//! - [`dispatcher::Dispatcher`] — validated chat/embedding routing, streaming
//! - [`vector_service::VectorService`] — store/collection selection for vector calls
//! - [`service::Gateway`] — the caller-facing operations in one place
//! - [`routes`] / [`server`] — HTTP/JSON transport with SSE streaming

pub mod dispatcher;
pub mod error;
pub mod routes;
pub mod server;
pub mod service;
pub mod session;
pub mod vector_service;

#[cfg(test)]
mod test_support;

pub use dispatcher::{ChatStream, Dispatcher};
pub use routes::create_router;
pub use server::{serve, start_server};
pub use service::Gateway;
pub use session::{ClientSession, SessionTable};
pub use vector_service::VectorService;
