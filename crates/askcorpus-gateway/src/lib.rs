//! # askcorpus gateway
//!
//! The online request surface: a small axum server exposing one
//! operation, "answer a question given a query string". The store is
//! loaded once at startup and shared read-only across requests; each
//! request flows retrieval → prompt → completion.

pub mod answer;
pub mod routes;
pub mod server;

pub use server::{AppState, start};
