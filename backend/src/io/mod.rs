//! # IO Module
//!
//! The adapter layer between clients and the domain logic. It exposes the
//! domain over a JSON REST API (Axum), maps the `shared` DTOs to domain
//! commands and back, and turns domain errors into HTTP status codes.

pub mod rest;

pub use rest::*;
