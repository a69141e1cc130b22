//! Library crate for team-sorter-back, exposing modules for binaries and integration tests.

/// Runtime configuration loaded from the environment.
pub mod config;
/// Persistence layer: stored entities and roster stores.
pub mod dao;
/// Request and response payloads exchanged over HTTP and SSE.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP route trees.
pub mod routes;
/// Business logic called by the routes.
pub mod services;
/// Shared in-memory application state.
pub mod state;
