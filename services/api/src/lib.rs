//! Workshop registration portal API
//!
//! Library surface for the API service so integration tests can exercise
//! the workflow and router directly.

pub mod admin;
pub mod auth;
pub mod error;
pub mod jwt;
pub mod keepalive;
pub mod mailer;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
pub mod workflow;
