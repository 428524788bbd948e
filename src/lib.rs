//! Relays qTest test-log webhooks for Tosca-driven test runs to a
//! Microsoft Teams channel as Adaptive Cards.

pub mod api;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod qtest;

pub use error::{AppError, Result};
