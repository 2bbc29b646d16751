//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (Prometheus registry, tokio timer, HTTP
//! servers). Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `metrics`: Prometheus metrics export and health checks
//! - `time`: Tokio-backed clock for the emitter loop

pub mod metrics;
pub mod time;
