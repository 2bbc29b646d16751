//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! application's core workflow. Each use case is a self-contained
//! operation receiving its collaborators as explicit arguments.
//!
//! Use cases:
//! - `EmitterLoop`: Bounded random counter emission

pub mod emitter;

pub use emitter::{EmitterError, EmitterLoop, RunReport};
