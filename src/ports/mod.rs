//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits; the
//! emitter receives them as explicit constructor arguments, never via
//! a global container.
//!
//! Port categories:
//! - `Counter`: Named monotonic metric accumulator
//! - `Clock`: Current time and suspend-for-duration primitive

pub mod clock;
pub mod counter;
