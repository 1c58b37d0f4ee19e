//! Shared test utilities for logdrop integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file.

pub mod builders;
pub mod fixtures;
pub mod sender;

pub use builders::*;
pub use fixtures::*;
pub use sender::*;
