//! Shared primitives: timeline types, frame buffers, errors and fixed-point helpers.

pub mod core;
pub mod error;
pub mod frame;
pub(crate) mod math;
