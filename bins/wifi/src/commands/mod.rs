//! Command implementations.

pub mod interfaces;
pub mod scan;
pub mod wiphy;
