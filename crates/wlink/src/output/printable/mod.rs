//! Printable implementations for wireless types.

mod interface;
mod network;
mod wiphy;

pub use interface::InterfaceRow;
