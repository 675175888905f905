//! Shared utilities for wlink.

pub mod ifname;

pub use ifname::{InterfaceResolver, SysfsInterfaces};
