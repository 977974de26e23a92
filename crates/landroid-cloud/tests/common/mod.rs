//! Common test utilities for the Landroid Cloud integration
//!
//! A recording mower stands in for the vendor SDK and a recording host
//! captures everything the integration writes.

#![allow(dead_code)]

mod fixtures;
mod mock_host;
mod mock_mower;

pub use fixtures::*;
pub use mock_host::*;
pub use mock_mower::*;
