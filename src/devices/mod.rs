//! Device interfaces
//!
//! `driveboard` is the real motor driver board behind a transport; `mock`
//! is a hardware-free simulation of it for tests and development.

pub mod driveboard;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
