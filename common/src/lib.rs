//! Shared building blocks for backend endpoint resolution.
//!
//! Everything in here is free of async runtime concerns: configuration,
//! error types, the endpoint model, subnet enumeration and local interface
//! discovery. The probing and orchestration live in `pawprobe-core`.

pub mod config;
pub mod device;
pub mod error;
pub mod network;
