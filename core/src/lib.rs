//! Backend endpoint resolution.
//!
//! The [`resolver::EndpointResolver`] walks emulator shortcut, cache
//! revalidation, subnet scan and static fallback once, then hands the same
//! endpoint to every caller until an operator invalidates it.

pub mod api;
pub mod cache;
pub mod environment;
pub mod network;
pub mod resolver;
pub mod scanner;
pub mod system;

#[cfg(test)]
mod test_utils;

pub use resolver::EndpointResolver;
