pub mod endpoint;
pub mod interface;
pub mod subnet;
