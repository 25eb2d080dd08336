pub mod client;
pub mod service;

pub use client::{StaticAuthConfigProvider, StaticServerAuthConfig};
pub use service::Service;
