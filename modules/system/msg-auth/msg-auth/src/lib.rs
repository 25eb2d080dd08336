//! Message Authentication Module
//!
//! Resolves the identity of an inbound HTTP request. When a provider is
//! registered for the servlet message layer and the configured application
//! context, the request is negotiated with that provider; otherwise the base
//! mechanism handles it. Identities a provider asks to register are cached in
//! the HTTP session and restored on later requests.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::MsgAuthConfig;
pub use domain::{DefaultAuthConfigFactory, ProcessRegistry, Service, StaticRegistry};
pub use module::{MsgAuthModule, ModuleDeps};
