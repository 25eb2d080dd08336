//! Message Authentication SDK
//!
//! This crate provides the contracts around the `msg_auth` engine:
//!
//! - [`SecurityContext`], [`ServerExchange`], [`HttpSession`] - What the hosting server supplies per request
//! - [`FallbackAuthenticator`] - Base mechanism used when no provider is configured
//! - [`SecurityDomain`] - Identity source consulted by provider callbacks
//! - [`RegistryAccess`] - Injected access to the provider factory
//! - [`AuthConfigFactory`], [`AuthConfigProvider`], [`ServerAuthConfig`], [`ServerAuthContext`] - Provider SPI
//! - [`MessageInfo`], [`ValidationResponse`], [`AuthStatus`] - Negotiation messages
//! - [`MsgAuthError`], [`ExchangeError`], [`RegistryError`] - Error types
//!
//! ## Usage
//!
//! Providers implement the SPI and register with a factory:
//!
//! ```ignore
//! use msg_auth_sdk::AuthConfigFactory;
//!
//! let id = factory.register_config_provider(
//!     Arc::new(MyProvider::new()),
//!     Some("HttpServlet"),
//!     Some("default-host /app"),
//!     "my provider",
//! );
//! ```

pub mod api;
pub mod callback;
pub mod error;
pub mod models;
pub mod plugin_api;

// Re-export main types at crate root
pub use api::{
    FallbackAuthenticator, HttpSession, RegistryAccess, SecurityContext, SecurityDomain,
    ServerExchange,
};
pub use callback::{Callback, CallbackHandler};
pub use error::{ExchangeError, MsgAuthError, RegistryError};
pub use models::{AuthStatus, MessageInfo, Subject, ValidationResponse, options};
pub use plugin_api::{AuthConfigFactory, AuthConfigProvider, ServerAuthConfig, ServerAuthContext};
