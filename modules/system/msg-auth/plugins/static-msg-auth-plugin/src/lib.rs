#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Message Authentication Plugin
//!
//! A message authentication provider with static token-to-identity mapping
//! for development and testing. Reads the bearer token from the
//! `Authorization` header and hands the mapped caller back to the server
//! through callbacks.
//!
//! ## Modes
//!
//! - **`accept_all`** (default): Accepts any non-empty token and reports the
//!   configured default identity.
//!
//! - **`static_tokens`**: Maps specific tokens to specific identities. Useful
//!   for E2E tests with distinct users.
//!
//! A request without a bearer token fails when authentication is mandatory
//! and proceeds anonymously otherwise. Unknown tokens always fail.
//!
//! ## Configuration
//!
//! ```yaml
//! modules:
//!   static_msg_auth_plugin:
//!     config:
//!       mode: static_tokens
//!       auth_type: BEARER
//!       register_session: true
//!       layer: HttpServlet
//!       application_context: "default-host /shop"
//!       tokens:
//!         - token: "token-alice"
//!           identity:
//!             principal: alice
//!             groups: ["admins"]
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use config::StaticMsgAuthPluginConfig;
pub use module::{StaticMsgAuthPlugin, install};
