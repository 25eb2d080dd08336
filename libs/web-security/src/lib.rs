#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod auth_type;
pub mod constants;
pub mod identity;

pub use auth_type::{AuthType, AuthTypeError};
pub use identity::{SecurityIdentity, SecurityIdentityBuilder};
