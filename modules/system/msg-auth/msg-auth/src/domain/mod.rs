//! Domain layer for message authentication.

pub mod error;
pub mod factory;
pub mod negotiation;
pub mod outcome;
pub mod registry;
pub mod service;
pub mod session_cache;
pub mod session_store;

pub use error::DomainError;
pub use factory::DefaultAuthConfigFactory;
pub use negotiation::NegotiationSession;
pub use registry::{ProcessRegistry, ProviderRegistryLookup, StaticRegistry};
pub use service::Service;
pub use session_store::{InMemoryExchange, InMemorySession, InMemorySessionStore};
