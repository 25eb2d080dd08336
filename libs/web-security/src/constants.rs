//! Well-known names shared between the security layer and its providers.

/// Message layer for the HTTP servlet profile. Every provider lookup is scoped to it.
pub const SERVLET_MESSAGE_LAYER: &str = "HttpServlet";

/// Mechanism name reported when a provider does not supply its own `authType`.
pub const DEFAULT_MECHANISM_NAME: &str = "JASPIC";

/// Name reported for an identity that carries no principal.
pub const ANONYMOUS_PRINCIPAL: &str = "anonymous";
