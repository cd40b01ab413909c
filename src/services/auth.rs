//! Authorization gate
//!
//! The core services are pure functions of (request, identity, store
//! state): every call takes an explicit [`Identity`] instead of reading
//! ambient session state, and trusts the single [`AdminGate`] predicate
//! for authorization.

use std::collections::HashSet;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

/// Caller identity as presented to the API (an opaque bearer token)
#[derive(Debug, Clone)]
pub struct Identity {
    pub token: String,
}

impl Identity {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// The one authorization question the core ever asks
pub trait AdminGate: Send + Sync {
    fn is_authorized_admin(&self, identity: &Identity) -> bool;
}

/// Gate backed by the configured administrator token set
pub struct TokenAdminGate {
    tokens: HashSet<String>,
}

impl TokenAdminGate {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            tokens: config.admin_tokens.iter().cloned().collect(),
        }
    }
}

impl AdminGate for TokenAdminGate {
    fn is_authorized_admin(&self, identity: &Identity) -> bool {
        self.tokens.contains(&identity.token)
    }
}

/// Shared precondition check used at the top of every service operation
pub fn authorize(gate: &dyn AdminGate, identity: &Identity) -> AppResult<()> {
    if gate.is_authorized_admin(identity) {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "administrator access required".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_gate_accepts_configured_tokens_only() {
        let gate = TokenAdminGate::new(&AuthConfig {
            admin_tokens: vec!["head-librarian".to_string()],
        });
        assert!(gate.is_authorized_admin(&Identity::new("head-librarian")));
        assert!(!gate.is_authorized_admin(&Identity::new("patron")));
    }

    #[test]
    fn authorize_maps_rejection_to_authorization_error() {
        let gate = TokenAdminGate::new(&AuthConfig {
            admin_tokens: vec![],
        });
        let err = authorize(&gate, &Identity::new("anyone")).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
