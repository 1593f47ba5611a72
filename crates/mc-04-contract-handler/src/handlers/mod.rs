//! # Handlers
//!
//! The closed set of role handlers.

mod alias;
mod bank;

pub use alias::AliasHandler;
pub use bank::BankHandler;

use crate::domain::{CodecError, ExecutionMessage, HandlerRequest, HandlerResponse, ROLE_ALIAS, ROLE_BANK};
use crate::ports::ContractHandler;

/// A handler, selected by role key at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleHandler {
    /// Alias registry.
    Alias(AliasHandler),
    /// Bank.
    Bank(BankHandler),
}

impl RoleHandler {
    /// Handler for a well-known role.
    pub fn for_role(role: &str) -> Option<Self> {
        match role {
            ROLE_ALIAS => Some(RoleHandler::Alias(AliasHandler)),
            ROLE_BANK => Some(RoleHandler::Bank(BankHandler)),
            _ => None,
        }
    }
}

impl ContractHandler for RoleHandler {
    fn role(&self) -> &'static str {
        match self {
            RoleHandler::Alias(h) => h.role(),
            RoleHandler::Bank(h) => h.role(),
        }
    }

    fn encode(&self, request: &HandlerRequest) -> Result<ExecutionMessage, CodecError> {
        match self {
            RoleHandler::Alias(h) => h.encode(request),
            RoleHandler::Bank(h) => h.encode(request),
        }
    }

    fn decode(&self, method: &str, data: &[u8]) -> Result<HandlerResponse, CodecError> {
        match self {
            RoleHandler::Alias(h) => h.decode(method, data),
            RoleHandler::Bank(h) => h.decode(method, data),
        }
    }
}
