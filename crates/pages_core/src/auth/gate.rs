//! Authorization gate, call metadata and call context.

use super::operation::Operation;
use crate::store::{Store, StoreError};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Metadata key carrying the session token.
pub const TOKEN_METADATA_KEY: &str = "token";

/// Transport call metadata: lowercase keys, each with one or more values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMetadata {
    entries: BTreeMap<String, Vec<String>>,
}

impl CallMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata holding a single token value.
    pub fn with_token(token: impl Into<String>) -> Self {
        let mut metadata = Self::new();
        metadata.append(TOKEN_METADATA_KEY, token);
        metadata
    }

    /// Appends one value under `key`. Keys are case-insensitive.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(key.trim().to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Returns every value stored under `key`.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .get(key.trim().to_ascii_lowercase().as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the concatenated token values, or `None` when absent or empty.
    pub fn token(&self) -> Option<String> {
        let token = self.get_all(TOKEN_METADATA_KEY).concat();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}

/// Identity attached to one call after the gate ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallContext {
    /// Public call; no token was inspected.
    Anonymous,
    /// Protected call whose token resolved to `account_id`.
    Authenticated { account_id: String },
}

impl CallContext {
    pub fn account_id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { account_id } => Some(account_id.as_str()),
        }
    }

    /// Returns the authenticated caller or rejects the call.
    pub fn require_account_id(&self) -> Result<&str, AccessDenied> {
        self.account_id().ok_or(AccessDenied::MissingMetadata)
    }
}

/// Reason a protected call was rejected before reaching its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    MissingMetadata,
    MissingToken,
    InvalidToken,
}

impl AccessDenied {
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingMetadata => "access_denied",
            Self::MissingToken => "access_denied_missing_token",
            Self::InvalidToken => "access_denied_invalid_token",
        }
    }
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMetadata => write!(f, "access denied"),
            Self::MissingToken => write!(f, "access denied: missing token"),
            Self::InvalidToken => write!(f, "access denied: invalid token"),
        }
    }
}

impl Error for AccessDenied {}

/// Gate failure: a rejection, or a storage fault while resolving the token.
#[derive(Debug)]
pub enum AuthError {
    Denied(AccessDenied),
    Store(StoreError),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Denied(reason) => reason.code(),
            Self::Store(err) => err.code(),
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied(reason) => write!(f, "{reason}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Denied(reason) => Some(reason),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<AccessDenied> for AuthError {
    fn from(value: AccessDenied) -> Self {
        Self::Denied(value)
    }
}

/// Stateless checkpoint run before every handler.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn Store>,
}

impl AuthGate {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Authorizes a call by its fully qualified method name.
    ///
    /// Unknown method names are treated as protected.
    pub fn authorize(
        &self,
        method: &str,
        metadata: Option<&CallMetadata>,
    ) -> Result<CallContext, AuthError> {
        match Operation::from_full_method(method) {
            Some(operation) if operation.is_public() => {
                debug!("event=auth_check module=auth status=ok method={method} access=public");
                Ok(CallContext::Anonymous)
            }
            _ => self.resolve(method, metadata),
        }
    }

    /// Authorizes a call for an already classified operation.
    pub fn authorize_operation(
        &self,
        operation: Operation,
        metadata: Option<&CallMetadata>,
    ) -> Result<CallContext, AuthError> {
        self.authorize(operation.full_method(), metadata)
    }

    fn resolve(
        &self,
        method: &str,
        metadata: Option<&CallMetadata>,
    ) -> Result<CallContext, AuthError> {
        let result = resolve_token(self.store.as_ref(), metadata);
        match &result {
            Ok(context) => debug!(
                "event=auth_check module=auth status=ok method={method} access=protected account_id={}",
                context.account_id().unwrap_or_default()
            ),
            Err(err) => warn!(
                "event=auth_check module=auth status=error method={method} access=protected error_code={}",
                err.code()
            ),
        }
        result
    }
}

fn resolve_token(
    store: &dyn Store,
    metadata: Option<&CallMetadata>,
) -> Result<CallContext, AuthError> {
    let metadata = metadata.ok_or(AccessDenied::MissingMetadata)?;
    let token = metadata.token().ok_or(AccessDenied::MissingToken)?;

    match store.account_for_token(&token) {
        Ok(account) => Ok(CallContext::Authenticated {
            account_id: account.id,
        }),
        Err(err) if err.is_not_found() => Err(AccessDenied::InvalidToken.into()),
        Err(err) => Err(AuthError::Store(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessDenied, CallContext, CallMetadata, TOKEN_METADATA_KEY};

    #[test]
    fn metadata_keys_are_case_insensitive() {
        let mut metadata = CallMetadata::new();
        metadata.append("Token", "abc");
        assert_eq!(metadata.get_all(TOKEN_METADATA_KEY), ["abc".to_string()]);
        assert_eq!(metadata.token().as_deref(), Some("abc"));
    }

    #[test]
    fn metadata_concatenates_multiple_token_values() {
        let mut metadata = CallMetadata::with_token("ab");
        metadata.append(TOKEN_METADATA_KEY, "cd");
        assert_eq!(metadata.token().as_deref(), Some("abcd"));
    }

    #[test]
    fn metadata_without_token_or_with_empty_token_has_none() {
        let mut metadata = CallMetadata::new();
        metadata.append("user-agent", "cli");
        assert_eq!(metadata.token(), None);
        assert_eq!(CallMetadata::with_token("").token(), None);
    }

    #[test]
    fn anonymous_context_requires_authentication() {
        assert_eq!(CallContext::Anonymous.account_id(), None);
        assert_eq!(
            CallContext::Anonymous.require_account_id(),
            Err(AccessDenied::MissingMetadata)
        );

        let context = CallContext::Authenticated {
            account_id: "a1".to_string(),
        };
        assert_eq!(context.require_account_id(), Ok("a1"));
    }

    #[test]
    fn access_denied_reasons_have_distinct_codes() {
        let codes = [
            AccessDenied::MissingMetadata.code(),
            AccessDenied::MissingToken.code(),
            AccessDenied::InvalidToken.code(),
        ];
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
        assert_ne!(codes[0], codes[2]);
    }
}
