//! Resolving callers to identities.
//!
//! Callers authenticate with `Authorization: Bearer <token>`. Tokens come
//! from the configured users and are held only as BLAKE3 digests; a lookup
//! hashes the presented token and compares digests.
//!
//! A request with no header, a non-bearer scheme, or an unknown token has no
//! identity. That is not an error here: the access decision turns it into
//! `MissingIdentity`, which handlers answer with 401.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tally_config::{ConfigError, UserDefinition};
use tally_rbac::{Identity, Role};

use crate::state::AppState;

/// In-memory user table, built once at startup.
#[derive(Debug, Default)]
pub struct UserDirectory {
    by_token: HashMap<blake3::Hash, Identity>,
}

impl UserDirectory {
    /// Builds the directory from configured users.
    ///
    /// # Errors
    ///
    /// Fails if two users share an id or a token, or a token is empty.
    pub fn from_users(users: &[UserDefinition]) -> Result<Self, ConfigError> {
        let mut by_token = HashMap::with_capacity(users.len());
        let mut ids = HashSet::with_capacity(users.len());

        for user in users {
            if user.token.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "user '{}' has an empty token",
                    user.id
                )));
            }
            if !ids.insert(user.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate user id '{}'",
                    user.id
                )));
            }

            let identity = Identity::new(
                user.id.as_str(),
                user.roles.iter().map(|r| Role::from(r.as_str())),
            );
            match by_token.entry(blake3::hash(user.token.as_bytes())) {
                Entry::Occupied(_) => {
                    return Err(ConfigError::ValidationError(format!(
                        "user '{}' reuses another user's token",
                        user.id
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(identity);
                }
            }
        }

        Ok(Self { by_token })
    }

    /// Returns the identity owning `token`, if any.
    pub fn resolve(&self, token: &str) -> Option<&Identity> {
        self.by_token.get(&blake3::hash(token.as_bytes()))
    }

    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// The caller's identity, or `None` when the request is unauthenticated.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Option<Identity>);

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .and_then(|token| state.directory().resolve(token))
            .cloned();

        Ok(Self(identity))
    }
}
