//! Raw declarations as operators write them.
//!
//! Declarations arrive loosely shaped: `allow_from` may be absent, a literal
//! token, or a list of user names. [`normalize_allow_from`] is the single
//! validation point that turns a raw value into a canonical [`Permission`];
//! both the prefix partitioner (publish points) and the API resolver
//! (repositories) funnel through it.

use crate::error::AuthError;
use crate::permission::{Permission, AUTHENTICATED, PREFIX};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw `allow_from` value before validation.
///
/// Deserializes from either a bare string token or a list of names; shapes
/// that are neither (numbers, maps) are rejected by serde before they reach
/// the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowFrom {
    /// A literal token: `"authenticated"` or `"prefix"`. Anything else
    /// fails validation.
    Token(String),
    /// An explicit list of user names (possibly unsorted, with duplicates).
    Users(Vec<String>),
}

/// The declared configuration of one publish point.
///
/// Unknown keys in the source document are ignored, mirroring the
/// partitioner's contract of stripping unrelated parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishDecl {
    /// Declared public access policy, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_from: Option<AllowFrom>,

    /// Component name → repository name; drives API permission resolution.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, String>,
}

impl PublishDecl {
    /// A declaration granting access to the given users.
    #[must_use]
    pub fn with_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow_from: Some(AllowFrom::Users(users.into_iter().map(Into::into).collect())),
            components: BTreeMap::new(),
        }
    }

    /// A declaration with a literal token (`"authenticated"`, `"prefix"`).
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            allow_from: Some(AllowFrom::Token(token.into())),
            components: BTreeMap::new(),
        }
    }
}

/// The declared configuration of one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoDecl {
    /// Access policy for the repository's API surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_from: Option<AllowFrom>,
}

impl RepoDecl {
    /// A repository restricted to the given users.
    #[must_use]
    pub fn with_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow_from: Some(AllowFrom::Users(users.into_iter().map(Into::into).collect())),
        }
    }

    /// A repository with a literal token policy.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            allow_from: Some(AllowFrom::Token(token.into())),
        }
    }
}

/// Validates and normalizes a raw `allow_from` into a [`Permission`].
///
/// `subject` names the declaration's owner for error reporting, e.g.
/// `publish point 'main/stable'` or `repository 'tools'`.
///
/// - absent → [`Permission::Unset`]
/// - `"authenticated"` → [`Permission::Authenticated`]
/// - `"prefix"` → [`Permission::Prefix`]
/// - non-empty name list → [`Permission::Users`], deduplicated and sorted
///
/// Any other token and the empty list fail with
/// [`AuthError::InvalidPermissionDeclaration`].
pub fn normalize_allow_from(
    subject: &str,
    raw: Option<&AllowFrom>,
) -> Result<Permission, AuthError> {
    match raw {
        None => Ok(Permission::Unset),
        Some(AllowFrom::Token(token)) if token == AUTHENTICATED => Ok(Permission::Authenticated),
        Some(AllowFrom::Token(token)) if token == PREFIX => Ok(Permission::Prefix),
        Some(AllowFrom::Token(token)) => Err(AuthError::InvalidPermissionDeclaration {
            subject: subject.to_string(),
            found: format!("\"{token}\""),
        }),
        Some(AllowFrom::Users(users)) if users.is_empty() => {
            Err(AuthError::InvalidPermissionDeclaration {
                subject: subject.to_string(),
                found: "an empty user list".to_string(),
            })
        }
        Some(AllowFrom::Users(users)) => Ok(Permission::users(users.iter().cloned())),
    }
}
