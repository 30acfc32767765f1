//! API permission resolution from repository references.
//!
//! A publish point that serves components out of named repositories exposes
//! an API surface gated by those repositories' own `allow_from` policies.
//! The point's API permission is the shared merge over every referenced
//! repository's policy.

use crate::decl::{normalize_allow_from, PublishDecl, RepoDecl};
use crate::error::AuthError;
use crate::permission::{merge_shared, Permission};
use std::collections::BTreeMap;

/// Computes a publish point's API-level permission.
///
/// - A point with no components yields [`Permission::Unset`] (no API slot
///   to guard).
/// - A reference to a repository missing from `repos` contributes nothing;
///   unresolved references are tolerated, not errors.
/// - A repository whose own policy is `prefix` contributes nothing;
///   sibling inheritance has no meaning for repositories.
///
/// With components present but nothing contributing, the merge yields the
/// empty user set (deny-all).
pub fn resolve_api_permission(
    decl: &PublishDecl,
    repos: &BTreeMap<String, RepoDecl>,
) -> Result<Permission, AuthError> {
    if decl.components.is_empty() {
        return Ok(Permission::Unset);
    }

    let mut permissions = Vec::with_capacity(decl.components.len());
    for repo_name in decl.components.values() {
        let Some(repo) = repos.get(repo_name) else {
            tracing::debug!(repo = %repo_name, "component references unknown repository");
            permissions.push(Permission::Unset);
            continue;
        };

        let permission =
            normalize_allow_from(&format!("repository '{repo_name}'"), repo.allow_from.as_ref())?;
        permissions.push(match permission {
            Permission::Prefix => Permission::Unset,
            other => other,
        });
    }

    Ok(merge_shared(&permissions))
}
