//! The full resolution pipeline.
//!
//! ```text
//! raw declarations
//!       │  partition_by_prefix (+ API resolution per point)
//!       ▼
//! prefix → dist → {public, api?}
//!       │  clean_and_default (defaults substituted, dead entries stripped)
//!       ▼
//!       │  resolve_prefix_permissions (per bucket, per channel)
//!       ▼
//!       │  aggregate_pools
//!       ▼
//! authorization table
//! ```
//!
//! Every stage is a pure transformation; the pipeline holds no state and a
//! failed stage aborts the whole call without partial output.

use crate::decl::{PublishDecl, RepoDecl};
use crate::defaults::clean_and_default;
use crate::error::AuthError;
use crate::inherit::resolve_prefix_permissions;
use crate::partition::partition_by_prefix;
use crate::permission::Permission;
use crate::table::{aggregate_pools, AuthTable, PrefixTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a resolution pass consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveInput {
    /// Publish-point path → raw declaration.
    pub publish: BTreeMap<String, PublishDecl>,

    /// Repository table; its presence switches the output to the
    /// dual-channel (`public`/`api`) schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repos: Option<BTreeMap<String, RepoDecl>>,

    /// Global default substituted for unset live channels.
    #[serde(default = "Permission::no_users")]
    pub default_allow_from: Permission,

    /// Per-prefix default overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prefix_defaults: BTreeMap<String, Permission>,

    /// Reserved: cross-distribution consistency checking. Accepted and
    /// recorded, but not enforced.
    #[serde(default)]
    pub strict: bool,
}

impl Default for ResolveInput {
    fn default() -> Self {
        Self {
            publish: BTreeMap::new(),
            repos: None,
            default_allow_from: Permission::no_users(),
            prefix_defaults: BTreeMap::new(),
            strict: false,
        }
    }
}

/// Resolves raw declarations into the final authorization table.
///
/// # Errors
///
/// Fails fast on the first invalid declaration
/// ([`AuthError::InvalidPermissionDeclaration`]) or unresolvable bucket
/// ([`AuthError::UnresolvedPrefixInheritance`]); no partial table is
/// returned.
///
/// # Example
///
/// ```
/// use pubgate_auth::{resolve, Permission, PublishDecl, ResolveInput};
///
/// let mut input = ResolveInput::default();
/// input.publish.insert("foo/test".into(), PublishDecl::with_users(["user1"]));
/// input.publish.insert("foo/bar".into(), PublishDecl::with_users(["user2"]));
///
/// let table = resolve(&input).unwrap();
/// assert_eq!(table["foo"].pool, Permission::users(["user1", "user2"]));
/// ```
pub fn resolve(input: &ResolveInput) -> Result<AuthTable, AuthError> {
    if input.strict {
        tracing::debug!("strict mode requested; consistency checking is not implemented");
    }

    let table = partition_by_prefix(&input.publish, input.repos.as_ref())?;
    let table = clean_and_default(table, &input.default_allow_from, &input.prefix_defaults);

    let mut resolved = PrefixTable::new();
    for (prefix, bucket) in table {
        let bucket = resolve_prefix_permissions(&prefix, &bucket)?;
        resolved.insert(prefix, bucket);
    }

    Ok(aggregate_pools(resolved, input.repos.is_some()))
}
