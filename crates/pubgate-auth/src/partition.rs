//! Splitting publish-point declarations into prefix buckets.
//!
//! A publish point is addressed by a slash-separated path: the first segment
//! is its prefix, the remainder its distribution name. Points without a
//! slash live under the root prefix `""`. Points under the reserved
//! `unmanaged` prefix are not service-managed and are dropped before any
//! other processing.

use crate::api::resolve_api_permission;
use crate::decl::{normalize_allow_from, PublishDecl, RepoDecl};
use crate::error::AuthError;
use crate::table::{DistPerms, PrefixTable};
use std::collections::BTreeMap;

/// Publish points under this prefix are never managed and never emitted.
pub const UNMANAGED: &str = "unmanaged";

/// Splits a publish path into `(prefix, distribution)`.
///
/// The prefix is empty when the path carries no `/`; only the first slash
/// splits, so a nested path keeps its tail as the distribution name.
#[must_use]
pub fn split_path(path: &str) -> (&str, &str) {
    match path.split_once('/') {
        Some((prefix, name)) => (prefix, name),
        None => ("", path),
    }
}

/// Partitions raw declarations into prefix buckets of validated permissions.
///
/// Per publish point:
///
/// 1. drop it when its prefix is [`UNMANAGED`];
/// 2. validate and normalize `allow_from` into the public channel;
/// 3. when `repos` is supplied, resolve the API channel from the point's
///    component references (every surviving point gets an API slot, unset
///    when it has no components).
///
/// Buckets and the distributions within them are ordered lexicographically.
pub fn partition_by_prefix(
    publish: &BTreeMap<String, PublishDecl>,
    repos: Option<&BTreeMap<String, RepoDecl>>,
) -> Result<PrefixTable, AuthError> {
    let mut table = PrefixTable::new();

    for (path, decl) in publish {
        let (prefix, name) = split_path(path);
        if prefix == UNMANAGED {
            tracing::trace!(path = %path, "dropping unmanaged publish point");
            continue;
        }

        let public =
            normalize_allow_from(&format!("publish point '{path}'"), decl.allow_from.as_ref())?;
        let api = match repos {
            Some(repos) => Some(resolve_api_permission(decl, repos)?),
            None => None,
        };

        table
            .entry(prefix.to_string())
            .or_default()
            .insert(name.to_string(), DistPerms { public, api });
    }

    tracing::debug!(prefixes = table.len(), "partitioned publish points");
    Ok(table)
}
