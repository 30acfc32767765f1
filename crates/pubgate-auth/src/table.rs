//! Table shapes flowing through the pipeline, and the pool aggregator.
//!
//! Two shapes exist:
//!
//! - the *working table* ([`PrefixTable`]): prefix → distribution →
//!   [`DistPerms`], mutated by the default/cleanup pass and the inheritance
//!   resolver;
//! - the *authorization table* ([`AuthTable`]): the final output, one
//!   [`PrefixAuth`] record per prefix with the aggregated pool value.
//!
//! All maps are `BTreeMap` so iteration (and therefore serialization) is
//! lexicographic by name; the output ordering is part of the observable
//! contract.

use crate::permission::{merge_shared, Permission};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-distribution permissions in the working table.
///
/// `api` is `None` when API permissions are not in play for this run, and
/// `Some` (possibly `Unset`) when a repository table was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistPerms {
    /// Public (fetch) channel.
    pub public: Permission,
    /// API channel, present only in dual-channel runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<Permission>,
}

impl DistPerms {
    /// A public-only entry.
    #[must_use]
    pub fn public(permission: Permission) -> Self {
        Self {
            public: permission,
            api: None,
        }
    }

    /// True when neither channel carries a usable value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.public.is_unset() && self.api.is_none()
    }
}

impl Default for DistPerms {
    fn default() -> Self {
        Self::public(Permission::Unset)
    }
}

/// All distributions sharing one prefix: distribution name → permissions.
pub type Bucket = BTreeMap<String, DistPerms>;

/// The working table: prefix → bucket.
pub type PrefixTable = BTreeMap<String, Bucket>;

/// A distribution's entry in the final authorization table.
///
/// Serializes as a bare permission value in public-only runs and as a
/// `{public, api}` map in dual-channel runs (dead channels omitted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistAuth {
    /// Public-only schema: the permission value itself.
    Value(Permission),
    /// Dual-channel schema.
    Channels {
        /// Effective public permission, omitted when the channel is dead.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        public: Option<Permission>,
        /// Effective API permission, omitted when the channel is dead.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api: Option<Permission>,
    },
}

/// One prefix in the final authorization table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixAuth {
    /// Union permission over every distribution's public channel; guards the
    /// prefix-wide shared package pool.
    pub pool: Permission,
    /// Union permission over the API channel, present only when some
    /// distribution in the bucket carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<Permission>,
    /// Distribution name → effective permissions.
    pub dists: BTreeMap<String, DistAuth>,
}

/// The final output: prefix → authorization record.
pub type AuthTable = BTreeMap<String, PrefixAuth>;

/// Folds each resolved bucket into its prefix-level record.
///
/// Expects post-inheritance, post-default values: no `Prefix` anywhere.
/// `dual_channel` selects the output schema; it is true when a repository
/// table was part of the input.
#[must_use]
pub fn aggregate_pools(table: PrefixTable, dual_channel: bool) -> AuthTable {
    let mut output = AuthTable::new();

    for (prefix, bucket) in table {
        let pool = merge_shared(bucket.values().map(|d| &d.public));
        let api_values: Vec<&Permission> = bucket.values().filter_map(|d| d.api.as_ref()).collect();
        let api = if api_values.is_empty() {
            None
        } else {
            Some(merge_shared(api_values))
        };

        let dists = bucket
            .into_iter()
            .map(|(name, perms)| {
                let entry = if dual_channel {
                    DistAuth::Channels {
                        public: (!perms.public.is_unset()).then_some(perms.public),
                        api: perms.api,
                    }
                } else {
                    DistAuth::Value(perms.public)
                };
                (name, entry)
            })
            .collect();

        tracing::trace!(prefix = %prefix, pool = %pool, "aggregated prefix pool");
        output.insert(prefix, PrefixAuth { pool, api, dists });
    }

    output
}
