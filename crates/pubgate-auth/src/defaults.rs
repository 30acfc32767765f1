//! The default/cleanup pass.
//!
//! Runs between partitioning and inheritance resolution. Within each prefix
//! bucket, a channel (`public` or `api`) is *live* when at least one
//! distribution declares a value on it. Live channels get the default
//! substituted into their unset slots; dead channels are stripped from
//! every descriptor. Distributions left with nothing, and prefixes left
//! without distributions, are dropped.
//!
//! Defaults are substituted before inheritance on purpose: a default may
//! itself be `prefix`, in which case an undeclared distribution inherits
//! from its siblings like any explicitly `prefix`-valued one.

use crate::permission::Permission;
use crate::table::{Bucket, PrefixTable};
use std::collections::BTreeMap;

/// Two-level default lookup: the per-prefix override when the table has
/// one, else the global default.
#[must_use]
pub fn default_for<'a>(
    prefix: &str,
    global: &'a Permission,
    overrides: &'a BTreeMap<String, Permission>,
) -> &'a Permission {
    overrides.get(prefix).unwrap_or(global)
}

/// Substitutes defaults into live channels and strips empty entries.
#[must_use]
pub fn clean_and_default(
    table: PrefixTable,
    global: &Permission,
    overrides: &BTreeMap<String, Permission>,
) -> PrefixTable {
    let mut output = PrefixTable::new();

    for (prefix, bucket) in table {
        let fallback = default_for(&prefix, global, overrides);
        let cleaned = clean_bucket(bucket, fallback);
        if cleaned.is_empty() {
            tracing::debug!(prefix = %prefix, "dropping prefix with no effective permissions");
            continue;
        }
        output.insert(prefix, cleaned);
    }

    output
}

fn clean_bucket(bucket: Bucket, fallback: &Permission) -> Bucket {
    let public_live = bucket.values().any(|d| !d.public.is_unset());
    let api_live = bucket
        .values()
        .any(|d| d.api.as_ref().is_some_and(|p| !p.is_unset()));

    bucket
        .into_iter()
        .filter_map(|(name, mut perms)| {
            if public_live {
                if perms.public.is_unset() {
                    perms.public = fallback.clone();
                }
            } else {
                perms.public = Permission::Unset;
            }

            perms.api = if api_live {
                match perms.api {
                    Some(p) if p.is_unset() => Some(fallback.clone()),
                    other => other,
                }
            } else {
                None
            };
            // A fallback of Unset leaves the slot dead; normalize it away.
            if perms.api.as_ref().is_some_and(Permission::is_unset) {
                perms.api = None;
            }

            if perms.is_empty() {
                None
            } else {
                Some((name, perms))
            }
        })
        .collect()
}
