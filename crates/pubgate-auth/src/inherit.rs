//! Prefix-inheritance resolution.
//!
//! Within one prefix bucket, a distribution may declare `prefix` to inherit
//! the union of its siblings' permissions. Resolution is a single pass per
//! channel: inheritors all receive the shared merge over the concrete donor
//! values, donors keep their own. There is no nesting: `prefix` only ever
//! refers to siblings in the same bucket, never to a parent path.

use crate::error::AuthError;
use crate::permission::{merge_shared, Permission};
use crate::table::Bucket;

/// Resolves `prefix`-valued permissions in one bucket, per channel.
///
/// # Errors
///
/// - [`AuthError::InvalidShape`] when the bucket is empty (caller bug);
/// - [`AuthError::UnresolvedPrefixInheritance`] when a channel has
///   inheritors but no distribution declares a concrete value to donate.
pub fn resolve_prefix_permissions(prefix: &str, bucket: &Bucket) -> Result<Bucket, AuthError> {
    if bucket.is_empty() {
        return Err(AuthError::InvalidShape {
            parameter: "distributions",
            expected: "at least one distribution",
        });
    }

    let public = resolve_channel(prefix, bucket.values().map(|d| &d.public))?;
    let api = resolve_channel(prefix, bucket.values().filter_map(|d| d.api.as_ref()))?;

    let mut resolved = bucket.clone();
    for perms in resolved.values_mut() {
        if perms.public.is_prefix() {
            // resolve_channel returned Some whenever an inheritor exists
            if let Some(merged) = &public {
                perms.public = merged.clone();
            }
        }
        if let Some(p) = &mut perms.api {
            if p.is_prefix() {
                if let Some(merged) = &api {
                    *p = merged.clone();
                }
            }
        }
    }

    Ok(resolved)
}

/// Computes the merged donor value for one channel.
///
/// Returns `None` when the channel has no inheritors (nothing to do) and
/// `Some(merged)` otherwise.
fn resolve_channel<'a, I>(prefix: &str, values: I) -> Result<Option<Permission>, AuthError>
where
    I: IntoIterator<Item = &'a Permission>,
{
    let mut inheritors = 0usize;
    let mut donors: Vec<&Permission> = Vec::new();

    for value in values {
        if value.is_prefix() {
            inheritors += 1;
        } else {
            donors.push(value);
        }
    }

    if inheritors == 0 {
        return Ok(None);
    }
    if !donors.iter().any(|p| p.is_concrete()) {
        return Err(AuthError::UnresolvedPrefixInheritance {
            prefix: prefix.to_string(),
        });
    }

    let merged = merge_shared(donors);
    tracing::trace!(prefix = %prefix, inheritors, merged = %merged, "resolved prefix inheritance");
    Ok(Some(merged))
}
