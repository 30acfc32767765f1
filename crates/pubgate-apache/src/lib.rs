//! Apache `Require` rendering for resolved authorization tables.
//!
//! Maps [`Permission`] values onto Apache 2.4 authorization directives and
//! renders one `<Location>` block per guarded path:
//!
//! | Permission | Directive |
//! |------------|-----------|
//! | `Authenticated` | `Require valid-user` |
//! | `Users({})` | `Require all denied` |
//! | `Users({a, b})` | `Require user a b` |
//!
//! A published prefix exposes two kinds of paths: the shared `pool/`
//! directory (guarded by the prefix pool permission, since packages from
//! every distribution land there) and one `dists/<name>/` directory per
//! distribution. When the table carries API permissions, a block per
//! distribution guards the publish API endpoint as well.

#![forbid(unsafe_code)]

use pubgate_auth::{AuthTable, DistAuth, Permission, PrefixAuth};
use std::fmt::Write as _;

/// Apache token for "any authenticated user".
pub const VALID_USER: &str = "valid-user";

/// Renders one permission as a `Require` directive.
///
/// Returns `None` for `Unset` and `Prefix`, which never appear in a
/// resolved table and have no directive form.
#[must_use]
pub fn require_directive(permission: &Permission) -> Option<String> {
    match permission {
        Permission::Authenticated => Some(format!("Require {VALID_USER}")),
        Permission::Users(users) if users.is_empty() => Some("Require all denied".to_string()),
        Permission::Users(users) => {
            let names: Vec<&str> = users.iter().map(String::as_str).collect();
            Some(format!("Require user {}", names.join(" ")))
        }
        Permission::Unset | Permission::Prefix => None,
    }
}

/// Renders a whole authorization table as an Apache configuration fragment.
///
/// Prefixes render in table order (lexicographic); within a prefix the pool
/// block comes first, then one block per distribution.
#[must_use]
pub fn render_table(table: &AuthTable) -> String {
    let mut out = String::new();
    for (prefix, auth) in table {
        render_prefix(&mut out, prefix, auth);
    }
    out
}

fn render_prefix(out: &mut String, prefix: &str, auth: &PrefixAuth) {
    let display = if prefix.is_empty() { "''" } else { prefix };
    let _ = writeln!(out, "# prefix {display}");

    render_block(out, &repo_path(prefix, "pool"), &auth.pool);

    for (name, entry) in &auth.dists {
        let path = repo_path(prefix, &format!("dists/{name}"));
        match entry {
            DistAuth::Value(permission) => render_block(out, &path, permission),
            DistAuth::Channels { public, api } => {
                if let Some(permission) = public {
                    render_block(out, &path, permission);
                }
                if let Some(permission) = api {
                    render_block(out, &api_path(prefix, name), permission);
                }
            }
        }
    }
}

fn render_block(out: &mut String, path: &str, permission: &Permission) {
    let Some(directive) = require_directive(permission) else {
        return;
    };
    let _ = writeln!(out, "<Location \"{path}\">");
    let _ = writeln!(out, "  {directive}");
    let _ = writeln!(out, "</Location>");
}

fn repo_path(prefix: &str, tail: &str) -> String {
    if prefix.is_empty() {
        format!("/{tail}")
    } else {
        format!("/{prefix}/{tail}")
    }
}

/// Publish API endpoints address the root prefix as `.`.
fn api_path(prefix: &str, dist: &str) -> String {
    let segment = if prefix.is_empty() { "." } else { prefix };
    format!("/api/publish/{segment}/{dist}")
}
