//! Permission resolution for path-addressed publish points.
//!
//! Operators declare who may fetch each published distribution with an
//! `allow_from` policy: an explicit user list, `authenticated` (any
//! logged-in user), or `prefix` (inherit from sibling distributions under
//! the same path prefix). This crate compiles those declarations into a
//! compact authorization table an HTTP access-control layer can render
//! into static configuration.
//!
//! # Pipeline
//!
//! | Stage | Function | Does |
//! |-------|----------|------|
//! | partition | [`partition_by_prefix`] | split paths into prefix buckets, validate declarations, resolve API permissions |
//! | defaults | [`clean_and_default`] | substitute defaults into live channels, strip empty entries |
//! | inheritance | [`resolve_prefix_permissions`] | replace `prefix` values with the sibling merge |
//! | pools | [`aggregate_pools`] | fold each bucket into its prefix-level pool |
//!
//! [`resolve`] chains all four. Everything is pure and deterministic:
//! identical input produces a byte-identical serialized table, user lists
//! are always sorted, and map iteration is lexicographic.
//!
//! # Example
//!
//! ```
//! use pubgate_auth::{resolve, Permission, PublishDecl, ResolveInput};
//!
//! let mut input = ResolveInput::default();
//! input.publish.insert("foo/test".into(), PublishDecl::with_users(["user1"]));
//! input.publish.insert("foo/bar".into(), PublishDecl::with_users(["user2"]));
//! input.publish.insert("foo/baz".into(), PublishDecl::with_token("prefix"));
//!
//! let table = resolve(&input).unwrap();
//! assert_eq!(table["foo"].pool, Permission::users(["user1", "user2"]));
//! assert_eq!(
//!     table["foo"].dists["baz"],
//!     pubgate_auth::DistAuth::Value(Permission::users(["user1", "user2"])),
//! );
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod decl;
pub mod defaults;
pub mod error;
pub mod inherit;
pub mod partition;
pub mod permission;
pub mod pipeline;
pub mod table;

pub use api::resolve_api_permission;
pub use decl::{normalize_allow_from, AllowFrom, PublishDecl, RepoDecl};
pub use defaults::{clean_and_default, default_for};
pub use error::AuthError;
pub use inherit::resolve_prefix_permissions;
pub use partition::{partition_by_prefix, split_path, UNMANAGED};
pub use permission::{merge_shared, Permission, AUTHENTICATED, PREFIX};
pub use pipeline::{resolve, ResolveInput};
pub use table::{aggregate_pools, AuthTable, Bucket, DistAuth, DistPerms, PrefixAuth, PrefixTable};
