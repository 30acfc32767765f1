//! End-to-end resolution scenarios against the full pipeline.

use pubgate_auth::{
    resolve, AuthError, Permission, PublishDecl, RepoDecl, ResolveInput,
};
use serde_json::json;
use std::collections::BTreeMap;

fn input_from(publish: &[(&str, PublishDecl)]) -> ResolveInput {
    ResolveInput {
        publish: publish
            .iter()
            .map(|(path, decl)| ((*path).to_string(), decl.clone()))
            .collect(),
        default_allow_from: Permission::Prefix,
        ..ResolveInput::default()
    }
}

fn users(names: &[&str]) -> PublishDecl {
    PublishDecl::with_users(names.iter().copied())
}

fn token(t: &str) -> PublishDecl {
    PublishDecl::with_token(t)
}

#[test]
fn smoke_full_authorization_scheme() {
    let input = input_from(&[
        ("unmanaged/foo", PublishDecl::default()),
        ("unmanaged/bar", PublishDecl::default()),
        ("stable", users(&["admin"])),
        ("testing", token("authenticated")),
        ("foo/test", users(&["user1"])),
        ("foo/bar", users(&["user2"])),
        ("foo/baz", token("prefix")),
        ("bar/shared", token("authenticated")),
        ("bar/user", users(&["user3"])),
        ("bar/undefined", PublishDecl::default()),
    ]);

    let table = resolve(&input).expect("resolves");
    let rendered = serde_json::to_value(&table).expect("serialize");

    assert_eq!(
        rendered,
        json!({
            "": {
                "pool": "authenticated",
                "dists": {
                    "stable": ["admin"],
                    "testing": "authenticated",
                },
            },
            "bar": {
                "pool": "authenticated",
                "dists": {
                    "shared": "authenticated",
                    "undefined": "authenticated",
                    "user": ["user3"],
                },
            },
            "foo": {
                "pool": ["user1", "user2"],
                "dists": {
                    "bar": ["user2"],
                    "baz": ["user1", "user2"],
                    "test": ["user1"],
                },
            },
        })
    );
}

#[test]
fn empty_publish_yields_empty_table() {
    let table = resolve(&input_from(&[])).expect("resolves");
    assert!(table.is_empty());
}

#[test]
fn same_user_across_distributions() {
    let input = input_from(&[("foo", users(&["user1"])), ("bar", users(&["user1"]))]);

    let table = resolve(&input).expect("resolves");
    assert_eq!(table[""].pool, Permission::users(["user1"]));
    assert_eq!(table[""].dists.len(), 2);
}

#[test]
fn different_users_merge_into_the_pool() {
    let input = input_from(&[("foo", users(&["user1"])), ("bar", users(&["user2"]))]);

    let table = resolve(&input).expect("resolves");
    assert_eq!(table[""].pool, Permission::users(["user1", "user2"]));
}

#[test]
fn all_prefix_fails_with_root_prefix_named() {
    let input = input_from(&[("foo", token("prefix")), ("bar", token("prefix"))]);

    let err = resolve(&input).expect_err("must fail");
    assert!(matches!(
        &err,
        AuthError::UnresolvedPrefixInheritance { prefix } if prefix.is_empty()
    ));
    assert!(err.to_string().contains("prefix ''"), "got: {err}");
}

#[test]
fn inheritor_resolves_to_donor_union() {
    let input = input_from(&[
        ("foo", token("prefix")),
        ("bar", users(&["user0"])),
        ("baz", users(&["user1"])),
    ]);

    let table = resolve(&input).expect("resolves");
    assert_eq!(
        serde_json::to_value(&table[""].dists).expect("serialize"),
        json!({
            "foo": ["user0", "user1"],
            "bar": ["user0"],
            "baz": ["user1"],
        })
    );
}

#[test]
fn authenticated_and_users_collapse_pool() {
    let input = input_from(&[
        ("prefix/authenticated", token("authenticated")),
        ("prefix/users", users(&["user1"])),
    ]);

    let table = resolve(&input).expect("resolves");
    assert_eq!(table["prefix"].pool, Permission::Authenticated);
    assert_eq!(
        serde_json::to_value(&table["prefix"].dists).expect("serialize"),
        json!({ "authenticated": "authenticated", "users": ["user1"] })
    );
}

#[test]
fn authenticated_and_prefix() {
    let input = input_from(&[
        ("prefix/authenticated", token("authenticated")),
        ("prefix/prefixed", token("prefix")),
    ]);

    let table = resolve(&input).expect("resolves");
    assert_eq!(
        serde_json::to_value(&table["prefix"].dists).expect("serialize"),
        json!({ "authenticated": "authenticated", "prefixed": "authenticated" })
    );
}

#[test]
fn users_and_prefix() {
    let input = input_from(&[
        ("prefix/users", users(&["user1", "user2"])),
        ("prefix/also_users", users(&["user3", "user2"])),
        ("prefix/prefixed", token("prefix")),
    ]);

    let table = resolve(&input).expect("resolves");
    assert_eq!(table["prefix"].pool, Permission::users(["user1", "user2", "user3"]));
    assert_eq!(
        serde_json::to_value(&table["prefix"].dists).expect("serialize"),
        json!({
            "users": ["user1", "user2"],
            "also_users": ["user2", "user3"],
            "prefixed": ["user1", "user2", "user3"],
        })
    );
}

#[test]
fn unmanaged_points_never_appear() {
    let input = input_from(&[
        ("unmanaged/one", PublishDecl::default()),
        ("unmanaged/two", PublishDecl::default()),
        ("stable", users(&["user"])),
    ]);

    let table = resolve(&input).expect("resolves");
    assert_eq!(table.len(), 1);
    let rendered = serde_json::to_string(&table).expect("serialize");
    assert!(!rendered.contains("unmanaged"), "got: {rendered}");
}

#[test]
fn resolution_is_idempotent_on_resolved_values() {
    let first = resolve(&input_from(&[
        ("foo/test", users(&["user1"])),
        ("foo/bar", users(&["user2"])),
        ("foo/baz", token("prefix")),
    ]))
    .expect("resolves");

    // feed the resolved per-distribution values back through the pipeline
    let replay: Vec<(String, PublishDecl)> = first["foo"]
        .dists
        .iter()
        .map(|(name, entry)| {
            let value = serde_json::to_value(entry).expect("serialize");
            let names: Vec<String> = serde_json::from_value(value).expect("user list");
            (format!("foo/{name}"), PublishDecl::with_users(names))
        })
        .collect();

    let second = resolve(&input_from(
        &replay
            .iter()
            .map(|(p, d)| (p.as_str(), d.clone()))
            .collect::<Vec<_>>(),
    ))
    .expect("resolves");

    assert_eq!(first, second);
}

#[test]
fn declaration_order_does_not_matter() {
    let forward = input_from(&[
        ("p/a", users(&["user1"])),
        ("p/b", token("authenticated")),
        ("p/c", token("prefix")),
    ]);
    let backward = input_from(&[
        ("p/c", token("prefix")),
        ("p/b", token("authenticated")),
        ("p/a", users(&["user1"])),
    ]);

    assert_eq!(
        resolve(&forward).expect("resolves"),
        resolve(&backward).expect("resolves")
    );
}

#[test]
fn dual_channel_table_with_repositories() {
    let repos: BTreeMap<String, RepoDecl> = [
        ("repouserx".to_string(), RepoDecl::with_users(["userx"])),
        ("repoany".to_string(), RepoDecl::with_token("authenticated")),
    ]
    .into_iter()
    .collect();

    let mut gated = users(&["admin"]);
    gated
        .components
        .insert("main".to_string(), "repouserx".to_string());

    let mut open = users(&["admin"]);
    open.components
        .insert("main".to_string(), "repoany".to_string());

    let input = ResolveInput {
        publish: [
            ("apt/gated".to_string(), gated),
            ("apt/open".to_string(), open),
        ]
        .into_iter()
        .collect(),
        repos: Some(repos),
        default_allow_from: Permission::Prefix,
        ..ResolveInput::default()
    };

    let table = resolve(&input).expect("resolves");
    let rendered = serde_json::to_value(&table).expect("serialize");

    assert_eq!(
        rendered,
        json!({
            "apt": {
                "pool": ["admin"],
                "api": "authenticated",
                "dists": {
                    "gated": { "public": ["admin"], "api": ["userx"] },
                    "open": { "public": ["admin"], "api": "authenticated" },
                },
            },
        })
    );
}

#[test]
fn invalid_declaration_aborts_the_whole_call() {
    let input = input_from(&[
        ("good", users(&["user1"])),
        ("main", token("wrong_value")),
    ]);

    let err = resolve(&input).expect_err("must fail");
    assert!(matches!(err, AuthError::InvalidPermissionDeclaration { .. }));
}
