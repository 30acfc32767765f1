//! The permission value type and the shared-permission merger.
//!
//! [`Permission`] is the currency of the whole resolver: every stage of the
//! pipeline consumes and produces it.
//!
//! | Variant | Meaning | Legal in resolved output |
//! |---------|---------|--------------------------|
//! | [`Unset`](Permission::Unset) | no policy declared | no (stripped or defaulted) |
//! | [`Authenticated`](Permission::Authenticated) | any logged-in user | yes |
//! | [`Prefix`](Permission::Prefix) | inherit from sibling distributions | no (resolved away) |
//! | [`Users`](Permission::Users) | an explicit, sorted user set | yes |
//!
//! `Unset` is distinct from `Users({})`: the former means "nothing was
//! declared", the latter is a concrete deny-all permission (the result of
//! merging nothing, see [`merge_shared`]).
//!
//! # Wire format
//!
//! On the wire a permission is `null`, the string `"authenticated"`, the
//! string `"prefix"`, or an array of user names. Any other string is
//! rejected at deserialization time.

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Literal token for the "any authenticated user" permission.
pub const AUTHENTICATED: &str = "authenticated";

/// Literal token for the "inherit from siblings" permission.
pub const PREFIX: &str = "prefix";

/// Who may access a publish point (or a repository, for API permissions).
///
/// # Example
///
/// ```
/// use pubgate_auth::Permission;
///
/// let p = Permission::users(["zoe", "alice", "alice"]);
/// // user sets are deduplicated and alphabetically sorted
/// assert_eq!(p, Permission::users(["alice", "zoe"]));
/// assert!(p.is_concrete());
/// assert!(!Permission::Unset.is_concrete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// No policy declared. Distinct from an empty user set.
    Unset,
    /// Any authenticated user; absorbing under [`merge_shared`].
    Authenticated,
    /// Inherit from sibling distributions in the same prefix.
    ///
    /// Only legal as raw input; the inheritance resolver replaces every
    /// occurrence before a table is emitted.
    Prefix,
    /// An explicit set of user names, deduplicated and sorted.
    Users(BTreeSet<String>),
}

impl Permission {
    /// Builds a [`Permission::Users`] from anything iterable over names.
    #[must_use]
    pub fn users<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Users(names.into_iter().map(Into::into).collect())
    }

    /// The empty user set: a concrete deny-all permission.
    #[must_use]
    pub fn no_users() -> Self {
        Self::Users(BTreeSet::new())
    }

    /// Returns `true` for `Authenticated` and `Users`: values that can act
    /// as inheritance donors and appear in resolved output.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        matches!(self, Self::Authenticated | Self::Users(_))
    }

    /// Returns `true` if this is [`Permission::Unset`].
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns `true` if this is [`Permission::Prefix`].
    #[must_use]
    pub fn is_prefix(&self) -> bool {
        matches!(self, Self::Prefix)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Authenticated => write!(f, "{AUTHENTICATED}"),
            Self::Prefix => write!(f, "{PREFIX}"),
            Self::Users(users) => {
                write!(f, "[")?;
                for (i, user) in users.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{user}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unset => serializer.serialize_none(),
            Self::Authenticated => serializer.serialize_str(AUTHENTICATED),
            Self::Prefix => serializer.serialize_str(PREFIX),
            Self::Users(users) => {
                let mut seq = serializer.serialize_seq(Some(users.len()))?;
                for user in users {
                    seq.serialize_element(user)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PermissionVisitor;

        impl<'de> Visitor<'de> for PermissionVisitor {
            type Value = Permission;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "null, \"{AUTHENTICATED}\", \"{PREFIX}\", or a list of user names"
                )
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(Permission::Unset)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(Permission::Unset)
            }

            fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
                d.deserialize_any(PermissionVisitor)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                match value {
                    AUTHENTICATED => Ok(Permission::Authenticated),
                    PREFIX => Ok(Permission::Prefix),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut users = BTreeSet::new();
                while let Some(user) = seq.next_element::<String>()? {
                    users.insert(user);
                }
                Ok(Permission::Users(users))
            }
        }

        deserializer.deserialize_any(PermissionVisitor)
    }
}

/// Merges a sequence of permission values into one.
///
/// The merge is a fold over a commutative, associative, idempotent
/// operation: `Authenticated` is absorbing, `Unset` contributes nothing,
/// user sets union. Merging an empty (or all-`Unset`) sequence yields the
/// empty user set: a concrete deny-all, *not* `Unset`.
///
/// `Prefix` operands are filtered out by every caller before merging;
/// should one slip through it contributes nothing (debug-asserted).
///
/// # Example
///
/// ```
/// use pubgate_auth::{merge_shared, Permission};
///
/// let merged = merge_shared([
///     &Permission::users(["user1", "user2"]),
///     &Permission::users(["user3"]),
///     &Permission::Unset,
/// ]);
/// assert_eq!(merged, Permission::users(["user1", "user2", "user3"]));
///
/// assert_eq!(merge_shared([&Permission::Unset]), Permission::no_users());
/// ```
pub fn merge_shared<'a, I>(values: I) -> Permission
where
    I: IntoIterator<Item = &'a Permission>,
{
    let mut users: BTreeSet<String> = BTreeSet::new();
    for value in values {
        match value {
            Permission::Unset => {}
            Permission::Authenticated => return Permission::Authenticated,
            Permission::Prefix => {
                debug_assert!(false, "Prefix must be resolved before merging");
            }
            Permission::Users(set) => users.extend(set.iter().cloned()),
        }
    }
    Permission::Users(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_deduplicates_and_sorts() {
        let p = Permission::users(["zoe", "alice", "mike", "alice"]);
        match &p {
            Permission::Users(users) => {
                let names: Vec<_> = users.iter().cloned().collect();
                assert_eq!(names, ["alice", "mike", "zoe"]);
            }
            other => panic!("expected Users, got {other:?}"),
        }
    }

    #[test]
    fn merge_users_only() {
        let merged = merge_shared([
            &Permission::users(["user1", "user2"]),
            &Permission::users(["user3", "user4"]),
            &Permission::Unset,
        ]);
        assert_eq!(merged, Permission::users(["user1", "user2", "user3", "user4"]));
    }

    #[test]
    fn merge_authenticated_absorbs() {
        let merged = merge_shared([
            &Permission::Authenticated,
            &Permission::users(["user1", "user2"]),
            &Permission::Unset,
        ]);
        assert_eq!(merged, Permission::Authenticated);
    }

    #[test]
    fn merge_of_nothing_is_deny_all() {
        assert_eq!(merge_shared([&Permission::Unset]), Permission::no_users());
        assert_eq!(merge_shared([]), Permission::no_users());
        assert_ne!(merge_shared([]), Permission::Unset);
    }

    #[test]
    fn merge_is_order_independent() {
        let a = Permission::users(["user1"]);
        let b = Permission::users(["user2", "user3"]);
        let c = Permission::Authenticated;

        assert_eq!(merge_shared([&a, &b]), merge_shared([&b, &a]));
        assert_eq!(merge_shared([&a, &b, &c]), merge_shared([&c, &a, &b]));
        assert_eq!(merge_shared([&a, &b, &c]), Permission::Authenticated);
    }

    #[test]
    fn merge_is_idempotent() {
        let a = Permission::users(["user1", "user2"]);
        assert_eq!(merge_shared([&a, &a]), a);
    }

    #[test]
    fn display() {
        assert_eq!(Permission::Unset.to_string(), "unset");
        assert_eq!(Permission::Authenticated.to_string(), "authenticated");
        assert_eq!(Permission::Prefix.to_string(), "prefix");
        assert_eq!(Permission::users(["b", "a"]).to_string(), "[a, b]");
    }

    #[test]
    fn serde_wire_shapes() {
        let json = |p: &Permission| serde_json::to_value(p).expect("serialize");

        assert_eq!(json(&Permission::Unset), serde_json::Value::Null);
        assert_eq!(json(&Permission::Authenticated), serde_json::json!("authenticated"));
        assert_eq!(json(&Permission::Prefix), serde_json::json!("prefix"));
        assert_eq!(
            json(&Permission::users(["b", "a"])),
            serde_json::json!(["a", "b"])
        );
    }

    #[test]
    fn serde_round_trip() {
        for p in [
            Permission::Unset,
            Permission::Authenticated,
            Permission::Prefix,
            Permission::no_users(),
            Permission::users(["user1", "user2"]),
        ] {
            let encoded = serde_json::to_string(&p).expect("serialize");
            let decoded: Permission = serde_json::from_str(&encoded).expect("deserialize");
            assert_eq!(decoded, p);
        }
    }

    #[test]
    fn serde_rejects_unknown_token() {
        let result = serde_json::from_str::<Permission>("\"wrong_value\"");
        assert!(result.is_err());
    }
}
