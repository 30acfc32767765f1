//! Resolver error types.
//!
//! Every error is an immediate, non-retryable validation failure: the whole
//! resolution call aborts and no partial table is ever returned. Callers are
//! expected to surface these as configuration-compilation failures.

use thiserror::Error;

/// Errors raised while resolving an authorization table.
#[derive(Debug, Error)]
pub enum AuthError {
    /// An `allow_from` value is not one of the accepted shapes.
    ///
    /// `subject` names the offending publish point or repository,
    /// `found` describes the rejected value.
    #[error(
        "'allow_from' for {subject} expects undef, 'authenticated', 'prefix', \
         or a non-empty list of user names, got {found}"
    )]
    InvalidPermissionDeclaration {
        /// The publish point or repository carrying the bad declaration.
        subject: String,
        /// Description of the rejected value.
        found: String,
    },

    /// A core function received a structurally malformed argument.
    #[error("parameter '{parameter}' expects {expected}")]
    InvalidShape {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The shape the parameter expects.
        expected: &'static str,
    },

    /// A prefix bucket contains `prefix`-inheriting distributions but no
    /// sibling declares a concrete permission to inherit from.
    #[error("unable to resolve permissions in prefix '{prefix}': no distribution declares a concrete permission to inherit from")]
    UnresolvedPrefixInheritance {
        /// The affected prefix; the root prefix renders as `''`.
        prefix: String,
    },

    /// Reserved for strict-mode cross-distribution consistency checking.
    ///
    /// The strict flag is accepted by the pipeline but enforcement is not
    /// implemented; this variant is never constructed today.
    #[error("found difference in users within prefix '{prefix}' with strict enabled")]
    StrictConsistencyViolation {
        /// The prefix whose distributions disagree.
        prefix: String,
    },
}

impl AuthError {
    /// Machine-readable error code, stable across releases.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPermissionDeclaration { .. } => "INVALID_PERMISSION_DECLARATION",
            Self::InvalidShape { .. } => "INVALID_SHAPE",
            Self::UnresolvedPrefixInheritance { .. } => "UNRESOLVED_PREFIX_INHERITANCE",
            Self::StrictConsistencyViolation { .. } => "STRICT_CONSISTENCY_VIOLATION",
        }
    }
}
