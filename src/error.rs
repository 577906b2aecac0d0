use std::fmt;

use thiserror::Error;

/// Boxed error returned by resolvers and binding consumers.
///
/// Resolvers consult external sources (session stores, header tables, ...)
/// whose failures have no common type, so they are carried as trait objects.
pub type ResolveError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the binding crate.
///
/// Each variant wraps one of the narrower error types so callers can match on
/// the phase that failed: scanning, start-up, request-time resolution or the
/// binding consumer itself.
#[derive(Debug, Error)]
pub enum Error {
    /// A target type could not be introspected
    #[error(transparent)]
    Introspection(#[from] IntrospectionError),
    /// Pre-warming the introspection cache failed at start-up
    #[error(transparent)]
    Initialization(#[from] IntrospectionInitError),
    /// A resolver failed while resolving a request value
    #[error(transparent)]
    Resolution(#[from] PropertyResolutionError),
    /// The binding consumer rejected the resolved values
    #[error(transparent)]
    Bind(#[from] BindError),
}

/// Structural errors found while scanning a target type.
///
/// Both kinds are fatal and abort introspection of the root type being
/// scanned. They are distinct so callers can tell a malformed bean from a
/// cyclic one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntrospectionError {
    /// A property definition cannot be bound.
    #[error("illegal property definition `{property}` on {bean}: {reason}")]
    IllegalPropertyDefinition {
        /// Name of the type declaring the property
        bean: &'static str,
        /// The offending property name
        property: String,
        /// What is wrong with it
        reason: String,
    },
    /// A nested property reaches a type that is already being scanned.
    #[error(
        "circular reference to {bean}; circular references are not supported. Cycle: {}",
        CycleDisplay(.cycle)
    )]
    CircularReference {
        /// The type that was reached a second time
        bean: &'static str,
        /// Ancestor chain from the root type down to the offending property.
        /// The repeated type appears at both ends, so a self-reference reads
        /// `[Root, Root]`.
        cycle: Vec<&'static str>,
    },
}

impl IntrospectionError {
    pub(crate) fn illegal(
        bean: &'static str,
        property: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        IntrospectionError::IllegalPropertyDefinition {
            bean,
            property: property.into(),
            reason: reason.into(),
        }
    }
}

struct CycleDisplay<'a>(&'a [&'static str]);

impl fmt::Display for CycleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(" -> "))
    }
}

/// Start-up failure raised when pre-warming the cache for a candidate type fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unable to introspect request bean of type {bean}: {source}")]
pub struct IntrospectionInitError {
    /// The candidate type whose scan failed
    pub bean: &'static str,
    /// The underlying scan failure
    #[source]
    pub source: IntrospectionError,
}

/// A resolver failed during request-time resolution.
///
/// Resolution is fail-fast: the first failure aborts the mapping for the
/// whole request and no partial values are handed to the binding consumer.
#[derive(Debug, Error)]
#[error("unable to resolve property `{path}`: {source}")]
pub struct PropertyResolutionError {
    /// Qualified path of the property being resolved
    pub path: String,
    /// The error reported by the resolver
    #[source]
    pub source: ResolveError,
}

/// The binding consumer rejected the resolved values.
#[derive(Debug, Error)]
#[error("unable to bind {target}: {message}")]
pub struct BindError {
    /// Name of the target type
    pub target: &'static str,
    /// Human-readable description of the failure
    pub message: String,
}

impl BindError {
    /// Creates a new bind error for the given target type.
    pub fn new(target: &'static str, message: impl Into<String>) -> Self {
        Self {
            target,
            message: message.into(),
        }
    }
}
