//! Describes dependency resolution errors

use std::fmt::{Display, Formatter};

/// A boxed error produced by a deferred loader.
pub type LoadError = Box<
    dyn std::error::Error
    + Send
    + Sync
>;

/// Errors raised by the accessor methods of a [`Scope`](crate::Scope).
///
/// Both [`Error::UnsetDependency`] and [`Error::MissingDefaultValue`] are
/// development-time guardrails: they signal a registration mistake and are
/// never retried or caught internally.
#[derive(Debug, Clone)]
pub enum Error {
    /// The key does not exist in the registry at call time.
    UnsetDependency {
        accessor: &'static str,
        key: String,
    },
    /// The callable accessor found no resolved value and no configured default.
    MissingDefaultValue {
        key: String,
    },
    /// The entry resolved to a value of a different type than requested.
    ValueTypeMismatch {
        key: String,
        expected: &'static str,
    },
}

impl Error {
    pub(crate) fn unset(accessor: &'static str, key: &str) -> Self {
        Error::UnsetDependency { accessor, key: key.to_owned() }
    }

    pub(crate) fn missing_default(key: &str) -> Self {
        Error::MissingDefaultValue { key: key.to_owned() }
    }

    pub(crate) fn type_mismatch(key: &str, expected: &'static str) -> Self {
        Error::ValueTypeMismatch { key: key.to_owned(), expected }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnsetDependency { accessor, key } => write!(
                f,
                "{accessor}: dependency \"{key}\" is not registered; \
                 add it to the registry, e.g. `builder.register(\"{key}\", value)` \
                 before calling `builder.build()`"
            ),
            Error::MissingDefaultValue { key } => write!(
                f,
                "use_hook: dependency \"{key}\" has not resolved yet and no default is configured; \
                 register one, e.g. `builder.register_deferred_with_default(\"{key}\", fallback, load)`"
            ),
            Error::ValueTypeMismatch { key, expected } => write!(
                f,
                "dependency \"{key}\" is registered with a different type than the requested `{expected}`"
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn unset_names_accessor_key_and_remediation() {
        let err = Error::unset("use_dependency", "theme");
        let msg = err.to_string();

        assert!(msg.contains("use_dependency"));
        assert!(msg.contains("\"theme\""));
        assert!(msg.contains("builder.register(\"theme\", value)"));
    }

    #[test]
    fn missing_default_names_key_and_remediation() {
        let err = Error::missing_default("format_date");
        let msg = err.to_string();

        assert!(msg.contains("use_hook"));
        assert!(msg.contains("\"format_date\""));
        assert!(msg.contains("register_deferred_with_default"));
    }

    #[test]
    fn type_mismatch_names_requested_type() {
        let err = Error::type_mismatch("theme", std::any::type_name::<String>());

        assert!(err.to_string().contains("alloc::string::String"));
    }
}
