//! Repository name resolution.
//!
//! Callers may refer to a repository as `name` or `namespace/name`.
//! Unqualified names are placed under the configured default namespace.
//! No normalization is performed: the input is passed through verbatim.

use crate::errors::{HostingError, HostingResult};

/// Resolves bare or qualified repository names.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    default_namespace: Option<String>,
}

impl NameResolver {
    /// Creates a resolver with an optional default namespace.
    pub fn new(default_namespace: Option<String>) -> Self {
        Self { default_namespace }
    }

    /// Gets the default namespace.
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Returns `namespace/name`.
    ///
    /// Fails with `InvalidName` when the name is malformed, or when it is
    /// unqualified and there is no default namespace to place it under.
    pub fn full_name(&self, raw_name: &str) -> HostingResult<String> {
        match split(raw_name)? {
            (Some(_), _) => Ok(raw_name.to_string()),
            (None, name) => match self.default_namespace() {
                Some(namespace) => Ok(format!("{}/{}", namespace, name)),
                None => Err(HostingError::invalid_name(
                    raw_name,
                    "unqualified and no default namespace is configured",
                )),
            },
        }
    }

    /// Returns the explicit namespace, or the default for unqualified names.
    pub fn namespace<'a>(&'a self, raw_name: &'a str) -> HostingResult<Option<&'a str>> {
        Ok(split(raw_name)?.0.or(self.default_namespace()))
    }

    /// Returns the name without its namespace.
    pub fn short_name<'a>(&self, raw_name: &'a str) -> HostingResult<&'a str> {
        Ok(split(raw_name)?.1)
    }
}

fn split(raw_name: &str) -> HostingResult<(Option<&str>, &str)> {
    if raw_name.is_empty() {
        return Err(HostingError::invalid_name(raw_name, "empty"));
    }

    match raw_name.split_once('/') {
        None => Ok((None, raw_name)),
        Some((_, rest)) if rest.contains('/') => Err(HostingError::invalid_name(
            raw_name,
            "expected `name` or `namespace/name`",
        )),
        Some((namespace, name)) if namespace.is_empty() || name.is_empty() => Err(
            HostingError::invalid_name(raw_name, "namespace and name must be non-empty"),
        ),
        Some((namespace, name)) => Ok((Some(namespace), name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HostingErrorKind;
    use test_case::test_case;

    fn resolver() -> NameResolver {
        NameResolver::new(Some("acme".to_string()))
    }

    #[test_case("widgets", "acme/widgets" ; "unqualified")]
    #[test_case("octo/widgets", "octo/widgets" ; "qualified")]
    #[test_case("acme/widgets", "acme/widgets" ; "qualified under default")]
    #[test_case("Widgets ", "acme/Widgets " ; "no normalization")]
    fn test_full_name(input: &str, expected: &str) {
        assert_eq!(resolver().full_name(input).unwrap(), expected);
    }

    #[test]
    fn test_namespace() {
        let resolver = resolver();
        assert_eq!(resolver.namespace("widgets").unwrap(), Some("acme"));
        assert_eq!(resolver.namespace("octo/widgets").unwrap(), Some("octo"));
        assert_eq!(NameResolver::default().namespace("widgets").unwrap(), None);
    }

    #[test]
    fn test_short_name() {
        let resolver = resolver();
        assert_eq!(resolver.short_name("widgets").unwrap(), "widgets");
        assert_eq!(resolver.short_name("octo/widgets").unwrap(), "widgets");
    }

    #[test_case("" ; "empty")]
    #[test_case("a/b/c" ; "too many separators")]
    #[test_case("/widgets" ; "empty namespace")]
    #[test_case("acme/" ; "empty name")]
    fn test_invalid_names(input: &str) {
        let err = resolver().full_name(input).unwrap_err();
        assert_eq!(*err.kind(), HostingErrorKind::InvalidName);
        assert!(resolver().short_name(input).is_err());
    }

    #[test]
    fn test_unqualified_without_default() {
        let err = NameResolver::default().full_name("widgets").unwrap_err();
        assert_eq!(*err.kind(), HostingErrorKind::InvalidName);

        assert_eq!(
            NameResolver::default().full_name("octo/widgets").unwrap(),
            "octo/widgets"
        );
    }
}
