//! Variable Resolvers
//!
//! The expansion engine never looks variables up itself. It asks a
//! [`Resolver`], which may be an in-memory map, the process environment, or
//! any closure.

use crate::interpreter::errors::ResolveError;
use std::collections::HashMap;

/// Source of variable values.
pub trait Resolver {
    /// Look up a variable. `Ok(None)` means unset.
    fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError>;

    /// Store a value for `${VAR:=word}`. Returns false when the resolver is
    /// read-only, in which case `:=` behaves like `:-`.
    fn assign(&mut self, _name: &str, _value: &str) -> bool {
        false
    }
}

/// Read-only resolver from a plain lookup closure.
impl<F> Resolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
        Ok(self(name))
    }
}

/// Read-only resolver from a closure that can fail, e.g. a secret store.
pub struct FallibleFn<F>(pub F);

impl<F> Resolver for FallibleFn<F>
where
    F: Fn(&str) -> Result<Option<String>, ResolveError>,
{
    fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
        (self.0)(name)
    }
}

// =============================================================================
// MAP RESOLVER
// =============================================================================

/// In-memory variables. Supports `:=` write-back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapResolver {
    vars: HashMap<String, String>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the process environment. Variables whose name or value is
    /// not valid UTF-8 are skipped.
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.vars.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Resolver for MapResolver {
    fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
        Ok(self.vars.get(name).cloned())
    }

    fn assign(&mut self, name: &str, value: &str) -> bool {
        self.vars.insert(name.to_string(), value.to_string());
        true
    }
}

impl From<HashMap<String, String>> for MapResolver {
    fn from(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}

impl<K, V> FromIterator<(K, V)> for MapResolver
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K, V> Extend<(K, V)> for MapResolver
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.vars
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

// =============================================================================
// ENVIRONMENT RESOLVER
// =============================================================================

/// Reads the process environment on every lookup. Read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvResolver;

impl Resolver for EnvResolver {
    fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
        match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ResolveError::new(format!(
                "value of {} is not valid unicode",
                name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_resolver() {
        let mut vars: MapResolver = [("A", "1")].into_iter().collect();
        assert_eq!(vars.resolve("A").unwrap(), Some("1".to_string()));
        assert_eq!(vars.resolve("B").unwrap(), None);

        assert!(vars.assign("B", "2"));
        assert_eq!(vars.get("B"), Some("2"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_map_resolver_from_hash_map() {
        let mut map = HashMap::new();
        map.insert("PORT".to_string(), "8080".to_string());
        let mut vars = MapResolver::from(map);
        vars.extend([("HOST", "localhost")]);
        assert_eq!(vars.get("PORT"), Some("8080"));
        assert_eq!(vars.get("HOST"), Some("localhost"));
        assert!(!vars.is_empty());
    }

    #[test]
    fn test_closure_resolver_is_read_only() {
        let mut lookup = |name: &str| (name == "X").then(|| "x".to_string());
        assert_eq!(Resolver::resolve(&lookup, "X").unwrap(), Some("x".to_string()));
        assert_eq!(Resolver::resolve(&lookup, "Y").unwrap(), None);
        assert!(!Resolver::assign(&mut lookup, "Y", "y"));
    }

    #[test]
    fn test_fallible_resolver() {
        let failing = FallibleFn(|name: &str| -> Result<Option<String>, ResolveError> {
            Err(ResolveError::new(format!("no access to {}", name)))
        });
        assert_eq!(
            failing.resolve("SECRET").unwrap_err().to_string(),
            "no access to SECRET"
        );
    }

    #[test]
    fn test_env_resolver() {
        std::env::set_var("ENVSUBST_RESOLVER_TEST", "present");
        assert_eq!(
            EnvResolver.resolve("ENVSUBST_RESOLVER_TEST").unwrap(),
            Some("present".to_string())
        );
        assert_eq!(EnvResolver.resolve("ENVSUBST_RESOLVER_TEST_MISSING").unwrap(), None);
    }
}
