//! The ambient name-value mapping that placeholders are resolved against.

use std::collections::BTreeMap;

/// An ordered set of variables with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: BTreeMap<String, String>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Env {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Env {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Self::new();
        env.extend(iter);
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_insert_wins() {
        let mut env = Env::from_iter([("A", "1")]);
        env.extend([("A", "2"), ("B", "3")]);

        assert_eq!(env.get("A"), Some("2"));
        assert_eq!(env.get("B"), Some("3"));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_iter_is_sorted_by_name() {
        let env = Env::from_iter([("ZETA", "z"), ("ALPHA", "a")]);
        let names: Vec<_> = env.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["ALPHA", "ZETA"]);
    }

    #[test]
    fn test_from_process_sees_path() {
        // PATH is set in every environment the tests run in
        let env = Env::from_process();
        assert!(env.contains("PATH"));
    }
}
