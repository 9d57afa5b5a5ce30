use std::collections::BTreeMap;

use crate::error::{Error, WriteErrorReason};

/// A key/value string store that variables are read from and written to.
///
/// Typed access is provided for every store through [`TypedEnv`](crate::TypedEnv).
pub trait EnvStore {
    /// Look up a variable, returning `None` when it is not defined.
    fn lookup(&self, key: &str) -> Option<String>;

    /// Define or replace a variable.
    fn store(&mut self, key: &str, value: &str) -> Result<(), Error>;

    fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }
}

/// The current process environment.
///
/// Writes go through [`std::env::set_var`], which mutates global process
/// state and is not thread-safe for concurrent environment access.
#[derive(Debug)]
pub struct ProcessEnv {
    _private: (),
}

impl ProcessEnv {
    /// Create a handle on the process environment.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write the
    /// process environment while this handle is used to store variables.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }

    /// Copy the current process environment into an in-memory store.
    ///
    /// Non-UTF-8 keys and values are converted lossily.
    pub fn snapshot() -> MemoryEnv {
        std::env::vars_os()
            .map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }
}

impl EnvStore for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), Error> {
        validate_var(key, value)?;
        // SAFETY: upheld by the caller of `ProcessEnv::new`; the key and value
        // were checked for the inputs `set_var` panics on.
        unsafe { std::env::set_var(key, value) };
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        std::env::var_os(key).is_some()
    }
}

/// An isolated in-memory environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: BTreeMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing map, for example [`ConfigMap::to_map`](crate::ConfigMap::to_map).
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.vars
    }
}

impl EnvStore for MemoryEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), Error> {
        validate_var(key, value)?;
        self.vars.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Reject the inputs the platform environment cannot represent.
pub(crate) fn validate_var(key: &str, value: &str) -> Result<(), Error> {
    let reason = if key.is_empty() {
        Some(WriteErrorReason::EmptyKey)
    } else if key.contains('=') {
        Some(WriteErrorReason::KeyContainsEquals)
    } else if key.contains('\0') {
        Some(WriteErrorReason::KeyContainsNul)
    } else if value.contains('\0') {
        Some(WriteErrorReason::ValueContainsNul)
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::EnvironmentWrite {
            key: key.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}
