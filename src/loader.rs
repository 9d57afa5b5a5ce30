use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::env::{EnvStore, ProcessEnv};
use crate::error::Error;
use crate::model::{ConfigMap, LoadReport};
use crate::parser::parse_reader;

/// File name used by the command-line front end when none is given.
pub const DEFAULT_FILE: &str = ".env";

/// Load a required file into the process environment, keeping variables that
/// are already defined.
///
/// # Safety
///
/// The caller must ensure no other threads concurrently read or write the
/// process environment for the duration of the call.
pub unsafe fn from_path(path: impl AsRef<Path>) -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    let mut env = unsafe { ProcessEnv::new() };
    FileLoader::new(path)
        .update_environment(true)
        .skip_if_already_defined(true)
        .load(&mut env)
}

/// Builder-style loader for a `KEY=VALUE` file.
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
    update_environment: bool,
    skip_if_already_defined: bool,
    must_exist: bool,
}

impl FileLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            update_environment: false,
            skip_if_already_defined: false,
            must_exist: true,
        }
    }

    /// Write parsed entries into the store passed to [`FileLoader::load`].
    pub fn update_environment(mut self, update_environment: bool) -> Self {
        self.update_environment = update_environment;
        self
    }

    /// Leave variables that are already defined in the store untouched.
    pub fn skip_if_already_defined(mut self, skip_if_already_defined: bool) -> Self {
        self.skip_if_already_defined = skip_if_already_defined;
        self
    }

    /// Fail with [`Error::FileNotFound`] when the file is missing. Defaults to
    /// `true`.
    pub fn must_exist(mut self, must_exist: bool) -> Self {
        self.must_exist = must_exist;
        self
    }

    /// Parse the file without touching any environment.
    pub fn parse_only(&self) -> Result<ConfigMap, Error> {
        Ok(self.read_entries()?.unwrap_or_default())
    }

    pub fn load<S>(&self, env: &mut S) -> Result<LoadReport, Error>
    where
        S: EnvStore + ?Sized,
    {
        let Some(entries) = self.read_entries()? else {
            return Ok(LoadReport::default());
        };

        let mut report = LoadReport {
            file_found: true,
            ..LoadReport::default()
        };

        if self.update_environment {
            for entry in &entries {
                if self.skip_if_already_defined && env.contains(&entry.key) {
                    report.skipped_existing += 1;
                    tracing::debug!(key = %entry.key, "skipping existing key");
                    continue;
                }

                env.store(&entry.key, &entry.value)?;
                report.applied += 1;
            }
        }

        report.entries = entries;
        Ok(report)
    }

    fn read_entries(&self) -> Result<Option<ConfigMap>, Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                if self.must_exist {
                    return Err(Error::FileNotFound {
                        path: self.path.clone(),
                    });
                }
                tracing::debug!(path = %self.path.display(), "optional file not found");
                return Ok(None);
            }
            Err(source) => {
                return Err(Error::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let entries = parse_reader(BufReader::new(file)).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(
            path = %self.path.display(),
            entries = entries.len(),
            "parsed file"
        );
        Ok(Some(entries))
    }
}
