use crate::env::EnvStore;
use crate::error::Error;

/// Directives for [`check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckOptions {
    write_back: bool,
    mandatory: bool,
    allow_empty: bool,
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a non-empty default when the variable is absent.
    pub fn write_back(mut self, write_back: bool) -> Self {
        self.write_back = write_back;
        self
    }

    /// Fail when the variable is absent. An empty value still counts as present.
    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    /// Accept an empty resolved value.
    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }
}

/// Validate a variable against `options`, resolving absent variables to
/// `default`.
///
/// Callers read the resolved value back through the typed accessors.
pub fn check<S>(env: &mut S, key: &str, default: &str, options: CheckOptions) -> Result<(), Error>
where
    S: EnvStore + ?Sized,
{
    let value = match env.lookup(key) {
        Some(value) => value,
        None => {
            if options.mandatory {
                return Err(Error::MissingMandatory {
                    key: key.to_owned(),
                });
            }

            if options.write_back && !default.is_empty() {
                env.store(key, default)?;
                tracing::debug!(key, "wrote default back to environment");
            }
            default.to_owned()
        }
    };

    if value.is_empty() && !options.allow_empty {
        return Err(Error::EmptyNotAllowed {
            key: key.to_owned(),
        });
    }

    Ok(())
}

/// [`check`] for a variable that may be absent.
#[deprecated(note = "use `check` with `CheckOptions`")]
pub fn check_optional<S>(
    env: &mut S,
    key: &str,
    default: &str,
    write_back: bool,
    allow_empty: bool,
) -> Result<(), Error>
where
    S: EnvStore + ?Sized,
{
    check(
        env,
        key,
        default,
        CheckOptions::new()
            .write_back(write_back)
            .allow_empty(allow_empty),
    )
}
