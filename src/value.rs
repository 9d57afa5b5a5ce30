use std::borrow::Cow;

use crate::error::ParseErrorKind;

/// Decimal separator accepted by float accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecimalSeparator {
    /// `1.5`
    #[default]
    Dot,
    /// `1,5`; the first comma of each value is read as the decimal point.
    Comma,
}

impl DecimalSeparator {
    pub(crate) fn normalize(self, raw: &str) -> Cow<'_, str> {
        match self {
            Self::Comma if raw.contains(',') => Cow::Owned(raw.replacen(',', ".", 1)),
            _ => Cow::Borrowed(raw),
        }
    }
}

/// A type that can be read from and written to an environment variable.
pub trait EnvValue: Sized {
    fn from_env_str(raw: &str) -> Result<Self, ParseErrorKind>;

    fn to_env_string(&self) -> String;
}

impl EnvValue for String {
    fn from_env_str(raw: &str) -> Result<Self, ParseErrorKind> {
        Ok(raw.to_owned())
    }

    fn to_env_string(&self) -> String {
        self.clone()
    }
}

impl EnvValue for bool {
    fn from_env_str(raw: &str) -> Result<Self, ParseErrorKind> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(ParseErrorKind::InvalidBool),
        }
    }

    fn to_env_string(&self) -> String {
        self.to_string()
    }
}

macro_rules! int_env_value {
    ($($ty:ty),*) => {
        $(
            impl EnvValue for $ty {
                fn from_env_str(raw: &str) -> Result<Self, ParseErrorKind> {
                    raw.parse().map_err(|_| ParseErrorKind::InvalidInt)
                }

                fn to_env_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

int_env_value!(i32, i64, isize);

impl EnvValue for f64 {
    fn from_env_str(raw: &str) -> Result<Self, ParseErrorKind> {
        raw.parse().map_err(|_| ParseErrorKind::InvalidFloat)
    }

    /// Shortest representation that parses back to the same value, never in
    /// exponent form.
    fn to_env_string(&self) -> String {
        self.to_string()
    }
}

/// Split a list value the way `str::split` does, except that an empty
/// separator yields one item per character.
pub(crate) fn split_items<'a>(raw: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return raw
            .char_indices()
            .map(|(idx, ch)| &raw[idx..idx + ch.len_utf8()])
            .collect();
    }
    raw.split(separator).collect()
}
