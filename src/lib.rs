//! Typed, defaulted access to environment variables and a minimal
//! `KEY=VALUE` file loader.
//!
//! Every operation works on an [`EnvStore`]. [`MemoryEnv`] is isolated and
//! safe to use anywhere; [`ProcessEnv`] reads and writes the process
//! environment and is `unsafe` to construct, because callers must guarantee
//! no concurrent process-environment access. [`ProcessEnv::snapshot`] copies
//! the process environment into a [`MemoryEnv`].
//!
//! ```
//! use envisage::{CheckOptions, DecimalSeparator, MemoryEnv, TypedEnv};
//!
//! let mut env = MemoryEnv::new();
//! env.set_int("WORKERS", 4)?;
//! env.set_string("RATIO", "0,75")?;
//!
//! assert_eq!(env.int_or("WORKERS", 1), 4);
//! assert_eq!(env.f64_or("RATIO", DecimalSeparator::Comma, 1.0), 0.75);
//! assert_eq!(env.ints_or("PORTS", ",", &[8080])?, vec![8080]);
//!
//! env.check("MODE", "release", CheckOptions::new().write_back(true))?;
//! assert_eq!(env.string_or("MODE", ""), "release");
//! # Ok::<(), envisage::Error>(())
//! ```

mod accessor;
mod check;
mod env;
mod error;
mod loader;
mod model;
mod parser;
mod value;

pub use accessor::TypedEnv;
#[allow(deprecated)]
pub use check::{CheckOptions, check, check_optional};
pub use env::{EnvStore, MemoryEnv, ProcessEnv};
pub use error::{Error, ParseError, ParseErrorKind, WriteErrorReason};
pub use loader::{DEFAULT_FILE, FileLoader, from_path};
pub use model::{ConfigMap, Entry, LoadReport};
pub use parser::{parse_reader, parse_str};
pub use value::{DecimalSeparator, EnvValue};
