use std::borrow::Cow;

use crate::check::{self, CheckOptions};
use crate::env::EnvStore;
use crate::error::{Error, ParseError};
use crate::value::{DecimalSeparator, EnvValue, split_items};

/// Typed, defaulted access to any [`EnvStore`].
///
/// Scalar accessors (`*_or`) return the default both when the variable is
/// absent and when it cannot be parsed. Use [`TypedEnv::parse_var`] to see the
/// parse error instead.
///
/// Numeric list accessors return the default when the variable is absent and
/// an error naming the first unparsable item otherwise. A present but empty
/// variable yields an empty list.
pub trait TypedEnv: EnvStore {
    /// Whether the variable is defined, even with an empty value.
    fn is_set(&self, key: &str) -> bool {
        self.contains(key)
    }

    /// Strict lookup: `Ok(None)` when absent, an error when unparsable.
    fn parse_var<T: EnvValue>(&self, key: &str) -> Result<Option<T>, Error> {
        let Some(raw) = self.lookup(key) else {
            return Ok(None);
        };
        T::from_env_str(&raw)
            .map(Some)
            .map_err(|kind| Error::Parse(ParseError::new(key, None, kind)))
    }

    /// Strict float lookup honoring a decimal separator.
    fn parse_f64(&self, key: &str, separator: DecimalSeparator) -> Result<Option<f64>, Error> {
        let Some(raw) = self.lookup(key) else {
            return Ok(None);
        };
        f64::from_env_str(&separator.normalize(&raw))
            .map(Some)
            .map_err(|kind| Error::Parse(ParseError::new(key, None, kind)))
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or_else(|| default.to_owned())
    }

    /// Platform-width integer; 64 bits on 64-bit targets.
    fn int_or(&self, key: &str, default: isize) -> isize {
        scalar_or(self, key, default)
    }

    fn i64_or(&self, key: &str, default: i64) -> i64 {
        scalar_or(self, key, default)
    }

    fn bool_or(&self, key: &str, default: bool) -> bool {
        scalar_or(self, key, default)
    }

    fn f64_or(&self, key: &str, separator: DecimalSeparator, default: f64) -> f64 {
        match self.parse_f64(key, separator) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                tracing::debug!(key, error = %err, "falling back to default");
                default
            }
        }
    }

    /// Split a variable into strings. Never fails; `""` yields `[""]`.
    fn strings_or(&self, key: &str, separator: &str, default: &[&str]) -> Vec<String> {
        match self.lookup(key) {
            Some(raw) => split_items(&raw, separator)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            None => default.iter().map(|item| (*item).to_owned()).collect(),
        }
    }

    fn ints_or(
        &self,
        key: &str,
        separator: &str,
        default: &[isize],
    ) -> Result<Vec<isize>, Error> {
        list_or(self, key, separator, default, |item| Cow::Borrowed(item))
    }

    fn i64s_or(&self, key: &str, separator: &str, default: &[i64]) -> Result<Vec<i64>, Error> {
        list_or(self, key, separator, default, |item| Cow::Borrowed(item))
    }

    fn bools_or(&self, key: &str, separator: &str, default: &[bool]) -> Result<Vec<bool>, Error> {
        list_or(self, key, separator, default, |item| Cow::Borrowed(item))
    }

    fn f64s_or(
        &self,
        key: &str,
        separator: &str,
        decimal: DecimalSeparator,
        default: &[f64],
    ) -> Result<Vec<f64>, Error> {
        list_or(self, key, separator, default, |item| decimal.normalize(item))
    }

    /// Store a value in its canonical string form.
    fn set_var<T: EnvValue>(&mut self, key: &str, value: &T) -> Result<(), Error> {
        self.store(key, &value.to_env_string())
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.store(key, value)
    }

    fn set_int(&mut self, key: &str, value: isize) -> Result<(), Error> {
        self.set_var(key, &value)
    }

    fn set_i64(&mut self, key: &str, value: i64) -> Result<(), Error> {
        self.set_var(key, &value)
    }

    fn set_f64(&mut self, key: &str, value: f64) -> Result<(), Error> {
        self.set_var(key, &value)
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), Error> {
        self.set_var(key, &value)
    }

    /// See [`check`](crate::check()).
    fn check(&mut self, key: &str, default: &str, options: CheckOptions) -> Result<(), Error> {
        check::check(self, key, default, options)
    }
}

impl<S: EnvStore + ?Sized> TypedEnv for S {}

fn scalar_or<S, T>(env: &S, key: &str, default: T) -> T
where
    S: EnvStore + ?Sized,
    T: EnvValue,
{
    match env.parse_var(key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(err) => {
            tracing::debug!(key, error = %err, "falling back to default");
            default
        }
    }
}

fn list_or<S, T, N>(
    env: &S,
    key: &str,
    separator: &str,
    default: &[T],
    normalize: N,
) -> Result<Vec<T>, Error>
where
    S: EnvStore + ?Sized,
    T: EnvValue + Clone,
    N: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    let Some(raw) = env.lookup(key) else {
        return Ok(default.to_vec());
    };
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    split_items(&raw, separator)
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            T::from_env_str(&normalize(item))
                .map_err(|kind| Error::Parse(ParseError::new(key, Some(idx), kind)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::TypedEnv;
    use crate::env::{EnvStore, MemoryEnv};
    use crate::error::{Error, ParseErrorKind};
    use crate::value::DecimalSeparator;

    fn env_with(pairs: &[(&str, &str)]) -> MemoryEnv {
        pairs.iter().copied().collect()
    }

    #[test]
    fn absent_keys_return_defaults() {
        let env = MemoryEnv::new();
        assert_eq!(env.string_or("MISSING", "fallback"), "fallback");
        assert_eq!(env.int_or("MISSING", 7), 7);
        assert_eq!(env.i64_or("MISSING", -9_000_000_000), -9_000_000_000);
        assert_eq!(env.f64_or("MISSING", DecimalSeparator::Dot, 2.5), 2.5);
        assert!(env.bool_or("MISSING", true));
        assert_eq!(env.strings_or("MISSING", ",", &["a", "b"]), vec!["a", "b"]);
        assert_eq!(env.ints_or("MISSING", ",", &[1, 2]).expect("ints"), vec![1, 2]);
        assert_eq!(env.i64s_or("MISSING", ",", &[3]).expect("i64s"), vec![3]);
        assert_eq!(
            env.f64s_or("MISSING", ";", DecimalSeparator::Comma, &[0.5])
                .expect("f64s"),
            vec![0.5]
        );
        assert_eq!(env.bools_or("MISSING", ",", &[false]).expect("bools"), vec![false]);
    }

    #[test]
    fn present_values_are_converted() {
        let env = env_with(&[
            ("NAME", "string with spaces"),
            ("PORT", "8080"),
            ("BIG", "545545464564156"),
            ("RATIO", "-0.25"),
            ("ENABLED", "T"),
        ]);
        assert_eq!(env.string_or("NAME", ""), "string with spaces");
        assert_eq!(env.int_or("PORT", 0), 8080);
        assert_eq!(env.i64_or("BIG", 0), 545_545_464_564_156);
        assert_eq!(env.f64_or("RATIO", DecimalSeparator::Dot, 0.0), -0.25);
        assert!(env.bool_or("ENABLED", false));
    }

    #[test]
    fn unparsable_scalars_fall_back_to_default() {
        let env = env_with(&[("PORT", "eighty"), ("ENABLED", "yes"), ("RATIO", "1,5")]);
        assert_eq!(env.int_or("PORT", 80), 80);
        assert_eq!(env.i64_or("PORT", 81), 81);
        assert!(!env.bool_or("ENABLED", false));
        assert_eq!(env.f64_or("RATIO", DecimalSeparator::Dot, 9.0), 9.0);
    }

    #[test]
    fn comma_decimal_separator_is_normalized() {
        let env = env_with(&[("RATIO", "1,5"), ("LIST", "1,5;2,25")]);
        assert_eq!(env.f64_or("RATIO", DecimalSeparator::Comma, 0.0), 1.5);
        assert_eq!(
            env.f64s_or("LIST", ";", DecimalSeparator::Comma, &[])
                .expect("f64s"),
            vec![1.5, 2.25]
        );
    }

    #[test]
    fn strict_lookup_surfaces_parse_errors() {
        let env = env_with(&[("PORT", "eighty"), ("RATIO", "1,5")]);
        assert_eq!(env.parse_var::<i32>("ABSENT").expect("absent"), None);

        match env.parse_var::<i32>("PORT") {
            Err(Error::Parse(err)) => {
                assert_eq!(err.key, "PORT");
                assert_eq!(err.item, None);
                assert_eq!(err.kind, ParseErrorKind::InvalidInt);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(env.parse_f64("RATIO", DecimalSeparator::Dot).is_err());
        assert_eq!(
            env.parse_f64("RATIO", DecimalSeparator::Comma).expect("comma"),
            Some(1.5)
        );
    }

    #[test]
    fn string_list_splits_on_separator() {
        let env = env_with(&[("LIST", "a,b,c"), ("EMPTY", "")]);
        assert_eq!(env.strings_or("LIST", ",", &[]), vec!["a", "b", "c"]);
        assert_eq!(env.strings_or("EMPTY", ",", &["x"]), vec![""]);
    }

    #[test]
    fn numeric_lists_parse_every_item() {
        let env = env_with(&[("INTS", "1,-2,3"), ("BOOLS", "true|0|F")]);
        assert_eq!(env.ints_or("INTS", ",", &[]).expect("ints"), vec![1, -2, 3]);
        assert_eq!(
            env.bools_or("BOOLS", "|", &[]).expect("bools"),
            vec![true, false, false]
        );
    }

    #[test]
    fn empty_value_yields_empty_numeric_list() {
        let env = env_with(&[("EMPTY", "")]);
        assert!(env.ints_or("EMPTY", ",", &[1]).expect("ints").is_empty());
        assert!(
            env.f64s_or("EMPTY", ",", DecimalSeparator::Dot, &[1.0])
                .expect("f64s")
                .is_empty()
        );
    }

    #[test]
    fn first_bad_list_item_aborts_conversion() {
        let env = env_with(&[("INTS", "1,x,y"), ("SPACED", "1, 2")]);

        let err = env.ints_or("INTS", ",", &[9]).expect_err("expected error");
        match err {
            Error::Parse(err) => {
                assert_eq!(err.item, Some(1));
                assert_eq!(err.kind, ParseErrorKind::InvalidInt);
                assert_eq!(err.to_string(), "invalid integer in INTS at item 1");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(env.i64s_or("SPACED", ",", &[]).is_err());
    }

    #[test]
    fn setters_round_trip_through_accessors() {
        let mut env = MemoryEnv::new();
        env.set_string("S", "value with spaces").expect("set string");
        env.set_int("I", -987_654).expect("set int");
        env.set_i64("L", 545_545_464_564_156).expect("set i64");
        env.set_bool("B", false).expect("set bool");

        assert_eq!(env.string_or("S", ""), "value with spaces");
        assert_eq!(env.int_or("I", 0), -987_654);
        assert_eq!(env.i64_or("L", 0), 545_545_464_564_156);
        assert!(!env.bool_or("B", true));
        assert_eq!(env.lookup("B").as_deref(), Some("false"));

        for value in [0.0, 0.1, -123.456, 1e20, 5e-324, f64::MAX] {
            env.set_f64("F", value).expect("set f64");
            assert_eq!(env.f64_or("F", DecimalSeparator::Dot, f64::NAN), value);
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn int_accessors_hold_values_beyond_32_bits() {
        let mut env = MemoryEnv::new();
        env.set_int("BIG", 545_545_464_564_156).expect("set int");
        env.set_string("BIGS", "545545464564156,-545545464564156")
            .expect("set string");

        assert_eq!(env.lookup("BIG").as_deref(), Some("545545464564156"));
        assert_eq!(env.int_or("BIG", 0), 545_545_464_564_156);
        assert_eq!(
            env.ints_or("BIGS", ",", &[]).expect("ints"),
            vec![545_545_464_564_156, -545_545_464_564_156]
        );
    }

    #[test]
    fn is_set_reports_empty_values_as_present() {
        let mut env = MemoryEnv::new();
        assert!(!env.is_set("KEY"));
        env.set_string("KEY", "").expect("set empty");
        assert!(env.is_set("KEY"));
    }

    #[test]
    fn setters_reject_invalid_keys() {
        let mut env = MemoryEnv::new();
        assert!(matches!(
            env.set_int("BAD=KEY", 1),
            Err(Error::EnvironmentWrite { .. })
        ));
        assert!(!env.is_set("BAD=KEY"));
    }
}
