use std::borrow::Cow;
use std::io::BufRead;

use crate::model::{ConfigMap, Entry};

/// Parse `KEY=VALUE` declarations from text.
///
/// Lines are trimmed; blank lines, `#` comments and lines that are not a
/// valid declaration are skipped.
pub fn parse_str(input: &str) -> ConfigMap {
    let mut map = ConfigMap::new();
    for (idx, line) in input.lines().enumerate() {
        push_line(&mut map, line, line_number(idx));
    }
    map
}

/// Parse declarations from a buffered reader, one line at a time.
///
/// Bytes that are not valid UTF-8 are replaced with `U+FFFD`, so a bad
/// line only affects its own declaration. Read errors are returned as is.
pub fn parse_reader<R: BufRead>(mut reader: R) -> std::io::Result<ConfigMap> {
    let mut map = ConfigMap::new();
    let mut buf = Vec::new();
    let mut idx = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if matches!(line, Cow::Owned(_)) {
            tracing::trace!(line = line_number(idx), "replaced invalid UTF-8");
        }
        push_line(&mut map, strip_newline(&line), line_number(idx));
        idx += 1;
    }
    Ok(map)
}

fn strip_newline(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn push_line(map: &mut ConfigMap, line: &str, line_num: u32) {
    match parse_line(line) {
        Some((key, value)) => map.insert(Entry {
            key: key.to_owned(),
            value: value.to_owned(),
            line: line_num,
        }),
        None => tracing::trace!(line = line_num, "skipping line"),
    }
}

fn line_number(idx: usize) -> u32 {
    u32::try_from(idx + 1).unwrap_or(u32::MAX)
}

pub(crate) fn parse_line(line: &str) -> Option<(&str, &str)> {
    let working = line.trim();
    if working.is_empty() || working.starts_with('#') {
        return None;
    }

    let (key, value) = working.split_once('=')?;
    if !is_valid_key(key) || !is_valid_value(value) {
        return None;
    }
    Some((key, value))
}

/// An ASCII letter followed by one or more ASCII letters, digits or `_`.
fn is_valid_key(key: &str) -> bool {
    let mut bytes = key.bytes();
    let Some(first) = bytes.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && key.len() >= 2
        && bytes.all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

/// Spaces are allowed; other ASCII line whitespace is not.
fn is_valid_value(value: &str) -> bool {
    !value
        .bytes()
        .any(|byte| matches!(byte, b'\t' | b'\n' | b'\x0C' | b'\r'))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{parse_line, parse_reader, parse_str};

    #[test]
    fn parses_basic_values_and_comments() {
        let input = "# comment\nAA=1\n\nBB=two words\nCC=\n";
        let map = parse_str(input);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("AA"), Some("1"));
        assert_eq!(map.get("BB"), Some("two words"));
        assert_eq!(map.get("CC"), Some(""));
        assert_eq!(map.entry("BB").map(|entry| entry.line), Some(4));
    }

    #[test]
    fn accepts_declarations_after_trimming() {
        assert_eq!(parse_line(" KEY=val"), Some(("KEY", "val")));
        assert_eq!(parse_line("\tKEY=val  "), Some(("KEY", "val")));
        assert_eq!(
            parse_line("ABC=value with spaces"),
            Some(("ABC", "value with spaces"))
        );
    }

    #[test]
    fn rejects_invalid_keys() {
        for line in [
            "#ABC=x",
            "_ABC=x",
            "A=x",
            "=INVALID",
            "10INVALID=1",
            "INVALID SYNTAX",
            "BAD-KEY=1",
            "KEY =1",
            "ÄB=1",
        ] {
            assert_eq!(parse_line(line), None, "{line:?}");
        }
    }

    #[test]
    fn keeps_punctuation_and_quotes_in_values() {
        assert_eq!(
            parse_line(r#"ABC="42378462%&&3 178964@""#),
            Some(("ABC", r#""42378462%&&3 178964@""#))
        );
        assert_eq!(
            parse_line("mnoPQR=42378462%&&3 ###"),
            Some(("mnoPQR", "42378462%&&3 ###"))
        );
        assert_eq!(parse_line("URL=a=b"), Some(("URL", "a=b")));
    }

    #[test]
    fn rejects_values_with_tabs() {
        assert_eq!(parse_line("KEY=a\tb"), None);
    }

    #[test]
    fn duplicate_keys_keep_last_value_and_first_position() {
        let map = parse_str("AA=1\nBB=2\nAA=3\n");
        let entries: Vec<_> = map
            .iter()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
            .collect();

        assert_eq!(entries, vec![("AA", "3"), ("BB", "2")]);
        assert_eq!(map.entry("AA").map(|entry| entry.line), Some(3));
    }

    #[test]
    fn parses_unicode_values() {
        let map = parse_str("GREETING=こんにちは\n");
        assert_eq!(map.get("GREETING"), Some("こんにちは"));
    }

    #[test]
    fn handles_crlf_newlines() {
        let map = parse_str("AA=1\r\nBB=2\r\n");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("AA"), Some("1"));
        assert_eq!(map.get("BB"), Some("2"));
    }

    #[test]
    fn reader_matches_str_parser() {
        let input = "AA=1\n#BB=2\r\nCC=three\nDD=last";
        let from_reader = parse_reader(Cursor::new(input)).expect("reader should parse");

        assert_eq!(from_reader.len(), 3);
        assert_eq!(from_reader.get("CC"), Some("three"));
        assert_eq!(from_reader.get("DD"), Some("last"));
        assert_eq!(from_reader, parse_str(input));
    }

    #[test]
    fn reader_keeps_lines_around_invalid_utf8() {
        let input = b"FIRST=1\nBROKEN=caf\xe9\nLAST=3\n".to_vec();
        let map = parse_reader(Cursor::new(input)).expect("reader should parse");

        assert_eq!(map.get("FIRST"), Some("1"));
        assert_eq!(map.get("BROKEN"), Some("caf\u{FFFD}"));
        assert_eq!(map.get("LAST"), Some("3"));
        assert_eq!(map.entry("LAST").map(|entry| entry.line), Some(3));
    }
}
