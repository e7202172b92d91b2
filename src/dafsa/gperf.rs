//! Reader for the gperf-style dictionary files the compiler takes as input.
//!
//! ```text
//! %{
//! // Anything before the first `%%` is kept as the preamble.
//! %}
//! %%
//! example.com, 1
//! example.org, 4
//! %%
//! ```

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Errors in the layout of a dictionary file.
///
/// Line numbers count from 1, over the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The file lacks the opening or closing `%%` line.
    #[error("expected the word list to be enclosed in a pair of %% lines")]
    MissingDelimiter,
    /// An entry has no word or does not end with `, <digit>`.
    #[error("line {line}: expected \"word, <digit>\", found {text:?}")]
    MalformedLine {
        /// Line number.
        line: usize,
        /// The trimmed line.
        text: String,
    },
    /// The value of an entry is not one of the allowed digits.
    #[error("line {line}: value {value:?} is not allowed")]
    DisallowedValue {
        /// Line number.
        line: usize,
        /// The offending character.
        value: char,
    },
}

/// Options for [`parse_gperf_with`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Values an entry may carry.
    ///
    /// The encoding has room for `0..=15`, but only `0`, `1`, `2` and `4`
    /// have an agreed meaning for consumers of the generated tables.
    pub allowed_values: Vec<u8>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            allowed_values: vec![0, 1, 2, 4],
        }
    }
}

/// A parsed dictionary file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dictionary {
    /// Lines before the first `%%`, joined with `\n`.
    pub preamble: String,
    /// Word/value pairs, in file order.
    pub entries: Vec<(String, u8)>,
}

/// Parses `text` with the default [`ParseOptions`].
///
/// # Examples
///
/// ```
/// use libdafsa::dafsa::gperf::parse_gperf;
///
/// let dict = parse_gperf("%%\naa, 1\na, 2\n%%\n").unwrap();
/// assert_eq!(dict.preamble, "");
/// assert_eq!(dict.entries, [("aa".to_string(), 1), ("a".to_string(), 2)]);
/// ```
pub fn parse_gperf(text: &str) -> Result<Dictionary, FormatError> {
    parse_gperf_with(text, &ParseOptions::default())
}

/// Parses `text`, accepting the values listed in `options`.
pub fn parse_gperf_with(text: &str, options: &ParseOptions) -> Result<Dictionary, FormatError> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let open = lines
        .iter()
        .position(|&l| l == "%%")
        .ok_or(FormatError::MissingDelimiter)?;
    let close = lines[open + 1..]
        .iter()
        .position(|&l| l == "%%")
        .map(|i| open + 1 + i)
        .ok_or(FormatError::MissingDelimiter)?;

    let mut entries = Vec::with_capacity(close - open - 1);
    for (index, &entry) in lines.iter().enumerate().take(close).skip(open + 1) {
        let line = index + 1;
        let (word, value) = entry
            .rsplit_once(", ")
            .filter(|(word, value)| !word.is_empty() && value.chars().count() == 1)
            .ok_or_else(|| FormatError::MalformedLine {
                line,
                text: entry.to_string(),
            })?;
        let value = value.chars().next().unwrap_or_default();
        let digit = value
            .to_digit(10)
            .map(|d| d as u8)
            .filter(|d| options.allowed_values.contains(d))
            .ok_or(FormatError::DisallowedValue { line, value })?;
        entries.push((word.to_string(), digit));
    }

    Ok(Dictionary {
        preamble: lines[..open].join("\n"),
        entries,
    })
}

/// Reads and parses the dictionary file at `path`.
pub fn read_gperf_file(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<Dictionary, crate::Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let dict = parse_gperf_with(&text, options)?;
    debug!(path = %path.display(), entries = dict.entries.len(), "parsed dictionary");
    Ok(dict)
}

#[cfg(test)]
mod test {
    use super::*;

    const INPUT: &str = "\
%{
// Generated from the public suffix list.
%}
%%
  aa, 1
a, 2
b.c, 4
%%
trailing text is ignored
";

    #[test]
    fn preamble_and_entries() {
        let dict = parse_gperf(INPUT).unwrap();
        assert_eq!(
            dict.preamble,
            "%{\n// Generated from the public suffix list.\n%}"
        );
        assert_eq!(
            dict.entries,
            [
                ("aa".to_string(), 1),
                ("a".to_string(), 2),
                ("b.c".to_string(), 4)
            ]
        );
    }

    #[test]
    fn commas_inside_words_are_kept() {
        let dict = parse_gperf("%%\na, b, 0\n%%").unwrap();
        assert_eq!(dict.entries, [("a, b".to_string(), 0)]);
    }

    #[test]
    fn missing_delimiters() {
        assert_eq!(parse_gperf("aa, 1\n"), Err(FormatError::MissingDelimiter));
        assert_eq!(parse_gperf("%%\naa, 1\n"), Err(FormatError::MissingDelimiter));
    }

    #[test]
    fn disallowed_digit() {
        assert_eq!(
            parse_gperf("%%\naa, 1\nab, 3\n%%\n"),
            Err(FormatError::DisallowedValue {
                line: 3,
                value: '3'
            })
        );
        assert_eq!(
            parse_gperf("%%\naa, x\n%%\n"),
            Err(FormatError::DisallowedValue {
                line: 2,
                value: 'x'
            })
        );
    }

    #[test]
    fn custom_values() {
        let options = ParseOptions {
            allowed_values: (0..=9).collect(),
        };
        let dict = parse_gperf_with("%%\nab, 3\n%%\n", &options).unwrap();
        assert_eq!(dict.entries, [("ab".to_string(), 3)]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_gperf_file("does/not/exist.gperf", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn malformed_lines() {
        for bad in ["aa 1", "aa,1", "aa, 12", "", "aa,  ", ", 1", "  , 2"] {
            let text = format!("%%\n{bad}\n%%\n");
            assert!(
                matches!(
                    parse_gperf(&text),
                    Err(FormatError::MalformedLine { line: 2, .. })
                ),
                "{bad:?}"
            );
        }
    }
}
