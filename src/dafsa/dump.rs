//! Human-readable listing of an encoded DAFSA.
//!
//! One line per byte, with the grammar production it belongs to and what it
//! does. A blank line separates nodes, so every link target starts a block:
//!
//! ```text
//! 0: 0x81 <end_offset1>  jump to 1
//!
//! 1: 0xE1 <end_char>     match "a"
//! 2: 0x02 <offset1>      jump to 4
//! 3: 0x81 <end_offset1>  jump to 5
//! ```

use std::fmt::Write as _;

use super::builder::is_printable;
use super::decoder::DecodeError;
use super::label::LabelByte;
use super::links::Links;

#[derive(Clone, Debug)]
struct Line {
    production: &'static str,
    comment: String,
}

impl Line {
    fn new(production: &'static str, comment: impl Into<String>) -> Self {
        Line {
            production,
            comment: comment.into(),
        }
    }
}

/// Annotates every reachable byte, failing on the same problems as
/// [`Dafsa::entries`](super::decoder::Dafsa::entries).
fn annotate(bytes: &[u8]) -> Result<(Vec<Option<Line>>, Vec<bool>), DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let mut lines: Vec<Option<Line>> = vec![None; bytes.len()];
    let mut node_start = vec![false; bytes.len()];
    let mut stack = vec![0];

    while let Some(start) = stack.pop() {
        if lines.get(start).is_some_and(Option::is_some) {
            continue;
        }
        for link in Links::new(bytes, start) {
            let link = link?;
            lines[link.position] = Some(Line::new(
                link.production(),
                format!("jump to {}", link.target),
            ));
            for at in link.position + 1..link.position + link.width {
                lines[at] = Some(Line::new("<byte>", ""));
            }
            if std::mem::replace(&mut node_start[link.target], true) {
                continue;
            }

            let mut at = link.target;
            loop {
                let byte = *bytes.get(at).ok_or(DecodeError::Truncated { position: at })?;
                let label = LabelByte::decode(byte);
                let comment = match label {
                    LabelByte::Char(ch) | LabelByte::EndChar(ch) if !is_printable(ch) => {
                        return Err(DecodeError::UnexpectedByte { position: at, byte });
                    }
                    LabelByte::Char(ch) | LabelByte::EndChar(ch) => {
                        format!("match {:?}", (ch as char).to_string())
                    }
                    LabelByte::Value(value) => format!("return {value}"),
                };
                lines[at] = Some(Line::new(label.production(), comment));
                match label {
                    LabelByte::Char(_) => at += 1,
                    LabelByte::EndChar(_) => {
                        stack.push(at + 1);
                        break;
                    }
                    LabelByte::Value(_) => break,
                }
            }
        }
    }
    Ok((lines, node_start))
}

/// Renders `bytes` one byte per line.
///
/// Bytes that no path from the root reaches are listed as `<unreached>`.
pub fn dump(bytes: &[u8]) -> Result<String, DecodeError> {
    let (lines, node_start) = annotate(bytes)?;
    let width = (bytes.len() - 1).to_string().len();

    let mut out = String::new();
    for (pos, (&byte, line)) in bytes.iter().zip(&lines).enumerate() {
        if node_start[pos] {
            out.push('\n');
        }
        let (production, comment) = match line {
            Some(line) => (line.production, line.comment.as_str()),
            None => ("<unreached>", ""),
        };
        let start = out.len();
        write!(out, "{pos:>width$}: 0x{byte:02X} {production:<14} {comment}").unwrap();
        out.truncate(out.trim_end().len().max(start));
        out.push('\n');
    }
    Ok(out)
}
