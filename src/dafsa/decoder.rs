use thiserror::Error;

use super::builder::is_printable;
use super::label::{END_OF_LABEL, LabelByte};
use super::links::{Link, Links};

/// Errors found while walking an encoded buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// There is not even a root link run.
    #[error("the buffer is empty")]
    Empty,
    /// A link or label runs past the end of the buffer.
    #[error("data starting at {position} runs past the end of the buffer")]
    Truncated {
        /// Address where the incomplete item starts.
        position: usize,
    },
    /// A link points at or before its own address.
    #[error("link at {position} points back to {target}")]
    BackwardLink {
        /// Address of the link.
        position: usize,
        /// Address it points to.
        target: usize,
    },
    /// A link points past the end of the buffer.
    #[error("link at {position} points to {target}, past the end of the buffer")]
    OutOfBounds {
        /// Address of the link.
        position: usize,
        /// Address it points to.
        target: usize,
    },
    /// A label contains a byte that is neither printable nor a terminator.
    #[error("unexpected byte {byte:#04x} at {position}")]
    UnexpectedByte {
        /// Address of the byte.
        position: usize,
        /// The byte itself.
        byte: u8,
    },
}

/// How the label of a node ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LabelEnd {
    /// The label ends with a character; its link run starts here.
    Links(usize),
    /// The label ends with a return value.
    Value(u8),
}

/// Read-only view of an encoded DAFSA.
///
/// # Examples
///
/// ```
/// use libdafsa::dafsa::decoder::Dafsa;
///
/// let bytes = [0x81, 0xE1, 0x02, 0x81, 0x82, 0x61, 0x81];
/// let dafsa = Dafsa::new(&bytes);
/// assert_eq!(dafsa.lookup("a"), Some(2));
/// assert_eq!(dafsa.lookup("aa"), Some(1));
/// assert_eq!(dafsa.lookup("aaa"), None);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Dafsa<'a> {
    bytes: &'a [u8],
}

impl<'a> Dafsa<'a> {
    /// Wraps an encoded buffer.
    pub fn new(bytes: &'a [u8]) -> Self {
        Dafsa { bytes }
    }

    /// Returns the value stored for `key`, or `None` if `key` is not in the
    /// dictionary.
    ///
    /// Only the link whose child starts with the next key character is
    /// followed, so a lookup never backtracks. Keys with bytes outside
    /// printable ASCII never match. A malformed buffer makes the lookup fail
    /// instead of panicking.
    pub fn lookup(&self, key: impl AsRef<[u8]>) -> Option<u8> {
        let key = key.as_ref();
        if !key.iter().all(|&ch| is_printable(ch)) {
            return None;
        }
        let byte = |at: usize| self.bytes.get(at).copied();

        let mut matched = 0;
        let mut links = Links::new(self.bytes, 0);
        while let Some(link) = links.next() {
            let mut at = link.ok()?.target;
            let mut consumed = false;

            if matched < key.len() && byte(at)? & END_OF_LABEL == 0 {
                // Wrong first character: try the next child.
                if byte(at)? != key[matched] {
                    continue;
                }
                consumed = true;
                at += 1;
                matched += 1;
                // Once a child is chosen every further plain character must match.
                while byte(at)? & END_OF_LABEL == 0 && matched < key.len() {
                    if byte(at)? != key[matched] {
                        return None;
                    }
                    at += 1;
                    matched += 1;
                }
            }

            if matched == key.len() {
                if let LabelByte::Value(value) = LabelByte::decode(byte(at)?) {
                    return Some(value);
                }
                if consumed {
                    return None;
                }
                continue;
            }

            if LabelByte::decode(byte(at)?) != LabelByte::EndChar(key[matched]) {
                if consumed {
                    return None;
                }
                continue;
            }
            matched += 1;
            links = Links::new(self.bytes, at + 1);
        }
        None
    }

    /// True if `key` is in the dictionary.
    pub fn contains(&self, key: impl AsRef<[u8]>) -> bool {
        self.lookup(key).is_some()
    }

    /// Reads the label starting at `at`, appending its characters to `word`.
    pub(crate) fn read_label(
        &self,
        mut at: usize,
        word: &mut String,
    ) -> Result<LabelEnd, DecodeError> {
        loop {
            let byte = *self
                .bytes
                .get(at)
                .ok_or(DecodeError::Truncated { position: at })?;
            match LabelByte::decode(byte) {
                LabelByte::Char(ch) | LabelByte::EndChar(ch) if !is_printable(ch) => {
                    return Err(DecodeError::UnexpectedByte { position: at, byte });
                }
                LabelByte::Char(ch) => word.push(ch as char),
                LabelByte::EndChar(ch) => {
                    word.push(ch as char);
                    return Ok(LabelEnd::Links(at + 1));
                }
                LabelByte::Value(value) => return Ok(LabelEnd::Value(value)),
            }
            at += 1;
        }
    }

    /// Lists every `(word, value)` pair, sorted by word.
    ///
    /// Fails on the first structural problem, including any link that does
    /// not point strictly forward.
    pub fn entries(&self) -> Result<Vec<(String, u8)>, DecodeError> {
        if self.bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let mut entries = Vec::new();
        let mut stack = vec![(0, String::new())];
        while let Some((start, prefix)) = stack.pop() {
            for link in Links::new(self.bytes, start) {
                let mut word = prefix.clone();
                match self.read_label(link?.target, &mut word)? {
                    LabelEnd::Links(next) => stack.push((next, word)),
                    LabelEnd::Value(value) => entries.push((word, value)),
                }
            }
        }
        entries.sort();
        Ok(entries)
    }

    /// Lists every link reachable from the root, ordered by address.
    pub fn links(&self) -> Result<Vec<Link>, DecodeError> {
        if self.bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let mut visited = vec![false; self.bytes.len() + 1];
        let mut links = Vec::new();
        let mut stack = vec![0];
        let mut scratch = String::new();
        while let Some(start) = stack.pop() {
            if std::mem::replace(&mut visited[start], true) {
                continue;
            }
            for link in Links::new(self.bytes, start) {
                let link = link?;
                links.push(link);
                scratch.clear();
                if let LabelEnd::Links(next) = self.read_label(link.target, &mut scratch)? {
                    stack.push(next);
                }
            }
        }
        links.sort_by_key(|link| link.position);
        Ok(links)
    }
}
