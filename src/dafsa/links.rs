//! Link runs: the variable-length offsets from a node to its children.
//!
//! ```text
//! s0xxxxxx                     offset1,  6-bit distance
//! s10xxxxx xxxxxxxx            offset2, 13-bit distance
//! s11xxxxx xxxxxxxx xxxxxxxx   offset3, 21-bit distance
//! ```
//!
//! `s` is set on the last link of a run. The first distance in a run is
//! counted from the run's first byte to the first child; every following
//! distance is counted from the previous child.

use smallvec::SmallVec;
use tracing::trace;

use super::decoder::DecodeError;
use super::encoder::{EncodeError, Owner};
use super::node::NodeId;

/// Exclusive upper bound of a link distance.
pub const MAX_DISTANCE: usize = 1 << 21;

/// Marks the last link of a run.
pub const END_OF_LINKS: u8 = 0x80;

const WIDTH_MASK: u8 = 0x60;
const OFFSET2: u8 = 0x40;
const OFFSET3: u8 = 0x60;

/// Appends `distance` in the narrowest of the three link widths.
fn push_distance(buf: &mut Vec<u8>, distance: usize) {
    if distance < 1 << 6 {
        buf.push(distance as u8);
    } else if distance < 1 << 13 {
        buf.push(OFFSET2 | (distance >> 8) as u8);
        buf.push(distance as u8);
    } else {
        buf.push(OFFSET3 | (distance >> 16) as u8);
        buf.push((distance >> 8) as u8);
        buf.push(distance as u8);
    }
}

/// Encodes the link run of a node whose bytes end at `current`.
///
/// `offsets[id]` must hold the offset of every child. The returned bytes
/// are in emission order, i.e. reversed like the rest of the buffer until
/// the final flip.
///
/// The distances depend on the size of the run itself, so the run is sized
/// by iteration: start from three bytes per child and re-encode with the
/// realized size until the two agree.
pub(crate) fn encode_links(
    owner: Owner,
    children: &[NodeId],
    offsets: &[Option<usize>],
    current: usize,
    max_rounds: usize,
) -> Result<Vec<u8>, EncodeError> {
    let mut placed: SmallVec<[usize; 8]> = children
        .iter()
        .map(|c| offsets[c.index()].expect("children are placed before their parents"))
        .collect();
    placed.sort_unstable_by(|a, b| b.cmp(a));

    let mut guess = 3 * placed.len();
    for round in 1..=max_rounds {
        let mut buf = Vec::with_capacity(guess);
        let mut offset = current + guess;
        let mut last = 0;
        for &child in &placed {
            last = buf.len();
            let distance = offset.saturating_sub(child);
            if distance == 0 || distance >= MAX_DISTANCE {
                return Err(EncodeError::DistanceOutOfRange { owner, distance });
            }
            push_distance(&mut buf, distance);
            offset -= distance;
        }

        if buf.len() == guess {
            buf[last] |= END_OF_LINKS;
            buf.reverse();
            return Ok(buf);
        }
        trace!(%owner, round, guess, realized = buf.len(), "resizing link run");
        guess = buf.len();
    }
    Err(EncodeError::SizingDidNotConverge {
        owner,
        rounds: max_rounds,
    })
}

/// A decoded link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    /// Address of the link's first byte.
    pub position: usize,
    /// Address of the child the link points to.
    pub target: usize,
    /// Number of bytes the link occupies.
    pub width: usize,
    /// True for the last link of a run.
    pub last: bool,
}

impl Link {
    /// Name of the grammar production of the link's first byte.
    pub fn production(&self) -> &'static str {
        match (self.last, self.width) {
            (false, 1) => "<offset1>",
            (false, 2) => "<offset2>",
            (false, _) => "<offset3>",
            (true, 1) => "<end_offset1>",
            (true, 2) => "<end_offset2>",
            (true, _) => "<end_offset3>",
        }
    }
}

/// Iterator over the link run starting at a given address.
///
/// Stops after the link carrying the end marker, or after the first error.
#[derive(Clone)]
pub struct Links<'a> {
    bytes: &'a [u8],
    position: Option<usize>,
    target: usize,
}

impl<'a> Links<'a> {
    /// Reads the run starting at `start`.
    pub fn new(bytes: &'a [u8], start: usize) -> Self {
        Links {
            bytes,
            position: Some(start),
            target: start,
        }
    }

    fn read(&self, position: usize) -> Result<(usize, usize, bool), DecodeError> {
        let byte = |at: usize| {
            self.bytes
                .get(at)
                .map(|&b| b as usize)
                .ok_or(DecodeError::Truncated { position })
        };
        let lead = self.bytes[position];
        let payload = (lead & 0x1F) as usize;
        let (distance, width) = match lead & WIDTH_MASK {
            OFFSET3 => (
                (payload << 16) | (byte(position + 1)? << 8) | byte(position + 2)?,
                3,
            ),
            OFFSET2 => ((payload << 8) | byte(position + 1)?, 2),
            _ => ((lead & 0x3F) as usize, 1),
        };
        Ok((distance, width, lead & END_OF_LINKS != 0))
    }
}

impl Iterator for Links<'_> {
    type Item = Result<Link, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.position.take()?;
        if position >= self.bytes.len() {
            return Some(Err(DecodeError::Truncated { position }));
        }
        let (distance, width, last) = match self.read(position) {
            Ok(link) => link,
            Err(err) => return Some(Err(err)),
        };
        let target = self.target + distance;
        if target <= position {
            return Some(Err(DecodeError::BackwardLink { position, target }));
        }
        if target >= self.bytes.len() {
            return Some(Err(DecodeError::OutOfBounds { position, target }));
        }
        self.target = target;
        if !last {
            self.position = Some(position + width);
        }
        Some(Ok(Link {
            position,
            target,
            width,
            last,
        }))
    }
}
