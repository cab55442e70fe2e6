//! A lazy, error tolerant UTF-8 decoder.
//!
//! Decoding never fails: malformed input is replaced by U+FFFD and the decoder resynchronizes at
//! the next byte that can start a sequence. Every call that is not at the end consumes at least
//! one byte, so decoding terminates on arbitrary input.

/// A Unicode scalar value.
///
/// `0` is reserved for "end of input".
pub type Codepoint = u32;

pub const END_OF_INPUT: Codepoint = 0;
pub const REPLACEMENT_CHARACTER: Codepoint = 0xFFFD;

/// Smallest codepoint that needs a sequence of the given length (indexed by the number of leading
/// one bits of the lead byte). Anything below is an overlong encoding.
const MIN_CODEPOINT_FOR_LENGTH: [Codepoint; 5] = [0, 0, 0x80, 0x800, 0x10000];

/// A position in a byte buffer plus the end bound decoding stops at.
///
/// Cursors are plain values: saving one and decoding from it again yields the same sequence.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecodeCursor {
    position: usize,
    end: usize,
}

impl DecodeCursor {
    /// A cursor bounded by the buffer's length.
    pub fn new(bytes: &[u8]) -> Self {
        Self::bounded(bytes.len())
    }

    /// A cursor that stops at `end`, or at the buffer's length if that is smaller.
    pub fn bounded(end: usize) -> Self {
        Self { position: 0, end }
    }

    /// A cursor that relies on a zero terminator to stop.
    ///
    /// The buffer's length still bounds it, so a missing terminator is harmless.
    pub fn zero_terminated() -> Self {
        Self::bounded(usize::MAX)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn end_in(&self, bytes: &[u8]) -> usize {
        self.end.min(bytes.len())
    }
}

/// Decode the codepoint at the cursor.
///
/// Returns [`END_OF_INPUT`] and the unchanged cursor when the cursor is at its end or at a zero
/// byte.
pub fn decode_next(bytes: &[u8], cursor: DecodeCursor) -> (Codepoint, DecodeCursor) {
    let end = cursor.end_in(bytes);
    let mut position = cursor.position;

    let Some(&lead) = bytes[..end].get(position) else {
        return (END_OF_INPUT, cursor);
    };
    if lead == 0 {
        return (END_OF_INPUT, cursor);
    }
    position += 1;

    let leading_ones = lead.leading_ones() as usize;
    let codepoint = match leading_ones {
        0 => lead as Codepoint,
        1 => {
            // Unexpected continuation byte: skip all of them and report one replacement.
            while position < end && is_continuation(bytes[position]) {
                position += 1;
            }
            REPLACEMENT_CHARACTER
        }
        2..=4 => {
            let mut codepoint = (lead & (0x7F >> leading_ones)) as Codepoint;
            let mut complete = true;
            for _ in 1..leading_ones {
                match bytes[..end].get(position) {
                    Some(&byte) if is_continuation(byte) => {
                        codepoint = (codepoint << 6) | (byte & 0x3F) as Codepoint;
                        position += 1;
                    }
                    // Leave the breaking byte (or the terminator) for the next call.
                    _ => {
                        complete = false;
                        break;
                    }
                }
            }

            if complete {
                validate(codepoint, leading_ones)
            } else {
                REPLACEMENT_CHARACTER
            }
        }
        // 0xF8..=0xFF can not start a sequence.
        _ => REPLACEMENT_CHARACTER,
    };

    let next = DecodeCursor {
        position,
        end: cursor.end,
    };

    (codepoint, next)
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

fn validate(codepoint: Codepoint, sequence_length: usize) -> Codepoint {
    if codepoint < MIN_CODEPOINT_FOR_LENGTH[sequence_length] || char::from_u32(codepoint).is_none()
    {
        return REPLACEMENT_CHARACTER;
    }
    codepoint
}

/// Iterator over the codepoints of a byte buffer. Ends at the first [`END_OF_INPUT`].
#[derive(Debug, Clone)]
pub struct Codepoints<'a> {
    bytes: &'a [u8],
    cursor: DecodeCursor,
}

impl<'a> Codepoints<'a> {
    pub fn new(bytes: &'a [u8], cursor: DecodeCursor) -> Self {
        Self { bytes, cursor }
    }

    /// The cursor the next codepoint is decoded from.
    pub fn cursor(&self) -> DecodeCursor {
        self.cursor
    }
}

impl Iterator for Codepoints<'_> {
    type Item = Codepoint;

    fn next(&mut self) -> Option<Self::Item> {
        let (codepoint, cursor) = decode_next(self.bytes, self.cursor);
        self.cursor = cursor;
        (codepoint != END_OF_INPUT).then_some(codepoint)
    }
}

/// Decode all of `bytes` up to the end or a zero terminator.
pub fn codepoints(bytes: &[u8]) -> Codepoints<'_> {
    Codepoints::new(bytes, DecodeCursor::new(bytes))
}
