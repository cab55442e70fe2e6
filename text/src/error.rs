use derive_more::{Display, Error, From};

use crate::decoder::Codepoint;

/// The atlas has no room for a glyph.
///
/// Either the codepoint is outside the range the allocator can address, or no free region of the
/// requested size is left. Entries are never evicted, so this is final for the glyph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, Error)]
#[display("Glyph atlas is full: no room for U+{codepoint:04X} ({width}x{height})")]
pub struct AtlasFull {
    pub codepoint: Codepoint,
    pub width: u32,
    pub height: u32,
}

/// An instance batch reached its capacity.
///
/// Recoverable by submitting the batch to the renderer and clearing it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, Error)]
#[display("Instance batch is full ({capacity} instances)")]
pub struct BatchFull {
    pub capacity: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, Error, From)]
pub enum TextError {
    #[display("{_0}")]
    AtlasFull(AtlasFull),
    #[display("{_0}")]
    BatchFull(BatchFull),
}
