use crate::{
    error::BatchFull,
    geometry::{RectPx, Rgba8, saturate},
    glyph::LEFT_PADDING,
    layout::PositionedGlyph,
};

/// The number of instances the GPU backend's instance buffer holds per draw.
pub const DEFAULT_BATCH_CAPACITY: usize = 255;

/// One visible glyph placement, as drawn by the renderer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderInstance {
    /// Where the glyph's padded bitmap is drawn, in framebuffer pixels.
    pub pos: RectPx,
    /// The padded bitmap in the atlas.
    pub tex: RectPx,
    /// Pre-multiplied.
    pub color: Rgba8,
    pub subpixel_shift: f32,
}

impl RenderInstance {
    /// `color` is straight alpha and gets pre-multiplied here.
    pub fn from_glyph(glyph: &PositionedGlyph, color: Rgba8) -> Self {
        let tex = RectPx::from(glyph.texture_rect);
        let left = glyph.position.x - LEFT_PADDING;
        let top = glyph.top();
        let pos = RectPx::new(
            saturate(left),
            saturate(top),
            saturate(left + tex.width()),
            saturate(top + tex.height()),
        );

        Self {
            pos,
            tex,
            color: color.premultiplied(),
            subpixel_shift: glyph.subpixel_shift,
        }
    }
}

/// Something instances can be appended to.
pub trait InstanceSink {
    fn append(&mut self, instance: RenderInstance) -> Result<(), BatchFull>;
}

/// A bounded, append-only sequence of instances.
#[derive(Debug, Clone)]
pub struct InstanceBatch {
    capacity: usize,
    instances: Vec<RenderInstance>,
}

impl Default for InstanceBatch {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_CAPACITY)
    }
}

impl InstanceBatch {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn instances(&self) -> &[RenderInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.instances.len() >= self.capacity
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

impl InstanceSink for InstanceBatch {
    fn append(&mut self, instance: RenderInstance) -> Result<(), BatchFull> {
        if self.is_full() {
            return Err(BatchFull {
                capacity: self.capacity,
            });
        }
        self.instances.push(instance);
        Ok(())
    }
}

/// All instances of a frame, split into batches of a fixed capacity.
///
/// A full batch is sealed and a new one started, so appending only fails if the capacity is zero.
#[derive(Debug, Clone)]
pub struct FrameBatches {
    sealed: Vec<InstanceBatch>,
    current: InstanceBatch,
}

impl Default for FrameBatches {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_CAPACITY)
    }
}

impl FrameBatches {
    pub fn new(batch_capacity: usize) -> Self {
        Self {
            sealed: Vec::new(),
            current: InstanceBatch::new(batch_capacity),
        }
    }

    /// The non-empty batches in draw order.
    pub fn batches(&self) -> impl Iterator<Item = &InstanceBatch> {
        self.sealed
            .iter()
            .chain((!self.current.is_empty()).then_some(&self.current))
    }

    pub fn instance_count(&self) -> usize {
        self.sealed.iter().map(|b| b.len()).sum::<usize>() + self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instance_count() == 0
    }

    /// Discards all batches, ready for the next frame.
    pub fn clear(&mut self) {
        self.sealed.clear();
        self.current.clear();
    }
}

impl InstanceSink for FrameBatches {
    fn append(&mut self, instance: RenderInstance) -> Result<(), BatchFull> {
        match self.current.append(instance) {
            Ok(()) => Ok(()),
            Err(full) if full.capacity == 0 => Err(full),
            Err(_) => {
                let capacity = self.current.capacity();
                let sealed = std::mem::replace(&mut self.current, InstanceBatch::new(capacity));
                log::debug!("Sealed batch #{} with {} instances", self.sealed.len(), sealed.len());
                self.sealed.push(sealed);
                self.current.append(instance)
            }
        }
    }
}
