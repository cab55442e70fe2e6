//! Configuration of the text pipeline and the window showing it.
use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::{
    geometry::{PositionPx, Rgba8, SizePx},
    glyph::{AtlasAllocator, GridAllocator, PackedAllocator},
    instance_batch::DEFAULT_BATCH_CAPACITY,
};

/// Device pixels per typographic point.
pub const PIXELS_PER_POINT: f32 = 1.333333;

pub fn pixels_for_points(points: f32) -> f32 {
    points * PIXELS_PER_POINT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub font_path: String,
    pub font_size_pt: f32,
    /// Top left corner of the first line.
    pub origin: [f32; 2],
    pub text: String,
    pub text_color: Rgba8,
    pub background: [f32; 3],
    /// Positive values make text heavier, negative lighter.
    pub coverage_adjustment: f32,
    pub batch_capacity: usize,
    pub window: WindowConfig,
    pub atlas: AtlasConfig,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_path: "Ubuntu-R.ttf".into(),
            font_size_pt: 10.0,
            origin: [10.0, 10.0],
            text: "The quick brown fox jumps over the lazy dog.".into(),
            text_color: Rgba8::new(218, 218, 218, 255),
            background: [0.25, 0.25, 0.25],
            coverage_adjustment: 0.0,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            window: WindowConfig::default(),
            atlas: AtlasConfig::default(),
        }
    }
}

impl TextConfig {
    /// Parses and validates a configuration.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml = fs::read_to_string(path)
            .with_context(|| format!("Reading configuration {}", path.display()))?;
        Self::from_toml_str(&toml).with_context(|| format!("Loading {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_capacity == 0 {
            bail!("Batch capacity must not be zero");
        }
        self.atlas.validate()
    }

    pub fn font_size_px(&self) -> f32 {
        pixels_for_points(self.font_size_pt)
    }

    pub fn origin(&self) -> PositionPx {
        PositionPx::new(self.origin[0], self.origin[1])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Subpixel Text".into(),
            width: 400,
            height: 100,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocatorKind {
    /// One fixed cell per codepoint.
    #[default]
    Grid,
    /// Glyphs of any codepoint, tightly packed.
    Packed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Width and height of the square atlas texture.
    pub size: u32,
    /// Width and height of a grid cell.
    pub cell_size: u32,
    pub allocator: AllocatorKind,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            size: 512,
            cell_size: 32,
            allocator: AllocatorKind::Grid,
        }
    }
}

impl AtlasConfig {
    /// Largest atlas extent accepted. Graphics backends commonly support 2D textures up to this size.
    pub const MAX_SIZE: u32 = 16384;

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            bail!("Atlas size must not be zero");
        }
        if self.size > Self::MAX_SIZE {
            bail!("Atlas size {} exceeds {}", self.size, Self::MAX_SIZE);
        }
        if self.cell_size == 0 {
            bail!("Atlas cell size must not be zero");
        }
        if self.cell_size > self.size {
            bail!(
                "Atlas cell size {} exceeds the atlas size {}",
                self.cell_size,
                self.size
            );
        }
        Ok(())
    }

    pub fn size(&self) -> SizePx {
        SizePx::new(self.size, self.size)
    }

    pub fn create_allocator(&self) -> Result<Box<dyn AtlasAllocator>> {
        self.validate()?;
        Ok(match self.allocator {
            AllocatorKind::Grid => Box::new(GridAllocator::new(
                self.size(),
                SizePx::new(self.cell_size, self.cell_size),
            )),
            AllocatorKind::Packed => Box::new(PackedAllocator::new(self.size())),
        })
    }
}
