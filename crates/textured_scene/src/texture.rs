use std::path::Path;

use tracing::debug;
use tracing::warn;

use crate::demo_error::AssetError;

const BYTES_PER_PIXEL: usize = 4;

/// One RGBA8 sRGB image of a mip chain, tightly packed.
#[derive(Clone, Debug, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl MipLevel {
    pub fn row_pitch(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn slice_pitch(&self) -> usize {
        self.row_pitch() * self.height as usize
    }

    fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let offset = y * self.row_pitch() + x * BYTES_PER_PIXEL;
        let mut texel = [0; 4];
        texel.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        texel
    }
}

/// A decoded texture with every mip level down to 1×1.
#[derive(Clone, Debug, PartialEq)]
pub struct MipChain {
    pub levels: Vec<MipLevel>,
}

impl MipChain {
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        let mut levels = vec![MipLevel {
            width,
            height,
            pixels,
        }];
        while let Some(last) = levels.last() {
            if last.width == 1 && last.height == 1 {
                break;
            }
            let next = downsample(last);
            levels.push(next);
        }
        Self { levels }
    }

    /// Stand-in texture used when the real one cannot be read.
    pub fn checkerboard(size: u32, cell: u32) -> Self {
        let light = [0xff, 0xff, 0xff, 0xff];
        let dark = [0x40, 0x40, 0x40, 0xff];
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity((size * size) as usize * BYTES_PER_PIXEL);
        for y in 0..size {
            for x in 0..size {
                let texel = if (x / cell + y / cell) % 2 == 0 { light } else { dark };
                pixels.extend_from_slice(&texel);
            }
        }
        Self::from_rgba8(size, size, pixels)
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    pub fn mip_levels(&self) -> u16 {
        self.levels.len() as u16
    }
}

pub fn load_texture(path: &Path) -> Result<MipChain, AssetError> {
    let image = image::open(path).map_err(|source| match source {
        image::ImageError::IoError(source) => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => AssetError::Image {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let chain = MipChain::from_rgba8(width, height, rgba.into_raw());
    debug!(
        path = %path.display(),
        width,
        height,
        mip_levels = chain.mip_levels(),
        "loaded texture"
    );
    Ok(chain)
}

/// Loads the material texture, falling back to a checkerboard when the file
/// is missing or unreadable.
pub fn load_texture_or_fallback(path: &Path) -> MipChain {
    match load_texture(path) {
        Ok(chain) => chain,
        Err(error) => {
            warn!("{error}; using checkerboard texture");
            MipChain::checkerboard(256, 32)
        }
    }
}

fn downsample(source: &MipLevel) -> MipLevel {
    let width = (source.width / 2).max(1);
    let height = (source.height / 2).max(1);
    let mut pixels = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);

    for y in 0..height {
        for x in 0..width {
            let footprint = [
                source.texel(2 * x, 2 * y),
                source.texel(2 * x + 1, 2 * y),
                source.texel(2 * x, 2 * y + 1),
                source.texel(2 * x + 1, 2 * y + 1),
            ];
            for channel in 0..3 {
                let linear: f32 = footprint
                    .iter()
                    .map(|texel| srgb_to_linear(texel[channel]))
                    .sum::<f32>()
                    / 4.0;
                pixels.push(linear_to_srgb(linear));
            }
            let alpha: u32 = footprint.iter().map(|texel| texel[3] as u32).sum();
            pixels.push(((alpha + 2) / 4) as u8);
        }
    }

    MipLevel {
        width,
        height,
        pixels,
    }
}

fn srgb_to_linear(value: u8) -> f32 {
    let c = value as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(value: f32) -> u8 {
    let c = if value <= 0.0031308 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    };
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}
