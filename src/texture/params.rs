//! Texture parameters.

use serde::{Deserialize, Serialize};

/// Texture addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureWrap {
    /// Clamp to edge pixel.
    #[default]
    ClampToEdge,
    /// Repeat the texture.
    Repeat,
    /// Mirror and repeat.
    MirroredRepeat,
}

impl From<TextureWrap> for wgpu::AddressMode {
    fn from(mode: TextureWrap) -> Self {
        match mode {
            TextureWrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            TextureWrap::Repeat => wgpu::AddressMode::Repeat,
            TextureWrap::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

/// Texture filtering mode. Magnification only distinguishes nearest from linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureFilter {
    /// Nearest texel.
    Nearest,
    /// Nearest texel of the nearest mip level.
    NearestMipmapNearest,
    /// Nearest texel, blended between mip levels.
    NearestMipmapLinear,
    /// Bilinear.
    Linear,
    /// Bilinear on the nearest mip level.
    LinearMipmapNearest,
    /// Trilinear.
    #[default]
    LinearMipmapLinear,
}

impl TextureFilter {
    /// Whether the filter samples mip levels.
    pub fn is_mipmap(self) -> bool {
        !matches!(self, Self::Nearest | Self::Linear)
    }

    /// Closest filter that does not need mip levels.
    pub fn without_mipmap(self) -> Self {
        match self {
            Self::Nearest | Self::NearestMipmapNearest | Self::NearestMipmapLinear => Self::Nearest,
            _ => Self::Linear,
        }
    }

    /// Texel filter as a wgpu enum.
    pub fn wgpu_filter(self) -> wgpu::FilterMode {
        match self.without_mipmap() {
            Self::Nearest => wgpu::FilterMode::Nearest,
            _ => wgpu::FilterMode::Linear,
        }
    }

    /// Mip level filter as a wgpu enum.
    pub fn wgpu_mipmap_filter(self) -> wgpu::FilterMode {
        match self {
            Self::NearestMipmapLinear | Self::LinearMipmapLinear => wgpu::FilterMode::Linear,
            _ => wgpu::FilterMode::Nearest,
        }
    }
}

/// Channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Single alpha channel.
    Alpha,
    /// Three colour channels (stored padded to four).
    Rgb,
    /// Four channels.
    #[default]
    Rgba,
}

/// Channel storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    /// 8-bit normalized.
    #[default]
    UnsignedByte,
    /// 16-bit float.
    HalfFloat,
    /// 32-bit float.
    Float,
}

/// The wgpu format storing `format` channels of `data_type`.
pub fn wgpu_format(format: PixelFormat, data_type: DataType) -> wgpu::TextureFormat {
    match (format, data_type) {
        (PixelFormat::Alpha, DataType::UnsignedByte) => wgpu::TextureFormat::R8Unorm,
        (PixelFormat::Alpha, DataType::HalfFloat) => wgpu::TextureFormat::R16Float,
        (PixelFormat::Alpha, DataType::Float) => wgpu::TextureFormat::R32Float,
        (_, DataType::UnsignedByte) => wgpu::TextureFormat::Rgba8Unorm,
        (_, DataType::HalfFloat) => wgpu::TextureFormat::Rgba16Float,
        (_, DataType::Float) => wgpu::TextureFormat::Rgba32Float,
    }
}

/// What a backend needs to create a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// 1 for 2D textures, 6 for cube maps.
    pub layers: u32,
    /// Channel layout.
    pub format: PixelFormat,
    /// Channel storage.
    pub data_type: DataType,
    /// Minification filter.
    pub min_filter: TextureFilter,
    /// Magnification filter.
    pub mag_filter: TextureFilter,
    /// Horizontal wrapping.
    pub wrap_s: TextureWrap,
    /// Vertical wrapping.
    pub wrap_t: TextureWrap,
    /// Allocate a full mip chain.
    pub mipmaps: bool,
}

impl TextureDescriptor {
    /// Number of mip levels to allocate.
    pub fn mip_level_count(&self) -> u32 {
        if self.mipmaps {
            32 - self.width.max(self.height).max(1).leading_zeros()
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_fallback() {
        assert_eq!(TextureFilter::NearestMipmapLinear.without_mipmap(), TextureFilter::Nearest);
        assert_eq!(TextureFilter::LinearMipmapNearest.without_mipmap(), TextureFilter::Linear);
        assert!(!TextureFilter::Linear.is_mipmap());
        assert!(TextureFilter::LinearMipmapLinear.is_mipmap());
    }

    #[test]
    fn test_mip_levels() {
        let mut desc = TextureDescriptor {
            width: 512,
            height: 256,
            layers: 1,
            format: PixelFormat::Rgba,
            data_type: DataType::UnsignedByte,
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::Repeat,
            wrap_t: TextureWrap::Repeat,
            mipmaps: true,
        };
        assert_eq!(desc.mip_level_count(), 10);
        desc.mipmaps = false;
        assert_eq!(desc.mip_level_count(), 1);
    }
}
