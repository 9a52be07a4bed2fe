//! Texture types and descriptors.

use super::{ClearValue, Extent3d};
use bitflags::bitflags;

/// Texture format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum TextureFormat {
    // 8-bit formats
    /// 8-bit red channel, unsigned normalized.
    R8Unorm,
    /// 8-bit red channel, unsigned integer.
    R8Uint,

    // 16-bit formats
    /// 16-bit red channel, float.
    R16Float,
    /// 8-bit RG channels, unsigned normalized.
    Rg8Unorm,

    // 32-bit formats
    /// 32-bit red channel, float.
    R32Float,
    /// 32-bit red channel, unsigned integer.
    R32Uint,
    /// 16-bit RG channels, float.
    Rg16Float,
    /// 8-bit RGBA channels, unsigned normalized.
    #[default]
    Rgba8Unorm,
    /// 8-bit RGBA channels, sRGB.
    Rgba8UnormSrgb,
    /// 8-bit BGRA channels, unsigned normalized.
    Bgra8Unorm,
    /// 8-bit BGRA channels, sRGB.
    Bgra8UnormSrgb,
    /// Packed 10-bit RGB with 2-bit alpha.
    Rgb10a2Unorm,
    /// Packed 11/11/10-bit float RGB.
    Rg11b10Float,

    // 64-bit formats
    /// 16-bit RGBA channels, float.
    Rgba16Float,
    /// 32-bit RG channels, float.
    Rg32Float,

    // 128-bit formats
    /// 32-bit RGBA channels, float.
    Rgba32Float,

    // Depth/stencil formats
    /// 16-bit depth.
    Depth16Unorm,
    /// 24-bit depth with 8-bit stencil.
    Depth24PlusStencil8,
    /// 32-bit depth, float.
    Depth32Float,
    /// 32-bit depth float with 8-bit stencil.
    Depth32FloatStencil8,
}

impl TextureFormat {
    /// Returns true if this is a depth or stencil format.
    pub fn is_depth_stencil(&self) -> bool {
        matches!(
            self,
            Self::Depth16Unorm
                | Self::Depth24PlusStencil8
                | Self::Depth32Float
                | Self::Depth32FloatStencil8
        )
    }

    /// Returns true if this format has a stencil component.
    pub fn has_stencil(&self) -> bool {
        matches!(self, Self::Depth24PlusStencil8 | Self::Depth32FloatStencil8)
    }

    /// Returns the size in bytes per pixel.
    pub fn block_size(&self) -> u32 {
        match self {
            Self::R8Unorm | Self::R8Uint => 1,
            Self::R16Float | Self::Rg8Unorm | Self::Depth16Unorm => 2,
            Self::R32Float
            | Self::R32Uint
            | Self::Rg16Float
            | Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Bgra8Unorm
            | Self::Bgra8UnormSrgb
            | Self::Rgb10a2Unorm
            | Self::Rg11b10Float
            | Self::Depth24PlusStencil8
            | Self::Depth32Float => 4,
            Self::Rgba16Float | Self::Rg32Float | Self::Depth32FloatStencil8 => 8,
            Self::Rgba32Float => 16,
        }
    }
}

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be copied from.
        const COPY_SRC = 1 << 0;
        /// Texture can be copied to.
        const COPY_DST = 1 << 1;
        /// Texture can be sampled in a shader.
        const TEXTURE_BINDING = 1 << 2;
        /// Texture can be used as a storage (unordered access) texture.
        const STORAGE_BINDING = 1 << 3;
        /// Texture can be used as a color or depth attachment.
        const RENDER_ATTACHMENT = 1 << 4;
        /// Texture can be presented to a surface.
        const PRESENT = 1 << 5;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Size of a texture, either fixed or relative to the current screen size.
///
/// Screen-relative textures are resolved at allocation time, which is why a
/// screen-size change forces the frame graph to rebuild its plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextureSize {
    /// Fixed extent in texels.
    Absolute(Extent3d),
    /// `scale` times the screen size, rounded down and clamped to at least 1.
    ScreenRelative {
        /// Horizontal scale factor.
        scale_x: f32,
        /// Vertical scale factor.
        scale_y: f32,
    },
}

impl TextureSize {
    /// A texture covering the whole screen.
    pub fn full_screen() -> Self {
        Self::ScreenRelative {
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Resolve this size against the given screen extent.
    pub fn resolve(&self, screen: Extent3d) -> Extent3d {
        match *self {
            Self::Absolute(extent) => extent,
            Self::ScreenRelative { scale_x, scale_y } => Extent3d::new_2d(
                ((screen.width as f32 * scale_x) as u32).max(1),
                ((screen.height as f32 * scale_y) as u32).max(1),
            ),
        }
    }

    /// Check if this size depends on the screen size.
    pub fn is_screen_relative(&self) -> bool {
        matches!(self, Self::ScreenRelative { .. })
    }

    /// Check that the size can produce a non-empty texture.
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::Absolute(extent) => extent.width > 0 && extent.height > 0 && extent.depth > 0,
            Self::ScreenRelative { scale_x, scale_y } => scale_x > 0.0 && scale_y > 0.0,
        }
    }
}

impl Default for TextureSize {
    fn default() -> Self {
        Self::Absolute(Extent3d::default())
    }
}

/// Descriptor for a frame graph texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Size of the texture.
    pub size: TextureSize,
    /// Mip level count.
    pub mip_level_count: u32,
    /// Sample count for multisampling.
    pub sample_count: u32,
    /// Texture format.
    pub format: TextureFormat,
    /// Usage flags.
    pub usage: TextureUsage,
    /// Value the texture is cleared to on first use, if any.
    pub clear_value: ClearValue,
}

impl TextureDescriptor {
    /// Create a new 2D texture descriptor with a fixed size.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label: None,
            size: TextureSize::Absolute(Extent3d::new_2d(width, height)),
            mip_level_count: 1,
            sample_count: 1,
            format,
            usage,
            clear_value: ClearValue::None,
        }
    }

    /// Create a new 3D texture descriptor with a fixed size.
    pub fn new_3d(
        width: u32,
        height: u32,
        depth: u32,
        format: TextureFormat,
        usage: TextureUsage,
    ) -> Self {
        Self {
            size: TextureSize::Absolute(Extent3d::new_3d(width, height, depth)),
            ..Self::new_2d(width, height, format, usage)
        }
    }

    /// Create a texture descriptor that follows the screen size.
    pub fn screen_relative(scale: f32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            size: TextureSize::ScreenRelative {
                scale_x: scale,
                scale_y: scale,
            },
            ..Self::new_2d(1, 1, format, usage)
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the mip level count.
    pub fn with_mip_levels(mut self, count: u32) -> Self {
        self.mip_level_count = count;
        self
    }

    /// Set the sample count for multisampling.
    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count;
        self
    }

    /// Set the clear value.
    pub fn with_clear_value(mut self, clear_value: ClearValue) -> Self {
        self.clear_value = clear_value;
        self
    }

    /// Return a copy of this descriptor with its size resolved against `screen`.
    pub fn resolved(&self, screen: Extent3d) -> Self {
        Self {
            size: TextureSize::Absolute(self.size.resolve(screen)),
            ..self.clone()
        }
    }

    /// The extent of this texture for the given screen size.
    pub fn extent(&self, screen: Extent3d) -> Extent3d {
        self.size.resolve(screen)
    }
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            size: TextureSize::default(),
            mip_level_count: 1,
            sample_count: 1,
            format: TextureFormat::default(),
            usage: TextureUsage::empty(),
            clear_value: ClearValue::None,
        }
    }
}
