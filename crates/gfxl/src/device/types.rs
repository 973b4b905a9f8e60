use std::fmt;
use std::num::NonZeroU32;

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            #[inline]
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }
    };
}

object_id!(
    /// A compiled shader stage.
    ShaderId
);
object_id!(
    /// A linked (or linkable) program.
    ProgramId
);
object_id!(
    /// A buffer object (vertex, index or uniform data).
    BufferId
);
object_id!(
    /// A vertex array object.
    VertexArrayId
);
object_id!(
    /// A texture object (2D or cubemap).
    TextureId
);

/// Resolved uniform location inside one program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformSlot(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Primitive {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Per-vertex data (`ARRAY_BUFFER`).
    Vertex,
    /// Element indices (`ELEMENT_ARRAY_BUFFER`).
    Index,
    Uniform,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureTarget {
    Texture2D,
    Cubemap,
}

/// Cube face, addressed by the axis it faces.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];
}

/// Destination of a single image upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ImageTarget {
    Texture2D,
    CubeFace(CubeFace),
}

impl ImageTarget {
    pub fn texture_target(self) -> TextureTarget {
        match self {
            ImageTarget::Texture2D => TextureTarget::Texture2D,
            ImageTarget::CubeFace(_) => TextureTarget::Cubemap,
        }
    }
}

/// Pixel layout of uploaded image bytes (8 bits per channel).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Wrap {
    ClampToEdge,
    Repeat,
}

/// Sampling state applied to a whole texture (all wrap axes share `wrap`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SamplerDesc {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap: Wrap,
}

impl SamplerDesc {
    pub const LINEAR_CLAMP: SamplerDesc = SamplerDesc {
        min_filter: Filter::Linear,
        mag_filter: Filter::Linear,
        wrap: Wrap::ClampToEdge,
    };

    pub const NEAREST_CLAMP: SamplerDesc = SamplerDesc {
        min_filter: Filter::Nearest,
        mag_filter: Filter::Nearest,
        wrap: Wrap::ClampToEdge,
    };
}

/// One float vertex attribute sourced from the bound vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub stride: u32,
    pub offset: u32,
}

/// Fixed-function state toggled by `Gfx::enable` / `Gfx::disable`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Capability {
    /// Source-alpha blending.
    Blend,
    DepthTest,
    /// Back-face culling with counter-clockwise front faces.
    CullFace,
}

/// A value written to a uniform location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Uniform {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major.
    Mat4([f32; 16]),
}
