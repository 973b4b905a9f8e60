use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::device::VertexAttribute;
use crate::math::{Vector2, Vector3};

/// Interleaved mesh vertex.
///
/// Attribute locations: 0 = position, 1 = normal, 2 = texcoord.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vector3,
    pub normal: Vector3,
    pub texcoord: Vector2,
}

impl Vertex {
    pub const fn new(position: Vector3, normal: Vector3, texcoord: Vector2) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }

    /// Vertex with only a position; normal and texcoord are zero.
    pub const fn at(position: Vector3) -> Self {
        Self {
            position,
            normal: Vector3::ZERO,
            texcoord: Vector2::ZERO,
        }
    }

    pub const STRIDE: u32 = size_of::<Vertex>() as u32;

    pub const ATTRIBUTES: [VertexAttribute; 3] = [
        VertexAttribute {
            location: 0,
            components: 3,
            stride: Self::STRIDE,
            offset: offset_of!(Vertex, position) as u32,
        },
        VertexAttribute {
            location: 1,
            components: 3,
            stride: Self::STRIDE,
            offset: offset_of!(Vertex, normal) as u32,
        },
        VertexAttribute {
            location: 2,
            components: 2,
            stride: Self::STRIDE,
            offset: offset_of!(Vertex, texcoord) as u32,
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 32);
        let offsets: Vec<u32> = Vertex::ATTRIBUTES.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
    }
}
