//! CPU-side model data.
//!
//! `Vertex` is the interleaved layout every mesh uploads; `obj` turns the
//! supported OBJ subset into an expanded (non-indexed) vertex list.

pub mod obj;
mod vertex;

pub use obj::{parse_obj, parse_obj_str, ObjModel};
pub use vertex::Vertex;
