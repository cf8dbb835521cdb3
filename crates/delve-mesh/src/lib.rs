//! CPU-side chunk geometry: transient mesh data from workers, the reusable
//! buffers the chunk grid owns, and the bundle type that carries one job's output.
#![forbid(unsafe_code)]

mod buffer;
mod bundle;
mod face;

pub use buffer::{MeshBuffer, MeshData};
pub use bundle::{BufferClass, GlowLight, MeshBundle};
pub use face::Face;
