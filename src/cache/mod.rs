//! GPU-backed registry of named textures, atlases and models.

mod store;
mod texture;

pub use store::ResourceCache;
pub use texture::{
    ActiveResource, GlyphMetrics, ResourceKind, StandaloneTexture, StitchedTexture, Texture,
};
