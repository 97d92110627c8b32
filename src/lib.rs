pub mod atlas;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod gpu;
pub mod model;
pub mod output;
pub mod packing;
pub mod paths;
pub mod scan;
pub mod sprite;

pub use atlas::{Atlas, AtlasBuilder, AtlasInfo, AtlasKind, UvRect};
pub use cache::{ResourceCache, ResourceKind, Texture};
pub use cli::{CliArgs, Command, PackingHeuristic};
pub use error::StitchError;
pub use gpu::{GpuBackend, HeadlessGpu, TextureHandle};
pub use paths::ResourcePaths;
pub use scan::{ContentScanner, ScanReport, initialize_content};
pub use sprite::{PackedSprite, SourceSprite};
