mod loader;
mod sprite;

pub use loader::{decode_image, list_images, load_images};
pub use sprite::{PackedSprite, SourceSprite};
