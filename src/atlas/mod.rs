pub mod animation;
mod builder;
mod info;
mod types;

pub use animation::{AnimationSet, AnimationSpec, FrameSource};
pub use builder::{AtlasBuilder, DEFAULT_MAX_SIZE};
pub use info::{AtlasInfo, InfoEntry, UvRect};
pub use types::{Atlas, AtlasEntry, AtlasKind};

/// Joins directory segments and entry names into namespaced keys
pub const NAMESPACE_SEPARATOR: char = ':';

/// `qualify("ui:button", "hover")` is `ui:button:hover`
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name)
    }
}
