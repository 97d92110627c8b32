//! The seam between the resource cache and whatever owns the GPU context.

use std::collections::HashMap;

use image::RgbaImage;
use log::trace;
use serde::Serialize;

use crate::error::{Result, StitchError};

/// Opaque texture name handed out by the GPU collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TextureHandle(pub u32);

/// Texture operations the cache needs from the render backend.
///
/// Implementations run on the thread that owns the GPU context.
pub trait GpuBackend {
    /// Upload RGBA8 pixels and return a new handle
    fn upload(&mut self, image: &RgbaImage) -> Result<TextureHandle>;

    /// Release a handle returned by `upload`
    fn delete(&mut self, handle: TextureHandle);

    /// Make `handle` the texture used by subsequent draws
    fn bind(&mut self, handle: TextureHandle);
}

/// In-memory backend for tools and tests: tracks handles, draws nothing.
#[derive(Debug, Default)]
pub struct HeadlessGpu {
    next_handle: u32,
    live: HashMap<TextureHandle, (u32, u32)>,
    bound: Option<TextureHandle>,
    uploads: usize,
    deletes: usize,
    binds: usize,
    fail_uploads: bool,
}

impl HeadlessGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following upload fail, to exercise error paths
    pub fn fail_uploads(&mut self, fail: bool) {
        self.fail_uploads = fail;
    }

    pub fn uploads(&self) -> usize {
        self.uploads
    }

    pub fn deletes(&self) -> usize {
        self.deletes
    }

    pub fn binds(&self) -> usize {
        self.binds
    }

    pub fn bound(&self) -> Option<TextureHandle> {
        self.bound
    }

    /// Number of handles uploaded and not yet deleted
    pub fn live_textures(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: TextureHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn dimensions(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.live.get(&handle).copied()
    }
}

impl GpuBackend for HeadlessGpu {
    fn upload(&mut self, image: &RgbaImage) -> Result<TextureHandle> {
        if self.fail_uploads {
            return Err(StitchError::Upload("headless upload disabled".to_string()));
        }

        // Handle 0 means "no texture" in GL, so start at 1
        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        self.live.insert(handle, image.dimensions());
        self.uploads += 1;
        trace!("upload {:?} ({}x{})", handle, image.width(), image.height());
        Ok(handle)
    }

    fn delete(&mut self, handle: TextureHandle) {
        if self.live.remove(&handle).is_some() {
            self.deletes += 1;
        }
        if self.bound == Some(handle) {
            self.bound = None;
        }
    }

    fn bind(&mut self, handle: TextureHandle) {
        self.bound = Some(handle);
        self.binds += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique_and_nonzero() {
        let mut gpu = HeadlessGpu::new();
        let a = gpu.upload(&RgbaImage::new(2, 2)).unwrap();
        let b = gpu.upload(&RgbaImage::new(4, 1)).unwrap();

        assert_ne!(a, b);
        assert_ne!(a, TextureHandle(0));
        assert_eq!(gpu.dimensions(b), Some((4, 1)));
        assert_eq!(gpu.live_textures(), 2);
    }

    #[test]
    fn test_delete_releases_and_unbinds() {
        let mut gpu = HeadlessGpu::new();
        let a = gpu.upload(&RgbaImage::new(1, 1)).unwrap();
        gpu.bind(a);
        gpu.delete(a);
        gpu.delete(a);

        assert_eq!(gpu.deletes(), 1);
        assert!(!gpu.is_live(a));
        assert_eq!(gpu.bound(), None);
    }

    #[test]
    fn test_failing_uploads() {
        let mut gpu = HeadlessGpu::new();
        gpu.fail_uploads(true);
        assert!(gpu.upload(&RgbaImage::new(1, 1)).is_err());
        assert_eq!(gpu.uploads(), 0);
        assert_eq!(gpu.live_textures(), 0);
    }
}
