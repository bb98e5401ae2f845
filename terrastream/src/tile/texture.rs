use crate::resource::MemoryCost;

/// A decoded image as handed to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Channels per pixel.
    pub components: u32,
}

impl Texture {
    pub fn new(width: u32, height: u32, components: u32) -> Self {
        Self {
            width,
            height,
            components,
        }
    }

    /// Pixel data lives on the GPU once uploaded.
    pub fn memory_cost(&self) -> MemoryCost {
        MemoryCost::gpu(self.width as u64 * self.height as u64 * self.components as u64)
    }
}
