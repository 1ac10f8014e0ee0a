/// Scale information for pyramid levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLevel {
    pub level: usize,
    pub scale: f32,
    pub width: usize,
    pub height: usize,
}

impl ScaleLevel {
    /// Map a level coordinate to the base image (pixel centres aligned).
    #[inline]
    pub fn to_base(&self, x: f32, y: f32) -> (f32, f32) {
        ((x + 0.5) * self.scale - 0.5, (y + 0.5) * self.scale - 0.5)
    }

    /// Map a base image coordinate onto this level.
    #[inline]
    pub fn from_base(&self, x: f32, y: f32) -> (f32, f32) {
        ((x + 0.5) / self.scale - 0.5, (y + 0.5) / self.scale - 0.5)
    }
}

/// FAST corner on a pyramid level with its Harris response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCorner {
    pub x: usize,
    pub y: usize,
    pub response: f32,
}
