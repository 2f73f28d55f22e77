/// The currently visible vertical slice of the feed, in content pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportWindow {
    pub top: f32,
    pub height: f32,
}

impl ViewportWindow {
    pub const fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    pub fn center(&self) -> f32 {
        self.top + self.height / 2.0
    }
}
