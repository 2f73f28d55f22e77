//! Viewport tracking: latest scroll offset and the derived visible window.

use reelfeed_model::ViewportWindow;

use crate::scheduler::DebounceScheduler;

#[derive(Debug, Clone)]
pub struct ViewportTracker {
    offset: f32,
    height: f32,
    scroll_events: u64,
}

impl ViewportTracker {
    pub fn new(height: f32) -> Self {
        Self {
            offset: 0.0,
            height: sanitize_height(height, 1.0),
            scroll_events: 0,
        }
    }

    /// Record the latest offset and arm the debounce.
    ///
    /// Overscroll (negative or non-finite offsets) clamps to the top.
    pub fn on_scroll(&mut self, offset: f32, scheduler: &mut DebounceScheduler) {
        self.offset = if offset.is_finite() { offset.max(0.0) } else { 0.0 };
        self.scroll_events += 1;
        scheduler.schedule();
    }

    /// Update the visible height (rotation, window resize) and arm the
    /// debounce. Non-positive heights are ignored.
    pub fn resize(&mut self, height: f32, scheduler: &mut DebounceScheduler) {
        self.height = sanitize_height(height, self.height);
        scheduler.schedule();
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn scroll_events(&self) -> u64 {
        self.scroll_events
    }

    pub fn window(&self) -> ViewportWindow {
        ViewportWindow::new(self.offset, self.height)
    }
}

fn sanitize_height(height: f32, fallback: f32) -> f32 {
    if height.is_finite() && height > 0.0 {
        height
    } else {
        fallback
    }
}
