//! Scroll state of the grid viewport.
//!
//! One [`ScrollState`] per axis: offset, viewport extent and content extent
//! in pixels, plus a pending request the grid resolves on its next frame.

// =============================================================================
// ScrollRequest
// =============================================================================

/// Actions that can be requested on scroll state.
///
/// These are consumed by the grid on the next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollRequest {
    /// Scroll by relative amount (positive = down/right).
    Delta(f64),
    /// Scroll to absolute offset.
    ToOffset(f64),
    /// Scroll to make the row at index visible.
    IntoView(usize),
    /// Scroll back by one viewport.
    PageUp,
    /// Scroll forward by one viewport.
    PageDown,
    /// Scroll to the start.
    Home,
    /// Scroll to the end.
    End,
}

// =============================================================================
// ScrollState
// =============================================================================

/// Scroll state along one axis.
///
/// # Example
///
/// ```
/// use shipdeck_grid::scroll::ScrollState;
///
/// let mut scroll = ScrollState::with_content(4_000.0);
/// scroll.set_viewport(600.0);
/// scroll.apply_delta(250.0);
/// assert_eq!(scroll.offset, 250.0);
/// assert_eq!(scroll.max_offset(), 3_400.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollState {
    /// Current scroll offset in pixels.
    pub offset: f64,

    /// Viewport extent (set by the host after layout).
    pub viewport: f64,

    /// Total content extent.
    pub content: f64,

    /// Pending scroll request.
    request: Option<ScrollRequest>,
}

impl ScrollState {
    /// Create a new scroll state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scroll state with known content extent.
    pub fn with_content(content: f64) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }

    /// Maximum scroll offset (content - viewport).
    pub fn max_offset(&self) -> f64 {
        (self.content - self.viewport).max(0.0)
    }

    /// Current scroll progress (0.0 = start, 1.0 = end).
    pub fn progress(&self) -> f64 {
        let max = self.max_offset();
        if max == 0.0 { 0.0 } else { self.offset / max }
    }

    /// Whether content exceeds viewport.
    pub fn can_scroll(&self) -> bool {
        self.content > self.viewport
    }

    /// Whether the offset sits at the start.
    pub fn at_start(&self) -> bool {
        self.offset <= 0.0
    }

    /// Whether the offset sits at the end.
    pub fn at_end(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Request scroll by relative amount.
    pub fn scroll_by(&mut self, delta: f64) {
        self.request = Some(ScrollRequest::Delta(delta));
    }

    /// Request scroll to absolute offset.
    pub fn scroll_to(&mut self, offset: f64) {
        self.request = Some(ScrollRequest::ToOffset(offset));
    }

    /// Request scroll to make the row at index visible.
    pub fn scroll_into_view(&mut self, index: usize) {
        self.request = Some(ScrollRequest::IntoView(index));
    }

    /// Request page up.
    pub fn page_up(&mut self) {
        self.request = Some(ScrollRequest::PageUp);
    }

    /// Request page down.
    pub fn page_down(&mut self) {
        self.request = Some(ScrollRequest::PageDown);
    }

    /// Request scroll to start.
    pub fn home(&mut self) {
        self.request = Some(ScrollRequest::Home);
    }

    /// Request scroll to end.
    pub fn end(&mut self) {
        self.request = Some(ScrollRequest::End);
    }

    /// Take and clear pending request.
    pub fn take_request(&mut self) -> Option<ScrollRequest> {
        self.request.take()
    }

    /// Check if there's a pending request.
    pub fn has_request(&self) -> bool {
        self.request.is_some()
    }

    /// Set viewport extent, clamping the offset.
    pub fn set_viewport(&mut self, viewport: f64) {
        self.viewport = viewport.max(0.0);
        self.offset = self.offset.clamp(0.0, self.max_offset());
    }

    /// Set content extent, clamping the offset.
    pub fn set_content(&mut self, content: f64) {
        self.content = content.max(0.0);
        self.offset = self.offset.clamp(0.0, self.max_offset());
    }

    /// Move the offset by `delta`, clamped to `[0, max]`.
    ///
    /// Returns the distance actually moved.
    pub fn apply_delta(&mut self, delta: f64) -> f64 {
        let before = self.offset;
        self.offset = (self.offset + delta).clamp(0.0, self.max_offset());
        self.offset - before
    }

    /// Apply a scroll request directly to the offset.
    ///
    /// Returns the request back if it needs row positions (`IntoView`).
    pub fn apply_request(&mut self, request: ScrollRequest) -> Option<ScrollRequest> {
        let max = self.max_offset();
        match request {
            ScrollRequest::Delta(d) => {
                self.apply_delta(d);
                None
            }
            ScrollRequest::ToOffset(o) => {
                self.offset = o.clamp(0.0, max);
                None
            }
            ScrollRequest::PageUp => {
                self.offset = (self.offset - self.viewport).max(0.0);
                None
            }
            ScrollRequest::PageDown => {
                self.offset = (self.offset + self.viewport).min(max);
                None
            }
            ScrollRequest::Home => {
                self.offset = 0.0;
                None
            }
            ScrollRequest::End => {
                self.offset = max;
                None
            }
            ScrollRequest::IntoView(_) => Some(request),
        }
    }

    /// Scroll the minimum distance that makes `[top, bottom)` visible.
    pub fn reveal(&mut self, top: f64, bottom: f64) {
        if top < self.offset {
            self.offset = top;
        } else if bottom > self.offset + self.viewport {
            self.offset = bottom - self.viewport;
        }
        self.offset = self.offset.clamp(0.0, self.max_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ScrollState {
        let mut s = ScrollState::with_content(1_000.0);
        s.set_viewport(200.0);
        s
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut s = state();
        assert_eq!(s.apply_delta(-50.0), 0.0);
        assert_eq!(s.apply_delta(5_000.0), 800.0);
        assert!(s.at_end());
    }

    #[test]
    fn test_page_requests() {
        let mut s = state();
        s.page_down();
        let request = s.take_request().unwrap();
        assert_eq!(s.apply_request(request), None);
        assert_eq!(s.offset, 200.0);

        s.end();
        let request = s.take_request().unwrap();
        s.apply_request(request);
        assert_eq!(s.offset, 800.0);
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn test_into_view_is_handed_back() {
        let mut s = state();
        s.scroll_into_view(12);
        let request = s.take_request().unwrap();
        assert_eq!(s.apply_request(request), Some(ScrollRequest::IntoView(12)));
        assert!(!s.has_request());
    }

    #[test]
    fn test_content_shrink_clamps_offset() {
        let mut s = state();
        s.apply_delta(700.0);
        s.set_content(500.0);
        assert_eq!(s.offset, 300.0);
    }

    #[test]
    fn test_reveal() {
        let mut s = state();
        s.reveal(400.0, 440.0);
        assert_eq!(s.offset, 240.0);
        s.reveal(100.0, 140.0);
        assert_eq!(s.offset, 100.0);
    }
}
