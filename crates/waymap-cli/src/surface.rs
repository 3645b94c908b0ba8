//! Headless map surface for one-shot commands.

use std::collections::VecDeque;

use waymap_lib::{MapEvent, MapSurface, RenderFrame, ViewportBounds};

/// Replays queued events and keeps the most recent frame.
#[derive(Debug, Default)]
pub struct BatchSurface {
    bounds: Option<ViewportBounds>,
    queue: VecDeque<MapEvent>,
    frame: Option<RenderFrame>,
}

impl BatchSurface {
    pub fn new(bounds: Option<ViewportBounds>) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    pub fn push(&mut self, event: MapEvent) {
        self.queue.push_back(event);
    }

    pub fn into_frame(self) -> Option<RenderFrame> {
        self.frame
    }
}

impl MapSurface for BatchSurface {
    fn viewport_bounds(&self) -> Option<ViewportBounds> {
        self.bounds
    }

    fn next_event(&mut self) -> Option<MapEvent> {
        self.queue.pop_front()
    }

    fn present(&mut self, frame: &RenderFrame) {
        self.frame = Some(frame.clone());
    }
}
