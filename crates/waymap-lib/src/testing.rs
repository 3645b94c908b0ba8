//! Test doubles for the routing service and the rendering surface.
//!
//! Both are usable from downstream crates' tests as well as from this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::client::{PathQuery, RoutingBackend, SearchStrategy};
use crate::error::{Error, Result};
use crate::model::{Path, Way};
use crate::surface::{MapEvent, MapSurface, RenderFrame};
use crate::viewport::ViewportBounds;

#[derive(Debug, Clone)]
enum Canned<T> {
    Ok(T),
    Status(u16),
}

impl<T: Clone> Canned<T> {
    fn resolve(&self, endpoint: &str) -> Result<T> {
        match self {
            Canned::Ok(value) => Ok(value.clone()),
            Canned::Status(status) => Err(Error::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: *status,
                reason: None,
            }),
        }
    }
}

/// In-memory [`RoutingBackend`] answering with canned data and logging calls.
#[derive(Debug)]
pub struct StaticBackend {
    ways: Mutex<Canned<Vec<Way>>>,
    paths: Mutex<Canned<Vec<Path>>>,
    way_calls: Mutex<Vec<Vec<String>>>,
    path_calls: Mutex<Vec<(SearchStrategy, PathQuery)>>,
}

impl StaticBackend {
    pub fn new(ways: Vec<Way>, paths: Vec<Path>) -> Self {
        Self {
            ways: Mutex::new(Canned::Ok(ways)),
            paths: Mutex::new(Canned::Ok(paths)),
            way_calls: Mutex::new(Vec::new()),
            path_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_paths(paths: Vec<Path>) -> Self {
        Self::new(Vec::new(), paths)
    }

    /// Backend whose every call fails with `status`.
    pub fn failing(status: u16) -> Self {
        let backend = Self::new(Vec::new(), Vec::new());
        backend.fail_with(status);
        backend
    }

    pub fn set_ways(&self, ways: Vec<Way>) {
        *lock(&self.ways) = Canned::Ok(ways);
    }

    pub fn set_paths(&self, paths: Vec<Path>) {
        *lock(&self.paths) = Canned::Ok(paths);
    }

    pub fn fail_with(&self, status: u16) {
        *lock(&self.ways) = Canned::Status(status);
        *lock(&self.paths) = Canned::Status(status);
    }

    /// Tag lists of every `fetch_ways` call so far.
    pub fn way_calls(&self) -> Vec<Vec<String>> {
        lock(&self.way_calls).clone()
    }

    /// Strategy and query of every `fetch_paths` call so far.
    pub fn path_calls(&self) -> Vec<(SearchStrategy, PathQuery)> {
        lock(&self.path_calls).clone()
    }
}

impl RoutingBackend for StaticBackend {
    fn fetch_ways(&self, tags: &[String]) -> Result<Vec<Way>> {
        lock(&self.way_calls).push(tags.to_vec());
        lock(&self.ways).resolve("/ways_by_tags")
    }

    fn fetch_paths(&self, strategy: SearchStrategy, query: &PathQuery) -> Result<Vec<Path>> {
        lock(&self.path_calls).push((strategy, *query));
        lock(&self.paths).resolve(strategy.endpoint())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// [`MapSurface`] replaying scripted events and keeping every presented frame.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    bounds: Option<ViewportBounds>,
    pending: VecDeque<MapEvent>,
    frames: Vec<RenderFrame>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: ViewportBounds) -> Self {
        Self {
            bounds: Some(bounds),
            ..Self::default()
        }
    }

    /// Queue an event for the next pump.
    pub fn emit(&mut self, event: MapEvent) {
        if let MapEvent::ViewportChanged(bounds) = &event {
            self.bounds = Some(*bounds);
        }
        self.pending.push_back(event);
    }

    pub fn frames(&self) -> &[RenderFrame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.frames.last()
    }
}

impl MapSurface for RecordingSurface {
    fn viewport_bounds(&self) -> Option<ViewportBounds> {
        self.bounds
    }

    fn next_event(&mut self) -> Option<MapEvent> {
        self.pending.pop_front()
    }

    fn present(&mut self, frame: &RenderFrame) {
        self.frames.push(frame.clone());
    }
}
