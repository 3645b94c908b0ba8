//! Start/goal marker selection.
//!
//! Primary clicks append until both slots are filled, after which they are
//! ignored. A secondary action removes the most recent marker. The selection
//! therefore only ever holds zero, one or two markers, and a full selection is
//! always an ordered (start, goal) pair.

use serde::Serialize;
use tracing::debug;

use crate::model::Marker;

pub const MAX_MARKERS: usize = 2;

/// Selection state by marker count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Empty,
    One,
    Two,
}

/// Role of a marker in the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerRole {
    Start,
    Goal,
}

impl MarkerRole {
    pub fn label(self) -> &'static str {
        match self {
            MarkerRole::Start => "Start",
            MarkerRole::Goal => "Goal",
        }
    }
}

/// Ordered selection of up to two markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    markers: Vec<Marker>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        match self.markers.len() {
            0 => SelectionState::Empty,
            1 => SelectionState::One,
            _ => SelectionState::Two,
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.markers.len() >= MAX_MARKERS
    }

    pub fn start(&self) -> Option<Marker> {
        self.markers.first().copied()
    }

    pub fn goal(&self) -> Option<Marker> {
        self.markers.get(1).copied()
    }

    /// `(start, goal)` once both markers are placed.
    pub fn endpoints(&self) -> Option<(Marker, Marker)> {
        Some((self.start()?, self.goal()?))
    }

    /// Markers paired with their roles, in selection order.
    pub fn with_roles(&self) -> impl Iterator<Item = (MarkerRole, Marker)> + '_ {
        self.markers.iter().enumerate().map(|(index, marker)| {
            let role = if index == 0 {
                MarkerRole::Start
            } else {
                MarkerRole::Goal
            };
            (role, *marker)
        })
    }

    /// Handle a primary click. Returns whether the marker was placed.
    pub fn primary(&mut self, at: Marker) -> bool {
        if self.is_full() {
            debug!(at = %at, "selection full, ignoring click");
            return false;
        }
        self.markers.push(at);
        debug!(at = %at, markers = self.markers.len(), "marker placed");
        true
    }

    /// Handle a secondary (cancel) action. Returns the removed marker.
    pub fn secondary(&mut self) -> Option<Marker> {
        let removed = self.markers.pop();
        if let Some(marker) = removed {
            debug!(at = %marker, markers = self.markers.len(), "marker removed");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> Marker {
        Marker::new(lat, lon)
    }

    #[test]
    fn third_click_is_ignored() {
        let mut selection = Selection::new();
        assert!(selection.primary(p(1.0, 1.0)));
        assert_eq!(selection.state(), SelectionState::One);
        assert!(selection.primary(p(2.0, 2.0)));
        assert!(!selection.primary(p(3.0, 3.0)));

        assert_eq!(selection.state(), SelectionState::Two);
        assert_eq!(selection.endpoints(), Some((p(1.0, 1.0), p(2.0, 2.0))));
    }

    #[test]
    fn secondary_pops_back_to_empty() {
        let mut selection = Selection::new();
        selection.primary(p(1.0, 1.0));
        selection.primary(p(2.0, 2.0));
        selection.primary(p(3.0, 3.0));

        assert_eq!(selection.secondary(), Some(p(2.0, 2.0)));
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.secondary(), Some(p(1.0, 1.0)));
        assert_eq!(selection.len(), 0);
        assert_eq!(selection.secondary(), None);
        assert_eq!(selection.state(), SelectionState::Empty);
    }

    #[test]
    fn corrected_goal_replaces_only_the_last_pick() {
        let mut selection = Selection::new();
        selection.primary(p(1.0, 1.0));
        selection.primary(p(2.0, 2.0));
        selection.secondary();
        selection.primary(p(5.0, 5.0));
        assert_eq!(selection.start(), Some(p(1.0, 1.0)));
        assert_eq!(selection.goal(), Some(p(5.0, 5.0)));
    }

    #[test]
    fn roles_follow_position() {
        let mut selection = Selection::new();
        selection.primary(p(1.0, 1.0));
        selection.primary(p(2.0, 2.0));
        let roles: Vec<_> = selection.with_roles().map(|(role, _)| role.label()).collect();
        assert_eq!(roles, vec!["Start", "Goal"]);
    }
}
