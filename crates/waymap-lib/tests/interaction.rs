mod common;

use common::{sample_paths, sample_ways};
use waymap_lib::testing::{RecordingSurface, StaticBackend};
use waymap_lib::{
    default_road_tags, feature_id, LatLon, MapCoordinator, MapEvent, MarkerRole, Notice,
    RouteOutcome, RouteRequestDispatcher, SearchStrategy, SelectionState, ViewportBounds,
};

fn viewport() -> ViewportBounds {
    ViewportBounds::new(51.06, 51.08, 4.02, 4.04).expect("valid bounds")
}

fn start() -> LatLon {
    LatLon::new(51.069, 4.030)
}

fn goal() -> LatLon {
    LatLon::new(51.070, 4.032)
}

#[test]
fn two_clicks_then_distance_targeted_request() {
    let backend = StaticBackend::new(sample_ways(), sample_paths());
    let dispatcher = RouteRequestDispatcher::new(&backend);
    let mut surface = RecordingSurface::with_bounds(viewport());
    let mut coordinator = MapCoordinator::default();

    coordinator
        .load_ways(&dispatcher, &default_road_tags())
        .expect("ways load");
    surface.emit(MapEvent::PrimaryClick(start()));
    surface.emit(MapEvent::PrimaryClick(goal()));
    assert_eq!(coordinator.pump(&mut surface), 2);

    coordinator.set_strategy(SearchStrategy::DistanceTargeted);
    let outcome = coordinator
        .request_routes(&dispatcher)
        .expect("selection complete");
    assert_eq!(outcome, RouteOutcome::Committed { paths: 3 });

    let calls = backend.path_calls();
    assert_eq!(calls.len(), 1);
    let (strategy, query) = calls[0];
    assert_eq!(strategy, SearchStrategy::DistanceTargeted);
    assert_eq!(query.start(), start());
    assert_eq!(query.goal(), goal());

    coordinator.pump(&mut surface);
    let frame = surface.last_frame().expect("frame presented");
    let ids: Vec<_> = frame.paths.features.iter().filter_map(feature_id).collect();
    assert_eq!(ids, vec!["path-0", "path-1", "path-2"]);
    assert_eq!(frame.markers.len(), 2);
    assert_eq!(frame.markers[0].role, MarkerRole::Start);
    assert_eq!(frame.markers[1].role, MarkerRole::Goal);
    assert_eq!(frame.ways.as_ref().map(|w| w.features.len()), Some(2));
}

#[test]
fn repeated_requests_replace_paths() {
    let backend = StaticBackend::with_paths(sample_paths());
    let dispatcher = RouteRequestDispatcher::new(&backend);
    let mut coordinator = MapCoordinator::default();
    coordinator.handle_event(MapEvent::PrimaryClick(start()));
    coordinator.handle_event(MapEvent::PrimaryClick(goal()));

    coordinator.request_routes(&dispatcher).expect("first request");
    backend.set_paths(sample_paths().into_iter().take(1).collect());
    coordinator.request_routes(&dispatcher).expect("second request");

    assert_eq!(backend.path_calls().len(), 2);
    assert_eq!(coordinator.paths().len(), 1);
    assert_eq!(coordinator.paths()[0].id, "path-0");
    let visible: Vec<_> = coordinator.visible_paths().iter().cloned().collect();
    assert_eq!(visible, vec!["path-0".to_string()]);
}

#[test]
fn selection_never_exceeds_two_markers() {
    let mut surface = RecordingSurface::new();
    let mut coordinator = MapCoordinator::default();

    surface.emit(MapEvent::PrimaryClick(LatLon::new(51.0, 4.0)));
    surface.emit(MapEvent::PrimaryClick(LatLon::new(51.1, 4.1)));
    surface.emit(MapEvent::PrimaryClick(LatLon::new(51.2, 4.2)));
    coordinator.pump(&mut surface);

    assert_eq!(coordinator.selection().len(), 2);
    assert_eq!(coordinator.selection().start(), Some(LatLon::new(51.0, 4.0)));
    assert_eq!(coordinator.selection().goal(), Some(LatLon::new(51.1, 4.1)));

    let mut lengths = Vec::new();
    for _ in 0..3 {
        coordinator.handle_event(MapEvent::SecondaryClick);
        lengths.push(coordinator.selection().len());
    }
    assert_eq!(lengths, vec![1, 0, 0]);
    assert_eq!(coordinator.selection().state(), SelectionState::Empty);
}

#[test]
fn incomplete_selection_surfaces_a_notice() {
    let backend = StaticBackend::with_paths(sample_paths());
    let dispatcher = RouteRequestDispatcher::new(&backend);
    let mut surface = RecordingSurface::new();
    let mut coordinator = MapCoordinator::default();

    surface.emit(MapEvent::PrimaryClick(start()));
    coordinator.pump(&mut surface);
    assert!(coordinator.request_routes(&dispatcher).is_err());
    coordinator.pump(&mut surface);

    let frame = surface.last_frame().expect("frame presented");
    assert!(matches!(frame.notice, Some(Notice::SelectionIncomplete(_))));
    assert!(backend.path_calls().is_empty());

    surface.emit(MapEvent::PrimaryClick(goal()));
    coordinator.pump(&mut surface);
    assert!(surface.last_frame().expect("frame").notice.is_none());
}

#[test]
fn hover_popup_follows_pointer_over_paths() {
    let backend = StaticBackend::with_paths(sample_paths());
    let dispatcher = RouteRequestDispatcher::new(&backend);
    let mut surface = RecordingSurface::with_bounds(viewport());
    let mut coordinator = MapCoordinator::default();
    coordinator.handle_event(MapEvent::PrimaryClick(start()));
    coordinator.handle_event(MapEvent::PrimaryClick(goal()));
    coordinator.request_routes(&dispatcher).expect("request");

    surface.emit(MapEvent::PointerMove {
        at: LatLon::new(51.0695, 4.031),
        feature_id: Some("path-1".to_string()),
    });
    coordinator.pump(&mut surface);
    let popup = surface
        .last_frame()
        .and_then(|frame| frame.popup.clone())
        .expect("popup shown");
    assert_eq!(popup.to_string(), "Path ID: path-1 | Distance: 498 m");

    surface.emit(MapEvent::PointerLeave);
    coordinator.pump(&mut surface);
    assert!(surface.last_frame().expect("frame").popup.is_none());
    assert_eq!(surface.frames().len(), 2);
}

#[test]
fn panning_away_culls_every_layer() {
    let backend = StaticBackend::new(sample_ways(), sample_paths());
    let dispatcher = RouteRequestDispatcher::new(&backend);
    let mut surface = RecordingSurface::with_bounds(viewport());
    let mut coordinator = MapCoordinator::default();
    coordinator
        .load_ways(&dispatcher, &default_road_tags())
        .expect("ways load");
    coordinator.set_nodes_visible(true);
    coordinator.handle_event(MapEvent::PrimaryClick(start()));
    coordinator.handle_event(MapEvent::PrimaryClick(goal()));
    coordinator.request_routes(&dispatcher).expect("request");

    surface.emit(MapEvent::ViewportChanged(
        ViewportBounds::new(40.0, 40.1, 10.0, 10.1).expect("valid bounds"),
    ));
    coordinator.pump(&mut surface);

    let frame = surface.last_frame().expect("frame presented");
    assert!(frame.paths.features.is_empty());
    assert!(frame.ways.as_ref().expect("ways on").features.is_empty());
    assert!(frame.nodes.as_ref().expect("nodes on").features.is_empty());
    assert_eq!(coordinator.paths().len(), 3);
}
