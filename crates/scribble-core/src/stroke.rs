//! Freehand stroke capture and smoothing.

use crate::brush::{Brush, BrushSource};
use crate::geometry::{calc_middle_point, DOT_OFFSET};
use crate::stage::{Frame, Layers, Stage};
use crate::surface::{Composite, StrokeStyle, Surface, SurfaceError};
use kurbo::{BezPath, Circle, Point, Shape};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Flattening tolerance for the cursor ring.
const CURSOR_TOLERANCE: f64 = 0.1;

/// Pointer input in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
}

impl PointerEvent {
    /// Client-space position of the event.
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { x, y } | PointerEvent::Move { x, y } | PointerEvent::Up { x, y } => {
                Point::new(x, y)
            }
        }
    }
}

/// Whether a stroke is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Active,
}

/// Build the smoothed path for a run of samples.
///
/// Each pair of consecutive samples becomes a quadratic segment whose control
/// point is the pair's midpoint. Returns `None` for fewer than two samples.
/// Two identical leading samples (a click without movement) get a tiny
/// horizontal extension so the dot is still painted.
pub fn smoothed_path(points: &[Point]) -> Option<BezPath> {
    let (&first, &second) = match points {
        [first, second, ..] => (first, second),
        _ => return None,
    };

    let mut path = BezPath::new();
    path.move_to(first);

    if first == second {
        path.line_to((second.x + DOT_OFFSET, second.y));
    }

    for pair in points.windows(2) {
        let middle = calc_middle_point(pair[0], pair[1]);
        path.quad_to(middle, pair[1]);
    }

    Some(path)
}

/// Turns pointer input into brush strokes and paints the cursor ring.
#[derive(Debug, Clone)]
pub struct StrokeRenderer<B = Brush> {
    brush: B,
    cursor: Point,
    points: Vec<Point>,
    state: StrokeState,
    saving: bool,
}

impl Default for StrokeRenderer<Brush> {
    fn default() -> Self {
        Self::new(Brush::default())
    }
}

impl<B: BrushSource> StrokeRenderer<B> {
    /// Create an idle renderer with the cursor at the origin.
    pub fn new(brush: B) -> Self {
        Self {
            brush,
            cursor: Point::ZERO,
            points: Vec::new(),
            state: StrokeState::Idle,
            saving: false,
        }
    }

    /// The brush strokes are painted with.
    pub fn brush(&self) -> &B {
        &self.brush
    }

    /// Mutable brush access.
    pub fn brush_mut(&mut self) -> &mut B {
        &mut self.brush
    }

    /// Cursor position in surface-local coordinates.
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Samples buffered for the current stroke.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Whether a stroke is in progress.
    pub fn state(&self) -> StrokeState {
        self.state
    }

    /// Suppress the cursor ring (while pixels are being exported).
    pub fn set_saving(&mut self, saving: bool) {
        self.saving = saving;
    }

    /// Whether the cursor ring is suppressed.
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Route a pointer event to its handler.
    pub fn handle_event<S: Surface>(&mut self, stage: &mut Stage<S>, event: &PointerEvent) {
        let position = event.position();
        match event {
            PointerEvent::Down { .. } => self.pointer_down(stage, position),
            PointerEvent::Move { .. } => self.pointer_move(stage, position),
            PointerEvent::Up { .. } => self.pointer_up(stage, position),
        }
    }

    /// Track the cursor and extend the active stroke.
    pub fn pointer_move<S: Surface>(&mut self, stage: &mut Stage<S>, screen: Point) {
        self.move_cursor(stage, screen);

        if self.state == StrokeState::Active {
            self.points.push(self.cursor);
        }
    }

    /// Start a stroke at the pointer.
    ///
    /// A press during an active stroke only moves the cursor.
    pub fn pointer_down<S: Surface>(&mut self, stage: &mut Stage<S>, screen: Point) {
        self.move_cursor(stage, screen);

        if self.state == StrokeState::Active {
            log::debug!("Ignoring press during an active stroke");
            return;
        }

        self.state = StrokeState::Active;
        self.points.push(self.cursor);
    }

    /// Finish the stroke and ask the stage to bake it into its cache.
    pub fn pointer_up<S: Surface>(&mut self, stage: &mut Stage<S>, screen: Point) {
        if self.state != StrokeState::Active {
            return;
        }

        self.move_cursor(stage, screen);
        self.state = StrokeState::Idle;
        self.points.push(self.cursor);
        stage.mark_cache_dirty();
    }

    fn move_cursor<S: Surface>(&mut self, stage: &mut Stage<S>, screen: Point) {
        self.cursor = stage.to_local(screen);
        stage.mark_dirty();
    }

    fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle::new(self.brush.stroke_color(), f64::from(self.brush.size())).with_round_ends()
    }

    fn cursor_style() -> StrokeStyle {
        StrokeStyle::new(Color::from_rgba8(0, 0, 0, 255), 1.0).with_composite(Composite::Xor)
    }
}

impl<S: Surface, B: BrushSource> Layers<S> for StrokeRenderer<B> {
    fn paint_structural(&mut self, frame: &mut Frame<'_, S>) -> Result<(), SurfaceError> {
        let Some(path) = smoothed_path(&self.points) else {
            return Ok(());
        };

        frame.surface().stroke(&path, &self.stroke_style())
    }

    fn paint_overlay(&mut self, frame: &mut Frame<'_, S>) -> Result<(), SurfaceError> {
        // The stroke is in the cache now.
        if frame.is_cache_updated() {
            self.points.clear();
        }

        if self.saving {
            return Ok(());
        }

        let ring = Circle::new(self.cursor, f64::from(self.brush.half_size()));
        frame
            .surface()
            .stroke(&ring.to_path(CURSOR_TOLERANCE), &Self::cursor_style())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::stage::TickOutcome;
    use crate::surface::{LineCap, LineJoin, RecordingSurface, SurfaceCommand};
    use kurbo::PathEl;

    fn stage() -> Stage<RecordingSurface> {
        Stage::new(RecordingSurface::new(200.0, 200.0))
    }

    fn strokes(surface: &RecordingSurface) -> Vec<(BezPath, StrokeStyle)> {
        surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::Stroke { path, style } => Some((path.clone(), style.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_point_has_no_path() {
        assert!(smoothed_path(&[]).is_none());
        assert!(smoothed_path(&[Point::new(1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_stationary_dot_is_extended() {
        let p = Point::new(5.0, 5.0);
        let path = smoothed_path(&[p, p]).unwrap();
        let elements = path.elements();

        assert_eq!(elements[0], PathEl::MoveTo(p));
        assert_eq!(elements[1], PathEl::LineTo(Point::new(5.0 + DOT_OFFSET, 5.0)));
        assert!(path.perimeter(0.01) >= DOT_OFFSET);
    }

    #[test]
    fn test_segments_route_through_midpoints() {
        let points = [Point::new(10.0, 10.0), Point::new(20.0, 10.0), Point::new(20.0, 10.0)];
        let path = smoothed_path(&points).unwrap();

        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(10.0, 10.0)),
                PathEl::QuadTo(Point::new(15.0, 10.0), Point::new(20.0, 10.0)),
                PathEl::QuadTo(Point::new(20.0, 10.0), Point::new(20.0, 10.0)),
            ]
        );
    }

    #[test]
    fn test_stroke_lifecycle_buffer() {
        let mut stage = stage();
        let mut renderer = StrokeRenderer::default();

        renderer.handle_event(&mut stage, &PointerEvent::Down { x: 10.0, y: 10.0 });
        assert_eq!(renderer.state(), StrokeState::Active);
        renderer.handle_event(&mut stage, &PointerEvent::Move { x: 20.0, y: 10.0 });
        renderer.handle_event(&mut stage, &PointerEvent::Up { x: 20.0, y: 10.0 });

        assert_eq!(renderer.state(), StrokeState::Idle);
        assert_eq!(
            renderer.points(),
            &[Point::new(10.0, 10.0), Point::new(20.0, 10.0), Point::new(20.0, 10.0)]
        );
    }

    #[test]
    fn test_idle_move_only_tracks_cursor() {
        let mut stage = stage();
        let mut renderer = StrokeRenderer::default();
        stage.tick(&mut renderer).unwrap();

        renderer.pointer_move(&mut stage, Point::new(42.0, 7.0));

        assert!(renderer.points().is_empty());
        assert_eq!(renderer.cursor(), Point::new(42.0, 7.0));
        assert!(stage.is_dirty());
    }

    #[test]
    fn test_cursor_uses_local_coordinates() {
        let surface = RecordingSurface::new(100.0, 100.0).with_origin(Point::new(8.0, 16.0));
        let mut stage = Stage::new(surface);
        let mut renderer = StrokeRenderer::default();

        renderer.pointer_down(&mut stage, Point::new(18.0, 26.0));
        assert_eq!(renderer.points(), &[Point::new(10.0, 10.0)]);
    }

    #[test]
    fn test_press_only_draws_nothing() {
        let mut stage = stage();
        let mut renderer = StrokeRenderer::default();
        renderer.pointer_down(&mut stage, Point::new(10.0, 10.0));
        stage.tick(&mut renderer).unwrap();

        // Only the cursor ring is painted.
        let painted = strokes(stage.surface());
        assert_eq!(painted.len(), 1);
        assert_eq!(painted[0].1.composite, Composite::Xor);
    }

    #[test]
    fn test_click_without_move_paints_dot() {
        let mut stage = stage();
        let mut renderer = StrokeRenderer::default();
        renderer.pointer_down(&mut stage, Point::new(10.0, 10.0));
        renderer.pointer_up(&mut stage, Point::new(10.0, 10.0));
        stage.tick(&mut renderer).unwrap();

        let painted = strokes(stage.surface());
        let (path, style) = &painted[0];
        assert_eq!(path.elements()[1], PathEl::LineTo(Point::new(10.0 + DOT_OFFSET, 10.0)));
        assert_eq!(style.join, LineJoin::Round);
        assert_eq!(style.cap, LineCap::Round);
        assert!(renderer.points().is_empty());
    }

    #[test]
    fn test_points_persist_until_cache_update() {
        let mut stage = stage();
        let mut renderer = StrokeRenderer::default();
        renderer.pointer_down(&mut stage, Point::new(0.0, 0.0));
        renderer.pointer_move(&mut stage, Point::new(5.0, 0.0));
        stage.tick(&mut renderer).unwrap();
        assert_eq!(renderer.points().len(), 2);

        renderer.pointer_move(&mut stage, Point::new(9.0, 3.0));
        stage.tick(&mut renderer).unwrap();
        assert_eq!(renderer.points().len(), 3);

        renderer.pointer_up(&mut stage, Point::new(9.0, 3.0));
        assert_eq!(stage.tick(&mut renderer).unwrap(), TickOutcome::Rendered);
        assert!(stage.is_cache_updated());
        assert!(renderer.points().is_empty());

        // The stroke lives on in the cache, not in the buffer.
        stage.mark_dirty();
        stage.surface_mut().clear_commands();
        stage.tick(&mut renderer).unwrap();
        assert_eq!(stage.surface().commands()[0], SurfaceCommand::Restore);
        assert_eq!(strokes(stage.surface()).len(), 1);
        assert_eq!(stage.surface().contents().len(), 2);
    }

    #[test]
    fn test_stroke_uses_brush() {
        let mut stage = stage();
        let brush = Brush::from_parts(12, 0.25, Rgb::new(51, 102, 153));
        let mut renderer = StrokeRenderer::new(brush);
        renderer.pointer_down(&mut stage, Point::new(0.0, 0.0));
        renderer.pointer_move(&mut stage, Point::new(5.0, 5.0));
        stage.tick(&mut renderer).unwrap();

        let painted = strokes(stage.surface());
        let (_, style) = &painted[0];
        assert!((style.width - 12.0).abs() < f64::EPSILON);
        assert_eq!(style.css_color(), "rgba(51, 102, 153, 0.25)");
        assert_eq!(style.composite, Composite::SourceOver);
    }

    #[test]
    fn test_cursor_ring_radius_is_half_size() {
        let mut stage = stage();
        let mut renderer = StrokeRenderer::new(Brush::from_parts(10, 1.0, Rgb::BLACK));
        renderer.pointer_move(&mut stage, Point::new(50.0, 50.0));
        stage.tick(&mut renderer).unwrap();

        let painted = strokes(stage.surface());
        let (ring, style) = &painted[0];
        let bounds = ring.bounding_box();
        assert!((bounds.width() - 10.0).abs() < 0.05);
        assert!((bounds.center().x - 50.0).abs() < 0.05);
        assert!((style.width - 1.0).abs() < f64::EPSILON);
        assert_eq!(style.composite, Composite::Xor);
    }

    #[test]
    fn test_saving_hides_cursor() {
        let mut stage = stage();
        let mut renderer = StrokeRenderer::default();
        renderer.set_saving(true);
        stage.tick(&mut renderer).unwrap();
        assert!(strokes(stage.surface()).is_empty());
    }

    #[test]
    fn test_second_press_is_ignored() {
        let mut stage = stage();
        let mut renderer = StrokeRenderer::default();
        renderer.pointer_down(&mut stage, Point::new(1.0, 1.0));
        renderer.pointer_down(&mut stage, Point::new(2.0, 2.0));

        assert_eq!(renderer.points(), &[Point::new(1.0, 1.0)]);
        assert_eq!(renderer.cursor(), Point::new(2.0, 2.0));
        assert_eq!(renderer.state(), StrokeState::Active);
    }

    #[test]
    fn test_release_while_idle_is_ignored() {
        let mut stage = stage();
        let mut renderer = StrokeRenderer::default();
        stage.tick(&mut renderer).unwrap();

        renderer.pointer_up(&mut stage, Point::new(3.0, 3.0));
        assert!(renderer.points().is_empty());
        assert!(!stage.is_dirty());
    }

    #[test]
    fn test_pointer_event_json() {
        let events: Vec<PointerEvent> =
            serde_json::from_str(r#"[{"type":"down","x":1,"y":2},{"type":"up","x":3.5,"y":4}]"#)
                .unwrap();
        assert_eq!(events[0], PointerEvent::Down { x: 1.0, y: 2.0 });
        assert_eq!(events[1].position(), Point::new(3.5, 4.0));
    }

    #[test]
    fn test_stroke_survives_failed_capture() {
        let mut stage = stage();
        let mut renderer = StrokeRenderer::default();
        renderer.pointer_down(&mut stage, Point::new(10.0, 10.0));
        renderer.pointer_move(&mut stage, Point::new(20.0, 10.0));
        renderer.pointer_up(&mut stage, Point::new(20.0, 10.0));

        stage.surface_mut().set_fail_snapshot(true);
        assert!(stage.tick(&mut renderer).is_err());
        assert_eq!(renderer.points().len(), 3);

        stage.surface_mut().set_fail_snapshot(false);
        renderer.pointer_move(&mut stage, Point::new(30.0, 30.0));
        assert_eq!(stage.tick(&mut renderer).unwrap(), TickOutcome::Rendered);
        assert!(stage.has_cache());
        assert!(renderer.points().is_empty());

        // A later pass restores the stroke from the cache.
        stage.mark_dirty();
        stage.surface_mut().clear_commands();
        stage.tick(&mut renderer).unwrap();
        let cached_strokes = stage
            .surface()
            .contents()
            .iter()
            .filter(|(_, style)| style.composite == Composite::SourceOver)
            .count();
        assert_eq!(cached_strokes, 1);
    }
}
