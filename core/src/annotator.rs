//! Marker drawing on the actual and expected surfaces.
//!
//! Each surface runs its own Idle -> Drawing -> Idle machine. Nothing
//! survives a gesture except the committed box list in the document.

use crate::models::{MarkerBox, Point, ReportData, Surface};
use serde::{Deserialize, Serialize};

/// Pointer position in client (CSS pixel) coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientPoint {
    pub client_x: f64,
    pub client_y: f64,
}

/// Rendered box of the image container, as reported by the webview.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementBounds {
    /// Pointer position as a percentage of the bounds, clamped to `[0, 100]`.
    pub fn to_percent(&self, pos: ClientPoint) -> Point {
        Point {
            x: percent(pos.client_x - self.left, self.width),
            y: percent(pos.client_y - self.top, self.height),
        }
    }
}

fn percent(offset: f64, size: f64) -> f64 {
    if size <= 0.0 || !size.is_finite() || !offset.is_finite() {
        return 0.0;
    }
    (offset * 100.0 / size).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing { start: Point, current: Point },
}

/// Drawing state for a single surface.
#[derive(Debug, Clone)]
pub struct Annotator {
    surface: Surface,
    state: DrawState,
}

impl Annotator {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            state: DrawState::Idle,
        }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    /// In-progress box, shown but not yet committed.
    pub fn draft(&self) -> Option<MarkerBox> {
        match self.state {
            DrawState::Drawing { start, current } => Some(MarkerBox::from_corners(start, current)),
            DrawState::Idle => None,
        }
    }

    /// Starts a gesture. Ignored when the surface has no image.
    pub fn pointer_down(&mut self, data: &ReportData, pos: ClientPoint, bounds: ElementBounds) -> bool {
        if !data.has_image(self.surface) {
            return false;
        }

        let start = bounds.to_percent(pos);
        self.state = DrawState::Drawing {
            start,
            current: start,
        };
        true
    }

    /// Updates the draft while drawing; `None` when idle.
    pub fn pointer_move(&mut self, pos: ClientPoint, bounds: ElementBounds) -> Option<MarkerBox> {
        if let DrawState::Drawing { start, .. } = self.state {
            let current = bounds.to_percent(pos);
            self.state = DrawState::Drawing { start, current };
        }
        self.draft()
    }

    /// Ends the gesture (pointer up, cancel or leave).
    ///
    /// Returns the next document when a box was committed. Boxes smaller than
    /// the minimum size are dropped without error.
    pub fn pointer_up(
        &mut self,
        data: &ReportData,
        pos: Option<ClientPoint>,
        bounds: ElementBounds,
    ) -> Option<ReportData> {
        if let Some(pos) = pos {
            self.pointer_move(pos, bounds);
        }

        let draft = self.draft();
        self.state = DrawState::Idle;

        let draft = draft?;
        if !draft.is_committable() || !data.has_image(self.surface) {
            log::debug!("{:?}: discarded {:?}", self.surface, draft);
            return None;
        }

        let mut next = data.clone();
        next.marker_boxes_mut(self.surface).push(draft);
        log::debug!(
            "{:?}: committed box #{}",
            self.surface,
            next.marker_boxes(self.surface).len()
        );
        Some(next)
    }

    /// Same as releasing the pointer without a final position.
    pub fn cancel(&mut self, data: &ReportData) -> Option<ReportData> {
        self.pointer_up(data, None, ElementBounds::default())
    }
}

/// The pair of independent surfaces.
#[derive(Debug, Clone)]
pub struct Annotators {
    actual: Annotator,
    expected: Annotator,
}

impl Default for Annotators {
    fn default() -> Self {
        Self {
            actual: Annotator::new(Surface::Actual),
            expected: Annotator::new(Surface::Expected),
        }
    }
}

impl Annotators {
    pub fn get(&self, surface: Surface) -> &Annotator {
        match surface {
            Surface::Actual => &self.actual,
            Surface::Expected => &self.expected,
        }
    }

    pub fn get_mut(&mut self, surface: Surface) -> &mut Annotator {
        match surface {
            Surface::Actual => &mut self.actual,
            Surface::Expected => &mut self.expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageAttachment;
    use chrono::NaiveDate;

    fn with_screenshot() -> ReportData {
        let mut data = ReportData::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        data.screenshot = Some(ImageAttachment {
            data_uri: "data:image/png;base64,AA==".to_string(),
            file_name: "a.png".to_string(),
        });
        data
    }

    fn at(x: f64, y: f64) -> ClientPoint {
        ClientPoint {
            client_x: x,
            client_y: y,
        }
    }

    // 200x400 element placed at (100, 50) on the page.
    fn bounds() -> ElementBounds {
        ElementBounds {
            left: 100.0,
            top: 50.0,
            width: 200.0,
            height: 400.0,
        }
    }

    #[test]
    fn percent_is_relative_and_clamped() {
        let b = bounds();
        assert_eq!(b.to_percent(at(200.0, 250.0)), Point::new(50.0, 50.0));
        assert_eq!(b.to_percent(at(0.0, 0.0)), Point::new(0.0, 0.0));
        assert_eq!(b.to_percent(at(900.0, 900.0)), Point::new(100.0, 100.0));
    }

    #[test]
    fn zero_sized_bounds_do_not_divide_by_zero() {
        let b = ElementBounds::default();
        assert_eq!(b.to_percent(at(10.0, 10.0)), Point::new(0.0, 0.0));
    }

    #[test]
    fn drag_commits_box() {
        let data = with_screenshot();
        let mut annotator = Annotator::new(Surface::Actual);

        assert!(annotator.pointer_down(&data, at(120.0, 90.0), bounds()));
        assert!(annotator.is_drawing());

        let draft = annotator.pointer_move(at(200.0, 210.0), bounds()).unwrap();
        assert_eq!(
            draft,
            MarkerBox {
                x: 10.0,
                y: 10.0,
                width: 40.0,
                height: 30.0
            }
        );

        let next = annotator.pointer_up(&data, None, bounds()).unwrap();
        assert!(!annotator.is_drawing());
        assert_eq!(next.actual_marker_boxes, vec![draft]);
        assert!(next.expected_marker_boxes.is_empty());
    }

    #[test]
    fn reverse_drag_normalises_corner() {
        let data = with_screenshot();
        let mut annotator = Annotator::new(Surface::Actual);
        annotator.pointer_down(&data, at(200.0, 210.0), bounds());
        let next = annotator.pointer_up(&data, Some(at(120.0, 90.0)), bounds()).unwrap();

        let b = next.actual_marker_boxes[0];
        assert_eq!((b.x, b.y, b.width, b.height), (10.0, 10.0, 40.0, 30.0));
    }

    #[test]
    fn drag_past_edge_stays_in_range() {
        let data = with_screenshot();
        let mut annotator = Annotator::new(Surface::Actual);
        annotator.pointer_down(&data, at(250.0, 400.0), bounds());
        let next = annotator.pointer_up(&data, Some(at(5000.0, -300.0)), bounds()).unwrap();

        let b = next.actual_marker_boxes[0];
        assert!(b.x >= 0.0 && b.y >= 0.0);
        assert!(b.x + b.width <= 100.0);
        assert!(b.y + b.height <= 100.0);
        assert_eq!(b.y, 0.0);
        assert_eq!(b.x + b.width, 100.0);
    }

    #[test]
    fn click_without_drag_is_discarded() {
        let data = with_screenshot();
        let mut annotator = Annotator::new(Surface::Actual);
        annotator.pointer_down(&data, at(150.0, 150.0), bounds());
        assert!(annotator.pointer_up(&data, Some(at(150.5, 150.5)), bounds()).is_none());
        assert!(!annotator.is_drawing());
    }

    #[test]
    fn thin_box_is_discarded() {
        let data = with_screenshot();
        let mut annotator = Annotator::new(Surface::Actual);
        annotator.pointer_down(&data, at(100.0, 50.0), bounds());
        // 50% wide, 0.25% tall
        assert!(annotator.pointer_up(&data, Some(at(200.0, 51.0)), bounds()).is_none());
    }

    #[test]
    fn no_image_means_no_drawing() {
        let data = with_screenshot();
        let mut annotator = Annotator::new(Surface::Expected);
        assert!(!annotator.pointer_down(&data, at(120.0, 90.0), bounds()));
        assert!(annotator.pointer_move(at(200.0, 200.0), bounds()).is_none());
        assert!(annotator.pointer_up(&data, None, bounds()).is_none());
    }

    #[test]
    fn cancel_commits_a_large_enough_draft() {
        let data = with_screenshot();
        let mut annotator = Annotator::new(Surface::Actual);
        annotator.pointer_down(&data, at(100.0, 50.0), bounds());
        annotator.pointer_move(at(200.0, 250.0), bounds());

        let next = annotator.cancel(&data).unwrap();
        assert_eq!(next.actual_marker_boxes.len(), 1);
        assert!(!annotator.is_drawing());
    }

    #[test]
    fn boxes_accumulate_in_insertion_order() {
        let mut data = with_screenshot();
        let mut annotators = Annotators::default();

        for (from, to) in [((100.0, 50.0), (140.0, 90.0)), ((200.0, 200.0), (260.0, 300.0))] {
            let a = annotators.get_mut(Surface::Actual);
            a.pointer_down(&data, at(from.0, from.1), bounds());
            data = a.pointer_up(&data, Some(at(to.0, to.1)), bounds()).unwrap();
        }

        assert_eq!(data.actual_marker_boxes.len(), 2);
        assert_eq!(data.actual_marker_boxes[0].x, 0.0);
        assert_eq!(data.actual_marker_boxes[1].x, 50.0);
        assert!(!annotators.get(Surface::Expected).is_drawing());
    }
}
