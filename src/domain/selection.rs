//! Pointer-driven region selection
//!
//! `Idle -> Dragging -> Idle`. A finished drag is mapped to native image
//! pixels; drags smaller than the minimum on either axis are dropped.

use super::geometry::{
    ContainerBounds, DisplaySize, ImageDimensions, Native, Rect, Screen, ScreenPoint,
};
use super::mapping::to_image_space;
use crate::error::Error;

/// Minimum drag size on each axis, in screen pixels
pub const MIN_SELECTION_PX: f32 = 5.0;

/// Pointer input relative to the image container
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(ScreenPoint),
    Move(ScreenPoint),
    Up(ScreenPoint),
    /// Pointer left the container; finishes the drag like `Up`
    Leave(ScreenPoint),
}

impl PointerEvent {
    /// Re-express a viewport position relative to the image container
    pub fn relative_to(self, container: ContainerBounds) -> Self {
        let rel = |p: ScreenPoint| ScreenPoint::from_client(p.x, p.y, container);
        match self {
            PointerEvent::Down(p) => PointerEvent::Down(rel(p)),
            PointerEvent::Move(p) => PointerEvent::Move(rel(p)),
            PointerEvent::Up(p) => PointerEvent::Up(rel(p)),
            PointerEvent::Leave(p) => PointerEvent::Leave(rel(p)),
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { start: ScreenPoint },
}

/// What a pointer event did to the selection
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// Nothing changed
    None,
    /// A drag began; any prior selection is gone
    Started,
    /// Live preview rectangle updated
    Preview(Rect<Screen>),
    /// The drag ended without producing a selection
    Discarded(Error),
    /// A region was selected
    Finalized {
        overlay: Rect<Screen>,
        region: Rect<Native>,
    },
}

/// Layout of the image the user is drawing on
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageLayout {
    pub displayed: DisplaySize,
    pub native: ImageDimensions,
}

#[derive(Debug, Clone)]
pub struct SelectionTool {
    state: DragState,
    /// Dashed rectangle shown while dragging
    preview: Option<Rect<Screen>>,
    /// Solid rectangle shown after a successful drag
    finished: Option<Rect<Screen>>,
    min_size: f32,
}

impl Default for SelectionTool {
    fn default() -> Self {
        Self::new(MIN_SELECTION_PX)
    }
}

impl SelectionTool {
    pub fn new(min_size: f32) -> Self {
        Self {
            state: DragState::Idle,
            preview: None,
            finished: None,
            min_size,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[cfg(test)]
    pub fn preview(&self) -> Option<Rect<Screen>> {
        self.preview
    }

    pub fn finished(&self) -> Option<Rect<Screen>> {
        self.finished
    }

    /// Drop any drag in progress and any finished overlay
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.preview = None;
        self.finished = None;
    }

    pub fn handle(&mut self, event: PointerEvent, layout: ImageLayout) -> SelectionEvent {
        match event {
            PointerEvent::Down(pos) => {
                // Always restart, whatever state a previous gesture left behind
                self.reset();
                if !layout.displayed.is_laid_out() {
                    log::debug!("ignoring pointer down: image not laid out");
                    return SelectionEvent::None;
                }
                self.state = DragState::Dragging { start: pos };
                self.preview = Some(Rect::from_points(pos, pos));
                SelectionEvent::Started
            }
            PointerEvent::Move(pos) => {
                let DragState::Dragging { start } = self.state else {
                    return SelectionEvent::None;
                };
                let rect = Rect::from_points(start, pos);
                self.preview = Some(rect);
                SelectionEvent::Preview(rect)
            }
            PointerEvent::Up(pos) | PointerEvent::Leave(pos) => {
                let DragState::Dragging { start } = self.state else {
                    return SelectionEvent::None;
                };
                self.state = DragState::Idle;
                self.preview = None;
                self.finish(Rect::from_points(start, pos), layout)
            }
        }
    }

    fn finish(&mut self, rect: Rect<Screen>, layout: ImageLayout) -> SelectionEvent {
        // Only the part over the image counts towards the minimum
        let rect = rect.clamp_to(layout.displayed);
        if !rect.meets_minimum(self.min_size) {
            log::debug!(
                "discarding {:.1}x{:.1} drag below {} px",
                rect.width(),
                rect.height(),
                self.min_size
            );
            return SelectionEvent::Discarded(Error::SelectionTooSmall);
        }

        match to_image_space(rect, layout.displayed, layout.native) {
            Ok(region) => {
                log::info!("selected region {region} on {} image", layout.native);
                self.finished = Some(rect);
                SelectionEvent::Finalized {
                    overlay: rect,
                    region,
                }
            }
            Err(err) => {
                log::warn!("could not map selection: {err}");
                SelectionEvent::Discarded(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ImageLayout {
        ImageLayout {
            displayed: DisplaySize::new(400.0, 300.0),
            native: ImageDimensions::new(800, 600),
        }
    }

    fn p(x: f32, y: f32) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    #[test]
    fn drag_produces_native_region() {
        let mut tool = SelectionTool::default();
        assert_eq!(
            tool.handle(PointerEvent::Down(p(10.0, 10.0)), layout()),
            SelectionEvent::Started
        );
        assert_eq!(tool.preview(), Some(Rect::from_corners(10.0, 10.0, 10.0, 10.0)));

        let event = tool.handle(PointerEvent::Up(p(60.0, 40.0)), layout());
        assert_eq!(
            event,
            SelectionEvent::Finalized {
                overlay: Rect::from_corners(10.0, 10.0, 60.0, 40.0),
                region: Rect::from_corners(20, 20, 120, 80),
            }
        );
        assert_eq!(tool.state(), DragState::Idle);
        assert_eq!(tool.preview(), None);
        assert_eq!(tool.finished(), Some(Rect::from_corners(10.0, 10.0, 60.0, 40.0)));
    }

    #[test]
    fn dragging_up_and_left_still_orders_corners() {
        let mut tool = SelectionTool::default();
        tool.handle(PointerEvent::Down(p(200.0, 150.0)), layout());

        let preview = tool.handle(PointerEvent::Move(p(120.0, 90.0)), layout());
        assert_eq!(
            preview,
            SelectionEvent::Preview(Rect::from_corners(120.0, 90.0, 200.0, 150.0))
        );

        let SelectionEvent::Finalized { region, .. } =
            tool.handle(PointerEvent::Up(p(100.0, 50.0)), layout())
        else {
            panic!("expected a finalized selection");
        };
        assert!(region.x1() <= region.x2());
        assert!(region.y1() <= region.y2());
        assert_eq!(region, Rect::from_corners(200, 100, 400, 300));
    }

    #[test]
    fn tiny_drag_is_discarded_without_residue() {
        let mut tool = SelectionTool::default();
        tool.handle(PointerEvent::Down(p(50.0, 50.0)), layout());
        tool.handle(PointerEvent::Move(p(100.0, 53.0)), layout());

        let event = tool.handle(PointerEvent::Up(p(100.0, 54.0)), layout());
        assert_eq!(event, SelectionEvent::Discarded(Error::SelectionTooSmall));
        assert_eq!(tool.preview(), None);
        assert_eq!(tool.finished(), None);
        assert_eq!(tool.state(), DragState::Idle);
    }

    #[test]
    fn leaving_the_container_finishes_the_drag() {
        let mut tool = SelectionTool::default();
        tool.handle(PointerEvent::Down(p(10.0, 10.0)), layout());
        let event = tool.handle(PointerEvent::Leave(p(410.0, 100.0)), layout());

        let SelectionEvent::Finalized { overlay, region } = event else {
            panic!("expected a finalized selection");
        };
        assert_eq!(overlay, Rect::from_corners(10.0, 10.0, 400.0, 100.0));
        assert_eq!(region, Rect::from_corners(20, 20, 800, 200));
        assert_eq!(tool.state(), DragState::Idle);
    }

    #[test]
    fn drag_from_the_image_edge_outwards_is_too_small() {
        let mut tool = SelectionTool::default();
        tool.handle(PointerEvent::Down(p(400.0, 10.0)), layout());
        tool.handle(PointerEvent::Move(p(480.0, 60.0)), layout());

        let event = tool.handle(PointerEvent::Leave(p(520.0, 100.0)), layout());
        assert_eq!(event, SelectionEvent::Discarded(Error::SelectionTooSmall));
        assert_eq!(tool.finished(), None);
        assert_eq!(tool.preview(), None);
    }

    #[test]
    fn drag_mostly_outside_keeps_only_the_covered_part() {
        let mut tool = SelectionTool::default();
        tool.handle(PointerEvent::Down(p(390.0, -50.0)), layout());

        let event = tool.handle(PointerEvent::Up(p(450.0, 40.0)), layout());
        assert_eq!(
            event,
            SelectionEvent::Finalized {
                overlay: Rect::from_corners(390.0, 0.0, 400.0, 40.0),
                region: Rect::from_corners(780, 0, 800, 80),
            }
        );
    }

    #[test]
    fn new_pointer_down_clears_finished_overlay() {
        let mut tool = SelectionTool::default();
        tool.handle(PointerEvent::Down(p(10.0, 10.0)), layout());
        tool.handle(PointerEvent::Up(p(60.0, 60.0)), layout());
        assert!(tool.finished().is_some());

        tool.handle(PointerEvent::Down(p(100.0, 100.0)), layout());
        assert_eq!(tool.finished(), None);
        assert_eq!(
            tool.state(),
            DragState::Dragging {
                start: p(100.0, 100.0)
            }
        );
    }

    #[test]
    fn events_outside_a_drag_are_ignored() {
        let mut tool = SelectionTool::default();
        let mut none = |event: PointerEvent| tool.handle(event, layout()) == SelectionEvent::None;
        assert!(none(PointerEvent::Move(p(5.0, 5.0))));
        assert!(none(PointerEvent::Up(p(5.0, 5.0))));
    }

    #[test]
    fn viewport_events_are_offset_by_container() {
        let container = ContainerBounds {
            left: 20.0,
            top: 100.0,
        };
        let event = PointerEvent::Move(p(70.0, 130.0)).relative_to(container);
        assert_eq!(event, PointerEvent::Move(p(50.0, 30.0)));
    }

    #[test]
    fn no_drag_starts_before_layout() {
        let mut tool = SelectionTool::default();
        let unlaid = ImageLayout {
            displayed: DisplaySize::default(),
            native: ImageDimensions::new(800, 600),
        };
        let event = tool.handle(PointerEvent::Down(p(1.0, 1.0)), unlaid);
        assert_eq!(event, SelectionEvent::None);
        assert_eq!(tool.state(), DragState::Idle);
    }
}
