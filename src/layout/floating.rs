use super::{Point, Rect};

use crate::constants::{MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH, RESIZE_HANDLE_SIZE, TAB_STRIP_HEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    fn moves_left(self) -> bool {
        matches!(
            self,
            ResizeEdge::Left | ResizeEdge::TopLeft | ResizeEdge::BottomLeft
        )
    }

    fn moves_right(self) -> bool {
        matches!(
            self,
            ResizeEdge::Right | ResizeEdge::TopRight | ResizeEdge::BottomRight
        )
    }

    fn moves_top(self) -> bool {
        matches!(
            self,
            ResizeEdge::Top | ResizeEdge::TopLeft | ResizeEdge::TopRight
        )
    }

    fn moves_bottom(self) -> bool {
        matches!(
            self,
            ResizeEdge::Bottom | ResizeEdge::BottomLeft | ResizeEdge::BottomRight
        )
    }
}

/// Which part of a surface the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitRegion {
    /// Title bar or body: starts a drag.
    Body,
    /// Resize grip: starts a resize along `ResizeEdge`.
    Resize(ResizeEdge),
    /// Folder tab strip. Never starts a drag; `member` is the tab under the
    /// pointer, if any.
    TabStrip { member: Option<usize> },
}

impl HitRegion {
    pub fn is_draggable(self) -> bool {
        matches!(self, HitRegion::Body)
    }
}

/// Bottom-right resize grip.
pub fn resize_handle_rect(rect: Rect) -> Rect {
    Rect::new(
        rect.right() - RESIZE_HANDLE_SIZE,
        rect.bottom() - RESIZE_HANDLE_SIZE,
        RESIZE_HANDLE_SIZE,
        RESIZE_HANDLE_SIZE,
    )
}

pub fn tab_strip_rect(rect: Rect) -> Rect {
    Rect::new(rect.x, rect.y, rect.width, TAB_STRIP_HEIGHT)
}

/// Classify `point` (already known to be inside `rect`) for a surface with
/// `tabs` tabs. `tabs == 0` means a plain window.
pub fn hit_region(rect: Rect, point: Point, tabs: usize) -> HitRegion {
    if super::rect_hit(resize_handle_rect(rect), point) {
        return HitRegion::Resize(ResizeEdge::BottomRight);
    }
    if tabs > 0 && super::rect_hit(tab_strip_rect(rect), point) {
        let tab_width = rect.width / tabs as f64;
        let member = if tab_width > 0.0 {
            let idx = ((point.x - rect.x) / tab_width).floor() as usize;
            (idx < tabs).then_some(idx)
        } else {
            None
        };
        return HitRegion::TabStrip { member };
    }
    HitRegion::Body
}

/// Origin that keeps the grab offset constant under the pointer.
pub fn apply_move(pointer: Point, grab_offset: Point) -> Point {
    Point::new(pointer.x - grab_offset.x, pointer.y - grab_offset.y)
}

/// Resize `start` by the pointer delta along `edge`, clamping to the minimum
/// window size. The edge opposite the dragged one stays anchored.
pub fn apply_resize_drag(start: Rect, edge: ResizeEdge, pointer: Point, pointer_start: Point) -> Rect {
    let dx = pointer.x - pointer_start.x;
    let dy = pointer.y - pointer_start.y;
    let mut x = start.x;
    let mut y = start.y;
    let mut width = start.width;
    let mut height = start.height;

    if edge.moves_left() {
        x += dx;
        width -= dx;
    } else if edge.moves_right() {
        width += dx;
    }
    if edge.moves_top() {
        y += dy;
        height -= dy;
    } else if edge.moves_bottom() {
        height += dy;
    }

    if width < MIN_WINDOW_WIDTH {
        if edge.moves_left() {
            x -= MIN_WINDOW_WIDTH - width;
        }
        width = MIN_WINDOW_WIDTH;
    }
    if height < MIN_WINDOW_HEIGHT {
        if edge.moves_top() {
            y -= MIN_WINDOW_HEIGHT - height;
        }
        height = MIN_WINDOW_HEIGHT;
    }

    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_right_grows_without_moving_origin() {
        let start = Rect::new(100.0, 100.0, 400.0, 300.0);
        let res = apply_resize_drag(
            start,
            ResizeEdge::BottomRight,
            Point::new(560.0, 420.0),
            Point::new(500.0, 400.0),
        );
        assert_eq!(res, Rect::new(100.0, 100.0, 460.0, 320.0));
    }

    #[test]
    fn bottom_right_clamps_to_minimum() {
        let start = Rect::new(0.0, 0.0, 400.0, 300.0);
        let res = apply_resize_drag(
            start,
            ResizeEdge::BottomRight,
            Point::new(0.0, 0.0),
            Point::new(400.0, 300.0),
        );
        assert_eq!(res.width, MIN_WINDOW_WIDTH);
        assert_eq!(res.height, MIN_WINDOW_HEIGHT);
        assert_eq!(res.position(), start.position());
    }

    #[test]
    fn left_edge_clamp_keeps_right_edge_anchored() {
        let start = Rect::new(100.0, 50.0, 300.0, 200.0);
        let res = apply_resize_drag(
            start,
            ResizeEdge::Left,
            Point::new(300.0, 60.0),
            Point::new(100.0, 60.0),
        );
        assert_eq!(res.width, MIN_WINDOW_WIDTH);
        assert_eq!(res.right(), start.right());
        assert_eq!(res.height, start.height);
    }

    #[test]
    fn top_drag_up_extends_height() {
        let start = Rect::new(0.0, 200.0, 300.0, 200.0);
        let res = apply_resize_drag(
            start,
            ResizeEdge::Top,
            Point::new(10.0, 150.0),
            Point::new(10.0, 200.0),
        );
        assert_eq!(res, Rect::new(0.0, 150.0, 300.0, 250.0));
    }

    #[test]
    fn move_keeps_grab_offset() {
        let origin = apply_move(Point::new(300.0, 240.0), Point::new(20.0, 10.0));
        assert_eq!(origin, Point::new(280.0, 230.0));
    }

    #[test]
    fn hit_region_prefers_resize_grip() {
        let rect = Rect::new(0.0, 0.0, 400.0, 300.0);
        assert_eq!(
            hit_region(rect, Point::new(395.0, 295.0), 0),
            HitRegion::Resize(ResizeEdge::BottomRight)
        );
        assert_eq!(hit_region(rect, Point::new(200.0, 10.0), 0), HitRegion::Body);
    }

    #[test]
    fn hit_region_maps_tab_index() {
        let rect = Rect::new(0.0, 0.0, 400.0, 300.0);
        assert_eq!(
            hit_region(rect, Point::new(250.0, 10.0), 2),
            HitRegion::TabStrip { member: Some(1) }
        );
        assert!(!hit_region(rect, Point::new(250.0, 10.0), 2).is_draggable());
        assert_eq!(
            hit_region(rect, Point::new(250.0, TAB_STRIP_HEIGHT + 1.0), 2),
            HitRegion::Body
        );
    }
}
