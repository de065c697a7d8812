/// Viewport-relative coordinates in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn from_dom(r: &web_sys::DomRect) -> Self {
        Self {
            x: r.left(),
            y: r.top(),
            width: r.width(),
            height: r.height(),
        }
    }
}

const EDGE_GAP: f64 = 8.0;

/// Keep a menu of `size` opened at `at` fully inside the viewport.
pub(crate) fn clamp_to_viewport(at: Point, size: Size, viewport: Size) -> Point {
    let max_x = (viewport.width - size.width - EDGE_GAP).max(EDGE_GAP);
    let max_y = (viewport.height - size.height - EDGE_GAP).max(EDGE_GAP);
    Point {
        x: at.x.clamp(EDGE_GAP.min(max_x), max_x),
        y: at.y.clamp(EDGE_GAP.min(max_y), max_y),
    }
}

/// Where a submenu goes next to its parent item.
///
/// Opens to the right of the parent; flips to the left when it would overflow
/// the right edge, and shifts up when it would overflow the bottom.
pub(crate) fn place_submenu(parent_item: Rect, size: Size, viewport: Size) -> (Point, bool) {
    let flipped = parent_item.right() + size.width > viewport.width - EDGE_GAP;
    let x = if flipped {
        (parent_item.x - size.width).max(EDGE_GAP)
    } else {
        parent_item.right()
    };
    let y = if parent_item.y + size.height > viewport.height - EDGE_GAP {
        (viewport.height - size.height - EDGE_GAP).max(EDGE_GAP)
    } else {
        parent_item.y
    };
    (Point { x, y }, flipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VIEWPORT: Size = Size {
        width: 1000.0,
        height: 800.0,
    };

    #[test]
    fn test_submenu_opens_right_when_room() {
        let item = Rect {
            x: 100.0,
            y: 100.0,
            width: 200.0,
            height: 30.0,
        };
        let (at, flipped) = place_submenu(
            item,
            Size {
                width: 220.0,
                height: 300.0,
            },
            VIEWPORT,
        );
        assert!(!flipped);
        assert_eq!(at, Point { x: 300.0, y: 100.0 });
    }

    #[test]
    fn test_submenu_flips_left_on_overflow() {
        let item = Rect {
            x: 700.0,
            y: 100.0,
            width: 200.0,
            height: 30.0,
        };
        let (at, flipped) = place_submenu(
            item,
            Size {
                width: 220.0,
                height: 300.0,
            },
            VIEWPORT,
        );
        assert!(flipped);
        assert_eq!(at.x, 480.0);
    }

    #[test]
    fn test_submenu_shifts_up_near_bottom() {
        let item = Rect {
            x: 100.0,
            y: 700.0,
            width: 200.0,
            height: 30.0,
        };
        let (at, _) = place_submenu(
            item,
            Size {
                width: 220.0,
                height: 300.0,
            },
            VIEWPORT,
        );
        assert_eq!(at.y, 492.0);
    }

    #[test]
    fn test_clamp_to_viewport() {
        let at = clamp_to_viewport(
            Point { x: 950.0, y: 790.0 },
            Size {
                width: 200.0,
                height: 100.0,
            },
            VIEWPORT,
        );
        assert_eq!(at, Point { x: 792.0, y: 692.0 });
    }
}
