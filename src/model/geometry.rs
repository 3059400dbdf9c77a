//! Window frame math (pure Rust, no FFI).

/// A window rectangle in screen points, origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point of the frame.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// A frame of the given size sharing this frame's center.
    pub fn recentered(&self, width: f64, height: f64) -> Frame {
        let (cx, cy) = self.center();
        Frame::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    /// A `size`×`size` frame inset by `margin` from the top-right of `area`.
    pub fn top_right_of(area: Frame, size: f64, margin: f64) -> Frame {
        Frame::new(
            area.x + area.width - size - margin,
            area.y + area.height - size - margin,
            size,
            size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center() {
        let f = Frame::new(100.0, 200.0, 80.0, 80.0);
        assert_eq!(f.center(), (140.0, 240.0));
    }

    #[test]
    fn test_expand_keeps_center() {
        let f = Frame::new(100.0, 200.0, 80.0, 80.0);
        let g = f.recentered(400.0, 400.0);
        assert_eq!(g, Frame::new(-60.0, 40.0, 400.0, 400.0));
        assert_eq!(g.center(), f.center());
    }

    #[test]
    fn test_expand_then_collapse_restores_frame() {
        let f = Frame::new(10.0, 20.0, 80.0, 80.0);
        let back = f.recentered(400.0, 400.0).recentered(80.0, 80.0);
        assert_eq!(back, f);
    }

    #[test]
    fn test_top_right_of_visible_area() {
        let area = Frame::new(0.0, 25.0, 1440.0, 875.0);
        let f = Frame::top_right_of(area, 80.0, 40.0);
        assert_eq!(f, Frame::new(1320.0, 780.0, 80.0, 80.0));
    }
}
