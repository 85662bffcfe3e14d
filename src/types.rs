/// Axis-aligned box in play-field pixels. `y` grows downwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn set_left(&mut self, left: f64) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f64) {
        self.x = right - self.width;
    }

    pub fn set_center_x(&mut self, center_x: f64) {
        self.x = center_x - self.width / 2.0;
    }

    pub fn set_bottom(&mut self, bottom: f64) {
        self.y = bottom - self.height;
    }

    /// Strict overlap; boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Pushes the box back inside `[0, max_width]` horizontally.
    pub fn clamp_horizontal(&mut self, max_width: f64) {
        if self.left() < 0.0 {
            self.set_left(0.0);
        }
        if self.right() > max_width {
            self.set_right(max_width);
        }
    }
}
