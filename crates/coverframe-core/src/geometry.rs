use std::ops::{Add, Sub};

/// Pan translation in display-space pixels, relative to the crop box centre.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Offset {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Pointer position in display space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Offset;

    fn sub(self, rhs: Self) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Output surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Display-space rectangle the user crops into. Fixed for a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropBoxGeometry {
    pub width: f64,
    pub height: f64,
}

impl CropBoxGeometry {
    /// The box is `max_display_width` wide with the target's aspect ratio.
    pub fn from_target(target: TargetSize, max_display_width: f64) -> Self {
        Self {
            width: max_display_width,
            height: max_display_width * target.height as f64 / target.width as f64,
        }
    }
}

/// Rectangle in natural source-pixel coordinates. May be fractional.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRect {
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}
