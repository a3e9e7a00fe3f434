//! Geometric types for image regions and the coordinate spaces they live in
//!
//! A rectangle always carries its space in its type, so a screen-space drag
//! rectangle can never be passed where native image pixels are expected.

use std::fmt;
use std::marker::PhantomData;

/// Marker for a coordinate space
pub trait Space: Copy + fmt::Debug + Default + PartialEq {
    type Unit: Copy + fmt::Debug + Default + PartialEq + PartialOrd;
}

/// Container-relative on-screen pixels of the displayed image
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Screen;

impl Space for Screen {
    type Unit = f32;
}

/// Native pixels of the decoded image asset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Native;

impl Space for Native {
    type Unit = u32;
}

/// Axis-aligned rectangle with `x1 <= x2` and `y1 <= y2`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect<S: Space> {
    x1: S::Unit,
    y1: S::Unit,
    x2: S::Unit,
    y2: S::Unit,
    space: PhantomData<S>,
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if b < a { (b, a) } else { (a, b) }
}

impl<S: Space> Rect<S> {
    /// Bounding box of two opposite corners given in any order
    pub fn from_corners(ax: S::Unit, ay: S::Unit, bx: S::Unit, by: S::Unit) -> Self {
        let (x1, x2) = ordered(ax, bx);
        let (y1, y2) = ordered(ay, by);
        Self {
            x1,
            y1,
            x2,
            y2,
            space: PhantomData,
        }
    }

    pub fn x1(&self) -> S::Unit {
        self.x1
    }

    pub fn y1(&self) -> S::Unit {
        self.y1
    }

    pub fn x2(&self) -> S::Unit {
        self.x2
    }

    pub fn y2(&self) -> S::Unit {
        self.y2
    }
}

impl Rect<Screen> {
    /// Bounding box of a drag from `start` to `current`
    pub fn from_points(start: ScreenPoint, current: ScreenPoint) -> Self {
        Self::from_corners(start.x, start.y, current.x, current.y)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Check that both sides reach `min` pixels
    pub fn meets_minimum(&self, min: f32) -> bool {
        self.width() >= min && self.height() >= min
    }

    /// Clamp the rectangle into `0..=width` x `0..=height`
    pub fn clamp_to(&self, size: DisplaySize) -> Self {
        Self::from_corners(
            self.x1.clamp(0.0, size.width),
            self.y1.clamp(0.0, size.height),
            self.x2.clamp(0.0, size.width),
            self.y2.clamp(0.0, size.height),
        )
    }
}

impl Rect<Native> {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Check whether the rectangle fits inside an image of the given size
    pub fn fits_within(&self, dims: ImageDimensions) -> bool {
        self.x2 <= dims.width && self.y2 <= dims.height
    }
}

impl<S: Space> fmt::Display for Rect<S>
where
    S::Unit: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Pointer position relative to the image container's top-left corner
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Convert a viewport (client) position into container-relative coordinates
    pub fn from_client(client_x: f32, client_y: f32, container: ContainerBounds) -> Self {
        Self {
            x: client_x - container.left,
            y: client_y - container.top,
        }
    }
}

/// Bounding box origin of the image container in viewport coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerBounds {
    pub left: f32,
    pub top: f32,
}

/// Rendered size of the image on screen
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

impl DisplaySize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// An image that has not been laid out yet reports a zero size
    pub fn is_laid_out(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// Native pixel size of a loaded image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_orders_reversed_drag() {
        let rect = Rect::<Screen>::from_corners(80.0, 60.0, 20.0, 10.0);
        assert_eq!((rect.x1(), rect.y1()), (20.0, 10.0));
        assert_eq!((rect.x2(), rect.y2()), (80.0, 60.0));
        assert_eq!(rect.width(), 60.0);
        assert_eq!(rect.height(), 50.0);
    }

    #[test]
    fn clamp_keeps_rect_inside_display() {
        let rect = Rect::<Screen>::from_corners(-10.0, 5.0, 250.0, 120.0);
        let clamped = rect.clamp_to(DisplaySize::new(200.0, 100.0));
        assert_eq!(clamped, Rect::from_corners(0.0, 5.0, 200.0, 100.0));
    }

    #[test]
    fn minimum_applies_to_each_axis() {
        let wide_but_flat = Rect::<Screen>::from_corners(0.0, 0.0, 100.0, 4.0);
        assert!(!wide_but_flat.meets_minimum(5.0));
        let square = Rect::<Screen>::from_corners(0.0, 0.0, 5.0, 5.0);
        assert!(square.meets_minimum(5.0));
    }

    #[test]
    fn client_position_is_made_container_relative() {
        let container = ContainerBounds {
            left: 100.0,
            top: 40.0,
        };
        let point = ScreenPoint::from_client(130.0, 45.5, container);
        assert_eq!(point, ScreenPoint::new(30.0, 5.5));
    }

    #[test]
    fn zero_display_size_is_not_laid_out() {
        assert!(!DisplaySize::new(0.0, 300.0).is_laid_out());
        assert!(!DisplaySize::default().is_laid_out());
        assert!(DisplaySize::new(640.0, 480.0).is_laid_out());
    }

    #[test]
    fn rects_print_their_corners() {
        let screen = Rect::<Screen>::from_corners(10.0, 12.5, 60.0, 40.0);
        assert_eq!(screen.to_string(), "(10, 12.5)-(60, 40)");
        let native = Rect::<Native>::from_corners(20, 25, 120, 80);
        assert_eq!(native.to_string(), "(20, 25)-(120, 80)");
    }
}
