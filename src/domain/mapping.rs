//! Screen-to-native coordinate mapping
//!
//! The displayed image may be scaled differently on each axis, so each axis
//! gets its own factor. Results are rounded with `f32::round`, which rounds
//! half-way cases away from zero.

use super::geometry::{DisplaySize, ImageDimensions, Native, Rect, Screen};
use crate::error::Error;

/// Per-axis factors converting displayed pixels to native pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    pub x: f32,
    pub y: f32,
}

impl ScaleFactors {
    pub fn between(displayed: DisplaySize, native: ImageDimensions) -> Result<Self, Error> {
        if !displayed.is_laid_out() {
            return Err(Error::LayoutNotReady);
        }
        Ok(Self {
            x: native.width as f32 / displayed.width,
            y: native.height as f32 / displayed.height,
        })
    }
}

/// Map a container-relative rectangle onto native image pixels
///
/// The rectangle is clamped to the displayed image first, so the result
/// always lies inside `0..=native.width` x `0..=native.height`.
pub fn to_image_space(
    rect: Rect<Screen>,
    displayed: DisplaySize,
    native: ImageDimensions,
) -> Result<Rect<Native>, Error> {
    let scale = ScaleFactors::between(displayed, native)?;
    let rect = rect.clamp_to(displayed);

    let map = |value: f32, factor: f32, limit: u32| -> u32 {
        let scaled = (value * factor).round();
        (scaled.max(0.0) as u32).min(limit)
    };

    let mapped = Rect::from_corners(
        map(rect.x1(), scale.x, native.width),
        map(rect.y1(), scale.y, native.height),
        map(rect.x2(), scale.x, native.width),
        map(rect.y2(), scale.y, native.height),
    );
    debug_assert!(mapped.fits_within(native));
    log::debug!(
        "mapped screen rect {rect} (scale {:.3}x{:.3}) to native {mapped}",
        scale.x,
        scale.y,
    );
    Ok(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_downscale_doubles_coordinates() {
        let rect = Rect::<Screen>::from_corners(10.0, 20.0, 110.0, 70.0);
        let mapped = to_image_space(
            rect,
            DisplaySize::new(400.0, 300.0),
            ImageDimensions::new(800, 600),
        )
        .unwrap();
        assert_eq!(mapped, Rect::from_corners(20, 40, 220, 140));
    }

    #[test]
    fn axes_scale_independently() {
        let rect = Rect::<Screen>::from_corners(10.0, 10.0, 50.0, 50.0);
        let mapped = to_image_space(
            rect,
            DisplaySize::new(100.0, 200.0),
            ImageDimensions::new(300, 100),
        )
        .unwrap();
        assert_eq!(mapped, Rect::from_corners(30, 5, 150, 25));
    }

    #[test]
    fn half_pixels_round_away_from_zero() {
        // scale 1.5: 3 -> 4.5 -> 5, 5 -> 7.5 -> 8
        let rect = Rect::<Screen>::from_corners(3.0, 3.0, 5.0, 5.0);
        let mapped = to_image_space(
            rect,
            DisplaySize::new(100.0, 100.0),
            ImageDimensions::new(150, 150),
        )
        .unwrap();
        assert_eq!(mapped, Rect::from_corners(5, 5, 8, 8));
    }

    #[test]
    fn refuses_unlaid_out_image() {
        let rect = Rect::<Screen>::from_corners(0.0, 0.0, 10.0, 10.0);
        let native = ImageDimensions::new(10, 10);
        let result = to_image_space(rect, DisplaySize::new(0.0, 100.0), native);
        assert_eq!(result, Err(Error::LayoutNotReady));
    }

    #[test]
    fn results_stay_within_native_bounds() {
        let native = ImageDimensions::new(1920, 1080);
        let displayed = DisplaySize::new(633.3, 356.1);
        let corners = [
            (-50.0, -50.0, 10.0, 10.0),
            (600.0, 300.0, 900.0, 700.0),
            (633.3, 356.1, 0.0, 0.0),
            (123.4, 56.7, 321.9, 300.2),
        ];
        for (ax, ay, bx, by) in corners {
            let rect = Rect::<Screen>::from_corners(ax, ay, bx, by);
            let mapped = to_image_space(rect, displayed, native).unwrap();
            assert!(mapped.fits_within(native), "{mapped} outside {native}");
            assert!(mapped.x1() <= mapped.x2());
            assert!(mapped.y1() <= mapped.y2());
        }
    }
}
