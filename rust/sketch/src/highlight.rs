// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Highlighted region of a group in view pixels.

use hull_sketch_geometry::BoundingBox;

use crate::host::ViewProjection;

/// Pixel rectangle with inclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Grown by `amount` pixels on every side.
    pub fn expanded(&self, amount: i32) -> PixelRect {
        PixelRect {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// `true` for pixels of an outline `line_width` pixels thick drawn
    /// inside the rectangle.
    pub fn is_outline_pixel(&self, x: i32, y: i32, line_width: i32) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        x < self.left + line_width
            || x > self.right - line_width
            || y < self.top + line_width
            || y > self.bottom - line_width
    }
}

/// Pixel rectangle around `bounds` as seen through `view`, grown by
/// `expansion`. `None` for an empty box.
pub fn highlight_region(bounds: &BoundingBox, view: &dyn ViewProjection, expansion: i32) -> Option<PixelRect> {
    if bounds.is_empty() {
        return None;
    }

    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for corner in bounds.corners() {
        let (x, y) = view.world_to_pixel(&corner);
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
        return None;
    }

    let rect = PixelRect {
        left: min_x.floor() as i32,
        top: min_y.floor() as i32,
        right: max_x.ceil() as i32,
        bottom: max_y.ceil() as i32,
    };
    Some(rect.expanded(expansion))
}
