//! Property-based invariant tests for board geometry.
//!
//! 1. A point lies inside the cell `Point::cell` assigns it to
//! 2. Overlap area is symmetric and bounded by either rectangle's area
//! 3. Rotation is always normalized into `[0, 360)`

use boardkit_core::{Piece, PieceId, Point, Rect};
use proptest::prelude::*;

/// Quarter-pixel coordinates, so cell arithmetic stays exact.
fn coord() -> impl Strategy<Value = f64> {
    (-8_000i32..8_000).prop_map(|v| f64::from(v) / 4.0)
}

proptest! {
    #[test]
    fn point_lies_within_its_cell(x in coord(), y in coord(), size in 1u32..300) {
        let point = Point::new(x, y);
        let cell = point.cell(size);
        let origin = cell.origin(size);
        let size = f64::from(size);
        prop_assert!(origin.x <= x && x < origin.x + size, "x={} origin={:?}", x, origin);
        prop_assert!(origin.y <= y && y < origin.y + size, "y={} origin={:?}", y, origin);
    }

    #[test]
    fn overlap_is_symmetric_and_bounded(
        ax in coord(), ay in coord(), bx in coord(), by in coord(),
        size in 1.0f64..400.0,
    ) {
        let a = Rect::square(Point::new(ax, ay), size);
        let b = Rect::square(Point::new(bx, by), size);
        let ab = a.overlap_area(&b);
        let ba = b.overlap_area(&a);
        prop_assert!((ab - ba).abs() < 1e-6);
        prop_assert!(ab >= 0.0);
        prop_assert!(ab <= a.area() + 1e-6);
    }

    #[test]
    fn rotation_normalized(degrees in -1e6f64..1e6) {
        let piece = Piece::new(PieceId(0)).with_rotation(degrees);
        let r = piece.rotation().unwrap_or(-1.0);
        prop_assert!((0.0..360.0).contains(&r), "rotation {} from {}", r, degrees);
    }
}
