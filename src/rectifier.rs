//! Perspective rectification (spec.md §4.6): builds the projective
//! transform that maps module-grid coordinates to pixel coordinates from
//! four known correspondences (the finder centers plus an estimated or
//! alignment-refined bottom-right corner), then samples every module center
//! through it.
//!
//! Construction follows the classic two-step method: a `squareToQuad`
//! transform is built for each of the module-space quad and the pixel-space
//! quad (mapping the unit square's four corners to each), and the two are
//! composed via `squareToQuad(dst) * adjugate-inverse(squareToQuad(src))`.
use crate::bitmap::{Bitmap, Cell};
use crate::point::Point;

/// A 3x3 projective transform, row-major `[[a,b,c],[d,e,f],[g,h,i]]`.
#[derive(Debug, Clone, Copy)]
pub struct Transform([[f64; 3]; 3]);

impl Transform {
    pub fn identity() -> Self {
        Transform([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Maps the unit square `(0,0),(1,0),(1,1),(0,1)` onto the quadrilateral
    /// `p0,p1,p2,p3` (in that corner order).
    pub fn square_to_quad(p0: Point, p1: Point, p2: Point, p3: Point) -> Transform {
        let dx3 = p0.x - p1.x + p2.x - p3.x;
        let dy3 = p0.y - p1.y + p2.y - p3.y;

        if dx3 == 0.0 && dy3 == 0.0 {
            // Affine case: p0,p1,p2,p3 already form a parallelogram.
            Transform([
                [p1.x - p0.x, p3.x - p0.x, p0.x],
                [p1.y - p0.y, p3.y - p0.y, p0.y],
                [0.0, 0.0, 1.0],
            ])
        } else {
            let dx1 = p1.x - p2.x;
            let dx2 = p3.x - p2.x;
            let dy1 = p1.y - p2.y;
            let dy2 = p3.y - p2.y;
            let den = dx1 * dy2 - dx2 * dy1;
            let g = (dx3 * dy2 - dx2 * dy3) / den;
            let h = (dx1 * dy3 - dx3 * dy1) / den;
            Transform([
                [p1.x - p0.x + g * p1.x, p3.x - p0.x + h * p3.x, p0.x],
                [p1.y - p0.y + g * p1.y, p3.y - p0.y + h * p3.y, p0.y],
                [g, h, 1.0],
            ])
        }
    }

    /// Inverse of [`Transform::square_to_quad`] via the classic adjugate
    /// formula for a 3x3 matrix.
    pub fn quad_to_square(p0: Point, p1: Point, p2: Point, p3: Point) -> Transform {
        Self::square_to_quad(p0, p1, p2, p3).adjugate_inverse()
    }

    fn adjugate_inverse(&self) -> Transform {
        let m = self.0;
        let cofactor = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        let a11 = cofactor(1, 2, 1, 2);
        let a12 = -cofactor(1, 2, 0, 2);
        let a13 = cofactor(1, 2, 0, 1);
        let det = m[0][0] * a11 + m[0][1] * a12 + m[0][2] * a13;

        let adj = [
            [a11, -cofactor(0, 2, 1, 2), cofactor(0, 1, 1, 2)],
            [a12, cofactor(0, 2, 0, 2), -cofactor(0, 1, 0, 2)],
            [a13, -cofactor(0, 2, 0, 1), cofactor(0, 1, 0, 1)],
        ];
        let mut out = [[0.0; 3]; 3];
        for r in 0..3 {
            for c in 0..3 {
                out[r][c] = adj[r][c] / det;
            }
        }
        Transform(out)
    }

    fn multiply(&self, other: &Transform) -> Transform {
        let (a, b) = (self.0, other.0);
        let mut out = [[0.0; 3]; 3];
        for r in 0..3 {
            for c in 0..3 {
                out[r][c] = (0..3).map(|k| a[r][k] * b[k][c]).sum();
            }
        }
        Transform(out)
    }

    /// Composes the transform taking the module-space quad `src` to the
    /// pixel-space quad `dst`.
    pub fn quad_to_quad(src: [Point; 4], dst: [Point; 4]) -> Transform {
        let to_square = Transform::quad_to_square(src[0], src[1], src[2], src[3]);
        let to_quad = Transform::square_to_quad(dst[0], dst[1], dst[2], dst[3]);
        to_quad.multiply(&to_square)
    }

    pub fn transform(&self, p: Point) -> Point {
        let m = self.0;
        let denom = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        Point::new(
            (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / denom,
            (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / denom,
        )
    }
}

/// Samples a `size`x`size` module grid out of `bitmap` through `transform`,
/// truncating each mapped pixel coordinate toward zero (spec.md §4.6: do not
/// round) and clamping to the image bounds.
pub fn sample_grid(bitmap: &Bitmap, transform: &Transform, size: usize) -> Bitmap {
    let mut out = Bitmap::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let module_center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let mapped = transform.transform(module_center);
            let (px, py) = mapped.trunc();
            let px = px.clamp(0, bitmap.width as i64 - 1) as usize;
            let py = py.clamp(0, bitmap.height as i64 - 1) as usize;
            let cell = if bitmap.get(px, py).is_on() { Cell::On } else { Cell::Off };
            out.set(x, y, cell);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_quad_round_trips() {
        let quad = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)];
        let t = Transform::quad_to_quad(quad, quad);
        let p = Point::new(0.3, 0.7);
        let mapped = t.transform(p);
        assert!((mapped.x - p.x).abs() < 1e-9);
        assert!((mapped.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn axis_aligned_scale_maps_corners() {
        let src = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)];
        let dst = [Point::new(10.0, 10.0), Point::new(110.0, 10.0), Point::new(110.0, 110.0), Point::new(10.0, 110.0)];
        let t = Transform::quad_to_quad(src, dst);
        let mapped = t.transform(Point::new(1.0, 1.0));
        assert!((mapped.x - 110.0).abs() < 1e-6);
        assert!((mapped.y - 110.0).abs() < 1e-6);
    }

    #[test]
    fn sample_grid_reads_axis_aligned_symbol() {
        let mut bmp = Bitmap::new(100, 100);
        bmp.rect(0, 0, 100, 100, Cell::Off);
        bmp.rect(20, 20, 10, 10, Cell::On);
        // src quad: module coords (0,0)-(10,10) over a 10x10 grid.
        let src = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
        let dst = [Point::new(20.0, 20.0), Point::new(30.0, 20.0), Point::new(30.0, 30.0), Point::new(20.0, 30.0)];
        let t = Transform::quad_to_quad(src, dst);
        let grid = sample_grid(&bmp, &t, 10);
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(grid.get(x, y), Cell::On);
            }
        }
    }
}
