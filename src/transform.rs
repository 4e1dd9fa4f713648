/// A 2D affine transform stored as the top two rows of a 3x3 matrix.
///
/// Maps `(x, y)` to `(a*x + b*y + tx, c*x + d*y + ty)`. Used to place the
/// origin-centered ripple path at the touch point each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// `[a, b, tx, c, d, ty]` in row-major order
    pub data: [f32; 6],
}

impl Transform {
    /// Identity matrix (no transformation)
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, // row 0
            0.0, 1.0, 0.0, // row 1
        ],
    };

    /// Create a translation transform
    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            data: [
                1.0, 0.0, x, // row 0
                0.0, 1.0, y, // row 1
            ],
        }
    }

    /// Create a clockwise rotation (y axis pointing down)
    pub fn rotate(angle_radians: f32) -> Self {
        let cos = angle_radians.cos();
        let sin = angle_radians.sin();
        Self {
            data: [
                cos, -sin, 0.0, // row 0
                sin, cos, 0.0, // row 1
            ],
        }
    }

    /// Create a rotation transform from degrees
    pub fn rotate_degrees(angle_degrees: f32) -> Self {
        Self::rotate(angle_degrees.to_radians())
    }

    /// Create a uniform scale transform
    pub fn scale(s: f32) -> Self {
        Self {
            data: [
                s, 0.0, 0.0, // row 0
                0.0, s, 0.0, // row 1
            ],
        }
    }

    /// Translate to `(x, y)`, scale, then rotate, in the order a canvas
    /// applies `translate; scale; rotate` before drawing the shape.
    pub fn ripple(x: f32, y: f32, scale: f32, rotation_degrees: Option<f32>) -> Self {
        let placed = Self::translate(x, y).then(&Self::scale(scale));
        match rotation_degrees {
            Some(degrees) => placed.then(&Self::rotate_degrees(degrees)),
            None => placed,
        }
    }

    /// Compose this transform with another: self * other
    /// Applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Transform {
        let [a0, b0, x0, c0, d0, y0] = self.data;
        let [a1, b1, x1, c1, d1, y1] = other.data;
        Transform {
            data: [
                a0 * a1 + b0 * c1,
                a0 * b1 + b0 * d1,
                a0 * x1 + b0 * y1 + x0,
                c0 * a1 + d0 * c1,
                c0 * b1 + d0 * d1,
                c0 * x1 + d0 * y1 + y0,
            ],
        }
    }

    /// Transform a point
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, tx, c, d, ty] = self.data;
        (a * x + b * y + tx, c * x + d * y + ty)
    }

    /// Convert to a `kurbo` affine for transforming paths.
    pub fn to_affine(&self) -> kurbo::Affine {
        let [a, b, tx, c, d, ty] = self.data.map(f64::from);
        kurbo::Affine::new([a, c, b, d, tx, ty])
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
