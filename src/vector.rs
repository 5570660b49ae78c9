//! Trigonometry-free 2D rotation.
//!
//! Directions are points on the unit circle generated from a single scalar
//! `t` (the tangent of half the rotation angle) with the rational
//! parametrization
//!
//! ```text
//! x = (1 - t²) / (1 + t²)
//! y = 2t / (1 + t²)
//! ```
//!
//! Rotation matrices are built straight from such a unit vector and reused
//! frame after frame, so steady state rotation is a single 2×2 multiply.
//! The parametrization is singular for `t → ∞` (a half turn); callers only
//! feed it small turn rates and per-column steps.

use glam::{DMat2, DVec2};

/// Largest allowed `|x² + y² - 1|` for a direction vector before it gets
/// renormalized.
pub const DRIFT_TOLERANCE: f64 = 1e-9;

/// Point on the unit circle for the half-angle tangent `t`.
pub fn unit_from_half_tangent(t: f64) -> DVec2 {
    let t2 = t * t;
    let factor = 1. / (1. + t2);
    DVec2::new((1. - t2) * factor, (2. * t) * factor)
}

/// 2×2 rotation built from a unit vector `(c, s)`:
///
/// ```text
/// | m11 m21 |   | c -s |
/// | m12 m22 | = | s  c |
/// ```
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RotationMatrix2(DMat2);

impl RotationMatrix2 {
    pub const IDENTITY: Self = Self(DMat2::IDENTITY);

    /// `v` must be a unit vector; it is the image of `(1, 0)` under the
    /// rotation.
    pub fn from_unit(v: DVec2) -> Self {
        Self(DMat2::from_cols(
            DVec2::new(v.x, v.y),
            DVec2::new(-v.y, v.x),
        ))
    }

    pub fn from_half_tangent(t: f64) -> Self {
        Self::from_unit(unit_from_half_tangent(t))
    }

    pub fn m11(&self) -> f64 {
        self.0.x_axis.x
    }

    pub fn m12(&self) -> f64 {
        self.0.x_axis.y
    }

    pub fn m21(&self) -> f64 {
        self.0.y_axis.x
    }

    pub fn m22(&self) -> f64 {
        self.0.y_axis.y
    }

    /// Rotation that applies `self` first and `next` afterwards.
    pub fn then(&self, next: &Self) -> Self {
        Self(next.0 * self.0)
    }

    pub fn apply(&self, v: DVec2) -> DVec2 {
        self.0 * v
    }
}

impl Default for RotationMatrix2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// In-place rotation for vectors.
pub trait Rotate {
    fn rotate_by(&mut self, matrix: &RotationMatrix2);

    /// Rotate by the half-angle tangent `t`.
    fn rotate_by_amount(&mut self, t: f64) {
        self.rotate_by(&RotationMatrix2::from_half_tangent(t));
    }
}

impl Rotate for DVec2 {
    fn rotate_by(&mut self, matrix: &RotationMatrix2) {
        *self = matrix.apply(*self);
    }
}

/// Pull a direction vector back onto the unit circle once it has drifted
/// past [`DRIFT_TOLERANCE`]. Returns whether it had to.
pub fn renormalize_if_drifted(v: &mut DVec2) -> bool {
    if (v.length_squared() - 1.).abs() <= DRIFT_TOLERANCE {
        return false;
    }

    let normalized = v.normalize_or_zero();
    if normalized == DVec2::ZERO {
        return false;
    }
    log::trace!("renormalizing drifted direction {v}");
    *v = normalized;
    true
}
