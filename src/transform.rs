use std::ops::Neg;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{Error, Result};

/// An affine transform, carrying its inverse and inverse-transpose so that evaluation never has
/// to invert a matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f32>,
    inverse: Matrix4<f32>,
    inverse_transpose: Matrix4<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            matrix: Matrix4::identity(),
            inverse: Matrix4::identity(),
            inverse_transpose: Matrix4::identity(),
        }
    }

    /// Build a transform from an arbitrary matrix, failing when it has no inverse.
    pub fn from_matrix(matrix: Matrix4<f32>) -> Result<Self> {
        let inverse = matrix.try_inverse().ok_or(Error::SingularTransform)?;
        let transform = Self::from_parts(matrix, inverse);
        transform.validate()?;
        Ok(transform)
    }

    fn from_parts(matrix: Matrix4<f32>, inverse: Matrix4<f32>) -> Self {
        Self {
            matrix,
            inverse,
            inverse_transpose: inverse.transpose(),
        }
    }

    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.matrix
    }

    pub fn inverse_matrix(&self) -> &Matrix4<f32> {
        &self.inverse
    }

    /// The matrix that carries object-space normals into world space.
    pub fn inverse_transpose(&self) -> &Matrix4<f32> {
        &self.inverse_transpose
    }

    /// The inverse as a transform of its own.
    pub fn inverse(&self) -> Self {
        Self::from_parts(self.inverse, self.matrix)
    }

    /// Check that the cached inverse really inverts the matrix. Builders like [`Transform::scale`]
    /// happily accept a zero factor, so anything that stores a transform calls this first.
    pub fn validate(&self) -> Result<()> {
        let finite = self.matrix.iter().chain(self.inverse.iter()).all(|x| x.is_finite());
        if !finite {
            return Err(Error::SingularTransform);
        }

        // Rounding in each entry of the product is bounded by the magnitudes that went into it,
        // so large translations get a proportionally larger tolerance.
        let product = self.matrix * self.inverse;
        let magnitude = self.matrix.abs() * self.inverse.abs();
        let identity = Matrix4::<f32>::identity();
        let inverts = product
            .iter()
            .zip(identity.iter())
            .zip(magnitude.iter())
            .all(|((p, i), m)| (p - i).abs() <= 1e-4 * m.max(1.));

        if inverts {
            Ok(())
        } else {
            Err(Error::SingularTransform)
        }
    }

    /// Append a translation to this transform.
    pub fn translate(mut self, vec: &Vector3<f32>) -> Self {
        self.matrix.append_translation_mut(vec);
        self.inverse.prepend_translation_mut(&vec.neg());
        self.refresh()
    }

    /// Append a non-uniform scaling to this transform.
    pub fn scale(mut self, factors: &Vector3<f32>) -> Self {
        self.matrix.append_nonuniform_scaling_mut(factors);
        self.inverse
            .prepend_nonuniform_scaling_mut(&factors.map(|f| 1.0 / f));
        self.refresh()
    }

    /// Append a uniform scaling to this transform.
    pub fn uniform_scale(self, amount: f32) -> Self {
        self.scale(&Vector3::new(amount, amount, amount))
    }

    /// Append an axis-angle rotation to the transform.
    pub fn rotate(mut self, axisangle: &Vector3<f32>) -> Self {
        self.matrix = Matrix4::new_rotation(*axisangle) * self.matrix;
        self.inverse *= Matrix4::new_rotation(axisangle.neg());
        self.refresh()
    }

    /// Append a shear, where `xy` moves x in proportion to y and so on.
    pub fn shear(self, xy: f32, xz: f32, yx: f32, yz: f32, zx: f32, zy: f32) -> Self {
        #[rustfmt::skip]
        let shear = Matrix4::new(
            1., xy, xz, 0.,
            yx, 1., yz, 0.,
            zx, zy, 1., 0.,
            0., 0., 0., 1.,
        );
        // a singular shear leaves a NaN inverse behind for `validate` to reject
        let inv = shear
            .try_inverse()
            .unwrap_or_else(|| Matrix4::from_element(f32::NAN));
        Self::from_parts(shear * self.matrix, self.inverse * inv)
    }

    fn refresh(mut self) -> Self {
        self.inverse_transpose = self.inverse.transpose();
        self
    }
}

/// `a * b` applies `b` first, then `a`.
impl std::ops::Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Self::Output {
        Transform::from_parts(self.matrix * rhs.matrix, rhs.inverse * self.inverse)
    }
}

impl std::ops::Mul<&Transform> for Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Self::Output {
        &self * rhs
    }
}

pub trait ApplyTransform {
    /// Map from the transform's local space out to its parent space.
    fn apply(&self, transform: &Transform) -> Self;

    /// Map from the parent space into the transform's local space.
    fn invert(&self, transform: &Transform) -> Self;
}

impl ApplyTransform for Point3<f32> {
    #[inline]
    fn apply(&self, transform: &Transform) -> Self {
        transform.matrix.transform_point(self)
    }

    #[inline]
    fn invert(&self, transform: &Transform) -> Self {
        transform.inverse.transform_point(self)
    }
}

impl ApplyTransform for Vector3<f32> {
    #[inline]
    fn apply(&self, transform: &Transform) -> Self {
        transform.matrix.transform_vector(self)
    }

    #[inline]
    fn invert(&self, transform: &Transform) -> Self {
        transform.inverse.transform_vector(self)
    }
}
