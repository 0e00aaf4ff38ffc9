use nalgebra::{Point3, Vector3};

use crate::{
    error::{Error, Result},
    transform::{ApplyTransform, Transform},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    position: Point3<f32>,

    /// Not normalized: keeping the length intact means a `t` found in object space is also
    /// valid along the world-space ray.
    direction: Vector3<f32>,
}

impl Ray {
    /// Construct a new ray. A zero or non-finite direction would make every intersection test
    /// divide by zero, so it is rejected here rather than surfacing as NaN during shading.
    pub fn new(position: Point3<f32>, direction: Vector3<f32>) -> Result<Ray> {
        let len = direction.norm_squared();
        if len == 0.0 || !len.is_finite() {
            return Err(Error::DegenerateRay);
        }

        Ok(Ray {
            position,
            direction,
        })
    }

    pub fn position(&self) -> &Point3<f32> {
        &self.position
    }

    pub fn direction(&self) -> &Vector3<f32> {
        &self.direction
    }

    /// The point reached after travelling `t` lengths of the direction.
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.position + self.direction * t
    }
}

impl ApplyTransform for Ray {
    #[inline]
    fn apply(&self, transform: &Transform) -> Self {
        Ray {
            position: self.position.apply(transform),
            direction: self.direction.apply(transform),
        }
    }

    #[inline]
    fn invert(&self, transform: &Transform) -> Self {
        Ray {
            position: self.position.invert(transform),
            direction: self.direction.invert(transform),
        }
    }
}
