use std::fmt::Debug;

use nalgebra::{Point3, Unit, Vector3};

use crate::{
    error::Result,
    intersection::{Intersection, Intersections},
    ray::Ray,
    transform::{ApplyTransform, Transform},
};

/// A primitive placed in the world by a single object-to-world transform.
pub trait Shape: Debug + Send + Sync {
    /// All the points where the world-space `ray` crosses the surface, in discovery order.
    fn intersect(&self, ray: &Ray) -> Intersections<'_>;

    /// The unit surface normal at a world-space point on the shape.
    fn normal_at(&self, point: &Point3<f32>) -> Unit<Vector3<f32>>;

    fn transform(&self) -> &Transform;

    /// Replace the placement transform. Singular transforms are rejected and leave the shape
    /// unchanged.
    fn set_transform(&mut self, transform: Transform) -> Result<()>;
}

/// The unit sphere, centered at the object-space origin.
#[derive(Debug, Clone, Default)]
pub struct Sphere {
    transform: Transform,
}

impl Sphere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(transform: Transform) -> Result<Self> {
        let mut sphere = Self::new();
        sphere.set_transform(transform)?;
        Ok(sphere)
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray) -> Intersections<'_> {
        let ray = ray.invert(&self.transform);
        let mut xs = Intersections::new();

        let dir = ray.direction();
        let sphere_to_ray = ray.position() - Point3::origin();

        let a = dir.dot(dir);
        if a == 0.0 {
            // the direction collapsed while moving into object space
            log::trace!("ray direction vanished in object space, treating as a miss");
            return xs;
        }

        let b = 2. * dir.dot(&sphere_to_ray);
        let c = sphere_to_ray.dot(&sphere_to_ray) - 1.;

        let discriminant = b * b - 4. * a * c;
        if discriminant < 0. {
            return xs;
        }

        let root = discriminant.sqrt();
        xs.push(Intersection::new((-b - root) / (2. * a), self));
        xs.push(Intersection::new((-b + root) / (2. * a), self));
        xs
    }

    fn normal_at(&self, point: &Point3<f32>) -> Unit<Vector3<f32>> {
        let object_point = point.invert(&self.transform);
        let object_normal = object_point - Point3::origin();

        // Translation ends up in the bottom row of the inverse-transpose and only pollutes `w`,
        // which is dropped here.
        let world_normal = self.transform.inverse_transpose() * object_normal.to_homogeneous();
        Unit::new_normalize(world_normal.xyz())
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn set_transform(&mut self, transform: Transform) -> Result<()> {
        transform.validate()?;
        self.transform = transform;
        Ok(())
    }
}
