use nalgebra::{Point3, Unit, Vector3};

use crate::{
    canvas::Color,
    error::Result,
    pattern::{PatternId, Patterns},
    ray::Ray,
    shape::Shape,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectId(u32);

/// A shape painted with a pattern.
#[derive(Debug)]
pub struct Object {
    pub shape: Box<dyn Shape>,
    pub pattern: PatternId,
}

/// Everything a ray can hit. Built once, then only read while rendering.
#[derive(Debug, Default)]
pub struct Scene {
    pub patterns: Patterns,
    objects: Vec<Object>,
}

/// The nearest visible intersection along a ray.
#[derive(Debug)]
pub struct Hit<'a> {
    pub id: ObjectId,
    pub object: &'a Object,
    pub t: f32,

    /// The hit point in world space.
    pub point: Point3<f32>,

    /// The normal in world space.
    pub normal: Unit<Vector3<f32>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape painted with `pattern`, which must already exist in [`Scene::patterns`].
    pub fn add_object(&mut self, shape: impl Shape + 'static, pattern: PatternId) -> Result<ObjectId> {
        self.patterns.get(pattern)?;
        let id = ObjectId(self.objects.len() as u32);
        log::debug!("object #{}: {:?} painted with {:?}", id.0, shape, pattern);
        self.objects.push(Object {
            shape: Box::new(shape),
            pattern,
        });
        Ok(id)
    }

    #[inline]
    pub fn object(&self, ObjectId(id): ObjectId) -> &Object {
        &self.objects[id as usize]
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(ix, obj)| (ObjectId(ix as u32), obj))
    }

    /// Find the closest object in front of the ray's origin.
    pub fn hit(&self, ray: &Ray) -> Option<Hit<'_>> {
        let (id, object, t) = self
            .objects()
            .filter_map(|(id, object)| {
                let xs = object.shape.intersect(ray);
                xs.hit().map(|i| (id, object, i.t))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))?;

        let point = ray.at(t);
        let normal = object.shape.normal_at(&point);
        Some(Hit {
            id,
            object,
            t,
            point,
            normal,
        })
    }

    /// The unlit surface color seen along the ray, or `None` when it hits nothing.
    pub fn color_at(&self, ray: &Ray) -> Result<Option<Color>> {
        self.hit(ray)
            .map(|hit| {
                self.patterns
                    .at_object(hit.object.pattern, hit.object.shape.as_ref(), &hit.point)
            })
            .transpose()
    }
}
