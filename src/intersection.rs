use smallvec::SmallVec;

use crate::shape::Shape;

/// A ray/shape hit at parametric distance `t`. The shape is borrowed, never owned: intersections
/// are recomputed for every ray and don't outlive the scene they came from.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    pub t: f32,
    pub shape: &'a dyn Shape,
}

impl<'a> Intersection<'a> {
    pub fn new(t: f32, shape: &'a dyn Shape) -> Self {
        Self { t, shape }
    }

    /// True when this intersection was produced by `shape`.
    pub fn is_on(&self, shape: &dyn Shape) -> bool {
        std::ptr::addr_eq(self.shape as *const dyn Shape, shape as *const dyn Shape)
    }
}

/// Intersections in the order they were discovered. Spheres produce at most two, which fit
/// inline.
#[derive(Debug, Default, Clone)]
pub struct Intersections<'a>(SmallVec<[Intersection<'a>; 2]>);

impl<'a> Intersections<'a> {
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    pub fn push(&mut self, intersection: Intersection<'a>) {
        self.0.push(intersection);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intersection<'a>> {
        self.0.iter()
    }

    /// The visible hit: the smallest non-negative `t`. The set itself is left in discovery
    /// order.
    pub fn hit(&self) -> Option<&Intersection<'a>> {
        self.0
            .iter()
            .filter(|i| i.t >= 0.)
            .min_by(|a, b| a.t.total_cmp(&b.t))
    }
}

impl<'a> std::ops::Index<usize> for Intersections<'a> {
    type Output = Intersection<'a>;

    fn index(&self, ix: usize) -> &Self::Output {
        &self.0[ix]
    }
}

impl<'a> Extend<Intersection<'a>> for Intersections<'a> {
    fn extend<I: IntoIterator<Item = Intersection<'a>>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<'a> FromIterator<Intersection<'a>> for Intersections<'a> {
    fn from_iter<I: IntoIterator<Item = Intersection<'a>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for Intersections<'a> {
    type Item = Intersection<'a>;
    type IntoIter = smallvec::IntoIter<[Intersection<'a>; 2]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
