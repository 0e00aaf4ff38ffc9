use nalgebra::{Point3, Vector3};

use crate::{
    canvas::Color,
    error::{Error, Result},
    shape::Shape,
    transform::{ApplyTransform, Transform},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternId(u32);

/// The kinds of pattern, and the children they blend between.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind {
    /// Just a solid color.
    Solid { color: Color },

    /// Unit-width bands along x.
    Stripe { first: PatternId, second: PatternId },

    /// A linear blend that restarts at every integer x.
    Gradient { first: PatternId, second: PatternId },

    /// Concentric bands around the y axis.
    Ring { first: PatternId, second: PatternId },

    /// Alternates at every integer boundary on every axis.
    Checker { first: PatternId, second: PatternId },

    /// The mean of two patterns, each evaluated in its own pattern space.
    Blended { first: PatternId, second: PatternId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    kind: PatternKind,
    transform: Transform,
}

impl Pattern {
    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    /// Placement of the pattern relative to the object it is painted on.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}

/// Storage for patterns. Children have to be added before the patterns that refer to them, which
/// keeps every composition acyclic.
#[derive(Debug, Default, Clone)]
pub struct Patterns {
    patterns: Vec<Pattern>,
}

impl Patterns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Look up a pattern, failing for ids that this arena never handed out.
    pub fn get(&self, id: PatternId) -> Result<&Pattern> {
        self.patterns
            .get(id.0 as usize)
            .ok_or(Error::UnknownPattern(id.0))
    }

    #[inline]
    fn pattern(&self, PatternId(id): PatternId) -> &Pattern {
        &self.patterns[id as usize]
    }

    fn add(&mut self, kind: PatternKind) -> Result<PatternId> {
        match &kind {
            PatternKind::Solid { .. } => (),
            PatternKind::Stripe { first, second }
            | PatternKind::Gradient { first, second }
            | PatternKind::Ring { first, second }
            | PatternKind::Checker { first, second }
            | PatternKind::Blended { first, second } => {
                self.get(*first)?;
                self.get(*second)?;
            }
        }

        Ok(self.push(kind))
    }

    #[inline]
    fn push(&mut self, kind: PatternKind) -> PatternId {
        let id = PatternId(self.patterns.len() as u32);
        log::debug!("pattern #{}: {:?}", id.0, kind);
        self.patterns.push(Pattern {
            kind,
            transform: Transform::new(),
        });
        id
    }

    pub fn solid(&mut self, color: Color) -> PatternId {
        self.push(PatternKind::Solid { color })
    }

    pub fn stripe(&mut self, first: PatternId, second: PatternId) -> Result<PatternId> {
        self.add(PatternKind::Stripe { first, second })
    }

    pub fn gradient(&mut self, first: PatternId, second: PatternId) -> Result<PatternId> {
        self.add(PatternKind::Gradient { first, second })
    }

    pub fn ring(&mut self, first: PatternId, second: PatternId) -> Result<PatternId> {
        self.add(PatternKind::Ring { first, second })
    }

    pub fn checker(&mut self, first: PatternId, second: PatternId) -> Result<PatternId> {
        self.add(PatternKind::Checker { first, second })
    }

    pub fn blended(&mut self, first: PatternId, second: PatternId) -> Result<PatternId> {
        self.add(PatternKind::Blended { first, second })
    }

    pub fn transform(&self, id: PatternId) -> Result<&Transform> {
        Ok(&self.get(id)?.transform)
    }

    /// Replace the pattern's transform. Singular transforms are rejected and leave the pattern
    /// unchanged.
    pub fn set_transform(&mut self, id: PatternId, transform: Transform) -> Result<()> {
        transform.validate()?;
        self.get(id)?;
        self.patterns[id.0 as usize].transform = transform;
        Ok(())
    }

    /// The color of the pattern at a point in its own pattern space. Children are sampled at the
    /// same point, without their own transforms.
    pub fn at(&self, id: PatternId, point: &Point3<f32>) -> Result<Color> {
        self.get(id)?;
        Ok(self.color(id, point))
    }

    /// The color of the pattern painted on `shape` at a world-space point. The point is carried
    /// into the shape's object space, then into the pattern's own space.
    pub fn at_object(
        &self,
        id: PatternId,
        shape: &dyn Shape,
        point: &Point3<f32>,
    ) -> Result<Color> {
        self.get(id)?;
        let object_point = point.invert(shape.transform());
        Ok(self.color_local(id, &object_point))
    }

    // Callers check `id` against this arena first. Children were checked when their parent was
    // added, so the recursion below only ever sees ids from this arena.
    fn color(&self, id: PatternId, point: &Point3<f32>) -> Color {
        match self.pattern(id).kind {
            PatternKind::Solid { color } => color,

            PatternKind::Stripe { first, second } => {
                if is_even(point.x.floor()) {
                    self.color(first, point)
                } else {
                    self.color(second, point)
                }
            }

            PatternKind::Gradient { first, second } => {
                let fraction = point.x - point.x.floor();
                let first = self.color(first, point);
                let second = self.color(second, point);
                first + (second - first) * fraction
            }

            PatternKind::Ring { first, second } => {
                let distance = Vector3::new(point.x, 0., point.z).norm();
                if is_even(distance.floor()) {
                    self.color(first, point)
                } else {
                    self.color(second, point)
                }
            }

            PatternKind::Checker { first, second } => {
                if is_even(point.x.floor() + point.y.floor() + point.z.floor()) {
                    self.color(first, point)
                } else {
                    self.color(second, point)
                }
            }

            // Only reached when nested inside another pattern, where no object space is
            // available.
            PatternKind::Blended { first, second } => self
                .color(first, point)
                .average_blend(&self.color(second, point)),
        }
    }

    fn color_local(&self, id: PatternId, object_point: &Point3<f32>) -> Color {
        let pattern = self.pattern(id);
        let pattern_point = object_point.invert(&pattern.transform);

        match pattern.kind {
            // Each side goes through its own transform, nested inside the blend's.
            PatternKind::Blended { first, second } => self
                .color_local(first, &pattern_point)
                .average_blend(&self.color_local(second, &pattern_point)),

            _ => self.color(id, &pattern_point),
        }
    }
}

/// Floors are whole numbers, so parity is exact. `rem_euclid` keeps negative cells alternating
/// with the same phase as positive ones.
#[inline]
fn is_even(floor: f32) -> bool {
    floor.rem_euclid(2.) == 0.
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::shape::Sphere;

    fn pt(x: f32, y: f32, z: f32) -> Point3<f32> {
        Point3::new(x, y, z)
    }

    fn two_tone(
        make: fn(&mut Patterns, PatternId, PatternId) -> Result<PatternId>,
    ) -> (Patterns, PatternId) {
        let mut pats = Patterns::new();
        let white = pats.solid(Color::white());
        let black = pats.solid(Color::black());
        let id = make(&mut pats, white, black).unwrap();
        (pats, id)
    }

    #[test]
    fn test_solid() {
        let mut pats = Patterns::new();
        let red = pats.solid(Color::new(1., 0., 0.));
        assert_eq!(pats.at(red, &pt(0., 0., 0.)).unwrap(), Color::new(1., 0., 0.));
        assert_eq!(pats.at(red, &pt(-7.5, 3., 100.)).unwrap(), Color::new(1., 0., 0.));
    }

    #[test]
    fn test_stripes() {
        let (pats, stripe) = two_tone(Patterns::stripe);
        let at = |x| pats.at(stripe, &pt(x, 0., 0.)).unwrap();
        assert_eq!(at(0.), Color::white());
        assert_eq!(at(0.9), Color::white());
        assert_eq!(at(1.), Color::black());
        assert_eq!(at(-0.1), Color::black());
        assert_eq!(at(-1.), Color::black());
        assert_eq!(at(-1.1), Color::white());
    }

    #[test]
    fn test_stripes_constant_in_y_and_z() {
        let (pats, stripe) = two_tone(Patterns::stripe);
        for p in [pt(0., 1., 0.), pt(0., 2., 0.), pt(0., 0., 1.), pt(0., 0., 2.)] {
            assert_eq!(pats.at(stripe, &p).unwrap(), Color::white());
        }
    }

    #[test]
    fn test_gradient() {
        let (pats, gradient) = two_tone(Patterns::gradient);
        let at = |x| pats.at(gradient, &pt(x, 0., 0.)).unwrap();
        assert_eq!(at(0.), Color::white());
        assert_relative_eq!(at(0.25), Color::new(0.75, 0.75, 0.75));
        assert_relative_eq!(at(0.5), Color::new(0.5, 0.5, 0.5));
        assert_relative_eq!(at(0.75), Color::new(0.25, 0.25, 0.25));

        // the blend restarts at every unit
        assert_relative_eq!(at(1.25), Color::new(0.75, 0.75, 0.75));
        assert_relative_eq!(at(-0.75), Color::new(0.75, 0.75, 0.75));
    }

    #[test]
    fn test_ring() {
        let (pats, ring) = two_tone(Patterns::ring);
        assert_eq!(pats.at(ring, &pt(0., 0., 0.)).unwrap(), Color::white());
        assert_eq!(pats.at(ring, &pt(1., 0., 0.)).unwrap(), Color::black());
        assert_eq!(pats.at(ring, &pt(0., 0., 1.)).unwrap(), Color::black());
        assert_eq!(pats.at(ring, &pt(0.708, 0., 0.708)).unwrap(), Color::black());
        assert_eq!(pats.at(ring, &pt(2., 5., 0.)).unwrap(), Color::white());
    }

    #[test]
    fn test_checker() {
        let (pats, checker) = two_tone(Patterns::checker);
        let at = |x, y, z| pats.at(checker, &pt(x, y, z)).unwrap();

        assert_eq!(at(0., 0., 0.), Color::white());
        assert_eq!(at(0.99, 0., 0.), Color::white());
        assert_eq!(at(1.01, 0., 0.), Color::black());

        assert_eq!(at(0., 0.99, 0.), Color::white());
        assert_eq!(at(0., 1.01, 0.), Color::black());

        assert_eq!(at(0., 0., 0.99), Color::white());
        assert_eq!(at(0., 0., 1.01), Color::black());

        assert_eq!(at(-0.5, 0., 0.), Color::black());
        assert_eq!(at(1.5, 1.5, 0.), Color::white());
    }

    #[test]
    fn test_nested_children() {
        let mut pats = Patterns::new();
        let white = pats.solid(Color::white());
        let black = pats.solid(Color::black());
        let red = pats.solid(Color::new(1., 0., 0.));
        let inner = pats.checker(white, black).unwrap();
        let outer = pats.stripe(inner, red).unwrap();

        assert_eq!(pats.at(outer, &pt(0.5, 0.5, 0.5)).unwrap(), Color::white());
        assert_eq!(pats.at(outer, &pt(0.5, 1.5, 0.5)).unwrap(), Color::black());
        assert_eq!(pats.at(outer, &pt(1.5, 0.5, 0.5)).unwrap(), Color::new(1., 0., 0.));
    }

    #[test]
    fn test_unknown_child() {
        let mut pats = Patterns::new();
        let white = pats.solid(Color::white());

        let mut other = Patterns::new();
        other.solid(Color::black());
        let foreign = other.solid(Color::black());

        assert_eq!(pats.stripe(white, foreign), Err(Error::UnknownPattern(1)));
        assert_eq!(pats.len(), 1);
    }

    #[test]
    fn test_default_transform() {
        let mut pats = Patterns::new();
        let white = pats.solid(Color::white());
        assert_eq!(pats.transform(white).unwrap(), &Transform::new());

        let t = Transform::new().translate(&Vector3::new(1., 2., 3.));
        pats.set_transform(white, t.clone()).unwrap();
        assert_eq!(pats.transform(white).unwrap(), &t);
    }

    #[test]
    fn test_rejects_singular_transform() {
        let mut pats = Patterns::new();
        let white = pats.solid(Color::white());
        let res = pats.set_transform(white, Transform::new().uniform_scale(0.));
        assert_eq!(res, Err(Error::SingularTransform));
        assert_eq!(pats.transform(white).unwrap(), &Transform::new());
    }

    #[test]
    fn test_object_transform() {
        let (pats, stripe) = two_tone(Patterns::stripe);
        let shape = Sphere::with_transform(Transform::new().uniform_scale(2.)).unwrap();
        assert_eq!(pats.at_object(stripe, &shape, &pt(1.5, 0., 0.)).unwrap(), Color::white());
    }

    #[test]
    fn test_pattern_transform() {
        let (mut pats, stripe) = two_tone(Patterns::stripe);
        pats.set_transform(stripe, Transform::new().uniform_scale(2.))
            .unwrap();
        let shape = Sphere::new();
        assert_eq!(pats.at_object(stripe, &shape, &pt(1.5, 0., 0.)).unwrap(), Color::white());
    }

    #[test]
    fn test_object_and_pattern_transform() {
        let (mut pats, stripe) = two_tone(Patterns::stripe);
        pats.set_transform(stripe, Transform::new().translate(&Vector3::new(0.5, 0., 0.)))
            .unwrap();
        let shape = Sphere::with_transform(Transform::new().uniform_scale(2.)).unwrap();
        // world 2.5 -> object 1.25 -> pattern 0.75
        assert_eq!(pats.at_object(stripe, &shape, &pt(2.5, 0., 0.)).unwrap(), Color::white());
        // world 3.5 -> object 1.75 -> pattern 1.25
        assert_eq!(pats.at_object(stripe, &shape, &pt(3.5, 0., 0.)).unwrap(), Color::black());
    }

    #[test]
    fn test_blended_uses_both_children() {
        let mut pats = Patterns::new();
        let white = pats.solid(Color::white());
        let black = pats.solid(Color::black());
        let red = pats.solid(Color::new(1., 0., 0.));
        let stripes = pats.stripe(white, black).unwrap();
        let blend = pats.blended(stripes, red).unwrap();

        let shape = Sphere::new();
        assert_relative_eq!(
            pats.at_object(blend, &shape, &pt(0.5, 0., 0.)).unwrap(),
            Color::new(1., 0.5, 0.5)
        );
        assert_relative_eq!(
            pats.at_object(blend, &shape, &pt(1.5, 0., 0.)).unwrap(),
            Color::new(0.5, 0., 0.)
        );
    }

    #[test]
    fn test_blended_children_keep_their_transforms() {
        let mut pats = Patterns::new();
        let white = pats.solid(Color::white());
        let black = pats.solid(Color::black());
        let vertical = pats.stripe(white, black).unwrap();
        let horizontal = pats.stripe(white, black).unwrap();
        pats.set_transform(
            horizontal,
            Transform::new().rotate(&Vector3::new(0., std::f32::consts::FRAC_PI_2, 0.)),
        )
        .unwrap();
        let blend = pats.blended(vertical, horizontal).unwrap();

        let shape = Sphere::new();
        let at = |x, z| pats.at_object(blend, &shape, &pt(x, 0., z)).unwrap();

        // the rotated child sees pattern-space x = -z
        assert_relative_eq!(at(0.5, -0.5), Color::white());
        assert_relative_eq!(at(1.5, -1.5), Color::black());
        assert_relative_eq!(at(0.5, -1.5), Color::new(0.5, 0.5, 0.5));
        assert_relative_eq!(at(1.5, -0.5), Color::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_blended_nested_at() {
        let mut pats = Patterns::new();
        let white = pats.solid(Color::white());
        let black = pats.solid(Color::black());
        let blend = pats.blended(white, black).unwrap();
        assert_relative_eq!(pats.at(blend, &pt(3., 1., 2.)).unwrap(), Color::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_evaluating_unknown_id() {
        let mut pats = Patterns::new();
        pats.solid(Color::white());

        let mut other = Patterns::new();
        for _ in 0..5 {
            other.solid(Color::black());
        }
        let foreign = other.solid(Color::black());

        let shape = Sphere::new();
        assert_eq!(pats.at(foreign, &pt(0., 0., 0.)), Err(Error::UnknownPattern(5)));
        assert_eq!(
            pats.at_object(foreign, &shape, &pt(0., 0., 0.)),
            Err(Error::UnknownPattern(5))
        );
    }

    #[test]
    fn test_blended_own_transform() {
        let mut pats = Patterns::new();
        let white = pats.solid(Color::white());
        let black = pats.solid(Color::black());
        let red = pats.solid(Color::new(1., 0., 0.));
        let blue = pats.solid(Color::new(0., 0., 1.));

        let fine = pats.stripe(white, black).unwrap();
        pats.set_transform(fine, Transform::new().uniform_scale(0.5))
            .unwrap();
        let coarse = pats.stripe(red, blue).unwrap();
        let blend = pats.blended(fine, coarse).unwrap();
        pats.set_transform(blend, Transform::new().translate(&Vector3::new(1., 0., 0.)))
            .unwrap();

        let shape = Sphere::with_transform(Transform::new().uniform_scale(2.)).unwrap();
        let at = |x| pats.at_object(blend, &shape, &pt(x, 0., 0.)).unwrap();

        // world 2.6 -> object 1.3 -> blend 0.3 -> fine 0.6 (white), coarse 0.3 (red)
        assert_relative_eq!(at(2.6), Color::new(1., 0.5, 0.5), epsilon = 1e-6);
        // world 3.2 -> object 1.6 -> blend 0.6 -> fine 1.2 (black), coarse 0.6 (red)
        assert_relative_eq!(at(3.2), Color::new(0.5, 0., 0.), epsilon = 1e-6);
        // world 1.6 -> object 0.8 -> blend -0.2 -> fine -0.4 (black), coarse -0.2 (blue)
        assert_relative_eq!(at(1.6), Color::new(0., 0., 0.5), epsilon = 1e-6);
    }
}
