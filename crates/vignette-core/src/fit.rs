//! Fitting a loaded model into a unit-ish bounding volume

/// Axis-aligned bounds in model space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    /// Bounds containing nothing; any included point replaces it
    pub fn empty() -> Self {
        Self {
            min: [f32::MAX; 3],
            max: [f32::MIN; 3],
        }
    }

    pub fn from_points<I: IntoIterator<Item = [f32; 3]>>(points: I) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.include_point(p);
        }
        bounds
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    pub fn include_point(&mut self, p: [f32; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    pub fn union(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.include_point(other.min);
        self.include_point(other.max);
    }

    pub fn size(&self) -> [f32; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn center(&self) -> [f32; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    pub fn max_dimension(&self) -> f32 {
        let [x, y, z] = self.size();
        x.max(y).max(z)
    }
}

/// Uniform scale plus translation that centers a model on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub scale: f32,
    pub translation: [f32; 3],
}

impl Default for FitTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl FitTransform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            translation: [0.0; 3],
        }
    }

    /// Scale so the largest dimension equals `fit_size`, then center on the origin.
    /// Empty or flat-to-a-point bounds leave the model untouched.
    pub fn for_bounds(bounds: &Bounds, fit_size: f32) -> Self {
        let max_dim = bounds.max_dimension();
        if bounds.is_empty() || !max_dim.is_finite() || max_dim <= f32::EPSILON {
            return Self::identity();
        }

        let scale = fit_size / max_dim;
        let c = bounds.center();
        Self {
            scale,
            translation: [-c[0] * scale, -c[1] * scale, -c[2] * scale],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn fitted(fit: &FitTransform, p: [f32; 3]) -> [f32; 3] {
        [
            p[0] * fit.scale + fit.translation[0],
            p[1] * fit.scale + fit.translation[1],
            p[2] * fit.scale + fit.translation[2],
        ]
    }

    #[test]
    fn test_bounds_from_points() {
        let b = Bounds::from_points([[1.0, -2.0, 0.5], [3.0, 2.0, -0.5], [2.0, 0.0, 0.0]]);
        assert_eq!(b.min, [1.0, -2.0, -0.5]);
        assert_eq!(b.max, [3.0, 2.0, 0.5]);
        assert_eq!(b.size(), [2.0, 4.0, 1.0]);
        assert_eq!(b.center(), [2.0, 0.0, 0.0]);
        assert_eq!(b.max_dimension(), 4.0);
    }

    #[test]
    fn test_union_ignores_empty() {
        let mut b = Bounds::from_points([[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        b.union(&Bounds::empty());
        assert_eq!(b.max, [1.0, 1.0, 1.0]);

        b.union(&Bounds::from_points([[-1.0, 0.5, 4.0]]));
        assert_eq!(b.min, [-1.0, 0.0, 0.0]);
        assert_eq!(b.max, [1.0, 1.0, 4.0]);
    }

    #[test]
    fn test_fit_scales_largest_dimension() {
        // 10 x 4 x 2 room offset from the origin
        let b = Bounds::from_points([[10.0, 0.0, 0.0], [20.0, 4.0, 2.0]]);
        let fit = FitTransform::for_bounds(&b, 0.7);
        assert!(approx(fit.scale, 0.07));

        let lo = fitted(&fit, b.min);
        let hi = fitted(&fit, b.max);
        assert!(approx(hi[0] - lo[0], 0.7));

        // Center maps to the origin
        let c = fitted(&fit, b.center());
        assert!(c.iter().all(|v| approx(*v, 0.0)));
    }

    #[test]
    fn test_degenerate_bounds_are_identity() {
        assert_eq!(FitTransform::for_bounds(&Bounds::empty(), 0.7), FitTransform::identity());

        let point = Bounds::from_points([[3.0, 3.0, 3.0]]);
        assert_eq!(FitTransform::for_bounds(&point, 0.7), FitTransform::identity());
    }
}
