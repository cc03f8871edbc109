use crate::Affine;

/// Axis-aligned bounding box in board units. The default value is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[must_use]
    pub fn from_points<I: IntoIterator<Item = [f64; 2]>>(points: I) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.include_point(p);
        }
        b
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    pub fn include_point(&mut self, p: [f64; 2]) {
        if !(p[0].is_finite() && p[1].is_finite()) {
            return;
        }
        self.min_x = self.min_x.min(p[0]);
        self.min_y = self.min_y.min(p[1]);
        self.max_x = self.max_x.max(p[0]);
        self.max_y = self.max_y.max(p[1]);
    }

    pub fn include(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.include_point([other.min_x, other.min_y]);
        self.include_point([other.max_x, other.max_y]);
    }

    #[must_use]
    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut out = *self;
        out.include(other);
        out
    }

    /// Grow on every side by `by`. Empty bounds stay empty.
    #[must_use]
    pub fn expand(&self, by: f64) -> Bounds {
        if self.is_empty() {
            return *self;
        }
        Bounds::new(
            self.min_x - by,
            self.min_y - by,
            self.max_x + by,
            self.max_y + by,
        )
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    #[must_use]
    pub fn center(&self) -> [f64; 2] {
        [
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        ]
    }

    /// Bounds of the four transformed corners.
    #[must_use]
    pub fn transformed(&self, tf: &Affine) -> Bounds {
        if self.is_empty() {
            return *self;
        }
        Bounds::from_points([
            tf.apply([self.min_x, self.min_y]),
            tf.apply([self.max_x, self.min_y]),
            tf.apply([self.max_x, self.max_y]),
            tf.apply([self.min_x, self.max_y]),
        ])
    }
}
