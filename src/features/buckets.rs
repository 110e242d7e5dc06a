//! Labelled numeric bins. Edges are part of the output contract.

/// Which end of each interval is inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Closed {
    /// `(lower, upper]`
    Right,
    /// `[lower, upper)`
    Left,
}

/// Ordered `(upper edge, value)` pairs scanned in ascending order. The
/// first interval starts at `floor`.
#[derive(Debug)]
pub struct Bins<T: 'static> {
    pub floor: f64,
    pub edges: &'static [(f64, T)],
    pub closed: Closed,
}

impl<T: Copy> Bins<T> {
    /// Value of the bin containing `x`, or `None` when `x` is outside every bin.
    pub fn classify(&self, x: f64) -> Option<T> {
        if x.is_nan() {
            return None;
        }
        let mut lower = self.floor;
        for &(upper, value) in self.edges {
            let inside = match self.closed {
                Closed::Right => x > lower && x <= upper,
                Closed::Left => x >= lower && x < upper,
            };
            if inside {
                return Some(value);
            }
            lower = upper;
        }
        None
    }
}

pub const AGE_FLOOR: f64 = 17.0;
pub const AGE_CEILING: f64 = 100.0;

pub const AGE_BUCKETS: Bins<&str> = Bins {
    floor: AGE_FLOOR,
    edges: &[
        (25.0, "18-25 (Joven)"),
        (35.0, "26-35 (Adulto Joven)"),
        (50.0, "36-50 (Adulto)"),
        (AGE_CEILING, "50+ (Senior)"),
    ],
    closed: Closed::Right,
};

pub const SCORE_CATEGORIES: Bins<&str> = Bins {
    floor: 299.0,
    edges: &[
        (500.0, "Muy Alto Riesgo (300-500)"),
        (600.0, "Alto Riesgo (501-600)"),
        (700.0, "Riesgo Medio (601-700)"),
        (850.0, "Bajo Riesgo (701-850)"),
    ],
    closed: Closed::Right,
};

pub const AMOUNT_BUCKETS: Bins<&str> = Bins {
    floor: 0.0,
    edges: &[
        (1_000.0, "Micro (<1K)"),
        (3_000.0, "Pequeño (1K-3K)"),
        (5_000.0, "Mediano (3K-5K)"),
        (10_000.0, "Grande (5K-10K)"),
        (f64::INFINITY, "Muy Grande (>10K)"),
    ],
    closed: Closed::Left,
};

/// Score points by amount-to-duration ratio.
pub const RATIO_POINTS: Bins<f64> = Bins {
    floor: 0.0,
    edges: &[
        (100.0, 50.0),
        (200.0, 20.0),
        (500.0, -10.0),
        (f64::INFINITY, -40.0),
    ],
    closed: Closed::Left,
};
