//! Breakpoint curves and the tunable sigmoid shaping function.

// -------------------------------------------------------------------------------------------------

/// Maximum number of breakpoints a [`Curve`] can hold.
pub const MAX_CURVE_POINTS: usize = 64;

// -------------------------------------------------------------------------------------------------

/// Tunable sigmoid: reshapes a normalized value `x` with the shape parameter `k`.
///
/// `k` is clamped to range [-1.0, 1.0]:
/// - `k = 0.0` is linear (identity),
/// - `k > 0.0` stays flat and then accelerates (exponential like),
/// - `k < 0.0` rises quickly and then flattens (logarithmic like).
///
/// `shaped(0, k) == 0` and `shaped(1, k) == 1` for all valid `k`.
///
/// Grain windows, ADSR stages and curve segments are all shaped with this function.
#[inline]
pub fn tunable_sigmoid(x: f32, k: f32) -> f32 {
    let k = k.clamp(-1.0, 1.0);
    let denominator = k - 2.0 * k * x.abs() + 1.0;
    if denominator == 0.0 {
        // k = -1 at x = 0 or k = 1 at |x| = 1
        return x;
    }
    (x - k * x) / denominator
}

/// Linear interpolation from `a` to `b` by `t`.
#[inline(always)]
pub(crate) fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// -------------------------------------------------------------------------------------------------

/// A single breakpoint of a [`Curve`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Value at this point.
    pub value: f32,
    /// Normalized time of this point.
    pub time: f64,
    /// Shape of the segment which starts at this point, see [`tunable_sigmoid`].
    /// Clamped to [-1.0, 1.0] when evaluating.
    pub slope: f32,
}

impl CurvePoint {
    pub const fn new(value: f32, time: f64, slope: f32) -> Self {
        Self { value, time, slope }
    }
}

// -------------------------------------------------------------------------------------------------

/// A fixed capacity set of breakpoints, sorted by time, with per segment shaping.
///
/// Curves never allocate: points live in a fixed size array of [`MAX_CURVE_POINTS`] entries.
/// Adding points to a full curve or modifying points at invalid indices silently does nothing.
#[derive(Debug, Clone)]
pub struct Curve {
    points: [CurvePoint; MAX_CURVE_POINTS],
    len: usize,
}

impl Default for Curve {
    fn default() -> Self {
        Self::new()
    }
}

impl Curve {
    /// Create a new, empty curve. Empty curves evaluate to 1.0.
    pub const fn new() -> Self {
        Self {
            points: [CurvePoint::new(0.0, 0.0, 0.0); MAX_CURVE_POINTS],
            len: 0,
        }
    }

    /// Create the breakpoint representation of a grain's amplitude window with the given
    /// smoothness in range [0.0, 1.0].
    ///
    /// Matches the inline window which grains apply, so it can e.g. be used to draw grain
    /// windows in UIs.
    pub fn grain_window(smoothness: f32) -> Self {
        let factor = (smoothness.clamp(0.0, 1.0) * 0.5) as f64;
        let mut curve = Self::new();
        if factor > 0.0 {
            curve.add_point(0.0, 0.0, -0.5);
            curve.add_point(1.0, factor, 0.0);
            curve.add_point(1.0, 1.0 - factor, -0.5);
            curve.add_point(0.01, 1.0, 0.0);
        } else {
            curve.add_point(1.0, 0.0, 0.0);
        }
        curve
    }

    /// Number of points in the curve.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the curve has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Access to all points, sorted by time.
    #[inline]
    pub fn points(&self) -> &[CurvePoint] {
        &self.points[..self.len]
    }

    /// Insert a new point. Does nothing when the curve is full.
    pub fn add_point(&mut self, value: f32, time: f64, slope: f32) {
        if self.len >= MAX_CURVE_POINTS {
            return;
        }
        self.points[self.len] = CurvePoint::new(value, time, slope);
        self.len += 1;
        self.sort();
    }

    /// Overwrite the point at the given index. Does nothing when the index is invalid.
    pub fn set_point(&mut self, index: usize, value: f32, time: f64, slope: f32) {
        if index >= self.len {
            return;
        }
        self.points[index] = CurvePoint::new(value, time, slope);
        self.sort();
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Evaluate the curve at the given normalized time.
    ///
    /// Times before the first or after the last point return the first or last point's value.
    pub fn evaluate(&self, time: f64) -> f32 {
        let points = self.points();
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return 1.0;
        };
        if time < first.time {
            return first.value;
        } else if time >= last.time {
            return last.value;
        }
        for segment in points.windows(2) {
            let (a, b) = (&segment[0], &segment[1]);
            if time >= a.time && time < b.time {
                let fraction = ((time - a.time) / (b.time - a.time)) as f32;
                return mix(a.value, b.value, tunable_sigmoid(fraction, a.slope));
            }
        }
        // unreachable with sorted points, but avoid panicking on NaN times
        last.value
    }

    fn sort(&mut self) {
        // stable insertion sort: keeps insertion order of points with equal times
        // and does not allocate.
        let points = &mut self.points[..self.len];
        for i in 1..points.len() {
            let mut j = i;
            while j > 0 && points[j - 1].time > points[j].time {
                points.swap(j - 1, j);
                j -= 1;
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------
