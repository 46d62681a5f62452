//! Bilinear interpolation over a rectangular, non-uniform grid
//!
//! Samples are known on the Cartesian product of two ascending index lists.
//! Query points between grid lines blend the four surrounding samples;
//! points outside the grid span evaluate to 0.

/// Position of a query index relative to one ascending axis
#[derive(Debug, Clone, Copy, PartialEq)]
enum AxisPos {
    /// Between `axis[lo]` and `axis[lo + 1]`, weight `w` on the upper one
    Inside { lo: usize, w: f64 },
    Outside,
}

fn locate(axis: &[usize], x: usize) -> AxisPos {
    match axis {
        [] => AxisPos::Outside,
        [only] if x == *only => AxisPos::Inside { lo: 0, w: 0.0 },
        [_] => AxisPos::Outside,
        _ => {
            let last = axis.len() - 1;
            if x < axis[0] || x > axis[last] {
                return AxisPos::Outside;
            }
            // First grid line strictly above x, clamped to the last segment
            let hi = axis.partition_point(|&a| a <= x).clamp(1, last);
            let lo = hi - 1;
            let w = (x - axis[lo]) as f64 / (axis[hi] - axis[lo]) as f64;
            AxisPos::Inside { lo, w }
        }
    }
}

/// Bilinear interpolator over grid rows `rows` × columns `cols`
pub struct GridInterpolator<'a> {
    rows: &'a [usize],
    cols: &'a [usize],
    /// Row-major samples, `rows.len() × cols.len()`
    values: &'a [f64],
}

impl<'a> GridInterpolator<'a> {
    pub fn new(rows: &'a [usize], cols: &'a [usize], values: &'a [f64]) -> Self {
        debug_assert_eq!(values.len(), rows.len() * cols.len());
        Self { rows, cols, values }
    }

    #[inline]
    fn at(&self, r: usize, c: usize) -> f64 {
        self.values[r * self.cols.len() + c]
    }

    /// Interpolated value at integer position `(t, f)`
    pub fn eval(&self, t: usize, f: usize) -> f64 {
        let (AxisPos::Inside { lo: r, w: wr }, AxisPos::Inside { lo: c, w: wc }) =
            (locate(self.rows, t), locate(self.cols, f))
        else {
            return 0.0;
        };

        // Degenerate axes carry a single line and zero weight
        let r1 = (r + 1).min(self.rows.len() - 1);
        let c1 = (c + 1).min(self.cols.len() - 1);

        let top = self.at(r, c) * (1.0 - wc) + self.at(r, c1) * wc;
        let bottom = self.at(r1, c) * (1.0 - wc) + self.at(r1, c1) * wc;
        top * (1.0 - wr) + bottom * wr
    }
}
