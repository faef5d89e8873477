//! Polynomials in time
//!
//! Trajectories, rotation angles and collision equations are all polynomials in
//! `t`, so "when does the ball touch this edge" becomes "where does this
//! polynomial cross zero". Coefficients are stored lowest power first.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// Trailing coefficients at or below this magnitude are dropped by [`Polynom::reduce`]
pub const REDUCE_EPSILON: f64 = 1e-12;

/// A critical point this close to zero (relative to the coefficient scale) is a double root
const TOUCH_EPSILON: f64 = 1e-10;

/// Roots closer than this are merged
const ROOT_MERGE_EPSILON: f64 = 1e-9;

const BISECT_MAX_STEPS: usize = 200;

/// A real polynomial `c0 + c1*t + c2*t^2 + ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynom {
    #[serde(alias = "koefs")]
    coefs: Vec<f64>,
}

/// Options for [`Polynom::find_roots`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RootQuery {
    /// Only roots inside this range are accepted
    pub range: Option<Interval>,
    /// Return at most the smallest accepted root
    pub smallest: bool,
    /// Use numeric isolation even for degree 1 and 2
    pub numeric: bool,
}

impl RootQuery {
    /// The earliest root inside `range`
    pub fn earliest(range: Interval) -> Self {
        Self {
            range: Some(range),
            smallest: true,
            numeric: false,
        }
    }

    /// Every root inside `range`, ascending
    pub fn all(range: Interval) -> Self {
        Self {
            range: Some(range),
            smallest: false,
            numeric: false,
        }
    }
}

impl Default for Polynom {
    fn default() -> Self {
        Self::zero()
    }
}

impl Polynom {
    pub fn new(coefs: Vec<f64>) -> Self {
        if coefs.is_empty() {
            return Self::zero();
        }
        Self { coefs }
    }

    pub fn zero() -> Self {
        Self { coefs: vec![0.0] }
    }

    pub fn constant(c: f64) -> Self {
        Self { coefs: vec![c] }
    }

    /// The polynomial `t`
    pub fn identity() -> Self {
        Self {
            coefs: vec![0.0, 1.0],
        }
    }

    /// `t + offset`, used to shift a polynomial's time origin via [`Polynom::compose`]
    pub fn shift(offset: f64) -> Self {
        Self {
            coefs: vec![offset, 1.0],
        }
    }

    pub fn coefs(&self) -> &[f64] {
        &self.coefs
    }

    /// Copy with near-zero trailing coefficients removed
    pub fn reduce(&self) -> Polynom {
        let end = self
            .coefs
            .iter()
            .rposition(|c| c.abs() > REDUCE_EPSILON)
            .map_or(1, |i| i + 1);
        Polynom::new(self.coefs[..end].to_vec())
    }

    /// Degree after trimming near-zero trailing coefficients
    pub fn degree(&self) -> usize {
        self.coefs
            .iter()
            .rposition(|c| c.abs() > REDUCE_EPSILON)
            .unwrap_or(0)
    }

    pub fn is_finite(&self) -> bool {
        self.coefs.iter().all(|c| c.is_finite())
    }

    /// Evaluate at `t` (Horner)
    pub fn eval(&self, t: f64) -> f64 {
        self.coefs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }

    /// Substitute another polynomial for `t`: `self(inner(t))`
    pub fn compose(&self, inner: &Polynom) -> Polynom {
        let mut coefs = self.coefs.iter().rev();
        let mut result = Polynom::constant(coefs.next().copied().unwrap_or(0.0));
        for &c in coefs {
            result = &(&result * inner) + c;
        }
        result
    }

    /// Term-wise derivative
    pub fn deriv(&self) -> Polynom {
        if self.coefs.len() < 2 {
            return Polynom::zero();
        }
        Polynom::new(
            self.coefs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(exp, c)| c * exp as f64)
                .collect(),
        )
    }

    pub fn scale(&self, factor: f64) -> Polynom {
        Polynom::new(self.coefs.iter().map(|c| c * factor).collect())
    }

    /// Non-negative integer power by repeated squaring
    pub fn pow(&self, exp: u32) -> Polynom {
        let mut result = Polynom::constant(1.0);
        let mut base = self.clone();
        let mut exp = exp;
        while exp > 0 {
            if exp & 1 == 1 {
                result = &result * &base;
            }
            exp >>= 1;
            if exp > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// Find the real roots of the polynomial.
    ///
    /// Degree 0 has no roots, degree 1 and 2 are solved in closed form, anything
    /// higher (or `query.numeric`) goes through numeric root isolation. Roots are
    /// then restricted to `query.range`, passed through `filter` in ascending
    /// order, and truncated to the first accepted one if `query.smallest`.
    /// Degenerate input never panics, it just yields no roots.
    pub fn find_roots<F>(&self, query: &RootQuery, filter: F) -> Vec<f64>
    where
        F: Fn(f64) -> bool,
    {
        if !self.is_finite() {
            return Vec::new();
        }
        let p = self.reduce();
        let mut roots = match p.degree() {
            0 => return Vec::new(),
            1 | 2 if !query.numeric => p.closed_form_roots(),
            _ => p.real_roots(query.range.unwrap_or_else(Interval::everything)),
        };
        roots.retain(|t| t.is_finite());
        roots.sort_by(f64::total_cmp);

        let accepted = roots
            .into_iter()
            .filter(|&t| query.range.is_none_or(|r| r.contains(t)))
            .filter(|&t| filter(t));
        if query.smallest {
            accepted.take(1).collect()
        } else {
            accepted.collect()
        }
    }

    /// Roots of a reduced polynomial of degree 1 or 2
    fn closed_form_roots(&self) -> Vec<f64> {
        match self.degree() {
            1 => vec![-self.coefs[0] / self.coefs[1]],
            2 => {
                let (c, b, a) = (self.coefs[0], self.coefs[1], self.coefs[2]);
                let disc = b * b - 4.0 * a * c;
                if disc < 0.0 {
                    return Vec::new();
                }
                let root = disc.sqrt();
                // Numerically stable form, avoids cancellation in -b ± root
                let q = -0.5 * (b + b.signum() * root);
                if q == 0.0 {
                    return vec![0.0, 0.0];
                }
                let mut roots = vec![q / a, c / q];
                roots.sort_by(f64::total_cmp);
                roots
            }
            _ => Vec::new(),
        }
    }

    /// Cauchy bound: every real root lies in `[-bound, bound]`
    fn root_bound(&self) -> f64 {
        let n = self.degree();
        let lead = self.coefs[n];
        1.0 + self.coefs[..n]
            .iter()
            .map(|c| (c / lead).abs())
            .fold(0.0, f64::max)
    }

    /// All real roots inside `range` by recursive derivative bracketing.
    ///
    /// The critical points (roots of the derivative) split the search range into
    /// monotone pieces; each piece holds at most one root, found by bisection.
    fn real_roots(&self, range: Interval) -> Vec<f64> {
        let bound = self.root_bound();
        let lo = range.min.max(-bound);
        let hi = range.max.min(bound);
        if !(lo <= hi) {
            return Vec::new();
        }
        self.isolate(lo, hi)
    }

    fn isolate(&self, lo: f64, hi: f64) -> Vec<f64> {
        let p = self.reduce();
        let degree = p.degree();
        if degree == 0 {
            return Vec::new();
        }
        if degree <= 2 {
            return p
                .closed_form_roots()
                .into_iter()
                .filter(|t| (lo..=hi).contains(t))
                .collect();
        }

        let critical = p.deriv().isolate(lo, hi);
        let mut knots = Vec::with_capacity(critical.len() + 2);
        knots.push(lo);
        knots.extend(critical.iter().copied().filter(|&c| c > lo && c < hi));
        knots.push(hi);

        let mut roots = Vec::new();
        for w in knots.windows(2) {
            let (a, b) = (w[0], w[1]);
            let (fa, fb) = (p.eval(a), p.eval(b));
            if fa == 0.0 {
                roots.push(a);
            } else if fb != 0.0 && fa.signum() != fb.signum() {
                roots.push(p.bisect(a, b, fa));
            }
        }
        if p.eval(hi) == 0.0 {
            roots.push(hi);
        }

        // Touching roots: the polynomial grazes zero at a critical point without a sign change
        let scale = p.coefs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        for &c in &critical {
            if p.eval(c).abs() <= TOUCH_EPSILON * scale.max(1.0) {
                roots.push(c);
            }
        }

        roots.sort_by(f64::total_cmp);
        roots.dedup_by(|a, b| (*a - *b).abs() <= ROOT_MERGE_EPSILON * (1.0 + b.abs()));
        roots
    }

    /// Bisection on `[a, b]` where `p(a)` and `p(b)` differ in sign
    fn bisect(&self, mut a: f64, mut b: f64, fa: f64) -> f64 {
        let sign_a = fa.signum();
        for _ in 0..BISECT_MAX_STEPS {
            let mid = 0.5 * (a + b);
            if mid <= a || mid >= b {
                break;
            }
            let fm = self.eval(mid);
            if fm == 0.0 {
                return mid;
            }
            if fm.signum() == sign_a {
                a = mid;
            } else {
                b = mid;
            }
        }
        0.5 * (a + b)
    }
}

impl fmt::Display for Polynom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .coefs
            .iter()
            .enumerate()
            .map(|(i, c)| match i {
                0 => format!("{c}"),
                1 => format!("{c}*t"),
                _ => format!("{c}*t^{i}"),
            })
            .collect();
        write!(f, "{}", terms.join(" + "))
    }
}

impl Add<&Polynom> for &Polynom {
    type Output = Polynom;

    fn add(self, other: &Polynom) -> Polynom {
        let (long, short) = if self.coefs.len() >= other.coefs.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut coefs = long.coefs.clone();
        for (c, s) in coefs.iter_mut().zip(&short.coefs) {
            *c += s;
        }
        Polynom::new(coefs)
    }
}

impl Add<f64> for &Polynom {
    type Output = Polynom;

    fn add(self, other: f64) -> Polynom {
        let mut coefs = self.coefs.clone();
        coefs[0] += other;
        Polynom::new(coefs)
    }
}

impl Neg for &Polynom {
    type Output = Polynom;

    fn neg(self) -> Polynom {
        self.scale(-1.0)
    }
}

impl Sub<&Polynom> for &Polynom {
    type Output = Polynom;

    fn sub(self, other: &Polynom) -> Polynom {
        self + &(-other)
    }
}

impl Sub<f64> for &Polynom {
    type Output = Polynom;

    fn sub(self, other: f64) -> Polynom {
        self + (-other)
    }
}

impl Mul<f64> for &Polynom {
    type Output = Polynom;

    fn mul(self, other: f64) -> Polynom {
        self.scale(other)
    }
}

/// Coefficient convolution
impl Mul<&Polynom> for &Polynom {
    type Output = Polynom;

    fn mul(self, other: &Polynom) -> Polynom {
        let mut coefs = vec![0.0; self.coefs.len() + other.coefs.len() - 1];
        for (i, a) in self.coefs.iter().enumerate() {
            if *a == 0.0 {
                continue;
            }
            for (j, b) in other.coefs.iter().enumerate() {
                coefs[i + j] += a * b;
            }
        }
        Polynom::new(coefs)
    }
}

// Owned operands forward to the borrowed implementations
macro_rules! forward_owned {
    ($($op:ident :: $method:ident),*) => {$(
        impl $op<Polynom> for Polynom {
            type Output = Polynom;

            fn $method(self, other: Polynom) -> Polynom {
                $op::$method(&self, &other)
            }
        }

        impl $op<&Polynom> for Polynom {
            type Output = Polynom;

            fn $method(self, other: &Polynom) -> Polynom {
                $op::$method(&self, other)
            }
        }

        impl $op<f64> for Polynom {
            type Output = Polynom;

            fn $method(self, other: f64) -> Polynom {
                $op::$method(&self, other)
            }
        }
    )*};
}

forward_owned!(Add::add, Sub::sub, Mul::mul);

impl Neg for Polynom {
    type Output = Polynom;

    fn neg(self) -> Polynom {
        -&self
    }
}
