//! Truncated sine/cosine series for rotating trajectories
//!
//! A ball trajectory rotated by a time-varying angle is only a polynomial if the
//! rotation itself is, so sin/cos are replaced by their Maclaurin polynomials.
//! The truncation error of an `order`-term series at angle `x` is bounded by
//! `|x|^order / order!`; [`TaylorSeries::window`] is the largest `|x|` for which
//! that stays below the configured tolerance.

use super::polynom::Polynom;

/// Maclaurin polynomial of `sin` with powers `0..order`
pub fn sin_taylor(order: usize) -> Polynom {
    series(order, |n| match n % 4 {
        1 => 1.0,
        3 => -1.0,
        _ => 0.0,
    })
}

/// Maclaurin polynomial of `cos` with powers `0..order`
pub fn cos_taylor(order: usize) -> Polynom {
    series(order, |n| match n % 4 {
        0 => 1.0,
        2 => -1.0,
        _ => 0.0,
    })
}

fn series(order: usize, sign: impl Fn(usize) -> f64) -> Polynom {
    let mut factorial = 1.0;
    let coefs = (0..order.max(1))
        .map(|n| {
            if n > 0 {
                factorial *= n as f64;
            }
            sign(n) / factorial
        })
        .collect();
    Polynom::new(coefs)
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

/// Precomputed sin/cos series plus the angle window inside which they are accurate
#[derive(Debug, Clone)]
pub struct TaylorSeries {
    order: usize,
    tolerance: f64,
    window: f64,
    sin: Polynom,
    cos: Polynom,
}

impl TaylorSeries {
    pub fn new(order: usize, tolerance: f64) -> Self {
        let order = order.max(2);
        let window = (tolerance * factorial(order)).powf(1.0 / order as f64);
        Self {
            order,
            tolerance,
            window,
            sin: sin_taylor(order),
            cos: cos_taylor(order),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Largest angle magnitude (radians) the series approximates within tolerance
    pub fn window(&self) -> f64 {
        self.window
    }

    pub fn sin(&self) -> &Polynom {
        &self.sin
    }

    pub fn cos(&self) -> &Polynom {
        &self.cos
    }
}

impl Default for TaylorSeries {
    fn default() -> Self {
        Self::new(crate::consts::TAYLOR_ORDER, crate::consts::TAYLOR_TOLERANCE)
    }
}
