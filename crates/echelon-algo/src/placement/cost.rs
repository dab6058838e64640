//! Concave reference cost and its tangent lines.
//!
//! The safety stock a stage must hold grows with the square root of its net
//! replenishment period. The solver never sees that function directly; it
//! only sees tangent lines, which upper-bound a concave function everywhere.

use serde::Serialize;

/// Slope returned for a tangent taken at zero, where the square root has an
/// infinite derivative.
pub const DEGENERATE_SLOPE: f64 = -9999.0;

/// Decimals kept for tangent evaluation points and true-cost arguments.
pub const TANGENT_DECIMALS: i32 = 3;

/// Decimals kept when net replenishment periods are read back from a solve.
pub const SOLUTION_DECIMALS: i32 = 6;

/// Round half away from zero to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Affine surrogate `slope · x + indicator · intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tangent {
    pub slope: f64,
    pub intercept: f64,
}

impl Tangent {
    /// Sentinel used at `x = 0`. With a zero argument and a zero intercept the
    /// surrogate is zero whatever the indicator says, matching `f(0) = 0`.
    pub const DEGENERATE: Tangent = Tangent {
        slope: DEGENERATE_SLOPE,
        intercept: 0.0,
    };

    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Value of the surrogate for a net replenishment period and indicator.
    #[inline]
    pub fn evaluate(&self, x: f64, indicator: f64) -> f64 {
        self.slope * x + indicator * self.intercept
    }

    pub fn is_degenerate(&self) -> bool {
        self.slope == DEGENERATE_SLOPE && self.intercept == 0.0
    }
}

/// A concave, non-decreasing cost with `f(0) = 0`.
///
/// Implementations only provide the value and the derivative; the tangent
/// rule (including the degenerate point) is shared.
pub trait ConcaveCost: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs and reports (e.g., "sqrt")
    fn id(&self) -> &str;

    fn evaluate(&self, x: f64) -> f64;

    /// Derivative for `x > 0`.
    fn derivative(&self, x: f64) -> f64;

    /// First-order expansion of the cost at `x`.
    ///
    /// Non-positive arguments return [`Tangent::DEGENERATE`].
    fn tangent(&self, x: f64) -> Tangent {
        if x <= 0.0 {
            return Tangent::DEGENERATE;
        }
        let slope = self.derivative(x);
        Tangent::new(slope, self.evaluate(x) - slope * x)
    }
}

/// `f(x) = √x`, the safety-stock cost under normally distributed demand.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquareRoot;

impl ConcaveCost for SquareRoot {
    fn id(&self) -> &str {
        "sqrt"
    }

    /// Negative periods hold no stock.
    fn evaluate(&self, x: f64) -> f64 {
        x.max(0.0).sqrt()
    }

    fn derivative(&self, x: f64) -> f64 {
        0.5 / x.sqrt()
    }

    fn tangent(&self, x: f64) -> Tangent {
        if x <= 0.0 {
            return Tangent::DEGENERATE;
        }
        Tangent::new(self.derivative(x), 0.5 * x.sqrt())
    }
}
