//! Autoregressive-integrated forecasting model, order (p, d, 0).
//!
//! The model differences the series `d` times, then fits `p`
//! autoregressive coefficients by conditional least squares on the lag
//! matrix. The moving-average order is fixed at zero; the traffic
//! detector never uses MA terms.
//!
//! Following the usual convention for differenced fits, a constant term
//! is estimated only when `d == 0`.

use crate::analysis::error::DetectError;

const MAX_AR_LAGS: usize = 10;
const MAX_DIFFERENCING: usize = 2;

/// Near-zero guard for variance and pivot checks
const EPS: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct Arima {
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// AR coefficients on the differenced scale
    coeffs: Vec<f64>,
    /// Constant term (zero unless d == 0)
    mean: f64,
    /// levels[0] is the fitted series, levels[l] its l-th difference
    levels: Vec<Vec<f64>>,
    fitted: bool,
}

impl Arima {
    /// Create a new unfitted model with the given orders.
    pub fn new(p: usize, d: usize) -> Result<Self, DetectError> {
        if p == 0 || p > MAX_AR_LAGS {
            return Err(DetectError::InvalidParameter {
                name: "ar_lags",
                reason: format!("AR order must be between 1 and {}", MAX_AR_LAGS),
            });
        }
        if d > MAX_DIFFERENCING {
            return Err(DetectError::InvalidParameter {
                name: "differencing",
                reason: format!("differencing order must be <= {}", MAX_DIFFERENCING),
            });
        }

        Ok(Self {
            p,
            d,
            coeffs: vec![0.0; p],
            mean: 0.0,
            levels: Vec::new(),
            fitted: false,
        })
    }

    /// Minimum series length the configured orders can be fitted on:
    /// after `d` differencing passes there must be at least `p` usable
    /// lag rows, each needing `p` prior values.
    pub fn min_observations(&self) -> usize {
        2 * self.p + self.d
    }

    /// Fit the model to `data`. Fitting is closed-form least squares
    /// with no random state, so identical input produces identical
    /// coefficients.
    pub fn fit(&mut self, data: &[f64]) -> Result<(), DetectError> {
        let required = self.min_observations();
        if data.len() < required {
            return Err(DetectError::InsufficientData {
                required,
                actual: data.len(),
                lags: self.p,
            });
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(DetectError::InvalidData);
        }

        // Build the differencing tower
        let mut levels = vec![data.to_vec()];
        for _ in 0..self.d {
            let prev = levels.last().expect("levels never empty");
            let diffed: Vec<f64> = prev.windows(2).map(|w| w[1] - w[0]).collect();
            levels.push(diffed);
        }

        let deepest = &levels[self.d];
        self.mean = if self.d == 0 {
            deepest.iter().sum::<f64>() / deepest.len() as f64
        } else {
            0.0
        };
        let centered: Vec<f64> = deepest.iter().map(|x| x - self.mean).collect();

        // A flat (or exactly linear, post-differencing) series has no lag
        // structure to estimate; zero coefficients predict it exactly.
        if centered.iter().all(|x| x.abs() < EPS) {
            self.coeffs = vec![0.0; self.p];
        } else {
            self.coeffs = fit_ar_least_squares(&centered, self.p);
        }

        self.levels = levels;
        self.fitted = true;
        Ok(())
    }

    /// One-step, non-dynamic in-sample predictions on the original
    /// scale, index 0 through last of the fitted series.
    ///
    /// Each predicted point combines the actual values before it with
    /// the fitted coefficients; forecasts are never fed forward. Where
    /// the full lag window does not exist yet (the first few indices),
    /// the lags that do exist are used, and index 0 is pinned to the
    /// first observation.
    pub fn predict_in_sample(&self) -> Result<Vec<f64>, DetectError> {
        if !self.fitted {
            return Err(DetectError::NotFitted);
        }

        let n = self.levels[0].len();
        let deepest = &self.levels[self.d];

        // AR one-step predictions on the deepest (differenced) scale
        let ar_pred = |k: usize| -> f64 {
            let mut pred = self.mean;
            for (j, coeff) in self.coeffs.iter().enumerate() {
                let Some(lag_idx) = k.checked_sub(j + 1) else {
                    break;
                };
                pred += coeff * (deepest[lag_idx] - self.mean);
            }
            pred
        };

        // Undifference one step: the prediction for y[t] is the last
        // actual value at each differencing level plus the AR prediction
        // of the deepest difference.
        let mut predictions = Vec::with_capacity(n);
        predictions.push(self.levels[0][0]);
        for t in 1..n {
            let mut pred = 0.0;
            let mut complete = true;
            for (l, level) in self.levels.iter().take(self.d).enumerate() {
                match t.checked_sub(1 + l) {
                    Some(idx) => pred += level[idx],
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete && t >= self.d {
                pred += ar_pred(t - self.d);
            }
            predictions.push(pred);
        }

        Ok(predictions)
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Fitted orders as (p, d)
    pub fn order(&self) -> (usize, usize) {
        (self.p, self.d)
    }

    /// Fitted AR coefficients
    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }
}

/// Conditional least squares AR(p) fit: regress each point on its `p`
/// predecessors and solve the normal equations.
fn fit_ar_least_squares(series: &[f64], p: usize) -> Vec<f64> {
    let m = series.len();
    let mut gram = vec![vec![0.0f64; p]; p];
    let mut rhs = vec![0.0f64; p];

    for k in p..m {
        for i in 0..p {
            let xi = series[k - 1 - i];
            rhs[i] += xi * series[k];
            for j in i..p {
                gram[i][j] += xi * series[k - 1 - j];
            }
        }
    }
    // Mirror the upper triangle
    for i in 1..p {
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
    }

    // A tiny ridge keeps the lag matrix invertible when lag columns are
    // collinear (e.g. long zero runs in sparse traffic).
    let trace: f64 = (0..p).map(|i| gram[i][i]).sum();
    let ridge = 1e-8 * (trace / p as f64).max(1.0);
    for (i, row) in gram.iter_mut().enumerate() {
        row[i] += ridge;
    }

    solve_linear_system(gram, rhs)
}

/// Gaussian elimination with partial pivoting for the small (p x p)
/// normal-equation system.
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();

    for col in 0..n {
        // Pivot on the largest remaining entry in this column
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| {
                a[r1][col]
                    .abs()
                    .partial_cmp(&a[r2][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if pivot_row != col {
            a.swap(pivot_row, col);
            b.swap(pivot_row, col);
        }

        let pivot = a[col][col];
        if pivot.abs() < EPS {
            continue;
        }

        for row in (col + 1)..n {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = vec![0.0f64; n];
    for col in (0..n).rev() {
        let pivot = a[col][col];
        if pivot.abs() < EPS {
            continue;
        }
        let mut sum = b[col];
        for k in (col + 1)..n {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / pivot;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_validation() {
        assert!(Arima::new(5, 1).is_ok());
        assert!(matches!(
            Arima::new(0, 1),
            Err(DetectError::InvalidParameter { name: "ar_lags", .. })
        ));
        assert!(matches!(
            Arima::new(11, 1),
            Err(DetectError::InvalidParameter { name: "ar_lags", .. })
        ));
        assert!(matches!(
            Arima::new(5, 3),
            Err(DetectError::InvalidParameter { name: "differencing", .. })
        ));
    }

    #[test]
    fn test_too_short_series_is_rejected() {
        // Five buckets cannot support five autoregressive lags
        let mut model = Arima::new(5, 1).unwrap();
        let err = model.fit(&[2.0, 2.0, 2.0, 2.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            DetectError::InsufficientData {
                required: 11,
                actual: 5,
                lags: 5,
            }
        );
        assert!(!model.is_fitted());
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = Arima::new(2, 1).unwrap();
        assert_eq!(model.predict_in_sample().unwrap_err(), DetectError::NotFitted);
    }

    #[test]
    fn test_non_finite_data_is_rejected() {
        let mut model = Arima::new(2, 0).unwrap();
        let mut data: Vec<f64> = (0..20).map(|x| x as f64).collect();
        data[7] = f64::NAN;
        assert_eq!(model.fit(&data).unwrap_err(), DetectError::InvalidData);
    }

    #[test]
    fn test_constant_series_predicts_itself() {
        // Differencing a constant series yields all zeros; the one-step
        // predictions must reproduce the series exactly.
        let data = vec![10.0; 30];
        let mut model = Arima::new(5, 1).unwrap();
        model.fit(&data).unwrap();
        let preds = model.predict_in_sample().unwrap();

        assert_eq!(preds.len(), data.len());
        for (obs, pred) in data.iter().zip(&preds) {
            assert!((obs - pred).abs() < 1e-9);
        }
    }

    #[test]
    fn test_linear_trend_is_absorbed_by_differencing() {
        // y[t] = 3t + 7 differences to a constant, so every one-step
        // prediction past the warmup is exact.
        let data: Vec<f64> = (0..40).map(|t| 3.0 * t as f64 + 7.0).collect();
        let mut model = Arima::new(3, 1).unwrap();
        model.fit(&data).unwrap();
        let preds = model.predict_in_sample().unwrap();

        for t in 5..data.len() {
            assert!(
                (data[t] - preds[t]).abs() < 1e-6,
                "index {}: observed {} predicted {}",
                t,
                data[t],
                preds[t]
            );
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let data: Vec<f64> = (0..60)
            .map(|t| 10.0 + ((t * 37) % 11) as f64)
            .collect();

        let run = || {
            let mut model = Arima::new(5, 1).unwrap();
            model.fit(&data).unwrap();
            (model.coefficients().to_vec(), model.predict_in_sample().unwrap())
        };

        let (coeffs_a, preds_a) = run();
        let (coeffs_b, preds_b) = run();
        // Bit-identical, not merely approximately equal
        assert_eq!(coeffs_a, coeffs_b);
        assert_eq!(preds_a, preds_b);
    }

    #[test]
    fn test_ar1_recovers_known_coefficient() {
        // Deterministic AR(1) process y[t] = 0.6 y[t-1], no noise:
        // least squares must recover the coefficient almost exactly.
        let mut data = vec![50.0];
        for _ in 0..59 {
            let prev = *data.last().unwrap();
            data.push(0.6 * prev);
        }

        let mut model = Arima::new(1, 0).unwrap();
        model.fit(&data).unwrap();
        let phi = model.coefficients()[0];
        assert!((phi - 0.6).abs() < 0.05, "recovered phi = {}", phi);
    }

    #[test]
    fn test_solve_linear_system() {
        // 2x + y = 5, x + 3y = 10 -> x = 1, y = 3
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];
        let x = solve_linear_system(a, b);
        assert!((x[0] - 1.0).abs() < 1e-9);
        assert!((x[1] - 3.0).abs() < 1e-9);
    }
}
