//! Derivative-free classical optimizers for the variational loop.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::VqeError;

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Optimal parameter values.
    pub optimal_params: Vec<f64>,
    /// Optimal objective value.
    pub optimal_value: f64,
    /// Number of function evaluations.
    pub num_evaluations: usize,
    /// Number of iterations.
    pub num_iterations: usize,
    /// Best objective value after each improving iteration.
    pub history: Vec<f64>,
    /// Whether the optimization converged.
    pub converged: bool,
}

/// A minimizer of a scalar objective over a real parameter vector.
pub trait Optimizer {
    /// Minimize `objective` starting from `initial_params`.
    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64;
}

/// Which optimizer drives the VQE loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Cobyla,
    Spsa,
}

impl std::fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizerKind::Cobyla => f.write_str("cobyla"),
            OptimizerKind::Spsa => f.write_str("spsa"),
        }
    }
}

impl std::str::FromStr for OptimizerKind {
    type Err = VqeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cobyla" => Ok(OptimizerKind::Cobyla),
            "spsa" => Ok(OptimizerKind::Spsa),
            _ => Err(VqeError::UnknownOptimizer(s.to_string())),
        }
    }
}

/// Index of the smallest value; NaN sorts last.
fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(0, |(i, _)| i)
}

/// COBYLA-style trust-region simplex optimizer.
///
/// Reflection steps are bounded by the current trust radius `rho`, which
/// shrinks from `rhobeg` towards `rhoend` whenever the simplex flattens out.
#[derive(Debug, Clone)]
pub struct Cobyla {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Convergence tolerance.
    pub tol: f64,
    /// Initial trust region radius.
    pub rhobeg: f64,
    /// Final trust region radius.
    pub rhoend: f64,
}

impl Default for Cobyla {
    fn default() -> Self {
        Self {
            maxiter: 100,
            tol: 1e-6,
            rhobeg: 0.5,
            rhoend: 1e-4,
        }
    }
}

impl Cobyla {
    /// Create a new COBYLA optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set trust region parameters.
    pub fn with_trust_region(mut self, rhobeg: f64, rhoend: f64) -> Self {
        self.rhobeg = rhobeg;
        self.rhoend = rhoend;
        self
    }

    fn simplex_around<F>(
        center: &[f64],
        rho: f64,
        objective: &mut F,
        evaluations: &mut usize,
    ) -> (Vec<Vec<f64>>, Vec<f64>)
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mut simplex = vec![center.to_vec()];
        let mut values = vec![objective(center)];
        *evaluations += 1;
        for i in 0..center.len() {
            let mut point = center.to_vec();
            point[i] += rho;
            values.push(objective(&point));
            *evaluations += 1;
            simplex.push(point);
        }
        (simplex, values)
    }
}

impl Optimizer for Cobyla {
    fn minimize<F>(&self, mut objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial_params.len();
        let mut num_evaluations = 0;

        if n == 0 {
            let value = objective(&initial_params);
            return OptimizationResult {
                optimal_params: initial_params,
                optimal_value: value,
                num_evaluations: 1,
                num_iterations: 0,
                history: vec![value],
                converged: true,
            };
        }

        let mut rho = self.rhobeg;
        let (mut simplex, mut f_simplex) =
            Self::simplex_around(&initial_params, rho, &mut objective, &mut num_evaluations);
        let mut f_best = f_simplex[0];
        let mut history = vec![f_best];
        let mut converged = false;
        let mut num_iterations = 0;

        for _ in 0..self.maxiter {
            num_iterations += 1;

            let mut indices: Vec<usize> = (0..=n).collect();
            indices.sort_by(|&a, &b| f_simplex[a].total_cmp(&f_simplex[b]));
            let best_idx = indices[0];
            let worst_idx = indices[n];

            let spread = f_simplex[worst_idx] - f_simplex[best_idx];
            if spread < self.tol {
                if rho <= self.rhoend {
                    converged = true;
                    break;
                }
                // Shrink the trust region and rebuild around the best point
                rho = (rho * 0.5).max(self.rhoend);
                let best = simplex[best_idx].clone();
                (simplex, f_simplex) =
                    Self::simplex_around(&best, rho, &mut objective, &mut num_evaluations);
                continue;
            }

            // Centroid of all points except the worst
            let mut centroid = vec![0.0; n];
            for &idx in &indices[..n] {
                for (c, x) in centroid.iter_mut().zip(&simplex[idx]) {
                    *c += x;
                }
            }
            for c in &mut centroid {
                *c /= n as f64;
            }

            // Reflection, bounded by the trust radius
            let reflected: Vec<f64> = centroid
                .iter()
                .zip(&simplex[worst_idx])
                .map(|(c, w)| {
                    let step = c - w;
                    c + step.clamp(-rho, rho)
                })
                .collect();
            let f_reflected = objective(&reflected);
            num_evaluations += 1;

            if f_reflected < f_simplex[best_idx] {
                // Expansion
                let expanded: Vec<f64> = centroid
                    .iter()
                    .zip(&reflected)
                    .map(|(c, r)| c + 2.0 * (r - c))
                    .collect();
                let f_expanded = objective(&expanded);
                num_evaluations += 1;

                if f_expanded < f_reflected {
                    simplex[worst_idx] = expanded;
                    f_simplex[worst_idx] = f_expanded;
                } else {
                    simplex[worst_idx] = reflected;
                    f_simplex[worst_idx] = f_reflected;
                }
            } else if f_reflected < f_simplex[indices[n - 1]] {
                simplex[worst_idx] = reflected;
                f_simplex[worst_idx] = f_reflected;
            } else {
                // Contraction
                let contracted: Vec<f64> = centroid
                    .iter()
                    .zip(&simplex[worst_idx])
                    .map(|(c, w)| 0.5 * (c + w))
                    .collect();
                let f_contracted = objective(&contracted);
                num_evaluations += 1;

                if f_contracted < f_simplex[worst_idx] {
                    simplex[worst_idx] = contracted;
                    f_simplex[worst_idx] = f_contracted;
                } else {
                    // Shrink towards the best point
                    let best = simplex[best_idx].clone();
                    for i in (0..=n).filter(|&i| i != best_idx) {
                        for (x, b) in simplex[i].iter_mut().zip(&best) {
                            *x = 0.5 * (b + *x);
                        }
                        f_simplex[i] = objective(&simplex[i]);
                        num_evaluations += 1;
                    }
                }
            }

            let min_idx = argmin(&f_simplex);
            if f_simplex[min_idx] < f_best {
                f_best = f_simplex[min_idx];
                history.push(f_best);
            }
        }

        let min_idx = argmin(&f_simplex);
        OptimizationResult {
            optimal_params: simplex.swap_remove(min_idx),
            optimal_value: f_simplex[min_idx],
            num_evaluations,
            num_iterations,
            history,
            converged,
        }
    }
}

/// Simultaneous Perturbation Stochastic Approximation.
///
/// Estimates the gradient from two evaluations along a random ±1 direction
/// per iteration. Deterministic for a fixed `seed`.
#[derive(Debug, Clone)]
pub struct Spsa {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Initial step size.
    pub a: f64,
    /// Perturbation size.
    pub c: f64,
    /// Learning rate decay parameter.
    pub alpha: f64,
    /// Perturbation decay parameter.
    pub gamma: f64,
    /// Seed for the perturbation directions.
    pub seed: u64,
}

impl Default for Spsa {
    fn default() -> Self {
        Self {
            maxiter: 100,
            a: 0.1,
            c: 0.1,
            alpha: 0.602,
            gamma: 0.101,
            seed: 42,
        }
    }
}

impl Spsa {
    /// Create a new SPSA optimizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the perturbation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Optimizer for Spsa {
    fn minimize<F>(&self, mut objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut x = initial_params;
        let mut f_x = objective(&x);
        let mut best = (x.clone(), f_x);
        let mut history = vec![f_x];
        let mut num_evaluations = 1;

        for k in 0..self.maxiter {
            let a_k = self.a / ((k + 1) as f64).powf(self.alpha);
            let c_k = self.c / ((k + 1) as f64).powf(self.gamma);

            let delta: Vec<f64> = x
                .iter()
                .map(|_| if rng.gen_bool(0.5) { 1.0 } else { -1.0 })
                .collect();
            let x_plus: Vec<f64> = x.iter().zip(&delta).map(|(xi, di)| xi + c_k * di).collect();
            let x_minus: Vec<f64> = x.iter().zip(&delta).map(|(xi, di)| xi - c_k * di).collect();

            let f_plus = objective(&x_plus);
            let f_minus = objective(&x_minus);
            num_evaluations += 2;

            let slope = (f_plus - f_minus) / (2.0 * c_k);
            for (xi, di) in x.iter_mut().zip(&delta) {
                *xi -= a_k * slope / di;
            }

            f_x = objective(&x);
            num_evaluations += 1;
            if f_x < best.1 {
                best = (x.clone(), f_x);
                history.push(f_x);
            }
        }

        OptimizationResult {
            optimal_params: best.0,
            optimal_value: best.1,
            num_evaluations,
            num_iterations: self.maxiter,
            history,
            converged: true,
        }
    }
}
