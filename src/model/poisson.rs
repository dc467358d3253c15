//! Independent-Poisson score model
//!
//! Home and away goal counts are treated as independent Poisson variables.
//! The joint grid is truncated at `cap` goals per side; the missing tail mass
//! is never redistributed into the grid itself; each query normalizes the way
//! it needs to.

use crate::error::{PredictError, Result};
use crate::types::ScoreLine;

/// Poisson point mass `λ^k e^{-λ} / k!`
pub fn poisson_pmf(k: u32, lambda: f64) -> f64 {
    // Built up iteratively so large k never overflows a factorial.
    let mut p = (-lambda).exp();
    for i in 1..=k {
        p *= lambda / i as f64;
    }
    p
}

/// `P(X <= k)` for `X ~ Poisson(λ)`
pub fn poisson_cdf(k: u32, lambda: f64) -> f64 {
    let mut term = (-lambda).exp();
    let mut sum = term;
    for i in 1..=k {
        term *= lambda / i as f64;
        sum += term;
    }
    sum
}

/// Normalized 1/X/2 split
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeProbs {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// Joint probability grid over `(home_goals, away_goals)` in `[0, cap)²`
#[derive(Debug, Clone)]
pub struct ScoreDistribution {
    lambda_home: f64,
    lambda_away: f64,
    cap: usize,
    /// Row-major: index `gh * cap + ga`
    cells: Vec<f64>,
}

impl ScoreDistribution {
    /// Build the surface for two expected-goals rates.
    ///
    /// Negative or non-finite rates are rejected.
    pub fn build(lambda_home: f64, lambda_away: f64, cap: usize) -> Result<Self> {
        for lambda in [lambda_home, lambda_away] {
            if !lambda.is_finite() || lambda < 0.0 {
                return Err(PredictError::InvalidRate(lambda));
            }
        }

        let pmf_home: Vec<f64> = (0..cap as u32).map(|k| poisson_pmf(k, lambda_home)).collect();
        let pmf_away: Vec<f64> = (0..cap as u32).map(|k| poisson_pmf(k, lambda_away)).collect();

        let mut cells = Vec::with_capacity(cap * cap);
        for p_h in &pmf_home {
            for p_a in &pmf_away {
                cells.push(p_h * p_a);
            }
        }

        Ok(Self {
            lambda_home,
            lambda_away,
            cap,
            cells,
        })
    }

    /// Probability of an exact score; zero outside the grid
    pub fn prob(&self, home_goals: usize, away_goals: usize) -> f64 {
        if home_goals >= self.cap || away_goals >= self.cap {
            return 0.0;
        }
        self.cells[home_goals * self.cap + away_goals]
    }

    /// Cells in enumeration order: home goals outer, away goals inner
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let cap = self.cap;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, p)| (i / cap, i % cap, *p))
    }

    /// Mass covered by the grid (below 1 because of truncation)
    pub fn total_mass(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Home/draw/away, renormalized over the grid so the three sum to 1
    pub fn outcome_probs(&self) -> OutcomeProbs {
        let mut home = 0.0;
        let mut draw = 0.0;
        let mut away = 0.0;

        for (gh, ga, p) in self.cells() {
            if gh > ga {
                home += p;
            } else if gh < ga {
                away += p;
            } else {
                draw += p;
            }
        }

        let sum = home + draw + away;
        if sum > 0.0 {
            OutcomeProbs {
                home: home / sum,
                draw: draw / sum,
                away: away / sum,
            }
        } else {
            OutcomeProbs {
                home: 1.0 / 3.0,
                draw: 1.0 / 3.0,
                away: 1.0 / 3.0,
            }
        }
    }

    /// Probability that total goals exceed a half-integer line.
    ///
    /// Uses the total-goals Poisson with rate `λ_home + λ_away` rather than
    /// the truncated grid.
    pub fn over(&self, line: f64) -> f64 {
        if !line.is_finite() || line < 0.0 {
            return 1.0;
        }
        let k = line.floor() as u32;
        let total = self.lambda_home + self.lambda_away;
        (1.0 - poisson_cdf(k, total)).clamp(0.0, 1.0)
    }

    /// Both teams to score
    pub fn btts(&self) -> f64 {
        let p0_home = poisson_pmf(0, self.lambda_home);
        let p0_away = poisson_pmf(0, self.lambda_away);
        (1.0 - p0_home - p0_away + p0_home * p0_away).clamp(0.0, 1.0)
    }

    /// Most likely exact scores.
    ///
    /// Probabilities are shares of the grid mass rounded to whole percent.
    /// Equal cells keep grid enumeration order.
    pub fn top_scores(&self, n: usize) -> Vec<ScoreLine> {
        let total = self.total_mass();
        let mut ranked: Vec<(usize, usize, f64)> = self.cells().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.2.total_cmp(&a.2));

        ranked
            .into_iter()
            .take(n)
            .map(|(gh, ga, p)| {
                let share = if total > 0.0 { p / total } else { 0.0 };
                ScoreLine {
                    score: format!("{gh}-{ga}"),
                    p: (share * 100.0).round() / 100.0,
                }
            })
            .collect()
    }
}
