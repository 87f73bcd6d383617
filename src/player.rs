use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::internal_rating::{NaturalRating, NATURAL_RATING_SCALE};
use crate::player_day::PlayerDay;

/// Interned identifier of a player name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PlayerId(pub(crate) usize);

/// Name interning table.
#[derive(Debug, Default)]
pub(crate) struct PlayerIds {
    inner: FxHashMap<Box<str>, PlayerId>,
}

impl PlayerIds {
    pub fn get_or_insert(&mut self, name: &str) -> PlayerId {
        let next_id = PlayerId(self.inner.len());
        *self.inner.entry(Box::from(name)).or_insert(next_id)
    }

    pub fn get(&self, name: &str) -> Option<PlayerId> {
        self.inner.get(name).copied()
    }
}

/// The Newton solve degenerated or ran away; the engine state is no longer
/// meaningful and the `Base` should be discarded or rebuilt.
#[derive(Debug, Error)]
#[error("unstable rating for player {name:?} on day {day}")]
pub struct UnstableRating {
    pub name: String,
    pub day: i64,
}

/// Natural ratings beyond this magnitude have left the range where exp()
/// arithmetic is meaningful.
const MAX_NATURAL_RATING: f64 = 650.0;

/// Keeps factorization pivots strictly negative when a day's game curvature
/// vanishes.
const DIAGONAL_SHIFT: f64 = 0.001;

/// A player's full time series of skill variables, and the per-player
/// Newton machinery that runs along it.
#[derive(Debug)]
pub(crate) struct Player {
    pub name: Box<str>,
    pub days: Vec<PlayerDay>,
    /// Natural-scale prior variance per elapsed day.
    w2: f64,
}

impl Player {
    pub fn new(name: &str, w2: f64) -> Player {
        Player {
            name: Box::from(name),
            days: Vec::new(),
            w2,
        }
    }

    /// Index of the PlayerDay for `day`, inserting one in day order if
    /// missing. The second value is true on a fresh insertion.
    pub fn day_slot(&mut self, day: i64) -> (usize, bool) {
        match self.days.binary_search_by_key(&day, |d| d.day) {
            Ok(index) => (index, false),
            Err(index) => {
                self.days.insert(index, PlayerDay::new(day));
                for (i, d) in self.days.iter_mut().enumerate() {
                    d.is_first_day = i == 0;
                }
                (index, true)
            }
        }
    }

    pub fn latest_gamma(&self) -> f64 {
        self.days.last().map_or(0.0, |day| day.r.gamma())
    }

    /// Wiener-prior variances between consecutive days.
    fn sigma2(&self) -> Vec<f64> {
        self.days
            .windows(2)
            .map(|pair| (pair[1].day - pair[0].day) as f64 * self.w2)
            .collect()
    }

    /// Diagonal, superdiagonal, and gradient of the per-player log
    /// posterior, with opponents held fixed.
    fn tridiagonal(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let n = self.days.len();
        let sigma2 = self.sigma2();
        let mut diag = Vec::with_capacity(n);
        let mut grad = Vec::with_capacity(n);
        for (i, day) in self.days.iter().enumerate() {
            let mut h = day.log_likelihood_second_derivative() - DIAGONAL_SHIFT;
            let mut g = day.log_likelihood_derivative();
            if i + 1 < n {
                h -= 1.0 / sigma2[i];
                g += (self.days[i + 1].r.0 - day.r.0) / sigma2[i];
            }
            if i > 0 {
                h -= 1.0 / sigma2[i - 1];
                g += (self.days[i - 1].r.0 - day.r.0) / sigma2[i - 1];
            }
            diag.push(h);
            grad.push(g);
        }
        let off = sigma2.iter().map(|s| 1.0 / s).collect();
        (diag, off, grad)
    }

    fn unstable(&self, index: usize) -> UnstableRating {
        UnstableRating {
            name: self.name.to_string(),
            day: self.days[index].day,
        }
    }

    /// Forward pivots of the LDLᵀ factorization. The Hessian is negative
    /// definite, so every pivot must come out finite and strictly negative.
    fn forward_pivots(&self, diag: &[f64], off: &[f64]) -> Result<Vec<f64>, UnstableRating> {
        let n = diag.len();
        let mut d = vec![0.0; n];
        for i in 0..n {
            let pivot = if i == 0 {
                diag[0]
            } else {
                diag[i] - off[i - 1] * off[i - 1] / d[i - 1]
            };
            if !pivot.is_finite() || pivot >= 0.0 {
                return Err(self.unstable(i));
            }
            d[i] = pivot;
        }
        Ok(d)
    }

    /// Pivots of the mirrored factorization running from the last day back,
    /// needed for the diagonal of the inverse.
    fn backward_pivots(&self, diag: &[f64], off: &[f64]) -> Result<Vec<f64>, UnstableRating> {
        let n = diag.len();
        let mut dp = vec![0.0; n];
        for i in (0..n).rev() {
            let pivot = if i + 1 == n {
                diag[n - 1]
            } else {
                diag[i] - off[i] * off[i] / dp[i + 1]
            };
            if !pivot.is_finite() || pivot >= 0.0 {
                return Err(self.unstable(i));
            }
            dp[i] = pivot;
        }
        Ok(dp)
    }

    /// One Newton step along the time series: solve `H·x = ∇` with the
    /// Thomas algorithm and move every day's rating by `-x`. A single step
    /// per sweep; convergence comes from repeated sweeps.
    pub fn run_newton_step(&mut self) -> Result<(), UnstableRating> {
        let n = self.days.len();
        if n == 0 {
            return Ok(());
        }
        let (diag, off, grad) = self.tridiagonal();
        let d = self.forward_pivots(&diag, &off)?;

        let mut y = grad;
        for i in 1..n {
            y[i] -= off[i - 1] / d[i - 1] * y[i - 1];
        }
        let mut x = vec![0.0; n];
        x[n - 1] = y[n - 1] / d[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = (y[i] - off[i] * x[i + 1]) / d[i];
        }

        for i in 0..n {
            let r = self.days[i].r.0 - x[i];
            if !r.is_finite() || r.abs() > MAX_NATURAL_RATING {
                return Err(self.unstable(i));
            }
            self.days[i].r = NaturalRating(r);
        }
        Ok(())
    }

    /// Diagonal of the inverse Hessian via the two-sided pivot recurrence,
    /// stored as an Elo-scale standard deviation per day.
    pub fn update_uncertainty(&mut self) -> Result<(), UnstableRating> {
        let n = self.days.len();
        if n == 0 {
            return Ok(());
        }
        let (diag, off, _) = self.tridiagonal();
        let d = self.forward_pivots(&diag, &off)?;
        let dp = self.backward_pivots(&diag, &off)?;
        for i in 0..n {
            let variance = if i + 1 < n {
                dp[i + 1] / (off[i] * off[i] - d[i] * dp[i + 1])
            } else {
                -1.0 / d[n - 1]
            };
            self.days[i].uncertainty = variance.sqrt() * NATURAL_RATING_SCALE;
        }
        Ok(())
    }

    /// This player's posterior contribution: game and virtual-game terms
    /// plus the normalized Wiener increments between consecutive days.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.days.len();
        let sigma2 = self.sigma2();
        let mut sum = 0.0;
        for (i, day) in self.days.iter().enumerate() {
            sum += day.log_likelihood();
            if i + 1 < n {
                let rd = self.days[i + 1].r.0 - day.r.0;
                let s2 = sigma2[i];
                sum += -0.5 * (std::f64::consts::TAU * s2).ln() - rd * rd / (2.0 * s2);
            }
        }
        sum
    }
}
