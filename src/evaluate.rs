use rustc_hash::FxHashMap;

use crate::base::{Base, GameRecord};
use crate::game::{win_probability, Winner};
use crate::internal_rating::NaturalRating;
use crate::rating::Elo;

/// Frozen snapshot of a trained [`Base`] for rating lookup and held-out
/// evaluation. Later changes to the `Base` do not affect it.
#[derive(Debug)]
pub struct Evaluate {
    histories: FxHashMap<Box<str>, Vec<(i64, f64)>>,
}

impl Evaluate {
    pub fn new(base: &Base) -> Evaluate {
        Evaluate {
            histories: base.snapshot(),
        }
    }

    /// The player's Elo rating on `day`, linearly interpolated between
    /// rated days and clamped to the first and last. None for an unknown
    /// name.
    pub fn rating(&self, name: &str, day: i64) -> Option<Elo> {
        let history = self.histories.get(name)?;
        Some(Elo(interpolate(history, day)))
    }

    /// Mean ln-probability of the observed outcomes under interpolated
    /// ratings. Games involving unknown players are skipped (and excluded
    /// from the denominator) when `ignore_null_players`; otherwise unknown
    /// players count as rating 0.
    pub fn average_log_likelihood(&self, games: &[GameRecord], ignore_null_players: bool) -> f64 {
        let mut total = 0.0;
        let mut counted = 0u64;
        for record in games {
            let black = self.rating(&record.black, record.day);
            let white = self.rating(&record.white, record.day);
            if ignore_null_players && (black.is_none() || white.is_none()) {
                continue;
            }
            let black = black.unwrap_or(Elo(0.0));
            let white = white.unwrap_or(Elo(0.0));
            let gamma_black =
                NaturalRating::from(Elo(f64::from(black) + record.handicap)).gamma();
            let gamma_white = NaturalRating::from(white).gamma();
            let p_white = win_probability(gamma_white, gamma_black);
            let p_black = win_probability(gamma_black, gamma_white);
            let p = match record.winner {
                Winner::White => p_white,
                Winner::Black => p_black,
                Winner::Draw => (p_white * p_black).sqrt(),
            };
            total += p.ln();
            counted += 1;
        }
        if counted == 0 {
            0.0
        } else {
            total / counted as f64
        }
    }
}

fn interpolate(history: &[(i64, f64)], day: i64) -> f64 {
    match history.binary_search_by_key(&day, |&(d, _)| d) {
        Ok(i) => history[i].1,
        Err(0) => history[0].1,
        Err(i) if i == history.len() => history[i - 1].1,
        Err(i) => {
            let (d0, e0) = history[i - 1];
            let (d1, e1) = history[i];
            e0 + (e1 - e0) * (day - d0) as f64 / (d1 - d0) as f64
        }
    }
}
