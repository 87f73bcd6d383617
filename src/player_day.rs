use crate::game::{Color, GameId};
use crate::internal_rating::NaturalRating;
use crate::rating::Elo;

/// One likelihood term: a (possibly fractional) game against an opponent of
/// known handicap-adjusted strength.
#[derive(Debug, Copy, Clone)]
struct GameTerm {
    opponent_gamma: f64,
    weight: f64,
}

/// A player's latent skill variable on one day, together with the games
/// played that day and their current likelihood terms.
///
/// The terms are rebuilt from the opponents' latest ratings before each
/// Newton step; a draw contributes half a win plus half a loss, which yields
/// the exact first and second derivatives of the draw log-probability.
#[derive(Debug)]
pub(crate) struct PlayerDay {
    pub day: i64,
    pub r: NaturalRating,
    /// Elo-scale posterior standard deviation; NaN until extracted.
    pub uncertainty: f64,
    pub games: Vec<(GameId, Color)>,
    pub is_first_day: bool,
    won_terms: Vec<GameTerm>,
    lost_terms: Vec<GameTerm>,
}

impl PlayerDay {
    pub fn new(day: i64) -> PlayerDay {
        PlayerDay {
            day,
            r: NaturalRating(0.0),
            uncertainty: f64::NAN,
            games: Vec::new(),
            is_first_day: false,
            won_terms: Vec::new(),
            lost_terms: Vec::new(),
        }
    }

    pub fn elo(&self) -> Elo {
        self.r.into()
    }

    pub fn set_elo(&mut self, elo: Elo) {
        self.r = elo.into();
    }

    pub fn clear_terms(&mut self) {
        self.won_terms.clear();
        self.lost_terms.clear();
    }

    pub fn add_win(&mut self, opponent_gamma: f64, weight: f64) {
        self.won_terms.push(GameTerm {
            opponent_gamma,
            weight,
        });
    }

    pub fn add_loss(&mut self, opponent_gamma: f64, weight: f64) {
        self.lost_terms.push(GameTerm {
            opponent_gamma,
            weight,
        });
    }

    /// First-day draws against the virtual anchor opponent at gamma = 1,
    /// which pin the otherwise translation-invariant rating scale.
    pub fn add_virtual_draws(&mut self, count: u32) {
        if count > 0 {
            let weight = f64::from(count) / 2.0;
            self.add_win(1.0, weight);
            self.add_loss(1.0, weight);
        }
    }

    pub fn log_likelihood(&self) -> f64 {
        let gamma = self.r.gamma();
        let mut sum = 0.0;
        for term in &self.won_terms {
            sum += term.weight * (gamma.ln() - (gamma + term.opponent_gamma).ln());
        }
        for term in &self.lost_terms {
            sum += term.weight * (term.opponent_gamma.ln() - (gamma + term.opponent_gamma).ln());
        }
        sum
    }

    pub fn log_likelihood_derivative(&self) -> f64 {
        let gamma = self.r.gamma();
        let mut sum = 0.0;
        for term in &self.won_terms {
            sum += term.weight * term.opponent_gamma / (gamma + term.opponent_gamma);
        }
        for term in &self.lost_terms {
            sum -= term.weight * gamma / (gamma + term.opponent_gamma);
        }
        sum
    }

    pub fn log_likelihood_second_derivative(&self) -> f64 {
        let gamma = self.r.gamma();
        let mut sum = 0.0;
        for term in self.won_terms.iter().chain(&self.lost_terms) {
            let strengths = gamma + term.opponent_gamma;
            sum -= term.weight * gamma * term.opponent_gamma / (strengths * strengths);
        }
        sum
    }
}
