use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::internal_rating::NaturalRating;
use crate::player::PlayerId;
use crate::rating::Elo;

/// Outcome of a game.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Winner {
    Black,
    White,
    Draw,
}

#[derive(Debug, Error)]
#[error("invalid winner")]
pub struct InvalidWinner;

impl FromStr for Winner {
    type Err = InvalidWinner;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "B" => Winner::Black,
            "W" => Winner::White,
            "D" => Winner::Draw,
            _ => return Err(InvalidWinner),
        })
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Winner::Black => "B",
            Winner::White => "W",
            Winner::Draw => "D",
        })
    }
}

/// Side of a game a player was on.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Color {
    Black,
    White,
}

/// Black's advantage for a single game: a constant number of Elo points, or
/// a pure function of the immutable game record.
#[derive(Debug, Copy, Clone)]
pub enum Handicap {
    Elo(f64),
    Fn(fn(&Game) -> f64),
}

impl From<f64> for Handicap {
    fn from(elo: f64) -> Handicap {
        Handicap::Elo(elo)
    }
}

/// Index of a game in the engine's game arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GameId(pub(crate) usize);

/// A single outcome record, immutable after insertion. The day indexes
/// address the participants' PlayerDay entries.
#[derive(Debug, Copy, Clone)]
pub struct Game {
    pub(crate) black: PlayerId,
    pub(crate) white: PlayerId,
    pub(crate) black_day: usize,
    pub(crate) white_day: usize,
    pub winner: Winner,
    pub day: i64,
    pub handicap: Handicap,
}

impl Game {
    pub fn black(&self) -> PlayerId {
        self.black
    }

    pub fn white(&self) -> PlayerId {
        self.white
    }

    /// Black's Elo advantage in this game.
    pub fn black_advantage(&self) -> Elo {
        Elo(match self.handicap {
            Handicap::Elo(elo) => elo,
            Handicap::Fn(f) => f(self),
        })
    }

    pub(crate) fn black_advantage_r(&self) -> f64 {
        f64::from(NaturalRating::from(self.black_advantage()))
    }
}

/// Bradley-Terry win probability against an opponent whose strength already
/// includes any handicap adjustment.
pub(crate) fn win_probability(gamma: f64, adjusted_opponent_gamma: f64) -> f64 {
    gamma / (gamma + adjusted_opponent_gamma)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_round_trips_through_str() {
        for winner in [Winner::Black, Winner::White, Winner::Draw] {
            assert_eq!(winner.to_string().parse::<Winner>().unwrap(), winner);
        }
        assert!("X".parse::<Winner>().is_err());
        assert!("".parse::<Winner>().is_err());
    }
}
