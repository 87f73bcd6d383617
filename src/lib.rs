//! Whole-History Rating.
//!
//! A Bayesian rating system for two-player games in which every player's
//! skill is a time-varying latent variable, and all skills are jointly
//! inferred from the entire history of game outcomes by maximum a
//! posteriori estimation (Rémi Coulom, *Whole-History Rating: A Bayesian
//! Rating System for Players of Time-Varying Strength*, 2008).
//!
//! Feed games into a [`Base`], iterate, and read back per-day Elo ratings
//! with calibrated uncertainties:
//!
//! ```
//! use whr::{Base, Winner};
//!
//! let mut base = Base::new();
//! base.create_game("Alice", "Carol", Winner::Draw, 0, 0.0)?;
//! base.create_game("Bob", "Dave", Winner::Black, 10, 0.0)?;
//! base.create_game("Dave", "Alice", Winner::White, 30, 0.0)?;
//! base.create_game("Bob", "Carol", Winner::White, 60, 0.0)?;
//! base.iterate(50)?;
//!
//! for (name, history) in base.ordered_ratings() {
//!     for sample in history {
//!         println!(
//!             "{name} day {}: {:.0} ± {:.0}",
//!             sample.day,
//!             f64::from(sample.elo),
//!             f64::from(sample.uncertainty),
//!         );
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Held-out games are scored against a frozen snapshot with [`Evaluate`].

mod base;
mod evaluate;
mod game;
mod internal_rating;
mod player;
mod player_day;
mod rating;

pub use base::{Base, BaseBuilder, GameRecord, InvalidGame};
pub use evaluate::Evaluate;
pub use game::{Game, GameId, Handicap, InvalidWinner, Winner};
pub use player::{PlayerId, UnstableRating};
pub use rating::{Elo, RatingSample};
