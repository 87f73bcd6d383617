use log::{debug, info};
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::game::{win_probability, Color, Game, GameId, Handicap, Winner};
use crate::internal_rating::NATURAL_RATING_SCALE;
use crate::player::{Player, PlayerId, PlayerIds, UnstableRating};
use crate::rating::{Elo, RatingSample};

/// Elo movement below which a sweep counts as quiet.
const CONVERGED_DELTA: f64 = 1e-3;

/// Quiet sweeps in a row required before iteration stops.
const CONVERGED_SWEEPS: u32 = 10;

/// A game described by plain data: the batch-ingestion and evaluation
/// record format `[black, white, winner, day, handicap]`.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub black: String,
    pub white: String,
    pub winner: Winner,
    pub day: i64,
    pub handicap: f64,
}

/// A game must have two distinct participants.
#[derive(Debug, Error)]
#[error("invalid game: {name:?} cannot play themselves")]
pub struct InvalidGame {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct BaseBuilder {
    w2: f64,
    virtual_games: u32,
}

impl Default for BaseBuilder {
    fn default() -> BaseBuilder {
        BaseBuilder::new()
    }
}

impl BaseBuilder {
    pub fn new() -> BaseBuilder {
        BaseBuilder {
            w2: 300.0,
            virtual_games: 2,
        }
    }

    /// Prior rating variance per elapsed day, in Elo².
    pub fn w2(&mut self, w2: f64) -> &mut Self {
        assert!(w2 > 0.0);
        self.w2 = w2;
        self
    }

    /// Number of first-day draws against the virtual anchor opponent.
    pub fn virtual_games(&mut self, virtual_games: u32) -> &mut Self {
        self.virtual_games = virtual_games;
        self
    }

    pub fn build(&self) -> Base {
        Base {
            ids: PlayerIds::default(),
            players: Vec::new(),
            games: Vec::new(),
            w2_natural: self.w2 / (NATURAL_RATING_SCALE * NATURAL_RATING_SCALE),
            virtual_games: self.virtual_games,
        }
    }
}

/// Global registry of players and games, and the driver of the joint MAP
/// optimization.
///
/// Players are visited in registration order, so within one sweep a later
/// player already sees the refreshed ratings of earlier opponents
/// (Gauss-Seidel semantics). After a failed sweep the contents are
/// undefined; discard the `Base`.
#[derive(Debug)]
pub struct Base {
    ids: PlayerIds,
    players: Vec<Player>,
    games: Vec<Game>,
    /// Natural-scale prior variance per elapsed day.
    w2_natural: f64,
    virtual_games: u32,
}

impl Default for Base {
    fn default() -> Base {
        Base::new()
    }
}

impl Base {
    /// An empty engine with the default configuration: `w2 = 300`,
    /// `virtual_games = 2`.
    pub fn new() -> Base {
        Base::builder().build()
    }

    pub fn builder() -> BaseBuilder {
        BaseBuilder::new()
    }

    fn register_player(&mut self, name: &str) -> PlayerId {
        let id = self.ids.get_or_insert(name);
        if id.0 == self.players.len() {
            self.players.push(Player::new(name, self.w2_natural));
        }
        id
    }

    /// Registers the game on the player's day, creating the day if needed.
    /// A fresh insertion shifts the indexes of every later day, so the
    /// games recorded on those days have their stored indexes repaired.
    fn register_day(&mut self, player: PlayerId, day: i64, game_id: GameId, color: Color) -> usize {
        let (index, inserted) = self.players[player.0].day_slot(day);
        if inserted {
            let games = &mut self.games;
            for later in &self.players[player.0].days[index + 1..] {
                for &(id, side) in &later.games {
                    let game = &mut games[id.0];
                    match side {
                        Color::Black => game.black_day += 1,
                        Color::White => game.white_day += 1,
                    }
                }
            }
        }
        self.players[player.0].days[index].games.push((game_id, color));
        index
    }

    /// Records one game, lazily creating the players and their days.
    pub fn create_game(
        &mut self,
        black: &str,
        white: &str,
        winner: Winner,
        day: i64,
        handicap: impl Into<Handicap>,
    ) -> Result<GameId, InvalidGame> {
        if black == white {
            return Err(InvalidGame {
                name: black.to_owned(),
            });
        }
        let game_id = GameId(self.games.len());
        let black_id = self.register_player(black);
        let white_id = self.register_player(white);
        let black_day = self.register_day(black_id, day, game_id, Color::Black);
        let white_day = self.register_day(white_id, day, game_id, Color::White);
        self.games.push(Game {
            black: black_id,
            white: white_id,
            black_day,
            white_day,
            winner,
            day,
            handicap: handicap.into(),
        });
        Ok(game_id)
    }

    /// Batch form of [`Base::create_game`].
    pub fn create_games<I>(&mut self, games: I) -> Result<(), InvalidGame>
    where
        I: IntoIterator<Item = GameRecord>,
    {
        for record in games {
            self.create_game(
                &record.black,
                &record.white,
                record.winner,
                record.day,
                record.handicap,
            )?;
        }
        Ok(())
    }

    pub fn game(&self, id: GameId) -> &Game {
        &self.games[id.0]
    }

    /// Opponent strength as seen from `side`, with black's advantage folded
    /// into whichever side of the matchup black is on.
    fn adjusted_opponent_gamma(&self, game: &Game, side: Color) -> f64 {
        let advantage = game.black_advantage_r();
        match side {
            Color::White => (self.players[game.black.0].days[game.black_day].r.0 + advantage).exp(),
            Color::Black => (self.players[game.white.0].days[game.white_day].r.0 - advantage).exp(),
        }
    }

    /// Rebuilds one player's likelihood terms from the opponents' current
    /// ratings.
    fn refresh_terms(&mut self, player: PlayerId) -> Result<(), UnstableRating> {
        let mut terms: Vec<Vec<(f64, f64, bool)>> =
            Vec::with_capacity(self.players[player.0].days.len());
        for day in &self.players[player.0].days {
            let mut day_terms = Vec::with_capacity(day.games.len() + 1);
            for &(game_id, side) in &day.games {
                let game = &self.games[game_id.0];
                let c = self.adjusted_opponent_gamma(game, side);
                if c == 0.0 || !c.is_finite() {
                    return Err(UnstableRating {
                        name: self.players[player.0].name.to_string(),
                        day: day.day,
                    });
                }
                match game.winner {
                    Winner::Draw => {
                        day_terms.push((c, 0.5, true));
                        day_terms.push((c, 0.5, false));
                    }
                    winner => {
                        let won = (winner == Winner::Black) == (side == Color::Black);
                        day_terms.push((c, 1.0, won));
                    }
                }
            }
            terms.push(day_terms);
        }
        let virtual_games = self.virtual_games;
        let player = &mut self.players[player.0];
        for (day, day_terms) in player.days.iter_mut().zip(terms) {
            day.clear_terms();
            for (opponent_gamma, weight, won) in day_terms {
                if won {
                    day.add_win(opponent_gamma, weight);
                } else {
                    day.add_loss(opponent_gamma, weight);
                }
            }
            if day.is_first_day {
                day.add_virtual_draws(virtual_games);
            }
        }
        Ok(())
    }

    fn run_one_sweep(&mut self) -> Result<(), UnstableRating> {
        for i in 0..self.players.len() {
            self.refresh_terms(PlayerId(i))?;
            self.players[i].run_newton_step()?;
        }
        Ok(())
    }

    fn update_uncertainty(&mut self) -> Result<(), UnstableRating> {
        for i in 0..self.players.len() {
            self.refresh_terms(PlayerId(i))?;
            self.players[i].update_uncertainty()?;
        }
        Ok(())
    }

    /// Runs `count` full sweeps, one Newton step per player each, then
    /// extracts every day's posterior uncertainty.
    pub fn iterate(&mut self, count: usize) -> Result<(), UnstableRating> {
        for _ in 0..count {
            self.run_one_sweep()?;
        }
        self.update_uncertainty()
    }

    /// Sweeps until no rating moved by more than 10⁻³ Elo in any of the
    /// last 10 sweeps, then extracts uncertainties. Returns the number of
    /// sweeps performed. Progress is reported through the `log` facade.
    pub fn iterate_until_converge(&mut self) -> Result<usize, UnstableRating> {
        let mut quiet_sweeps = 0;
        let mut sweeps = 0usize;
        while quiet_sweeps < CONVERGED_SWEEPS {
            let previous: Vec<Vec<f64>> = self
                .players
                .iter()
                .map(|p| p.days.iter().map(|d| f64::from(d.elo())).collect())
                .collect();
            self.run_one_sweep()?;
            sweeps += 1;
            let mut max_delta = 0.0f64;
            for (player, old) in self.players.iter().zip(&previous) {
                for (day, old_elo) in player.days.iter().zip(old) {
                    max_delta = max_delta.max((f64::from(day.elo()) - old_elo).abs());
                }
            }
            quiet_sweeps = if max_delta < CONVERGED_DELTA {
                quiet_sweeps + 1
            } else {
                0
            };
            debug!("sweep {sweeps}: max Elo change {max_delta:.6}");
        }
        info!("converged after {sweeps} sweeps");
        self.update_uncertainty()?;
        Ok(sweeps)
    }

    /// Summed per-player posterior contributions at the current ratings.
    /// Takes `&mut self` to refresh the cached likelihood terms first;
    /// undefined (possibly NaN) after a failed sweep.
    pub fn log_likelihood(&mut self) -> f64 {
        for i in 0..self.players.len() {
            if self.refresh_terms(PlayerId(i)).is_err() {
                return f64::NAN;
            }
        }
        self.players.iter().map(Player::log_likelihood).sum()
    }

    fn player_samples(player: &Player) -> Vec<RatingSample> {
        player
            .days
            .iter()
            .map(|day| RatingSample {
                day: day.day,
                elo: day.elo(),
                uncertainty: Elo(day.uncertainty),
            })
            .collect()
    }

    /// The player's rating history in ascending day order, or None for an
    /// unknown name.
    pub fn ratings_for_player(&self, name: &str) -> Option<Vec<RatingSample>> {
        let id = self.ids.get(name)?;
        Some(Self::player_samples(&self.players[id.0]))
    }

    /// Every player's history, strongest current (latest-day) rating first.
    pub fn ordered_ratings(&self) -> Vec<(&str, Vec<RatingSample>)> {
        let mut players: Vec<&Player> = self.players.iter().collect();
        players.sort_by_key(|p| OrderedFloat(-p.latest_gamma()));
        players
            .into_iter()
            .map(|p| (&*p.name, Self::player_samples(p)))
            .collect()
    }

    /// Probability that white wins `game` at the current ratings. Required
    /// alongside [`Base::black_win_probability`] for calibration checks.
    pub fn white_win_probability(&self, game: GameId) -> f64 {
        let game = &self.games[game.0];
        let gamma = self.players[game.white.0].days[game.white_day].r.gamma();
        win_probability(gamma, self.adjusted_opponent_gamma(game, Color::White))
    }

    pub fn black_win_probability(&self, game: GameId) -> f64 {
        let game = &self.games[game.0];
        let gamma = self.players[game.black.0].days[game.black_day].r.gamma();
        win_probability(gamma, self.adjusted_opponent_gamma(game, Color::Black))
    }

    /// Overrides the rating of an existing (player, day). Returns false if
    /// the player or day is unknown.
    pub fn set_rating(&mut self, name: &str, day: i64, elo: Elo) -> bool {
        let Some(id) = self.ids.get(name) else {
            return false;
        };
        let player = &mut self.players[id.0];
        match player.days.binary_search_by_key(&day, |d| d.day) {
            Ok(index) => {
                player.days[index].set_elo(elo);
                true
            }
            Err(_) => false,
        }
    }

    /// Per-player (day, Elo) histories for [`crate::Evaluate`].
    pub(crate) fn snapshot(&self) -> FxHashMap<Box<str>, Vec<(i64, f64)>> {
        self.players
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    p.days.iter().map(|d| (d.day, f64::from(d.elo()))).collect(),
                )
            })
            .collect()
    }
}
