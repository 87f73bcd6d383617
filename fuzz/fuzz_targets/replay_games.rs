#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use whr::{Base, Winner};

#[derive(Arbitrary)]
struct RawGame {
    black: u8,
    white: u8,
    winner: u8,
    day: i8,
    handicap: i16,
}

fuzz_target!(|games: Vec<RawGame>| {
    let mut base = Base::new();

    for game in games.iter().take(64) {
        let winner = match game.winner % 3 {
            0 => Winner::Black,
            1 => Winner::White,
            _ => Winner::Draw,
        };
        let black = format!("p{}", game.black % 16);
        let white = format!("p{}", game.white % 16);
        let _ = base.create_game(
            &black,
            &white,
            winner,
            i64::from(game.day),
            f64::from(game.handicap),
        );
    }

    // Divergence must surface as UnstableRating, never as a panic or a
    // non-finite rating on the success path.
    if base.iterate(5).is_ok() {
        for (_, history) in base.ordered_ratings() {
            for sample in history {
                assert!(f64::from(sample.elo).is_finite());
                assert!(f64::from(sample.uncertainty).is_finite());
            }
        }
    }
});
