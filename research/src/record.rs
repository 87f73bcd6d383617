use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use whr::{GameRecord, Winner};

/// One row of the replay input: `black,white,winner,day[,handicap]`.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct RawGame {
    pub black: String,
    pub white: String,
    #[serde_as(as = "DisplayFromStr")]
    pub winner: Winner,
    pub day: i64,
    #[serde(default)]
    pub handicap: f64,
}

impl From<RawGame> for GameRecord {
    fn from(raw: RawGame) -> GameRecord {
        GameRecord {
            black: raw.black,
            white: raw.white,
            winner: raw.winner,
            day: raw.day,
            handicap: raw.handicap,
        }
    }
}
