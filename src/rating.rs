/// Rating on the human-readable Elo scale. A difference of 400 points
/// corresponds to a tenfold odds ratio.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
pub struct Elo(pub f64);

impl From<Elo> for f64 {
    #[inline]
    fn from(Elo(elo): Elo) -> f64 {
        elo
    }
}

/// One point of a player's rating history: the estimated rating on `day`
/// and its posterior standard deviation, both on the Elo scale.
///
/// `uncertainty` is NaN until the engine has extracted uncertainties at the
/// end of an iteration pass.
#[derive(Debug, Copy, Clone)]
pub struct RatingSample {
    pub day: i64,
    pub elo: Elo,
    pub uncertainty: Elo,
}
