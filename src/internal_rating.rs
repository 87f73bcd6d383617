use crate::rating::Elo;

/// Rating on the natural scale that all optimization math runs on. The
/// Bradley-Terry strength is `gamma = exp(r)`.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
pub(crate) struct NaturalRating(pub f64);

impl From<NaturalRating> for f64 {
    #[inline]
    fn from(NaturalRating(r): NaturalRating) -> f64 {
        r
    }
}

impl From<Elo> for NaturalRating {
    #[inline]
    fn from(Elo(elo): Elo) -> NaturalRating {
        NaturalRating(elo / NATURAL_RATING_SCALE)
    }
}

impl From<NaturalRating> for Elo {
    #[inline]
    fn from(NaturalRating(r): NaturalRating) -> Elo {
        Elo(r * NATURAL_RATING_SCALE)
    }
}

impl NaturalRating {
    #[inline]
    pub fn gamma(self) -> f64 {
        self.0.exp()
    }
}

/// Elo points per natural rating unit: `400 / ln 10`.
pub(crate) const NATURAL_RATING_SCALE: f64 = 400.0 / std::f64::consts::LN_10;
