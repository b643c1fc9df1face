use serde::{Deserialize, Serialize};

/// Grams CO2 per km that an order of that distance is compared against when scoring.
pub const SCORING_BASELINE_GRAMS_PER_KM: f64 = 20.0;

/// Ordered (ratio of baseline, score) bands. A band matches when the emissions are at or
/// below `ratio * baseline`; the first match wins.
const SCORE_BANDS: [(f64, u8); 5] = [(0.3, 95), (0.5, 85), (0.7, 70), (1.0, 55), (1.5, 35)];
const FLOOR_SCORE: u8 = 20;

/// Ordered (minimum score, rating) bands.
const RATING_BANDS: [(u8, Rating); 3] = [
    (85, Rating::Excellent),
    (70, Rating::Good),
    (50, Rating::Moderate),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl Rating {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
        }
    }
}

/// Bands an order's emissions against `distance_km * 20` grams.
pub fn eco_score(carbon_grams: f64, distance_km: f64) -> u8 {
    let baseline = distance_km * SCORING_BASELINE_GRAMS_PER_KM;

    SCORE_BANDS
        .iter()
        .find(|(ratio, _)| carbon_grams <= baseline * ratio)
        .map(|(_, score)| *score)
        .unwrap_or(FLOOR_SCORE)
}

pub fn rating(score: u8) -> Rating {
    RATING_BANDS
        .iter()
        .find(|(minimum, _)| score >= *minimum)
        .map(|(_, rating)| *rating)
        .unwrap_or(Rating::Poor)
}
