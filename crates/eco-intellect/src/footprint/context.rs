/// Ordered (exclusive upper bound in kg, sentence) bands for yearly footprints.
const CONTEXT_BANDS: [(f64, &str); 4] = [
    (0.5, "That's less than charging a smartphone for a year!"),
    (2.0, "That's equivalent to boiling water for 10 cups of tea."),
    (5.0, "That's like driving a car for 40 km."),
    (10.0, "That's equivalent to a short car trip of 80 km."),
];

/// Kilometres of car driving per kilogram of CO2 used above the last band.
const DRIVING_KM_PER_KG: f64 = 8.0;

/// Human-readable comparison for a yearly carbon mass.
pub fn environmental_context(carbon_kg: f64) -> String {
    CONTEXT_BANDS
        .iter()
        .find(|(limit, _)| carbon_kg < *limit)
        .map(|(_, sentence)| (*sentence).to_string())
        .unwrap_or_else(|| {
            let km = (carbon_kg * DRIVING_KM_PER_KG) as u64;
            format!("That's equivalent to driving {km} km by car.")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_band_by_exclusive_upper_bound() {
        assert!(environmental_context(0.0).contains("smartphone"));
        assert!(environmental_context(0.5).contains("cups of tea"));
        assert!(environmental_context(1.99).contains("cups of tea"));
        assert!(environmental_context(2.0).contains("40 km"));
        assert!(environmental_context(9.99).contains("80 km"));
    }

    #[test]
    fn large_footprints_scale_with_driving_distance() {
        assert_eq!(
            environmental_context(10.0),
            "That's equivalent to driving 80 km by car."
        );
        assert_eq!(
            environmental_context(33.8),
            "That's equivalent to driving 270 km by car."
        );
    }
}
