use crate::domain::model::Attraction;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Share knocked off the price during festival season.
pub const FESTIVAL_DISCOUNT: f64 = 0.20;

/// Price of one trek, at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub price: f64,
    pub festival_applied: bool,
}

impl Quote {
    /// Price rounded to cents for display. Stored prices keep full precision.
    pub fn display_price(&self) -> f64 {
        (self.price * 100.0).round() / 100.0
    }
}

/// August through October (Dashain and Tihar).
pub fn is_festival_season(date: NaiveDate) -> bool {
    matches!(date.month(), 8..=10)
}

pub fn compute_price(attraction: &Attraction, trek_date: NaiveDate) -> Quote {
    let festival_applied = is_festival_season(trek_date);
    let mut price = attraction.base_price * attraction.difficulty.multiplier();
    if festival_applied {
        price *= 1.0 - FESTIVAL_DISCOUNT;
    }

    Quote {
        price: price.max(0.0),
        festival_applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Altitude, Difficulty};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_everest_in_september() {
        let everest = Attraction::new("Everest Base Camp", "Khumbu", Altitude::High, Difficulty::Hard, 1000.0);
        let quote = compute_price(&everest, date(2024, 9, 15));

        assert!(quote.festival_applied);
        assert!((quote.price - 1000.0 * 1.6 * 0.8).abs() < 1e-9);
        assert_eq!(quote.display_price(), 1280.0);
    }

    #[test]
    fn test_festival_is_exactly_twenty_percent_off() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let attraction = Attraction::new("Langtang Valley", "Langtang", Altitude::High, difficulty, 612.35);
            let off_season = compute_price(&attraction, date(2025, 3, 1));
            assert!(!off_season.festival_applied);

            for month in 8..=10 {
                let festival = compute_price(&attraction, date(2025, month, 12));
                assert!(festival.festival_applied);
                assert!((festival.price - off_season.price * 0.8).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_season_boundaries() {
        assert!(!is_festival_season(date(2025, 7, 31)));
        assert!(is_festival_season(date(2025, 8, 1)));
        assert!(is_festival_season(date(2025, 10, 31)));
        assert!(!is_festival_season(date(2025, 11, 1)));
    }

    #[test]
    fn test_display_rounds_to_cents() {
        let attraction = Attraction::new("Annapurna Circuit", "Annapurna", Altitude::High, Difficulty::Medium, 333.33);
        let quote = compute_price(&attraction, date(2025, 1, 10));
        assert_eq!(quote.display_price(), 433.33);
        assert!((quote.price - 433.329).abs() < 1e-9);
    }
}
