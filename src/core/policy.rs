use serde::{Deserialize, Serialize};

/// Tunable business limits. Defaults match the rules the desk has always enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingPolicy {
    /// Guide's share of a booking's total price.
    pub commission_rate: f64,
    pub max_guide_load: usize,
    pub max_tourist_bookings: usize,
    pub cancel_window_days: i64,
    pub modify_window_days: i64,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            commission_rate: 0.30,
            max_guide_load: 5,
            max_tourist_bookings: 10,
            cancel_window_days: 7,
            modify_window_days: 3,
        }
    }
}

impl BookingPolicy {
    pub fn commission(&self, total_price: f64) -> f64 {
        total_price * self.commission_rate
    }
}
