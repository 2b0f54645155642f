use crate::core::ledger::Ledger;
use serde::Serialize;
use std::collections::BTreeMap;

const TOP_N: usize = 5;

/// Figures behind the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub tourists: usize,
    pub guides: usize,
    pub attractions: usize,
    pub bookings: usize,
    pub bookings_by_status: BTreeMap<String, usize>,
    pub festival_bookings: usize,
    /// Total price of confirmed and completed bookings.
    pub revenue: f64,
    pub commission_paid: f64,
    pub nationalities: BTreeMap<String, usize>,
    pub popular_attractions: Vec<(String, usize)>,
    pub top_guides: Vec<(String, f64)>,
}

pub fn build_report(ledger: &Ledger) -> Report {
    let mut bookings_by_status = BTreeMap::new();
    let mut per_attraction: BTreeMap<&str, usize> = BTreeMap::new();
    let mut festival_bookings = 0;
    let mut revenue = 0.0;

    for booking in ledger.bookings.values() {
        *bookings_by_status
            .entry(booking.status.to_string())
            .or_insert(0) += 1;
        if booking.status.is_active() {
            *per_attraction.entry(booking.attraction.as_str()).or_insert(0) += 1;
        }
        if booking.festival_discount {
            festival_bookings += 1;
        }
        if booking.status.is_earning() {
            revenue += booking.total_price;
        }
    }

    let mut nationalities = BTreeMap::new();
    for tourist in ledger.tourists.values() {
        *nationalities.entry(tourist.nationality.clone()).or_insert(0) += 1;
    }

    let mut popular_attractions: Vec<(String, usize)> = per_attraction
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    popular_attractions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    popular_attractions.truncate(TOP_N);

    let mut top_guides: Vec<(String, f64)> = ledger
        .guides
        .values()
        .map(|g| (g.person.username.clone(), g.total_earnings))
        .collect();
    top_guides.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_guides.truncate(TOP_N);

    Report {
        tourists: ledger.tourists.len(),
        guides: ledger.guides.len(),
        attractions: ledger.attractions.len(),
        bookings: ledger.bookings.len(),
        bookings_by_status,
        festival_bookings,
        revenue,
        commission_paid: ledger.guides.values().map(|g| g.total_earnings).sum(),
        nationalities,
        popular_attractions,
        top_guides,
    }
}
