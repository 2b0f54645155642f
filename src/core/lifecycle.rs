//! Booking state machine.
//!
//! Every transition validates first and only then touches the booking. The returned
//! [`Bookkeeping`] lists the side effects on attractions and guides; the ledger applies
//! them so a rejected transition never leaves partial state behind.

use crate::core::policy::BookingPolicy;
use crate::core::pricing::compute_price;
use crate::domain::model::{Attraction, Booking, BookingStatus, Guide, Tourist};
use crate::utils::error::{Result, TransitionError, TrekError};
use chrono::NaiveDate;

/// Side effects of a transition on entities other than the booking itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bookkeeping {
    /// Attraction whose booking count goes down by one.
    pub release_slot: Option<String>,
    /// Attraction whose booking count goes up by one.
    pub claim_slot: Option<String>,
    /// Per-guide earnings adjustments.
    pub commission: Vec<(String, f64)>,
}

impl Bookkeeping {
    fn credit(&mut self, guide: &str, amount: f64) {
        if amount != 0.0 {
            self.commission.push((guide.to_string(), amount));
        }
    }
}

/// Everything `modify` may change. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct BookingChange {
    pub attraction: Option<String>,
    pub trek_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn invalid_status(booking: &Booking, action: &'static str) -> TrekError {
    TransitionError::InvalidStatus {
        booking_id: booking.id,
        action,
        status: booking.status.to_string(),
    }
    .into()
}

/// Builds a new Pending booking. `active_bookings` is how many open (pending or
/// confirmed) bookings the tourist already holds.
#[allow(clippy::too_many_arguments)]
pub fn create_booking(
    id: u32,
    tourist: &Tourist,
    active_bookings: usize,
    attraction: &Attraction,
    trek_date: NaiveDate,
    notes: &str,
    today: NaiveDate,
    policy: &BookingPolicy,
) -> Result<Booking> {
    if trek_date <= today {
        return Err(TrekError::validation(
            "trek_date",
            format!("trek date {} must be after {}", trek_date, today),
        ));
    }

    if !attraction.is_available() {
        return Err(TrekError::capacity(format!(
            "{} is not accepting bookings ({} of {} spots taken{})",
            attraction.name,
            attraction.current_bookings,
            attraction.max_capacity,
            if attraction.active { "" } else { ", inactive" }
        )));
    }

    if active_bookings >= policy.max_tourist_bookings {
        return Err(TrekError::capacity(format!(
            "{} already holds {} active bookings, the maximum is {}",
            tourist.person.username, active_bookings, policy.max_tourist_bookings
        )));
    }

    let quote = compute_price(attraction, trek_date);

    Ok(Booking {
        id,
        tourist: tourist.person.username.clone(),
        guide: None,
        attraction: attraction.name.clone(),
        booked_on: today,
        trek_date,
        status: BookingStatus::Pending,
        total_price: quote.price,
        festival_discount: quote.festival_applied,
        notes: notes.to_string(),
    })
}

pub fn confirm(
    booking: &mut Booking,
    attraction: &Attraction,
    policy: &BookingPolicy,
) -> Result<Bookkeeping> {
    if booking.status != BookingStatus::Pending {
        return Err(invalid_status(booking, "confirm"));
    }

    if !attraction.is_available() {
        return Err(TrekError::capacity(format!(
            "{} is fully booked",
            attraction.name
        )));
    }

    booking.status = BookingStatus::Confirmed;

    let mut effects = Bookkeeping {
        claim_slot: Some(booking.attraction.clone()),
        ..Default::default()
    };
    if let Some(guide) = &booking.guide {
        effects.credit(guide, policy.commission(booking.total_price));
    }
    Ok(effects)
}

pub fn cancel(booking: &mut Booking, today: NaiveDate, policy: &BookingPolicy) -> Result<Bookkeeping> {
    if !booking.status.is_open() {
        return Err(invalid_status(booking, "cancel"));
    }

    let days_left = booking.days_until_trek(today);
    if days_left < policy.cancel_window_days {
        return Err(TransitionError::CancelWindow {
            booking_id: booking.id,
            days_left,
            minimum: policy.cancel_window_days,
        }
        .into());
    }

    let previous = booking.status;
    booking.status = BookingStatus::Cancelled;

    let mut effects = Bookkeeping::default();
    if previous.holds_slot() {
        effects.release_slot = Some(booking.attraction.clone());
    }
    if let (true, Some(guide)) = (previous.is_earning(), &booking.guide) {
        effects.credit(guide, -policy.commission(booking.total_price));
    }
    Ok(effects)
}

/// `new_attraction` is the attraction the booking ends up on, which is the current one
/// when the change leaves it alone.
pub fn modify(
    booking: &mut Booking,
    new_attraction: &Attraction,
    change: BookingChange,
    today: NaiveDate,
    policy: &BookingPolicy,
) -> Result<Bookkeeping> {
    if !booking.status.is_open() {
        return Err(invalid_status(booking, "modify"));
    }

    let days_left = booking.days_until_trek(today);
    if days_left < policy.modify_window_days {
        return Err(TransitionError::ModifyWindow {
            booking_id: booking.id,
            days_left,
            minimum: policy.modify_window_days,
        }
        .into());
    }

    let trek_date = change.trek_date.unwrap_or(booking.trek_date);
    if trek_date <= today {
        return Err(TrekError::validation(
            "trek_date",
            format!("trek date {} must be after {}", trek_date, today),
        ));
    }

    let moving = new_attraction.name != booking.attraction;
    if moving && !new_attraction.is_available() {
        return Err(TrekError::capacity(format!(
            "{} is not accepting bookings",
            new_attraction.name
        )));
    }

    let mut effects = Bookkeeping::default();
    if moving && booking.status.holds_slot() {
        effects.release_slot = Some(booking.attraction.clone());
        effects.claim_slot = Some(new_attraction.name.clone());
    }

    let quote = compute_price(new_attraction, trek_date);
    if let (true, Some(guide)) = (booking.status.is_earning(), &booking.guide) {
        effects.credit(
            guide,
            policy.commission(quote.price) - policy.commission(booking.total_price),
        );
    }

    booking.attraction = new_attraction.name.clone();
    booking.trek_date = trek_date;
    booking.total_price = quote.price;
    booking.festival_discount = quote.festival_applied;
    if let Some(notes) = change.notes {
        booking.notes = notes;
    }

    Ok(effects)
}

/// Checks that a booking may be permanently removed.
pub fn purge(booking: &Booking) -> Result<()> {
    if booking.status != BookingStatus::Cancelled {
        return Err(invalid_status(booking, "purge"));
    }
    Ok(())
}

/// Administrative override: any status may move to any other. Capacity is not enforced.
pub fn set_status(
    booking: &mut Booking,
    status: BookingStatus,
    policy: &BookingPolicy,
) -> Bookkeeping {
    let previous = booking.status;
    booking.status = status;

    let mut effects = Bookkeeping::default();
    match (previous.holds_slot(), status.holds_slot()) {
        (true, false) => effects.release_slot = Some(booking.attraction.clone()),
        (false, true) => effects.claim_slot = Some(booking.attraction.clone()),
        _ => {}
    }

    if let Some(guide) = &booking.guide {
        let commission = policy.commission(booking.total_price);
        match (previous.is_earning(), status.is_earning()) {
            (false, true) => effects.credit(guide, commission),
            (true, false) => effects.credit(guide, -commission),
            _ => {}
        }
    }
    effects
}

/// Marks a confirmed trek as done once its date has arrived.
pub fn complete(booking: &mut Booking, today: NaiveDate) -> Result<Bookkeeping> {
    if booking.status != BookingStatus::Confirmed {
        return Err(invalid_status(booking, "complete"));
    }
    if booking.trek_date > today {
        return Err(TransitionError::NotYetTrekked {
            booking_id: booking.id,
            trek_date: booking.trek_date.to_string(),
        }
        .into());
    }

    booking.status = BookingStatus::Completed;
    Ok(Bookkeeping {
        release_slot: Some(booking.attraction.clone()),
        ..Default::default()
    })
}

/// Assigns `guide` to the booking. `guide_load` is the number of non-cancelled bookings
/// the guide already holds, not counting this one.
pub fn assign(
    booking: &mut Booking,
    guide: &Guide,
    guide_load: usize,
    policy: &BookingPolicy,
) -> Result<Bookkeeping> {
    if !booking.status.is_open() {
        return Err(invalid_status(booking, "assign a guide to"));
    }

    let username = guide.person.username.as_str();
    if booking.is_assigned_to(username) {
        return Ok(Bookkeeping::default());
    }

    if guide_load >= policy.max_guide_load {
        return Err(TrekError::capacity(format!(
            "guide {} already has {} active bookings, the maximum is {}",
            username, guide_load, policy.max_guide_load
        )));
    }

    if !guide.available {
        return Err(TrekError::capacity(format!(
            "guide {} is not available",
            username
        )));
    }

    let mut effects = Bookkeeping::default();
    if booking.status.is_earning() {
        let commission = policy.commission(booking.total_price);
        if let Some(previous) = &booking.guide {
            effects.credit(previous, -commission);
        }
        effects.credit(username, commission);
    }

    booking.guide = Some(username.to_string());
    Ok(effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Altitude, Difficulty, Person};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn everest() -> Attraction {
        Attraction::new("Everest Base Camp", "Khumbu", Altitude::High, Difficulty::Hard, 1000.0)
    }

    fn tourist() -> Tourist {
        Tourist {
            person: Person {
                username: "maya".into(),
                password_hash: String::new(),
                full_name: "Maya Gurung".into(),
                email: "maya@example.com".into(),
                phone: String::new(),
            },
            nationality: "Nepali".into(),
            total_spent: 0.0,
        }
    }

    fn guide(available: bool) -> Guide {
        Guide {
            person: Person {
                username: "ram_guide".into(),
                password_hash: String::new(),
                full_name: "Ram Bahadur".into(),
                email: "ram@guide.com".into(),
                phone: String::new(),
            },
            languages: vec!["English".into(), "Nepali".into()],
            experience_years: 8,
            specializations: vec![],
            total_earnings: 0.0,
            available,
        }
    }

    fn booking_in(days: i64, status: BookingStatus) -> Booking {
        let policy = BookingPolicy::default();
        let mut booking = create_booking(
            1,
            &tourist(),
            0,
            &everest(),
            today() + Duration::days(days),
            "",
            today(),
            &policy,
        )
        .unwrap();
        booking.status = status;
        booking
    }

    #[test]
    fn test_create_rejects_past_dates_and_full_attractions() {
        let policy = BookingPolicy::default();
        let past = create_booking(1, &tourist(), 0, &everest(), today(), "", today(), &policy);
        assert!(matches!(past, Err(TrekError::Validation { .. })));

        let mut full = everest();
        full.current_bookings = full.max_capacity;
        let result = create_booking(1, &tourist(), 0, &full, today() + Duration::days(30), "", today(), &policy);
        assert!(matches!(result, Err(TrekError::Capacity { .. })));

        let busy = create_booking(1, &tourist(), 10, &everest(), today() + Duration::days(30), "", today(), &policy);
        assert!(matches!(busy, Err(TrekError::Capacity { .. })));
    }

    #[test]
    fn test_confirm_only_from_pending() {
        let policy = BookingPolicy::default();
        let mut booking = booking_in(30, BookingStatus::Pending);
        let effects = confirm(&mut booking, &everest(), &policy).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(effects.claim_slot.as_deref(), Some("Everest Base Camp"));

        assert!(confirm(&mut booking, &everest(), &policy).is_err());
    }

    #[test]
    fn test_cancel_window_boundaries() {
        let policy = BookingPolicy::default();
        for (days, status, allowed) in [
            (7, BookingStatus::Pending, true),
            (7, BookingStatus::Confirmed, true),
            (6, BookingStatus::Pending, false),
            (5, BookingStatus::Confirmed, false),
            (30, BookingStatus::Completed, false),
            (30, BookingStatus::Cancelled, false),
        ] {
            let mut booking = booking_in(days, status);
            let result = cancel(&mut booking, today(), &policy);
            assert_eq!(result.is_ok(), allowed, "days={} status={}", days, status);
            if !allowed {
                assert_eq!(booking.status, status);
            }
        }
    }

    #[test]
    fn test_cancel_rejection_names_the_window() {
        let policy = BookingPolicy::default();
        let mut booking = booking_in(5, BookingStatus::Confirmed);
        let err = cancel(&mut booking, today(), &policy).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot cancel booking #1: trek is in 5 days, minimum is 7"
        );
    }

    #[test]
    fn test_cancel_confirmed_releases_slot_and_commission() {
        let policy = BookingPolicy::default();
        let mut booking = booking_in(20, BookingStatus::Confirmed);
        booking.guide = Some("ram_guide".into());

        let effects = cancel(&mut booking, today(), &policy).unwrap();
        assert_eq!(effects.release_slot.as_deref(), Some("Everest Base Camp"));
        assert_eq!(effects.commission.len(), 1);
        assert!((effects.commission[0].1 + booking.total_price * 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_modify_window_boundaries() {
        let policy = BookingPolicy::default();
        for (days, status, allowed) in [
            (3, BookingStatus::Pending, true),
            (3, BookingStatus::Confirmed, true),
            (2, BookingStatus::Pending, false),
            (10, BookingStatus::Completed, false),
        ] {
            let mut booking = booking_in(days, status);
            let change = BookingChange {
                notes: Some("vegetarian meals".into()),
                ..Default::default()
            };
            let result = modify(&mut booking, &everest(), change, today(), &policy);
            assert_eq!(result.is_ok(), allowed, "days={} status={}", days, status);
        }
    }

    #[test]
    fn test_modify_reprices_for_new_date() {
        let policy = BookingPolicy::default();
        let mut booking = booking_in(30, BookingStatus::Pending);
        assert!(!booking.festival_discount);

        let change = BookingChange {
            trek_date: NaiveDate::from_ymd_opt(2025, 9, 10),
            ..Default::default()
        };
        modify(&mut booking, &everest(), change, today(), &policy).unwrap();
        assert!(booking.festival_discount);
        assert!((booking.total_price - 1280.0).abs() < 1e-9);
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[test]
    fn test_modify_moves_confirmed_slot() {
        let policy = BookingPolicy::default();
        let mut booking = booking_in(30, BookingStatus::Confirmed);
        let pokhara = Attraction::new("Pokhara Lake", "Pokhara", Altitude::Low, Difficulty::Easy, 200.0);
        let change = BookingChange {
            attraction: Some(pokhara.name.clone()),
            ..Default::default()
        };

        let effects = modify(&mut booking, &pokhara, change, today(), &policy).unwrap();
        assert_eq!(effects.release_slot.as_deref(), Some("Everest Base Camp"));
        assert_eq!(effects.claim_slot.as_deref(), Some("Pokhara Lake"));
        assert_eq!(booking.attraction, "Pokhara Lake");
        assert!((booking.total_price - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_purge_only_cancelled() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
        ] {
            assert!(purge(&booking_in(30, status)).is_err());
        }
        assert!(purge(&booking_in(30, BookingStatus::Cancelled)).is_ok());
    }

    #[test]
    fn test_set_status_commission_bookkeeping() {
        let policy = BookingPolicy::default();
        let mut booking = booking_in(30, BookingStatus::Cancelled);
        booking.guide = Some("ram_guide".into());
        let commission = booking.total_price * 0.3;

        let effects = set_status(&mut booking, BookingStatus::Completed, &policy);
        assert_eq!(effects.commission, vec![("ram_guide".to_string(), commission)]);
        assert_eq!(effects.claim_slot, None);

        let effects = set_status(&mut booking, BookingStatus::Confirmed, &policy);
        assert!(effects.commission.is_empty());
        assert_eq!(effects.claim_slot.as_deref(), Some("Everest Base Camp"));

        let effects = set_status(&mut booking, BookingStatus::Cancelled, &policy);
        assert_eq!(effects.commission, vec![("ram_guide".to_string(), -commission)]);
        assert_eq!(effects.release_slot.as_deref(), Some("Everest Base Camp"));
    }

    #[test]
    fn test_assign_rejects_sixth_booking_regardless_of_availability() {
        let policy = BookingPolicy::default();
        for available in [true, false] {
            let mut booking = booking_in(30, BookingStatus::Pending);
            let result = assign(&mut booking, &guide(available), 5, &policy);
            assert!(matches!(result, Err(TrekError::Capacity { .. })));
            assert_eq!(booking.guide, None);
        }
    }

    #[test]
    fn test_assign_unavailable_guide() {
        let policy = BookingPolicy::default();
        let mut booking = booking_in(30, BookingStatus::Pending);
        assert!(assign(&mut booking, &guide(false), 0, &policy).is_err());
        assert!(assign(&mut booking, &guide(true), 4, &policy).is_ok());
        assert_eq!(booking.guide.as_deref(), Some("ram_guide"));
    }

    #[test]
    fn test_assign_confirmed_accrues_commission() {
        let policy = BookingPolicy::default();
        let mut booking = booking_in(30, BookingStatus::Confirmed);
        booking.guide = Some("sita_guide".into());

        let effects = assign(&mut booking, &guide(true), 0, &policy).unwrap();
        let commission = booking.total_price * 0.3;
        assert_eq!(
            effects.commission,
            vec![
                ("sita_guide".to_string(), -commission),
                ("ram_guide".to_string(), commission)
            ]
        );
    }

    #[test]
    fn test_complete_requires_trek_date() {
        let mut booking = booking_in(3, BookingStatus::Confirmed);
        assert!(complete(&mut booking, today()).is_err());

        let later = today() + Duration::days(3);
        let effects = complete(&mut booking, later).unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
        assert_eq!(effects.release_slot.as_deref(), Some("Everest Base Camp"));
    }
}
