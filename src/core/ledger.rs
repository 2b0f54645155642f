use crate::core::accounts::{verify_password, NewGuide, NewTourist};
use crate::core::lifecycle::{self, BookingChange, Bookkeeping};
use crate::core::policy::BookingPolicy;
use crate::core::pricing::{compute_price, Quote};
use crate::domain::model::{Account, Admin, Attraction, Booking, BookingStatus, Guide, Tourist};
use crate::utils::error::{Result, TrekError};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_amount, validate_positive_number,
    validate_single_line, Validate,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// In-memory snapshot of every collection, plus the booking id sequence.
///
/// Derived figures (tourist spend, guide earnings, attraction load) are kept up to date
/// incrementally by each operation and rebuilt from bookings by [`Ledger::recompute_derived`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub tourists: BTreeMap<String, Tourist>,
    pub guides: BTreeMap<String, Guide>,
    pub attractions: BTreeMap<String, Attraction>,
    pub bookings: BTreeMap<u32, Booking>,
    next_booking_id: u32,
    admin: Option<Admin>,
    policy: BookingPolicy,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(BookingPolicy::default())
    }
}

impl Ledger {
    pub fn new(policy: BookingPolicy) -> Self {
        Self {
            tourists: BTreeMap::new(),
            guides: BTreeMap::new(),
            attractions: BTreeMap::new(),
            bookings: BTreeMap::new(),
            next_booking_id: 1,
            admin: None,
            policy,
        }
    }

    /// Assembles a ledger from loaded collections and rebuilds derived figures.
    pub fn from_parts(
        tourists: Vec<Tourist>,
        guides: Vec<Guide>,
        attractions: Vec<Attraction>,
        bookings: Vec<Booking>,
        next_booking_id: u32,
        policy: BookingPolicy,
    ) -> Self {
        let mut ledger = Self::new(policy);
        ledger.tourists = tourists
            .into_iter()
            .map(|t| (t.person.username.clone(), t))
            .collect();
        ledger.guides = guides
            .into_iter()
            .map(|g| (g.person.username.clone(), g))
            .collect();
        ledger.attractions = attractions
            .into_iter()
            .map(|a| (a.name.clone(), a))
            .collect();
        ledger.bookings = bookings.into_iter().map(|b| (b.id, b)).collect();
        ledger.next_booking_id = next_booking_id.max(1);
        ledger.recompute_derived();
        ledger
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    pub fn next_booking_id(&self) -> u32 {
        self.next_booking_id
    }

    pub fn admin(&self) -> Option<&Admin> {
        self.admin.as_ref()
    }

    pub fn set_admin(&mut self, admin: Option<Admin>) {
        self.admin = admin;
    }

    // ---- accounts ----

    pub fn username_taken(&self, username: &str) -> bool {
        self.tourists.contains_key(username)
            || self.guides.contains_key(username)
            || self
                .admin
                .as_ref()
                .is_some_and(|a| a.person.username == username)
    }

    fn ensure_username_free(&self, username: &str) -> Result<()> {
        if self.username_taken(username) {
            return Err(TrekError::Duplicate {
                kind: "Username",
                key: username.to_string(),
            });
        }
        Ok(())
    }

    pub fn register_tourist(&mut self, form: NewTourist) -> Result<&Tourist> {
        form.validate()?;
        self.ensure_username_free(&form.person.username)?;

        let tourist = form.into_tourist();
        let username = tourist.person.username.clone();
        tracing::info!("Registered tourist '{}'", username);
        Ok(self.tourists.entry(username).or_insert(tourist))
    }

    pub fn register_guide(&mut self, form: NewGuide) -> Result<&Guide> {
        form.validate()?;
        self.ensure_username_free(&form.person.username)?;

        let guide = form.into_guide();
        let username = guide.person.username.clone();
        tracing::info!("Registered guide '{}'", username);
        Ok(self.guides.entry(username).or_insert(guide))
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<Account> {
        if let Some(admin) = &self.admin {
            if admin.person.username == username {
                return if verify_password(username, password, &admin.person.password_hash) {
                    Ok(Account::Admin(admin.clone()))
                } else {
                    Err(TrekError::Authentication)
                };
            }
        }

        if let Some(tourist) = self.tourists.get(username) {
            if verify_password(username, password, &tourist.person.password_hash) {
                return Ok(Account::Tourist(tourist.clone()));
            }
        } else if let Some(guide) = self.guides.get(username) {
            if verify_password(username, password, &guide.person.password_hash) {
                return Ok(Account::Guide(guide.clone()));
            }
        }

        Err(TrekError::Authentication)
    }

    /// Deletes a tourist or guide. Any booking naming the account, whatever its status,
    /// blocks removal: a later registrant with the same username would inherit it.
    pub fn remove_account(&mut self, username: &str) -> Result<Account> {
        let referenced = self
            .bookings
            .values()
            .filter(|b| b.tourist == username || b.is_assigned_to(username))
            .count();
        if referenced > 0 {
            return Err(TrekError::validation(
                "username",
                format!(
                    "{} is named on {} bookings; purge cancelled ones or keep the account",
                    username, referenced
                ),
            ));
        }

        if let Some(tourist) = self.tourists.remove(username) {
            tracing::info!("Removed tourist '{}'", username);
            return Ok(Account::Tourist(tourist));
        }
        if let Some(guide) = self.guides.remove(username) {
            tracing::info!("Removed guide '{}'", username);
            return Ok(Account::Guide(guide));
        }
        Err(TrekError::not_found("Account", username))
    }

    pub fn set_guide_availability(&mut self, username: &str, available: bool) -> Result<()> {
        let guide = self
            .guides
            .get_mut(username)
            .ok_or_else(|| TrekError::not_found("Guide", username))?;
        guide.available = available;
        Ok(())
    }

    // ---- attractions ----

    pub fn add_attraction(&mut self, mut attraction: Attraction) -> Result<()> {
        // Stored names are trimmed on load, so they must be trimmed here too.
        attraction.name = attraction.name.trim().to_string();
        validate_non_empty_string("name", &attraction.name)?;
        validate_single_line("name", &attraction.name)?;
        validate_single_line("location", &attraction.location)?;
        validate_single_line("description", &attraction.description)?;
        validate_positive_amount("base_price", attraction.base_price)?;
        validate_positive_number("max_capacity", attraction.max_capacity as usize, 1)?;

        if self.attractions.contains_key(&attraction.name) {
            return Err(TrekError::Duplicate {
                kind: "Attraction",
                key: attraction.name,
            });
        }

        tracing::info!("Added attraction '{}'", attraction.name);
        self.attractions.insert(attraction.name.clone(), attraction);
        Ok(())
    }

    /// Removes an attraction no booking refers to. Referenced attractions can only be
    /// deactivated, otherwise their bookings would point nowhere.
    pub fn remove_attraction(&mut self, name: &str) -> Result<Attraction> {
        if !self.attractions.contains_key(name) {
            return Err(TrekError::not_found("Attraction", name));
        }

        let referenced = self.bookings.values().filter(|b| b.attraction == name).count();
        if referenced > 0 {
            return Err(TrekError::validation(
                "name",
                format!(
                    "{} is referenced by {} bookings; deactivate it instead",
                    name, referenced
                ),
            ));
        }

        tracing::info!("Removed attraction '{}'", name);
        self.attractions
            .remove(name)
            .ok_or_else(|| TrekError::not_found("Attraction", name))
    }

    pub fn set_attraction_active(&mut self, name: &str, active: bool) -> Result<()> {
        let attraction = self
            .attractions
            .get_mut(name)
            .ok_or_else(|| TrekError::not_found("Attraction", name))?;
        attraction.active = active;
        Ok(())
    }

    pub fn attraction(&self, name: &str) -> Result<&Attraction> {
        self.attractions
            .get(name)
            .ok_or_else(|| TrekError::not_found("Attraction", name))
    }

    pub fn quote(&self, attraction: &str, trek_date: NaiveDate) -> Result<Quote> {
        Ok(compute_price(self.attraction(attraction)?, trek_date))
    }

    // ---- bookings ----

    pub fn booking(&self, id: u32) -> Result<&Booking> {
        self.bookings
            .get(&id)
            .ok_or_else(|| TrekError::not_found("Booking", format!("#{}", id)))
    }

    pub fn bookings_of_tourist<'a>(&'a self, username: &'a str) -> impl Iterator<Item = &'a Booking> {
        self.bookings.values().filter(move |b| b.tourist == username)
    }

    pub fn bookings_of_guide<'a>(&'a self, username: &'a str) -> impl Iterator<Item = &'a Booking> {
        self.bookings.values().filter(move |b| b.is_assigned_to(username))
    }

    /// Pending or confirmed bookings the tourist holds.
    pub fn open_bookings_of(&self, tourist: &str) -> usize {
        self.bookings_of_tourist(tourist)
            .filter(|b| b.status.is_open())
            .count()
    }

    /// Non-cancelled bookings assigned to the guide, completed treks included.
    pub fn guide_load(&self, guide: &str) -> usize {
        self.bookings_of_guide(guide)
            .filter(|b| b.status.is_active())
            .count()
    }

    pub fn create_booking(
        &mut self,
        tourist: &str,
        attraction: &str,
        trek_date: NaiveDate,
        notes: &str,
        today: NaiveDate,
    ) -> Result<&Booking> {
        let tourist_record = self
            .tourists
            .get(tourist)
            .ok_or_else(|| TrekError::not_found("Tourist", tourist))?;
        let following_id = self
            .next_booking_id
            .checked_add(1)
            .filter(|_| !self.bookings.contains_key(&self.next_booking_id))
            .ok_or_else(|| TrekError::capacity("booking ids are exhausted"))?;
        let booking = lifecycle::create_booking(
            self.next_booking_id,
            tourist_record,
            self.open_bookings_of(tourist),
            self.attraction(attraction)?,
            trek_date,
            notes,
            today,
            &self.policy,
        )?;

        let id = booking.id;
        self.next_booking_id = following_id;
        tracing::info!(
            "Created booking #{} for {} at {} on {} (${:.2}{})",
            id,
            booking.tourist,
            booking.attraction,
            booking.trek_date,
            booking.total_price,
            if booking.festival_discount { ", festival discount" } else { "" }
        );
        self.bookings.insert(id, booking);
        self.recompute_tourist(tourist);
        self.booking(id)
    }

    pub fn confirm(&mut self, id: u32) -> Result<&Booking> {
        let booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| TrekError::not_found("Booking", format!("#{}", id)))?;
        let attraction = self
            .attractions
            .get(&booking.attraction)
            .ok_or_else(|| TrekError::not_found("Attraction", booking.attraction.clone()))?;

        let effects = lifecycle::confirm(booking, attraction, &self.policy)?;
        tracing::info!("Confirmed booking #{}", id);
        self.settle(id, effects)
    }

    pub fn cancel(&mut self, id: u32, today: NaiveDate) -> Result<&Booking> {
        let booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| TrekError::not_found("Booking", format!("#{}", id)))?;

        let effects = lifecycle::cancel(booking, today, &self.policy)?;
        tracing::info!("Cancelled booking #{}", id);
        self.settle(id, effects)
    }

    pub fn modify(&mut self, id: u32, change: BookingChange, today: NaiveDate) -> Result<&Booking> {
        let booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| TrekError::not_found("Booking", format!("#{}", id)))?;
        let target = change
            .attraction
            .clone()
            .unwrap_or_else(|| booking.attraction.clone());
        let attraction = self
            .attractions
            .get(&target)
            .ok_or_else(|| TrekError::not_found("Attraction", target.clone()))?;

        let effects = lifecycle::modify(booking, attraction, change, today, &self.policy)?;
        tracing::info!(
            "Modified booking #{}: {} on {} (${:.2})",
            id,
            booking.attraction,
            booking.trek_date,
            booking.total_price
        );
        self.settle(id, effects)
    }

    pub fn purge(&mut self, id: u32) -> Result<Booking> {
        lifecycle::purge(self.booking(id)?)?;
        let booking = self
            .bookings
            .remove(&id)
            .ok_or_else(|| TrekError::not_found("Booking", format!("#{}", id)))?;
        tracing::info!("Purged booking #{}", id);
        self.recompute_tourist(&booking.tourist);
        Ok(booking)
    }

    pub fn set_status(&mut self, id: u32, status: BookingStatus) -> Result<&Booking> {
        let booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| TrekError::not_found("Booking", format!("#{}", id)))?;
        let previous = booking.status;

        let effects = lifecycle::set_status(booking, status, &self.policy);
        tracing::info!("Booking #{} status overridden: {} -> {}", id, previous, status);
        self.settle(id, effects)
    }

    pub fn complete(&mut self, id: u32, today: NaiveDate) -> Result<&Booking> {
        let booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| TrekError::not_found("Booking", format!("#{}", id)))?;

        let effects = lifecycle::complete(booking, today)?;
        tracing::info!("Completed booking #{}", id);
        self.settle(id, effects)
    }

    pub fn assign_guide(&mut self, id: u32, guide: &str) -> Result<&Booking> {
        let guide_record = self
            .guides
            .get(guide)
            .ok_or_else(|| TrekError::not_found("Guide", guide))?;
        let load = self
            .bookings_of_guide(guide)
            .filter(|b| b.id != id && b.status.is_active())
            .count();
        let booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| TrekError::not_found("Booking", format!("#{}", id)))?;

        let effects = lifecycle::assign(booking, guide_record, load, &self.policy)?;
        tracing::info!("Assigned guide '{}' to booking #{}", guide, id);
        self.settle(id, effects)
    }

    /// Applies a transition's side effects and refreshes the booking owner's total.
    fn settle(&mut self, id: u32, effects: Bookkeeping) -> Result<&Booking> {
        if let Some(name) = &effects.release_slot {
            if let Some(attraction) = self.attractions.get_mut(name) {
                attraction.current_bookings = attraction.current_bookings.saturating_sub(1);
            }
        }
        if let Some(name) = &effects.claim_slot {
            if let Some(attraction) = self.attractions.get_mut(name) {
                attraction.current_bookings += 1;
            }
        }
        for (username, delta) in &effects.commission {
            match self.guides.get_mut(username) {
                Some(guide) => guide.total_earnings += delta,
                None => tracing::warn!("Commission for unknown guide '{}' dropped", username),
            }
        }

        let tourist = self.booking(id)?.tourist.clone();
        self.recompute_tourist(&tourist);
        self.booking(id)
    }

    fn recompute_tourist(&mut self, username: &str) {
        let spent: f64 = self
            .bookings_of_tourist(username)
            .filter(|b| b.status.is_active())
            .map(|b| b.total_price)
            .sum();
        if let Some(tourist) = self.tourists.get_mut(username) {
            tourist.total_spent = spent;
        }
    }

    /// Rebuilds every derived figure from the bookings.
    pub fn recompute_derived(&mut self) {
        let mut spent: BTreeMap<&str, f64> = BTreeMap::new();
        let mut earnings: BTreeMap<&str, f64> = BTreeMap::new();
        let mut slots: BTreeMap<&str, u32> = BTreeMap::new();
        let mut highest_id = 0;

        for booking in self.bookings.values() {
            highest_id = highest_id.max(booking.id);
            if booking.status.is_active() {
                *spent.entry(booking.tourist.as_str()).or_default() += booking.total_price;
            }
            if let (true, Some(guide)) = (booking.status.is_earning(), &booking.guide) {
                *earnings.entry(guide.as_str()).or_default() +=
                    self.policy.commission(booking.total_price);
            }
            if booking.status.holds_slot() {
                *slots.entry(booking.attraction.as_str()).or_default() += 1;
            }
        }

        for (name, tourist) in self.tourists.iter_mut() {
            tourist.total_spent = spent.get(name.as_str()).copied().unwrap_or(0.0);
        }
        for (name, guide) in self.guides.iter_mut() {
            guide.total_earnings = earnings.get(name.as_str()).copied().unwrap_or(0.0);
        }
        for (name, attraction) in self.attractions.iter_mut() {
            attraction.current_bookings = slots.get(name.as_str()).copied().unwrap_or(0);
        }

        self.next_booking_id = self.next_booking_id.max(highest_id.saturating_add(1));
    }
}
