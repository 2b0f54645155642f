use crate::core::accounts::{NewGuide, NewTourist};
use crate::core::analytics::{build_report, Report};
use crate::core::ledger::Ledger;
use crate::core::lifecycle::BookingChange;
use crate::core::policy::BookingPolicy;
use crate::core::pricing::Quote;
use crate::domain::model::{Account, Admin, Attraction, Booking, BookingStatus, Guide, Tourist};
use crate::domain::ports::{Clock, Storage};
use crate::store::{LoadReport, RecordStore};
use crate::utils::error::Result;
use chrono::NaiveDate;

/// Front door for every operation: load the ledger, apply one change, commit.
///
/// Nothing is written when the change is rejected.
pub struct BookingDesk<S: Storage, C: Clock> {
    store: RecordStore<S>,
    clock: C,
    policy: BookingPolicy,
    admin: Option<Admin>,
}

impl<S: Storage, C: Clock> BookingDesk<S, C> {
    pub fn new(store: RecordStore<S>, clock: C, policy: BookingPolicy, admin: Option<Admin>) -> Self {
        Self {
            store,
            clock,
            policy,
            admin,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn initialize(&self) -> Result<bool> {
        self.store.initialize()
    }

    /// Current state, read-only.
    pub fn snapshot(&self) -> Result<(Ledger, LoadReport)> {
        self.store
            .load_ledger(self.policy.clone(), self.admin.clone())
    }

    fn transact<T, F>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger, NaiveDate) -> Result<T>,
    {
        let (mut ledger, _) = self.snapshot()?;
        let result = change(&mut ledger, self.clock.today())?;
        self.store.commit(&ledger)?;
        Ok(result)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Account> {
        let (ledger, _) = self.snapshot()?;
        let account = ledger.authenticate(username, password)?;
        tracing::info!("{} '{}' logged in", account.role(), username);
        Ok(account)
    }

    pub fn register_tourist(&self, form: NewTourist) -> Result<Tourist> {
        self.transact(|ledger, _| ledger.register_tourist(form).cloned())
    }

    pub fn register_guide(&self, form: NewGuide) -> Result<Guide> {
        self.transact(|ledger, _| ledger.register_guide(form).cloned())
    }

    pub fn remove_account(&self, username: &str) -> Result<Account> {
        self.transact(|ledger, _| ledger.remove_account(username))
    }

    pub fn set_guide_availability(&self, username: &str, available: bool) -> Result<()> {
        self.transact(|ledger, _| ledger.set_guide_availability(username, available))
    }

    pub fn add_attraction(&self, attraction: Attraction) -> Result<()> {
        self.transact(|ledger, _| ledger.add_attraction(attraction))
    }

    pub fn remove_attraction(&self, name: &str) -> Result<Attraction> {
        self.transact(|ledger, _| ledger.remove_attraction(name))
    }

    pub fn set_attraction_active(&self, name: &str, active: bool) -> Result<()> {
        self.transact(|ledger, _| ledger.set_attraction_active(name, active))
    }

    pub fn quote(&self, attraction: &str, trek_date: NaiveDate) -> Result<Quote> {
        let (ledger, _) = self.snapshot()?;
        ledger.quote(attraction, trek_date)
    }

    pub fn book(
        &self,
        tourist: &str,
        attraction: &str,
        trek_date: NaiveDate,
        notes: &str,
    ) -> Result<Booking> {
        self.transact(|ledger, today| {
            ledger
                .create_booking(tourist, attraction, trek_date, notes, today)
                .cloned()
        })
    }

    pub fn confirm(&self, id: u32) -> Result<Booking> {
        self.transact(|ledger, _| ledger.confirm(id).cloned())
    }

    pub fn cancel(&self, id: u32) -> Result<Booking> {
        self.transact(|ledger, today| ledger.cancel(id, today).cloned())
    }

    pub fn modify(&self, id: u32, change: BookingChange) -> Result<Booking> {
        self.transact(|ledger, today| ledger.modify(id, change, today).cloned())
    }

    pub fn purge(&self, id: u32) -> Result<Booking> {
        self.transact(|ledger, _| ledger.purge(id))
    }

    pub fn set_status(&self, id: u32, status: BookingStatus) -> Result<Booking> {
        self.transact(|ledger, _| ledger.set_status(id, status).cloned())
    }

    pub fn complete(&self, id: u32) -> Result<Booking> {
        self.transact(|ledger, today| ledger.complete(id, today).cloned())
    }

    pub fn assign_guide(&self, id: u32, guide: &str) -> Result<Booking> {
        self.transact(|ledger, _| ledger.assign_guide(id, guide).cloned())
    }

    pub fn report(&self) -> Result<Report> {
        let (ledger, _) = self.snapshot()?;
        Ok(build_report(&ledger))
    }
}
