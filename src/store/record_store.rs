use crate::core::ledger::Ledger;
use crate::core::policy::BookingPolicy;
use crate::domain::model::{Admin, Attraction, Booking, Guide, Tourist};
use crate::domain::ports::Storage;
use crate::store::codec::{parse_records, write_record};
use crate::store::records::{Recordable, Sequence};
use crate::store::seed;
use crate::utils::error::{Result, TrekError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What to do with a record that cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the load with the file and line of the first bad record.
    #[default]
    Reject,
    /// Drop the record, log it, and list it in the load report.
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub file: &'static str,
    pub line: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub skipped: Vec<SkippedRecord>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Loads and saves entity collections, one file per kind.
///
/// Every save rewrites the whole file. There is no append path, so a collection on disk
/// is always exactly what was last committed.
#[derive(Debug, Clone)]
pub struct RecordStore<S: Storage> {
    storage: S,
    on_malformed: MalformedPolicy,
}

impl<S: Storage> RecordStore<S> {
    pub fn new(storage: S, on_malformed: MalformedPolicy) -> Self {
        Self {
            storage,
            on_malformed,
        }
    }

    fn reject_or_skip(
        &self,
        skipped: &mut Vec<SkippedRecord>,
        file: &'static str,
        line: usize,
        reason: String,
    ) -> Result<()> {
        match self.on_malformed {
            MalformedPolicy::Reject => Err(TrekError::Parse {
                file: file.to_string(),
                line,
                reason,
            }),
            MalformedPolicy::Skip => {
                tracing::warn!("Skipping record in {} at line {}: {}", file, line, reason);
                skipped.push(SkippedRecord { file, line, reason });
                Ok(())
            }
        }
    }

    pub fn load<T: Recordable>(&self) -> Result<Loaded<T>> {
        let mut loaded = Loaded {
            records: Vec::new(),
            skipped: Vec::new(),
        };

        let Some(text) = self.storage.read_file(T::FILE)? else {
            tracing::debug!("{} does not exist yet", T::FILE);
            return Ok(loaded);
        };

        let parsed = parse_records(&text);
        for malformed in parsed.malformed {
            self.reject_or_skip(&mut loaded.skipped, T::FILE, malformed.line, malformed.reason)?;
        }

        let mut seen = HashSet::new();
        for raw in &parsed.records {
            match T::from_record(raw) {
                Ok(record) => {
                    if seen.insert(record.key()) {
                        loaded.records.push(record);
                    } else {
                        let reason = format!("duplicate {} '{}'", T::KIND, record.key());
                        self.reject_or_skip(&mut loaded.skipped, T::FILE, raw.line, reason)?;
                    }
                }
                Err(reason) => {
                    self.reject_or_skip(&mut loaded.skipped, T::FILE, raw.line, reason)?;
                }
            }
        }

        tracing::debug!(
            "Loaded {} {} records from {} ({} skipped)",
            loaded.records.len(),
            T::KIND,
            T::FILE,
            loaded.skipped.len()
        );
        Ok(loaded)
    }

    /// Overwrites the kind's file with `records`.
    pub fn save<T: Recordable>(&self, records: &[T]) -> Result<()> {
        let mut out = String::new();
        for record in records {
            write_record(&mut out, &record.to_fields());
        }
        self.storage.write_file(T::FILE, &out)?;
        tracing::debug!("Saved {} {} records to {}", records.len(), T::KIND, T::FILE);
        Ok(())
    }

    /// Loads every collection into a ledger, resolving booking references. The admin's
    /// username is reserved; stored accounts that reuse it are malformed.
    pub fn load_ledger(
        &self,
        policy: BookingPolicy,
        admin: Option<Admin>,
    ) -> Result<(Ledger, LoadReport)> {
        let mut report = LoadReport::default();

        let attractions = self.load::<Attraction>()?;
        let tourists = self.load::<Tourist>()?;
        let guides = self.load::<Guide>()?;
        let bookings = self.load::<Booking>()?;
        let sequence = self.load::<Sequence>()?;

        report.skipped.extend(attractions.skipped);
        report.skipped.extend(tourists.skipped);
        report.skipped.extend(guides.skipped);
        report.skipped.extend(bookings.skipped);
        report.skipped.extend(sequence.skipped);

        let mut tourist_records = tourists.records;
        let mut guide_records = guides.records;
        if let Some(admin) = &admin {
            let reserved = admin.person.username.as_str();
            let clashes = [
                (Tourist::FILE, tourist_records.iter().any(|t| t.person.username == reserved)),
                (Guide::FILE, guide_records.iter().any(|g| g.person.username == reserved)),
            ];
            for (file, clash) in clashes {
                if clash {
                    let reason = format!("username '{}' is reserved for the admin", reserved);
                    self.reject_or_skip(&mut report.skipped, file, 0, reason)?;
                }
            }
            tourist_records.retain(|t| t.person.username != reserved);
            guide_records.retain(|g| g.person.username != reserved);
        }

        let tourist_names: HashSet<&str> = tourist_records
            .iter()
            .map(|t| t.person.username.as_str())
            .collect();
        let mut kept_guides = Vec::with_capacity(guide_records.len());
        for guide in guide_records {
            if tourist_names.contains(guide.person.username.as_str()) {
                let reason = format!(
                    "username '{}' is already used by a tourist",
                    guide.person.username
                );
                self.reject_or_skip(&mut report.skipped, Guide::FILE, 0, reason)?;
            } else {
                kept_guides.push(guide);
            }
        }

        let attraction_names: HashSet<&str> =
            attractions.records.iter().map(|a| a.name.as_str()).collect();
        let mut kept_bookings = Vec::with_capacity(bookings.records.len());
        for booking in bookings.records {
            if attraction_names.contains(booking.attraction.as_str()) {
                kept_bookings.push(booking);
                continue;
            }
            match self.on_malformed {
                MalformedPolicy::Reject => {
                    return Err(TrekError::DanglingReference {
                        booking_id: booking.id,
                        attraction: booking.attraction,
                    });
                }
                MalformedPolicy::Skip => {
                    let reason = format!(
                        "booking #{} references unknown attraction '{}'",
                        booking.id, booking.attraction
                    );
                    tracing::warn!("Skipping {}", reason);
                    report.skipped.push(SkippedRecord {
                        file: Booking::FILE,
                        line: 0,
                        reason,
                    });
                }
            }
        }

        let next_booking_id = sequence
            .records
            .first()
            .map(|s| s.next_booking_id)
            .unwrap_or(1);

        let mut ledger = Ledger::from_parts(
            tourist_records,
            kept_guides,
            attractions.records,
            kept_bookings,
            next_booking_id,
            policy,
        );
        ledger.set_admin(admin);
        Ok((ledger, report))
    }

    /// Writes every collection. Each file is replaced atomically; derived totals are
    /// rebuilt on load, so they never disagree with the bookings file.
    pub fn commit(&self, ledger: &Ledger) -> Result<()> {
        let attractions: Vec<Attraction> = ledger.attractions.values().cloned().collect();
        let tourists: Vec<Tourist> = ledger.tourists.values().cloned().collect();
        let guides: Vec<Guide> = ledger.guides.values().cloned().collect();
        let bookings: Vec<Booking> = ledger.bookings.values().cloned().collect();

        self.save(&attractions)?;
        self.save(&tourists)?;
        self.save(&guides)?;
        self.save(&bookings)?;
        self.save(&[Sequence {
            next_booking_id: ledger.next_booking_id(),
        }])?;

        tracing::info!(
            "Committed {} attractions, {} tourists, {} guides, {} bookings",
            attractions.len(),
            tourists.len(),
            guides.len(),
            bookings.len()
        );
        Ok(())
    }

    /// First-run setup: seeds default attractions and guides where their files are
    /// missing. Returns whether anything was written.
    pub fn initialize(&self) -> Result<bool> {
        self.storage.prepare()?;
        let mut seeded = false;

        if !self.storage.exists(Attraction::FILE)? {
            self.save(&seed::default_attractions())?;
            tracing::info!("Seeded default attractions");
            seeded = true;
        }
        if !self.storage.exists(Guide::FILE)? {
            self.save(&seed::default_guides())?;
            tracing::info!("Seeded default guides");
            seeded = true;
        }
        Ok(seeded)
    }
}
