use crate::utils::error::Result;
use chrono::NaiveDate;

/// Byte-level persistence the record store writes through.
pub trait Storage {
    /// Returns `None` when the file does not exist yet.
    fn read_file(&self, path: &str) -> Result<Option<String>>;

    /// Replaces the whole file. Implementations must not leave a half-written file behind.
    fn write_file(&self, path: &str, data: &str) -> Result<()>;

    fn exists(&self, path: &str) -> Result<bool>;

    /// Creates the storage root if needed.
    fn prepare(&self) -> Result<()> {
        Ok(())
    }
}

/// Source of "today" for window checks.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
