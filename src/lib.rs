pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod store;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{LocalStorage, MemoryStorage};
pub use app::BookingDesk;
pub use config::AppConfig;
pub use core::{ledger::Ledger, policy::BookingPolicy};
pub use store::{MalformedPolicy, RecordStore};
pub use utils::error::{Result, TrekError};
