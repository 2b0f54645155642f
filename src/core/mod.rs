pub mod accounts;
pub mod analytics;
pub mod ledger;
pub mod lifecycle;
pub mod policy;
pub mod pricing;

pub use crate::domain::model::{
    Account, Admin, Altitude, Attraction, Booking, BookingStatus, Difficulty, Guide, Person,
    Role, Tourist,
};
pub use crate::domain::ports::{Clock, FixedClock, Storage, SystemClock};
pub use crate::utils::error::Result;
