pub mod desk;

pub use desk::BookingDesk;
