use crate::utils::error::TrekError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of concurrent bookings an attraction accepts.
pub const DEFAULT_CAPACITY: u32 = 50;

/// Highest admin access level.
pub const MAX_ACCESS_LEVEL: u8 = 10;

macro_rules! labelled_enum {
    ($name:ident, $field:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = TrekError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.trim().eq_ignore_ascii_case($label) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(TrekError::validation(
                    $field,
                    format!("unknown value '{}'", s.trim()),
                ))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Tourist,
    Guide,
    Admin,
}

labelled_enum!(Role, "role" {
    Tourist => "Tourist",
    Guide => "Guide",
    Admin => "Admin",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Altitude {
    High,
    Low,
}

labelled_enum!(Altitude, "altitude" {
    High => "High",
    Low => "Low",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

labelled_enum!(Difficulty, "difficulty" {
    Easy => "Easy",
    Medium => "Medium",
    Hard => "Hard",
});

impl Difficulty {
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Easy => 1.0,
            Self::Medium => 1.3,
            Self::Hard => 1.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

labelled_enum!(BookingStatus, "status" {
    Pending => "Pending",
    Confirmed => "Confirmed",
    Cancelled => "Cancelled",
    Completed => "Completed",
});

impl BookingStatus {
    /// Counts toward the tourist's total spent.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Statuses under which the assigned guide's commission accrues.
    pub fn is_earning(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }

    /// Statuses a tourist may still cancel or modify.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Only confirmed bookings hold a slot on the attraction.
    pub fn holds_slot(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Fields shared by every account role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tourist {
    pub person: Person,
    pub nationality: String,
    pub total_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub person: Person,
    pub languages: Vec<String>,
    pub experience_years: u32,
    pub specializations: Vec<String>,
    pub total_earnings: f64,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub person: Person,
    pub access_level: u8,
}

impl Admin {
    pub fn can_manage_users(&self) -> bool {
        self.access_level >= 5
    }

    pub fn can_view_analytics(&self) -> bool {
        self.access_level >= 3
    }

    pub fn can_manage_system(&self) -> bool {
        self.access_level >= 8
    }
}

/// A logged-in or stored account, tagged by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Account {
    Tourist(Tourist),
    Guide(Guide),
    Admin(Admin),
}

impl Account {
    pub fn person(&self) -> &Person {
        match self {
            Self::Tourist(t) => &t.person,
            Self::Guide(g) => &g.person,
            Self::Admin(a) => &a.person,
        }
    }

    pub fn username(&self) -> &str {
        &self.person().username
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Tourist(_) => Role::Tourist,
            Self::Guide(_) => Role::Guide,
            Self::Admin(_) => Role::Admin,
        }
    }

    pub fn greeting(&self) -> String {
        match self {
            Self::Tourist(t) => format!(
                "Welcome Tourist {}! Total spent: ${:.2}",
                t.person.full_name, t.total_spent
            ),
            Self::Guide(g) => format!(
                "Welcome Guide {}! {} years experience, earnings ${:.2}, {}",
                g.person.full_name,
                g.experience_years,
                g.total_earnings,
                if g.available { "available" } else { "busy" }
            ),
            Self::Admin(a) => format!(
                "Welcome Administrator {}! Access level {}",
                a.person.full_name, a.access_level
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    pub location: String,
    pub altitude: Altitude,
    pub difficulty: Difficulty,
    pub base_price: f64,
    pub description: String,
    pub max_capacity: u32,
    pub current_bookings: u32,
    pub active: bool,
}

impl Attraction {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        altitude: Altitude,
        difficulty: Difficulty,
        base_price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            altitude,
            difficulty,
            base_price,
            description: String::new(),
            max_capacity: DEFAULT_CAPACITY,
            current_bookings: 0,
            active: true,
        }
    }

    pub fn is_available(&self) -> bool {
        self.active && self.current_bookings < self.max_capacity
    }

    pub fn available_spots(&self) -> u32 {
        self.max_capacity.saturating_sub(self.current_bookings)
    }

    pub fn is_high_altitude(&self) -> bool {
        self.altitude == Altitude::High
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: u32,
    pub tourist: String,
    pub guide: Option<String>,
    pub attraction: String,
    pub booked_on: NaiveDate,
    pub trek_date: NaiveDate,
    pub status: BookingStatus,
    pub total_price: f64,
    pub festival_discount: bool,
    pub notes: String,
}

impl Booking {
    /// Whole days from `today` until the trek; negative once it has passed.
    pub fn days_until_trek(&self, today: NaiveDate) -> i64 {
        (self.trek_date - today).num_days()
    }

    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.trek_date > today && self.status.is_open()
    }

    pub fn is_assigned_to(&self, guide: &str) -> bool {
        self.guide.as_deref() == Some(guide)
    }
}
