use crate::domain::model::{
    Attraction, Booking, BookingStatus, Guide, Person, Role, Tourist, DEFAULT_CAPACITY,
};
use crate::store::codec::RawRecord;
use chrono::NaiveDate;

/// An entity stored one-per-record in its own file.
pub trait Recordable: Sized {
    const FILE: &'static str;
    const KIND: &'static str;

    /// Identity used for duplicate detection.
    fn key(&self) -> String;

    fn to_fields(&self) -> Vec<(&'static str, String)>;

    fn from_record(record: &RawRecord) -> Result<Self, String>;
}

fn person_fields(person: &Person) -> Vec<(&'static str, String)> {
    vec![
        ("Username", person.username.clone()),
        ("Password", person.password_hash.clone()),
        ("Full Name", person.full_name.clone()),
        ("Email", person.email.clone()),
        ("Phone", person.phone.clone()),
    ]
}

fn person_from(record: &RawRecord, role: Role) -> Result<Person, String> {
    if let Some(stored) = record.get("Role") {
        let stored: Role = stored.parse().map_err(|e| format!("{}", e))?;
        if stored != role {
            return Err(format!("expected role {}, found {}", role, stored));
        }
    }

    let username = record.require("Username")?.trim();
    if username.is_empty() {
        return Err("field 'Username' is empty".to_string());
    }

    Ok(Person {
        username: username.to_string(),
        password_hash: record.require("Password")?.to_string(),
        full_name: record.get("Full Name").unwrap_or_default().to_string(),
        email: record.get("Email").unwrap_or_default().to_string(),
        phone: record.get("Phone").unwrap_or_default().to_string(),
    })
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

impl Recordable for Tourist {
    const FILE: &'static str = "tourists.txt";
    const KIND: &'static str = "Tourist";

    fn key(&self) -> String {
        self.person.username.clone()
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = person_fields(&self.person);
        fields.push(("Nationality", self.nationality.clone()));
        fields.push(("Role", Role::Tourist.to_string()));
        fields.push(("Total Spent", self.total_spent.to_string()));
        fields
    }

    fn from_record(record: &RawRecord) -> Result<Self, String> {
        Ok(Self {
            person: person_from(record, Role::Tourist)?,
            nationality: record.get("Nationality").unwrap_or_default().to_string(),
            total_spent: record.parse_or("Total Spent", 0.0)?,
        })
    }
}

impl Recordable for Guide {
    const FILE: &'static str = "guides.txt";
    const KIND: &'static str = "Guide";

    fn key(&self) -> String {
        self.person.username.clone()
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = person_fields(&self.person);
        fields.push(("Languages", self.languages.join(", ")));
        fields.push(("Experience", self.experience_years.to_string()));
        fields.push(("Role", Role::Guide.to_string()));
        fields.push(("Total Earnings", self.total_earnings.to_string()));
        fields.push(("Available", self.available.to_string()));
        fields.push(("Specializations", self.specializations.join(", ")));
        fields
    }

    fn from_record(record: &RawRecord) -> Result<Self, String> {
        let languages = split_list(Some(record.require("Languages")?));
        if languages.is_empty() {
            return Err("guide has no languages".to_string());
        }

        let experience_years: u32 = record.parse("Experience")?;
        if experience_years > 50 {
            return Err(format!("experience of {} years is out of range", experience_years));
        }

        Ok(Self {
            person: person_from(record, Role::Guide)?,
            languages,
            experience_years,
            specializations: split_list(record.get("Specializations")),
            total_earnings: record.parse_or("Total Earnings", 0.0)?,
            available: record.parse_or("Available", true)?,
        })
    }
}

impl Recordable for Attraction {
    const FILE: &'static str = "attractions.txt";
    const KIND: &'static str = "Attraction";

    fn key(&self) -> String {
        self.name.clone()
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Location", self.location.clone()),
            ("Altitude", self.altitude.to_string()),
            ("Difficulty", self.difficulty.to_string()),
            ("Base Price", self.base_price.to_string()),
            ("Max Capacity", self.max_capacity.to_string()),
            ("Active", self.active.to_string()),
            ("Description", self.description.clone()),
        ]
    }

    fn from_record(record: &RawRecord) -> Result<Self, String> {
        let name = record.require("Name")?.trim();
        if name.is_empty() {
            return Err("field 'Name' is empty".to_string());
        }

        let base_price: f64 = record.parse("Base Price")?;
        if !base_price.is_finite() || base_price <= 0.0 {
            return Err(format!("base price {} must be positive", base_price));
        }

        Ok(Self {
            name: name.to_string(),
            location: record.get("Location").unwrap_or_default().to_string(),
            altitude: record.parse("Altitude")?,
            difficulty: record.parse("Difficulty")?,
            base_price,
            description: record.get("Description").unwrap_or_default().to_string(),
            max_capacity: record.parse_or("Max Capacity", DEFAULT_CAPACITY)?,
            current_bookings: 0,
            active: record.parse_or("Active", true)?,
        })
    }
}

impl Recordable for Booking {
    const FILE: &'static str = "bookings.txt";
    const KIND: &'static str = "Booking";

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Booking ID", self.id.to_string()),
            ("Tourist", self.tourist.clone()),
            ("Guide", self.guide.clone().unwrap_or_default()),
            ("Attraction", self.attraction.clone()),
            ("Trek Date", self.trek_date.to_string()),
            ("Status", self.status.to_string()),
            ("Total Price", self.total_price.to_string()),
            ("Festival Discount", self.festival_discount.to_string()),
            ("Booking Date", self.booked_on.to_string()),
            ("Notes", self.notes.clone()),
        ]
    }

    fn from_record(record: &RawRecord) -> Result<Self, String> {
        let trek_date: NaiveDate = record.parse("Trek Date")?;
        let guide = record
            .get("Guide")
            .map(str::trim)
            .filter(|g| !g.is_empty() && *g != "Unassigned")
            .map(str::to_string);

        let total_price: f64 = record.parse("Total Price")?;
        if !total_price.is_finite() || total_price < 0.0 {
            return Err(format!("total price {} is invalid", total_price));
        }

        Ok(Self {
            id: record.parse("Booking ID")?,
            tourist: record.require("Tourist")?.trim().to_string(),
            guide,
            attraction: record.require("Attraction")?.trim().to_string(),
            // Older files carry no booking date.
            booked_on: record.parse_or("Booking Date", trek_date)?,
            trek_date,
            status: record.parse_or("Status", BookingStatus::Pending)?,
            total_price,
            festival_discount: record.parse_or("Festival Discount", false)?,
            notes: record.get("Notes").unwrap_or_default().to_string(),
        })
    }
}

/// Booking id counter, stored on its own so purged ids are never handed out again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sequence {
    pub next_booking_id: u32,
}

impl Recordable for Sequence {
    const FILE: &'static str = "sequence.txt";
    const KIND: &'static str = "Sequence";

    fn key(&self) -> String {
        Self::KIND.to_string()
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![("Next Booking ID", self.next_booking_id.to_string())]
    }

    fn from_record(record: &RawRecord) -> Result<Self, String> {
        Ok(Self {
            next_booking_id: record.parse("Next Booking ID")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::codec::parse_records;

    fn single(text: &str) -> RawRecord {
        let parsed = parse_records(text);
        assert!(parsed.malformed.is_empty(), "{:?}", parsed.malformed);
        parsed.records.into_iter().next().unwrap()
    }

    #[test]
    fn test_legacy_guide_record() {
        let record = single(
            "Username: ram_guide\nPassword: ram123\nFull Name: Ram Bahadur\nEmail: ram@guide.com\n\
             Phone: +977-1234567\nLanguages: English, Nepali, Hindi\nExperience: 8\nRole: Guide\n\
             Total Earnings: 360.0\n------------------------\n",
        );
        let guide = Guide::from_record(&record).unwrap();

        assert_eq!(guide.languages, vec!["English", "Nepali", "Hindi"]);
        assert_eq!(guide.experience_years, 8);
        assert!(guide.available);
        assert!(guide.specializations.is_empty());
    }

    #[test]
    fn test_legacy_booking_record() {
        let record = single(
            "Booking ID: 3\nTourist: maya\nGuide: \nAttraction: Everest Base Camp\n\
             Trek Date: 2024-09-15\nStatus: Confirmed\nTotal Price: 1280.0\n\
             Festival Discount: true\n------------------------\n",
        );
        let booking = Booking::from_record(&record).unwrap();

        assert_eq!(booking.id, 3);
        assert_eq!(booking.guide, None);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.booked_on, booking.trek_date);
        assert!(booking.festival_discount);
    }

    #[test]
    fn test_booking_attraction_is_trimmed() {
        let record = single(
            "Booking ID: 7\nTourist: maya\nAttraction: Lake Trek \nTrek Date: 2025-04-01\n\
             Total Price: 650\n------------------------\n",
        );
        let booking = Booking::from_record(&record).unwrap();
        assert_eq!(booking.attraction, "Lake Trek");
    }

    #[test]
    fn test_role_mismatch_is_rejected() {
        let record = single(
            "Username: maya\nPassword: x\nNationality: Nepali\nRole: Guide\n------------------------\n",
        );
        let err = Tourist::from_record(&record).unwrap_err();
        assert!(err.contains("expected role Tourist"));
    }

    #[test]
    fn test_attraction_requires_positive_price() {
        let record = single(
            "Name: Free Walk\nAltitude: Low\nDifficulty: Easy\nBase Price: 0\n------------------------\n",
        );
        assert!(Attraction::from_record(&record).is_err());
    }
}
