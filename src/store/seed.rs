use crate::core::accounts::hash_password;
use crate::domain::model::{Altitude, Attraction, Difficulty, Guide, Person};

pub fn default_attractions() -> Vec<Attraction> {
    vec![
        Attraction::new("Everest Base Camp", "Khumbu", Altitude::High, Difficulty::Hard, 1200.0),
        Attraction::new("Annapurna Circuit", "Annapurna", Altitude::High, Difficulty::Medium, 800.0),
        Attraction::new("Langtang Valley", "Langtang", Altitude::High, Difficulty::Medium, 600.0),
        Attraction::new("Chitwan Safari", "Chitwan", Altitude::Low, Difficulty::Easy, 300.0),
        Attraction::new("Pokhara Sightseeing", "Pokhara", Altitude::Low, Difficulty::Easy, 150.0),
        Attraction::new("Manaslu Circuit", "Manaslu", Altitude::High, Difficulty::Hard, 1000.0),
    ]
}

fn guide(
    username: &str,
    password: &str,
    full_name: &str,
    email: &str,
    phone: &str,
    languages: &[&str],
    experience_years: u32,
) -> Guide {
    Guide {
        person: Person {
            username: username.to_string(),
            password_hash: hash_password(username, password),
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        },
        languages: languages.iter().map(|l| l.to_string()).collect(),
        experience_years,
        specializations: Vec::new(),
        total_earnings: 0.0,
        available: true,
    }
}

pub fn default_guides() -> Vec<Guide> {
    vec![
        guide(
            "ram_guide",
            "ram123",
            "Ram Bahadur",
            "ram@guide.com",
            "+977-1234567",
            &["English", "Nepali", "Hindi"],
            8,
        ),
        guide(
            "sita_guide",
            "sita123",
            "Sita Sharma",
            "sita@guide.com",
            "+977-7654321",
            &["English", "Nepali"],
            5,
        ),
    ]
}
