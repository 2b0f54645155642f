use crate::domain::model::{Guide, Person, Tourist};
use crate::utils::error::{Result, TrekError};
use crate::utils::validation::{
    validate_email, validate_non_empty_string, validate_range, validate_single_line,
    validate_username, Validate,
};
use sha2::{Digest, Sha256};

const HASH_PREFIX: &str = "sha256:";

/// Salted with the username so identical passwords hash differently per account.
pub fn hash_password(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{}{:x}", HASH_PREFIX, hasher.finalize())
}

pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with(HASH_PREFIX)
}

pub fn verify_password(username: &str, password: &str, stored: &str) -> bool {
    if is_hashed(stored) {
        return hash_password(username, password) == stored;
    }

    // Files written before hashing was introduced hold the password verbatim.
    tracing::warn!("Account '{}' still has a plaintext password on file", username);
    !stored.is_empty() && stored == password
}

/// Registration form shared by every role.
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

impl NewPerson {
    pub fn into_person(self) -> Person {
        Person {
            password_hash: hash_password(&self.username, &self.password),
            username: self.username,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
        }
    }
}

impl Validate for NewPerson {
    fn validate(&self) -> Result<()> {
        validate_username("username", &self.username)?;
        if self.password.len() < 3 {
            return Err(TrekError::validation(
                "password",
                "Password must be at least 3 characters",
            ));
        }
        validate_non_empty_string("full_name", &self.full_name)?;
        validate_single_line("full_name", &self.full_name)?;
        validate_email("email", &self.email)?;
        validate_single_line("phone", &self.phone)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewTourist {
    pub person: NewPerson,
    pub nationality: String,
}

impl Validate for NewTourist {
    fn validate(&self) -> Result<()> {
        self.person.validate()?;
        validate_non_empty_string("nationality", &self.nationality)?;
        validate_single_line("nationality", &self.nationality)
    }
}

impl NewTourist {
    pub fn into_tourist(self) -> Tourist {
        Tourist {
            person: self.person.into_person(),
            nationality: self.nationality.trim().to_string(),
            total_spent: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewGuide {
    pub person: NewPerson,
    pub languages: Vec<String>,
    pub experience_years: u32,
}

impl Validate for NewGuide {
    fn validate(&self) -> Result<()> {
        self.person.validate()?;
        if self.languages.iter().all(|l| l.trim().is_empty()) {
            return Err(TrekError::validation(
                "languages",
                "A guide must speak at least one language",
            ));
        }
        for language in &self.languages {
            validate_single_line("languages", language)?;
            if language.contains(',') {
                return Err(TrekError::validation(
                    "languages",
                    format!("'{}' cannot contain a comma", language),
                ));
            }
        }
        validate_range("experience_years", self.experience_years, 0, 50)
    }
}

impl NewGuide {
    pub fn into_guide(self) -> Guide {
        Guide {
            person: self.person.into_person(),
            languages: self
                .languages
                .into_iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            experience_years: self.experience_years,
            specializations: Vec::new(),
            total_earnings: 0.0,
            available: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str) -> NewPerson {
        NewPerson {
            username: username.to_string(),
            password: "secret".to_string(),
            full_name: "Sita Sharma".to_string(),
            email: "sita@guide.com".to_string(),
            phone: "+977-7654321".to_string(),
        }
    }

    #[test]
    fn test_hash_is_salted_by_username() {
        let a = hash_password("sita", "secret");
        let b = hash_password("ram", "secret");
        assert_ne!(a, b);
        assert!(a.starts_with("sha256:"));
        assert_eq!(a.len(), "sha256:".len() + 64);
    }

    #[test]
    fn test_verify_password() {
        let stored = hash_password("sita", "secret");
        assert!(verify_password("sita", "secret", &stored));
        assert!(!verify_password("sita", "wrong", &stored));
        assert!(verify_password("sita", "sita123", "sita123"));
        assert!(!verify_password("sita", "", ""));
    }

    #[test]
    fn test_guide_form_validation() {
        let mut guide = NewGuide {
            person: form("sita_guide"),
            languages: vec!["English".into(), " Nepali ".into()],
            experience_years: 5,
        };
        assert!(guide.validate().is_ok());
        assert_eq!(guide.clone().into_guide().languages, vec!["English", "Nepali"]);

        guide.experience_years = 51;
        assert!(guide.validate().is_err());

        guide.experience_years = 5;
        guide.languages = vec![" ".into()];
        assert!(guide.validate().is_err());
    }

    #[test]
    fn test_tourist_form_rejects_bad_email() {
        let mut tourist = NewTourist {
            person: form("maya"),
            nationality: "Nepali".into(),
        };
        assert!(tourist.validate().is_ok());
        tourist.person.email = "not-an-email".into();
        assert!(tourist.validate().is_err());
    }
}
