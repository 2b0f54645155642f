use crate::core::accounts::{hash_password, is_hashed};
use crate::core::policy::BookingPolicy;
use crate::domain::model::{Admin, Person, MAX_ACCESS_LEVEL};
use crate::store::MalformedPolicy;
use crate::utils::error::{Result, TrekError};
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_username, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "trekbook.toml";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub store: Option<StoreConfig>,
    pub admin: Option<AdminConfig>,
    pub policy: Option<PolicyConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub data_dir: Option<String>,
    pub on_malformed: Option<MalformedPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    pub username: String,
    /// Plain password, usually injected with `${VAR}`.
    pub password: Option<String>,
    /// Stored hash as produced by `hash_password`; takes precedence over `password`.
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub access_level: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub commission_rate: Option<f64>,
    pub max_guide_load: Option<usize>,
    pub max_tourist_bookings: Option<usize>,
    pub cancel_window_days: Option<i64>,
    pub modify_window_days: Option<i64>,
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| TrekError::Config {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.as_ref().display());
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TrekError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` references (e.g. `${TREKBOOK_ADMIN_PASSWORD}`) with environment values.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TrekError::Config {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn data_dir(&self) -> &str {
        self.store
            .as_ref()
            .and_then(|s| s.data_dir.as_deref())
            .unwrap_or(DEFAULT_DATA_DIR)
    }

    pub fn set_data_dir(&mut self, data_dir: String) {
        self.store.get_or_insert_with(StoreConfig::default).data_dir = Some(data_dir);
    }

    pub fn malformed_policy(&self) -> MalformedPolicy {
        self.store
            .as_ref()
            .and_then(|s| s.on_malformed)
            .unwrap_or_default()
    }

    pub fn booking_policy(&self) -> BookingPolicy {
        let defaults = BookingPolicy::default();
        let Some(policy) = &self.policy else {
            return defaults;
        };

        BookingPolicy {
            commission_rate: policy.commission_rate.unwrap_or(defaults.commission_rate),
            max_guide_load: policy.max_guide_load.unwrap_or(defaults.max_guide_load),
            max_tourist_bookings: policy
                .max_tourist_bookings
                .unwrap_or(defaults.max_tourist_bookings),
            cancel_window_days: policy
                .cancel_window_days
                .unwrap_or(defaults.cancel_window_days),
            modify_window_days: policy
                .modify_window_days
                .unwrap_or(defaults.modify_window_days),
        }
    }

    /// The configured admin account, if any.
    pub fn admin_account(&self) -> Result<Option<Admin>> {
        let Some(admin) = &self.admin else {
            return Ok(None);
        };

        let password_hash = match (&admin.password_hash, &admin.password) {
            (Some(hash), _) => hash.clone(),
            (None, Some(password)) if !password.starts_with("${") => {
                hash_password(&admin.username, password)
            }
            _ => {
                return Err(TrekError::Config {
                    message: format!(
                        "admin '{}' needs a password or password_hash (is the environment variable set?)",
                        admin.username
                    ),
                })
            }
        };

        Ok(Some(Admin {
            person: Person {
                username: admin.username.clone(),
                password_hash,
                full_name: admin
                    .full_name
                    .clone()
                    .unwrap_or_else(|| "Administrator".to_string()),
                email: admin.email.clone().unwrap_or_default(),
                phone: admin.phone.clone().unwrap_or_default(),
            },
            access_level: admin.access_level.unwrap_or(MAX_ACCESS_LEVEL),
        }))
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_path("store.data_dir", self.data_dir())?;

        if let Some(admin) = &self.admin {
            validate_username("admin.username", &admin.username)?;
            if let Some(level) = admin.access_level {
                validate_range("admin.access_level", level, 0, MAX_ACCESS_LEVEL)?;
            }
            if let Some(hash) = &admin.password_hash {
                if !is_hashed(hash) {
                    return Err(TrekError::validation(
                        "admin.password_hash",
                        "expected a value starting with 'sha256:'",
                    ));
                }
            }
        }

        let policy = self.booking_policy();
        validate_range("policy.commission_rate", policy.commission_rate, 0.0, 1.0)?;
        validate_positive_number("policy.max_guide_load", policy.max_guide_load, 1)?;
        validate_positive_number("policy.max_tourist_bookings", policy.max_tourist_bookings, 1)?;
        validate_range("policy.cancel_window_days", policy.cancel_window_days, 0, 365)?;
        validate_range("policy.modify_window_days", policy.modify_window_days, 0, 365)?;

        Ok(())
    }
}
