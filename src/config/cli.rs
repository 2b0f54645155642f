use crate::domain::model::{Altitude, BookingStatus, Difficulty};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "trekbook")]
#[command(about = "Trek booking desk: pricing, booking lifecycle and flat-file records")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = crate::config::toml_config::DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Override store.data_dir from the config file
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create the data directory and seed default attractions and guides
    Init,

    /// List attractions, with prices for a trek date
    Attractions {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Price a trek without booking it
    Quote {
        #[arg(long)]
        attraction: String,
        #[arg(long)]
        date: NaiveDate,
    },

    AddAttraction {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        altitude: Altitude,
        #[arg(long)]
        difficulty: Difficulty,
        #[arg(long)]
        base_price: f64,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long, default_value = "")]
        description: String,
    },

    RemoveAttraction {
        name: String,
    },

    /// Open or close an attraction for new bookings
    SetActive {
        name: String,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },

    RegisterTourist {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        nationality: String,
    },

    RegisterGuide {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, value_delimiter = ',')]
        languages: Vec<String>,
        #[arg(long)]
        experience: u32,
    },

    RemoveAccount {
        username: String,
    },

    /// Mark a guide available or busy
    SetAvailability {
        guide: String,
        #[arg(action = clap::ArgAction::Set)]
        available: bool,
    },

    /// Check credentials and print the account's role
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    Book {
        #[arg(long)]
        tourist: String,
        #[arg(long)]
        attraction: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "")]
        notes: String,
    },

    Confirm {
        id: u32,
    },

    Cancel {
        id: u32,
    },

    Modify {
        id: u32,
        #[arg(long)]
        attraction: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Permanently delete a cancelled booking
    Purge {
        id: u32,
    },

    Assign {
        id: u32,
        #[arg(long)]
        guide: String,
    },

    /// Administrative status override
    SetStatus {
        id: u32,
        status: BookingStatus,
    },

    Complete {
        id: u32,
    },

    /// List bookings, optionally for one tourist or guide
    Bookings {
        #[arg(long)]
        tourist: Option<String>,
        #[arg(long)]
        guide: Option<String>,
    },

    /// Dashboard statistics
    Report {
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book_command() {
        let cli = CliConfig::try_parse_from([
            "trekbook",
            "--today",
            "2025-03-01",
            "book",
            "--tourist",
            "maya",
            "--attraction",
            "Everest Base Camp",
            "--date",
            "2025-09-15",
        ])
        .unwrap();

        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2025, 3, 1));
        match cli.command {
            Command::Book { tourist, date, notes, .. } => {
                assert_eq!(tourist, "maya");
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 9, 15).unwrap());
                assert!(notes.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_status_and_languages() {
        let cli = CliConfig::try_parse_from(["trekbook", "set-status", "4", "completed"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::SetStatus { id: 4, status: BookingStatus::Completed }
        ));

        let cli = CliConfig::try_parse_from([
            "trekbook",
            "register-guide",
            "--username",
            "sita_guide",
            "--password",
            "sita123",
            "--full-name",
            "Sita Sharma",
            "--email",
            "sita@guide.com",
            "--languages",
            "English,Nepali",
            "--experience",
            "5",
        ])
        .unwrap();
        match cli.command {
            Command::RegisterGuide { languages, experience, .. } => {
                assert_eq!(languages, vec!["English", "Nepali"]);
                assert_eq!(experience, 5);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(CliConfig::try_parse_from(["trekbook", "quote", "--attraction", "X", "--date", "15/09/2025"]).is_err());
    }
}
