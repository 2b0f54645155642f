use clap::Parser;
use trekbook::core::accounts::{NewGuide, NewPerson, NewTourist};
use trekbook::core::lifecycle::BookingChange;
use trekbook::core::pricing::compute_price;
use trekbook::core::{Account, Attraction, Booking, Clock, FixedClock, SystemClock};
use trekbook::utils::error::ErrorSeverity;
use trekbook::utils::{logger, validation::Validate};
use trekbook::{AppConfig, BookingDesk, CliConfig, Command, LocalStorage, RecordStore, TrekError};

fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli) {
        let Some(err) = e.downcast_ref::<TrekError>() else {
            tracing::error!("❌ {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        };

        tracing::debug!(
            "Command failed: {} (Category: {:?}, Severity: {:?})",
            err,
            err.category(),
            err.severity()
        );
        eprintln!("❌ {}", err.user_friendly_message());
        eprintln!("💡 {}", err.recovery_suggestion());

        let exit_code = match err.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn run(cli: CliConfig) -> anyhow::Result<()> {
    let mut config = AppConfig::from_file_or_default(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.set_data_dir(data_dir);
    }
    config.validate()?;

    let clock = FixedClock(cli.today.unwrap_or_else(|| SystemClock.today()));
    tracing::debug!("Data directory: {}, today: {}", config.data_dir(), clock.today());

    let store = RecordStore::new(LocalStorage::new(config.data_dir()), config.malformed_policy());
    let desk = BookingDesk::new(store, clock, config.booking_policy(), config.admin_account()?);

    match cli.command {
        Command::Init => {
            if desk.initialize()? {
                println!("✅ Seeded default attractions and guides in {}", config.data_dir());
            } else {
                println!("Data directory {} is already initialized", config.data_dir());
            }
        }
        Command::Attractions { date } => {
            let (ledger, _) = desk.snapshot()?;
            for attraction in ledger.attractions.values() {
                print_attraction(attraction, date);
            }
        }
        Command::Quote { attraction, date } => {
            let quote = desk.quote(&attraction, date)?;
            println!("{} on {}: ${:.2}", attraction, date, quote.display_price());
            if quote.festival_applied {
                println!("🎉 Festival discount applied (Dashain & Tihar season, 20% off)");
            }
        }
        Command::AddAttraction {
            name,
            location,
            altitude,
            difficulty,
            base_price,
            capacity,
            description,
        } => {
            let mut attraction = Attraction::new(name, location, altitude, difficulty, base_price);
            attraction.description = description;
            if let Some(capacity) = capacity {
                attraction.max_capacity = capacity;
            }
            let name = attraction.name.clone();
            desk.add_attraction(attraction)?;
            println!("✅ Added attraction {}", name);
        }
        Command::RemoveAttraction { name } => {
            desk.remove_attraction(&name)?;
            println!("✅ Removed attraction {}", name);
        }
        Command::SetActive { name, active } => {
            desk.set_attraction_active(&name, active)?;
            println!("✅ {} is now {}", name, if active { "active" } else { "inactive" });
        }
        Command::RegisterTourist {
            username,
            password,
            full_name,
            email,
            phone,
            nationality,
        } => {
            let tourist = desk.register_tourist(NewTourist {
                person: NewPerson {
                    username,
                    password,
                    full_name,
                    email,
                    phone,
                },
                nationality,
            })?;
            println!("✅ Registered tourist {}", tourist.person.username);
        }
        Command::RegisterGuide {
            username,
            password,
            full_name,
            email,
            phone,
            languages,
            experience,
        } => {
            let guide = desk.register_guide(NewGuide {
                person: NewPerson {
                    username,
                    password,
                    full_name,
                    email,
                    phone,
                },
                languages,
                experience_years: experience,
            })?;
            println!("✅ Registered guide {}", guide.person.username);
        }
        Command::RemoveAccount { username } => {
            let account = desk.remove_account(&username)?;
            println!("✅ Removed {} {}", account.role(), account.username());
        }
        Command::SetAvailability { guide, available } => {
            desk.set_guide_availability(&guide, available)?;
            println!("✅ {} is now {}", guide, if available { "available" } else { "busy" });
        }
        Command::Login { username, password } => {
            let account = desk.login(&username, &password)?;
            println!("{}", account.greeting());
            if let Account::Admin(admin) = &account {
                println!(
                    "Manage users: {}, view analytics: {}, manage system: {}",
                    admin.can_manage_users(),
                    admin.can_view_analytics(),
                    admin.can_manage_system()
                );
            }
        }
        Command::Book {
            tourist,
            attraction,
            date,
            notes,
        } => {
            let booking = desk.book(&tourist, &attraction, date, &notes)?;
            println!("✅ Booking created");
            print_booking(&booking);
        }
        Command::Confirm { id } => {
            print_booking(&desk.confirm(id)?);
        }
        Command::Cancel { id } => {
            print_booking(&desk.cancel(id)?);
        }
        Command::Modify {
            id,
            attraction,
            date,
            notes,
        } => {
            let booking = desk.modify(
                id,
                BookingChange {
                    attraction,
                    trek_date: date,
                    notes,
                },
            )?;
            print_booking(&booking);
        }
        Command::Purge { id } => {
            desk.purge(id)?;
            println!("✅ Booking #{} deleted", id);
        }
        Command::Assign { id, guide } => {
            print_booking(&desk.assign_guide(id, &guide)?);
        }
        Command::SetStatus { id, status } => {
            print_booking(&desk.set_status(id, status)?);
        }
        Command::Complete { id } => {
            print_booking(&desk.complete(id)?);
        }
        Command::Bookings { tourist, guide } => {
            let (ledger, report) = desk.snapshot()?;
            for skipped in &report.skipped {
                eprintln!("⚠️  skipped {} line {}: {}", skipped.file, skipped.line, skipped.reason);
            }
            let selected = ledger.bookings.values().filter(|b| {
                tourist.as_deref().map_or(true, |t| b.tourist == t)
                    && guide.as_deref().map_or(true, |g| b.is_assigned_to(g))
            });
            let today = desk.today();
            for booking in selected {
                print_booking(booking);
                if booking.is_upcoming(today) {
                    println!("    ⏳ {} days to go", booking.days_until_trek(today));
                }
            }
        }
        Command::Report { json } => {
            let report = desk.report()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Tourists: {}  Guides: {}  Attractions: {}", report.tourists, report.guides, report.attractions);
                println!("Bookings: {} ({} with festival discount)", report.bookings, report.festival_bookings);
                for (status, count) in &report.bookings_by_status {
                    println!("  {}: {}", status, count);
                }
                println!("Revenue: ${:.2}  Commission: ${:.2}", report.revenue, report.commission_paid);
                println!("Nationalities:");
                for (nationality, count) in &report.nationalities {
                    println!("  {}: {}", nationality, count);
                }
                println!("Popular attractions:");
                for (name, count) in &report.popular_attractions {
                    println!("  {}: {}", name, count);
                }
                println!("Top guides:");
                for (name, earnings) in &report.top_guides {
                    println!("  {}: ${:.2}", name, earnings);
                }
            }
        }
    }

    Ok(())
}

fn print_attraction(attraction: &Attraction, date: Option<chrono::NaiveDate>) {
    print!(
        "{}{} ({}, {} altitude, {}) base ${:.2}, {}/{} spots free{}",
        if attraction.is_high_altitude() { "⛰️  " } else { "" },
        attraction.name,
        attraction.location,
        attraction.altitude,
        attraction.difficulty,
        attraction.base_price,
        attraction.available_spots(),
        attraction.max_capacity,
        if attraction.active { "" } else { ", inactive" }
    );
    match date {
        Some(date) => {
            let quote = compute_price(attraction, date);
            println!(
                " -> ${:.2} on {}{}",
                quote.display_price(),
                date,
                if quote.festival_applied { " 🎉" } else { "" }
            );
        }
        None => println!(),
    }
}

fn print_booking(booking: &Booking) {
    println!(
        "#{} {} | {} | {} | {} | ${:.2}{} | guide: {}",
        booking.id,
        booking.status,
        booking.tourist,
        booking.attraction,
        booking.trek_date,
        booking.total_price,
        if booking.festival_discount { " (festival 20% off)" } else { "" },
        booking.guide.as_deref().unwrap_or("Not Assigned")
    );
    if !booking.notes.is_empty() {
        println!("    notes: {}", booking.notes);
    }
}
