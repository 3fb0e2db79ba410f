pub mod commands;

use std::io::{self, Write};

use crate::ads;
use crate::advice::composer;
use crate::advice::models::GeoPoint;
use crate::advice::ProviderFactory;
use crate::cli::commands::{Commands, ProfileAction, SessionAction};
use crate::config::AppConfig;
use crate::db::{get_connection, service::DbService};
use crate::profile::{age_is_valid, weight_is_valid};
use uuid::Uuid;

pub async fn run_cli(command: Commands, config_path: String) {
    let config = AppConfig::load(&config_path).expect("Failed to load config");

    match command {
        Commands::Serve => {
            panic!("Serve command should be intercepted by main.rs to boot actix-web");
        }
        Commands::Session { action } => {
            let pool = get_connection(&config.database).expect("DB error");
            let conn = pool.lock().unwrap();

            match action {
                SessionAction::Create { name } => {
                    match DbService::insert_session(&conn, &name, serde_json::json!({})) {
                        Ok(session) => println!("Created Session: {} ({})", session.name, session.id),
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                SessionAction::List => {
                    match DbService::list_sessions(&conn, 50, 0) {
                        Ok(sessions) => {
                            if sessions.is_empty() {
                                println!("No sessions found.");
                            } else {
                                println!("{:<38} | {:<20} | {}", "ID", "Created At", "Name");
                                println!("{:-<38}-+-{:-<20}-+-{:-<20}", "", "", "");
                                for s in sessions {
                                    println!("{:<38} | {:<20} | {}", s.id.to_string(), s.created_at, s.name);
                                }
                            }
                        }
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                SessionAction::Delete { id } => {
                    match DbService::delete_session(&conn, id) {
                        Ok(_) => println!("Deleted session {}", id),
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                SessionAction::Export { id, path } => {
                    let session = match DbService::get_session(&conn, id) {
                        Ok(Some(s)) => s,
                        _ => { eprintln!("Session {} not found.", id); return; }
                    };
                    let turns = DbService::get_turns(&conn, id, 1000, 0).unwrap_or_default();

                    let export_path = path.unwrap_or_else(|| format!("session_{}.txt", id));
                    let mut file = std::fs::File::create(&export_path).expect("Failed to create file");

                    writeln!(file, "Session: {}", session.name).unwrap();
                    writeln!(file, "ID: {}", session.id).unwrap();
                    writeln!(file, "Created At: {}", session.created_at).unwrap();
                    writeln!(file, "---").unwrap();

                    for t in turns {
                        writeln!(file, "[{}]: {}", t.role.to_uppercase(), t.content).unwrap();
                        for s in &t.sources {
                            writeln!(file, "  source: {} <{}>", s.title, s.uri).unwrap();
                        }
                        writeln!(file, "---").unwrap();
                    }

                    println!("Session exported successfully to: {}", export_path);
                }
            }
        }
        Commands::Profile { action } => {
            let pool = get_connection(&config.database).expect("DB error");
            let conn = pool.lock().unwrap();

            match action {
                ProfileAction::Show => {
                    let profile = DbService::load_profile(&conn).unwrap_or_default();
                    println!("{}", serde_json::to_string_pretty(&profile).unwrap());
                }
                ProfileAction::Set {
                    name,
                    breed,
                    age,
                    weight,
                    allergies,
                    conditions,
                    home_location,
                } => {
                    let mut profile = DbService::load_profile(&conn).unwrap_or_default();

                    if let Some(v) = name { profile.name = v; }
                    if let Some(v) = breed { profile.breed = v; }
                    if let Some(v) = age { profile.age = v; }
                    if let Some(v) = weight { profile.weight = v; }
                    if let Some(v) = allergies { profile.allergies = v; }
                    if let Some(v) = conditions { profile.conditions = v; }
                    if let Some(v) = home_location { profile.home_location = v; }

                    // Advisory only: warn, never refuse the save.
                    if !age_is_valid(&profile.age) {
                        eprintln!("warning: age '{}' does not look like e.g. '5 years' or '6 mo'", profile.age);
                    }
                    if !weight_is_valid(&profile.weight) {
                        eprintln!("warning: weight '{}' does not look like e.g. '30kg' or '15 lbs'", profile.weight);
                    }

                    match DbService::save_profile(&conn, &profile) {
                        Ok(_) => println!("Profile saved."),
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
            }
        }
        Commands::Ads => {
            let pool = get_connection(&config.database).expect("DB error");
            let conn = pool.lock().unwrap();

            let profile = DbService::load_profile(&conn).unwrap_or_default();
            let catalog = ads::load_catalog().expect("Failed to parse ad catalog");

            println!("{:<24} | {:<12} | {}", "ID", "Category", "Title");
            println!("{:-<24}-+-{:-<12}-+-{:-<30}", "", "", "");
            for ad in ads::rank(&catalog, &profile) {
                println!("{:<24} | {:<12} | {}", ad.id, ad.category, ad.title);
            }
        }
        Commands::Chat { session, lat, lng } => {
            let location = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
                _ => None,
            };
            run_repl(session, location, config).await;
        }
    }
}

async fn run_repl(session_id: Uuid, location: Option<GeoPoint>, config: AppConfig) {
    let pool = get_connection(&config.database).expect("DB Error");

    // Verify session
    let session_exists = {
        let conn = pool.lock().unwrap();
        DbService::get_session(&conn, session_id).unwrap_or(None).is_some()
    };

    if !session_exists {
        eprintln!("Session {} not found.", session_id);
        return;
    }

    let provider = ProviderFactory::create_default(&config).expect("Failed to init advice provider");

    println!("--- PawPal Terminal Chat ---");
    println!("Connected to Session: {}", session_id);
    if location.is_some() {
        println!("Location bias enabled.");
    }
    println!("Type /exit to quit.");
    println!("----------------------------");

    loop {
        print!("\nYou> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();
        let text = input.trim();

        if text.is_empty() { continue; }
        if text == "/exit" || text == "/quit" { break; }

        // Snapshot context and persist the user turn
        let (history, profile) = {
            let conn = pool.lock().unwrap();
            let history = DbService::get_turns(&conn, session_id, config.chat.max_history_turns as usize, 0)
                .unwrap_or_default();
            let profile = DbService::load_profile(&conn).unwrap_or_default();

            if let Err(e) = DbService::insert_turn(&conn, session_id, "user", text, &[]) {
                eprintln!("Failed to save turn: {}", e);
                continue;
            }
            (history, profile)
        };

        let advice = composer::ask(provider.as_ref(), text, &history, location, Some(&profile)).await;

        println!("PawPal> {}", advice.text);
        if !advice.sources.is_empty() {
            println!("\nSources:");
            for s in &advice.sources {
                println!("  - {} <{}>", s.title, s.uri);
            }
        }

        // Save assistant turn with its sources
        {
            let conn = pool.lock().unwrap();
            let _ = DbService::insert_turn(&conn, session_id, "assistant", &advice.text, &advice.sources);
        }
    }
}
