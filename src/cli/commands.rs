use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "pawpal", version, about = "PawPal Dog-Care Advice Server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API and WebSocket server
    Serve,

    /// Enter interactive CLI chat REPL mode
    Chat {
        /// The UUID of the session to connect to
        #[arg(short, long)]
        session: Uuid,

        /// Latitude to bias location-aware answers with
        #[arg(long)]
        lat: Option<f64>,

        /// Longitude to bias location-aware answers with
        #[arg(long)]
        lng: Option<f64>,
    },

    /// Manage chat sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Show or edit the stored dog profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Print the ad catalog ranked against the stored profile
    Ads,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Create a new session
    Create {
        #[arg(short, long)]
        name: String,
    },

    /// List all sessions
    List,

    /// Delete a session
    Delete {
        id: Uuid,
    },

    /// Export a session transcript to a .txt file
    Export {
        /// The UUID of the session to export
        id: Uuid,
        /// The path to the output file (optional)
        #[arg(short, long)]
        path: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Print the stored profile
    Show,

    /// Update profile fields; omitted fields keep their stored value
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        breed: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        allergies: Option<String>,
        #[arg(long)]
        conditions: Option<String>,
        #[arg(long)]
        home_location: Option<String>,
    },
}
