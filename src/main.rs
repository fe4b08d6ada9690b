// Copyright (C) 2026 The sboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};

use sboard::controller::terminal;
use sboard::controller::Controller;
use sboard::engine;
use sboard::sampler::{Session, MAX_CHANNELS};
use sboard::settings::Settings;
use sboard::state;
use tracing::warn;

#[derive(Parser)]
#[clap(
    author = "The sboard authors",
    version = crate_version!(),
    about = "A keyboard-triggered sampler."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start will start the sampler.
    Start {
        /// The audio output device to play through. Defaults to the system
        /// default output device.
        #[arg(short, long)]
        device: Option<String>,

        /// A state file (.ssf) to load on startup.
        state: Option<PathBuf>,
    },
    /// Lists the available audio output devices.
    Devices {},
    /// Prints the contents of a state file.
    State {
        /// The path to the state file.
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sboard=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { device, state } => {
            let engine = engine::get_engine(device.as_deref(), MAX_CHANNELS)?;
            let mut session = Session::new(engine);

            if let Some(state) = state {
                session.load_from(&state)?;
            }

            let mut controller = Controller::new(
                session,
                Settings::load(),
                terminal::Events::new(),
                terminal::Prompts::new(),
            );
            controller.run()?;

            let mut settings = controller.into_settings();
            settings.window = terminal::window_geometry();
            if let Err(e) = settings.save() {
                warn!(err = %e, "Unable to save settings");
            }
        }
        Commands::Devices {} => {
            let devices = engine::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::State { path } => {
            let records = state::read_state(&path)?;

            if records.is_empty() {
                println!("No samples in {}.", path.display());
                return Ok(());
            }

            println!("Samples (count: {}):", records.len());
            for record in records {
                println!(
                    "- {} ({}) key={} {} volume={} pan={}",
                    record.name,
                    record.file.display(),
                    record.key,
                    record.loop_mode,
                    record.volume,
                    record.pan,
                );
            }
        }
    }

    Ok(())
}
