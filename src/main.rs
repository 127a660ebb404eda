use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Args, Parser, Subcommand};
use macsim_rs::error::SimError;
use macsim_rs::mac::MacScheme;
use macsim_rs::sim::{self, SimConfig, Simulation};
use macsim_rs::ui::{self, progress::ProgressManager};
use macsim_rs::utils::logging::init_logging;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Compare MAC schemes on a simulated shared medium", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every station with one MAC scheme
    Run {
        #[arg(short, long, value_enum, default_value_t = MacScheme::CsmaCa)]
        scheme: MacScheme,
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Run all four schemes under the same traffic and print a comparison
    Compare {
        #[command(flatten)]
        sim: SimArgs,
    },
}

#[derive(Args)]
struct SimArgs {
    /// JSON config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short = 'n', long)]
    stations: Option<usize>,
    /// Run length in seconds
    #[arg(short, long)]
    duration: Option<f64>,
    /// Mean packet inter-arrival time per station
    #[arg(short, long)]
    interval_ms: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl SimArgs {
    fn resolve(&self) -> Result<SimConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        if let Some(stations) = self.stations {
            config.stations = stations;
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
        }
        if let Some(interval) = self.interval_ms {
            config.arrival_interval_ms = interval;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }

    fn progress_manager(&self) -> ProgressManager {
        if self.json {
            ProgressManager::hidden()
        } else {
            ProgressManager::new()
        }
    }
}

fn main() -> Result<(), SimError> {
    init_logging();
    let cli = Cli::parse();

    let keep_going = Arc::new(AtomicBool::new(true));
    let r = keep_going.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    match cli.command {
        Commands::Run { scheme, sim: args } => {
            let config = args.resolve()?;
            let progress_manager = args.progress_manager();
            if !args.json {
                ui::print_banner();
            }

            let simulation = Simulation::new(scheme, config)?;
            ui::start_run_bar(&progress_manager, scheme, simulation.config().duration());
            let report = simulation.run(&keep_going, |elapsed| {
                ui::update_progress(&progress_manager, scheme, elapsed)
            })?;
            ui::finish_run_bar(&progress_manager, scheme, "done");

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
        }
        Commands::Compare { sim: args } => {
            let config = args.resolve()?;
            let progress_manager = args.progress_manager();
            if !args.json {
                ui::print_banner();
            }

            for scheme in MacScheme::ALL {
                ui::start_run_bar(&progress_manager, scheme, config.duration());
            }
            let reports = sim::compare(&config, &keep_going, |scheme, elapsed| {
                ui::update_progress(&progress_manager, scheme, elapsed)
            })?;
            for report in &reports {
                ui::finish_run_bar(
                    &progress_manager,
                    report.scheme,
                    &format!("{:.1}% delivered", report.totals.delivery_ratio * 100.0),
                );
            }
            progress_manager.finish_all();

            if args.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    println!("{}\n", report);
                }
                print!("{}", sim::comparison_table(&reports));
            }
        }
    }

    info!("Exiting gracefully...");
    Ok(())
}
