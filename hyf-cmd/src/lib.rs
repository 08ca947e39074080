//! Command implementations for the HYF CLI.
//!
//! Provides subcommands for inspecting a network assembled from a
//! realization config, summarising catchment forcing, and fetching
//! observed data for gauge stations.

use clap::Subcommand;

pub mod forcing;
pub mod gauge;
pub mod inspect;

pub use gauge::Service;

#[derive(Subcommand)]
pub enum Command {
    /// Assemble the network in a realization config and report its structure
    Inspect {
        /// Path to the realization config (JSON)
        #[arg(short = 'c', long)]
        config: String,
    },

    /// Summarise the forcing data of one catchment
    Forcing {
        /// Path to the realization config (JSON)
        #[arg(short = 'c', long)]
        config: String,

        /// Catchment id, e.g. cat-88
        #[arg(long)]
        catchment: String,

        /// Only report this forcing variable
        #[arg(long)]
        variable: Option<String>,
    },

    /// Fetch observations for a gauge station
    Gauge {
        /// Station identifier, e.g. 02146211
        #[arg(short = 's', long, required_unless_present = "nexus")]
        station: Option<String>,

        /// Take the station from this nexus's gauge location (needs --config)
        #[arg(long, requires = "config")]
        nexus: Option<String>,

        /// Path to the realization config (JSON)
        #[arg(short = 'c', long)]
        config: Option<String>,

        /// Start of the requested range, e.g. "2024-01-01" or "2024-01-01 06:00"
        #[arg(long)]
        start: Option<String>,

        /// End of the requested range
        #[arg(long)]
        end: Option<String>,

        /// Hydrometric data service to query
        #[arg(long, value_enum, default_value_t = Service::Nwis)]
        service: Service,

        /// Write `timestamp,value` rows here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<String>,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Inspect { config } => inspect::run_inspect(&config),
        Command::Forcing {
            config,
            catchment,
            variable,
        } => forcing::run_forcing(&config, &catchment, variable.as_deref()),
        Command::Gauge {
            station,
            nexus,
            config,
            start,
            end,
            service,
            output,
        } => {
            let request = gauge::GaugeRequest {
                station,
                nexus,
                config,
                start,
                end,
                service,
                output,
            };
            gauge::run_gauge(request).await
        }
    }
}
