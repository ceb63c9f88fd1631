use anyhow::Result;
use clap::Parser;
use sparkify_etl::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sparkify", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Build the analytical tables from the raw record trees
    ///
    /// Reads every catalog record under `<input>/song_data/*/*/*/*.json` and
    /// every event under `<input>/log_data/*/*/*.json`, then writes five
    /// Parquet tables below the output root:
    ///
    /// - songs      partitioned by year and artist_id
    /// - artists    unpartitioned
    /// - users      unpartitioned
    /// - time       partitioned by year and month
    /// - songplays  partitioned by year and month
    ///
    /// Every run recomputes all tables from scratch and replaces whatever a
    /// previous run left in each table directory.
    ///
    /// Locations may be local paths, file:// URIs or s3:// (s3a://) URLs.
    /// S3 locations need storage.access_key_id and storage.secret_access_key
    /// in the configuration.
    Run {
        /// Input root (overrides input_root from config)
        #[arg(long)]
        input: Option<String>,

        /// Output root (overrides output_root from config)
        #[arg(long)]
        output: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Get a config value (or the whole config file)
    Get {
        /// Key to read, e.g. output_root or storage.region
        key: Option<String>,
    },
    /// Set a config value in the config file
    Set {
        /// Key to set, e.g. time_basis or compat.hour_as_year
        key: String,
        /// New value
        value: String,
    },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { input, output } => {
            let mut config = Config::load_with_overrides(input, output)?;
            init_logging(&mut config)?;
            commands::run::run_pipeline(&config).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config()?,
            ConfigAction::Get { key } => commands::config::get_config(key)?,
            ConfigAction::Set { key, value } => commands::config::set_config(&key, &value)?,
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}

fn init_logging(config: &mut Config) -> Result<()> {
    let opts = std::mem::take(&mut config.logging);
    twyg::setup(opts).map_err(|e| anyhow::anyhow!("Failed to set up logging: {e}"))?;
    Ok(())
}
