use anyhow::Result;
use clap::Parser;
use marquee_etl::Config;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "marquee", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/marquee/marquee.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print query results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Import ratings export snapshots
    ///
    /// Each CSV file is one snapshot, labelled by its file name without the
    /// extension: `15.01.2025.csv` becomes the snapshot `15.01.2025`. A
    /// directory imports every `.csv` file directly inside it, in file-name
    /// order.
    ///
    /// The first snapshot a title appears in sets its descriptive fields
    /// (title, directors, genres, ...). Every snapshot adds that title's vote
    /// count and rating under its own label. Re-importing a file replaces
    /// the values for its label, so imports can be repeated safely.
    Import {
        /// CSV files or directories of CSV files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List imported snapshots, oldest first
    Snapshots,
    /// Remove everything a snapshot contributed
    ///
    /// Titles that appeared only in this snapshot are deleted.
    RemoveSnapshot {
        /// Snapshot label, e.g. 15.01.2025
        label: String,
    },
    /// Compare vote counts between two snapshots
    Compare {
        /// Earlier snapshot date (dd.MM.yyyy)
        from: String,
        /// Later snapshot date (dd.MM.yyyy)
        to: String,
        /// Only titles whose title, id, type, directors or genres contain this
        #[arg(long)]
        search: Option<String>,
        /// Order by vote difference, largest first
        #[arg(long)]
        sort: bool,
    },
    /// Titles per release year
    Years {
        /// Count titles in snapshots whose label contains this date (dd.MM.yyyy)
        #[arg(long)]
        from: Option<String>,
        /// Also print years without titles
        #[arg(long)]
        all: bool,
    },
    /// Average personal rating per release year
    YearlyAverage {
        /// Only titles rated on or before this date (dd.MM.yyyy)
        #[arg(long)]
        cutoff: Option<String>,
    },
    /// Title count and average personal rating per primary genre
    Genres {
        /// Only titles rated on or before this date (dd.MM.yyyy)
        #[arg(long)]
        cutoff: Option<String>,
    },
    /// Titles per title type
    TitleTypes {
        /// Count titles in snapshots whose label contains this date (dd.MM.yyyy)
        #[arg(long)]
        from: Option<String>,
    },
    /// Titles per country of origin
    Countries,
    /// Every title in one snapshot with that snapshot's votes and rating
    Ratings {
        /// Snapshot date (dd.MM.yyyy, default: today)
        date: Option<String>,
    },
    /// Fill missing countries of origin from Wikidata
    ///
    /// Looks up every title without a country, one at a time, and saves each
    /// answer immediately. Press Ctrl-C to stop after the current title;
    /// running the command again continues with the titles still missing.
    Enrich,
    /// Show database status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it does not exist
    Init,
    /// Print one config value, or the whole config file
    Get {
        /// Config key
        key: Option<String>,
    },
}

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.db {
        Some(path) => Config::load_with_db_path(path)?,
        None => Config::load()?,
    };
    init_logging(&config.log_level);

    let output = commands::Output::new(cli.json);

    match cli.command {
        Commands::Import { paths } => {
            commands::run_import(&config, &paths, output)?;
        }
        Commands::Snapshots => {
            commands::list_snapshots(&config, output)?;
        }
        Commands::RemoveSnapshot { label } => {
            commands::remove_snapshot(&config, &label, output)?;
        }
        Commands::Compare {
            from,
            to,
            search,
            sort,
        } => {
            commands::query::compare(&config, &from, &to, search.as_deref(), sort, output)?;
        }
        Commands::Years { from, all } => {
            commands::query::years(&config, from.as_deref(), all, output)?;
        }
        Commands::YearlyAverage { cutoff } => {
            commands::query::yearly_average(&config, cutoff.as_deref(), output)?;
        }
        Commands::Genres { cutoff } => {
            commands::query::genres(&config, cutoff.as_deref(), output)?;
        }
        Commands::TitleTypes { from } => {
            commands::query::title_types(&config, from.as_deref(), output)?;
        }
        Commands::Countries => {
            commands::query::countries(&config, output)?;
        }
        Commands::Ratings { date } => {
            commands::query::ratings(&config, date.as_deref(), output)?;
        }
        Commands::Enrich => {
            commands::run_enrich(&config, output).await?;
        }
        Commands::Status => {
            commands::show_status(&config, output)?;
        }
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config()?,
            ConfigAction::Get { key } => commands::config::get_config(&config, key.as_deref())?,
        },
    }

    Ok(())
}
