//! studyform CLI: the experimenter-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "studyform",
    version,
    about = "Research questionnaire sessions, scoring and exports"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// What `export` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    CsqVr,
    NasaTlx,
    Usability,
    /// Aggregate CSV of every form
    Csv,
    /// Aggregate JSON of every form
    Json,
    /// Everything above
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example study design
    Init,

    /// Validate a study design TOML file
    Validate {
        /// Path to the study design
        #[arg(long)]
        study: PathBuf,
    },

    /// List built-in form schemas
    Schemas {
        /// Show the fields of one instrument
        #[arg(long)]
        instrument: Option<String>,
    },

    /// Start a new active session from a study design
    Start {
        #[arg(long)]
        study: PathBuf,

        /// Participant name
        #[arg(long)]
        participant: String,

        /// Overall session comment
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// List the active session's forms in display order
    Forms,

    /// Change the participant name and overall comment
    Participant {
        #[arg(long)]
        name: String,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Record one field of a form
    Record {
        /// Display position (1-based) or instance id
        #[arg(long)]
        form: String,

        #[arg(long)]
        field: String,

        /// Selected value
        #[arg(long, conflicts_with = "clear")]
        value: Option<String>,

        /// Clear the selection
        #[arg(long)]
        clear: bool,

        /// Free-text comment for the field
        #[arg(long)]
        comment: Option<String>,
    },

    /// Fill a form interactively from stdin (`field value` per line)
    Fill {
        /// Display position (1-based) or instance id
        #[arg(long)]
        form: String,
    },

    /// Move a group to another position (1-based)
    MoveGroup {
        #[arg(long)]
        from: usize,

        #[arg(long)]
        to: usize,
    },

    /// Move a form within its group (1-based positions)
    MoveForm {
        #[arg(long)]
        group: String,

        #[arg(long)]
        from: usize,

        #[arg(long)]
        to: usize,
    },

    /// Save the active session into the saved collection
    Save,

    /// List saved sessions
    Saved,

    /// Make a saved session the active one
    Load {
        #[arg(long)]
        id: String,
    },

    /// Delete a saved session
    Delete {
        #[arg(long)]
        id: String,
    },

    /// Clear all responses and return to the study's participant defaults
    Reset {
        #[arg(long)]
        study: PathBuf,

        /// Mint new form identities
        #[arg(long)]
        fresh_instances: bool,
    },

    /// Export scores or aggregated responses
    Export {
        #[arg(long, value_enum, default_value = "all")]
        kind: ExportKind,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export a single form's responses
    ExportForm {
        /// Display position (1-based) or instance id
        #[arg(long)]
        form: String,

        #[arg(long, value_enum, default_value = "json")]
        format: FormFormat,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("studyform=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { study } => commands::validate::execute(study),
        Commands::Schemas { instrument } => commands::schemas::execute(instrument),
        Commands::Start {
            study,
            participant,
            comment,
        } => commands::session::start(config, study, participant, comment),
        Commands::Forms => commands::session::forms(config),
        Commands::Participant { name, comment } => {
            commands::session::participant(config, name, comment)
        }
        Commands::Record {
            form,
            field,
            value,
            clear,
            comment,
        } => commands::record::execute(config, form, field, value, clear, comment),
        Commands::Fill { form } => commands::fill::execute(config, form).await,
        Commands::MoveGroup { from, to } => commands::session::move_group(config, from, to),
        Commands::MoveForm { group, from, to } => {
            commands::session::move_form(config, group, from, to)
        }
        Commands::Save => commands::saved::save(config),
        Commands::Saved => commands::saved::list(config),
        Commands::Load { id } => commands::saved::load(config, id),
        Commands::Delete { id } => commands::saved::delete(config, id),
        Commands::Reset {
            study,
            fresh_instances,
        } => commands::session::reset(config, study, fresh_instances),
        Commands::Export { kind, output } => commands::export::execute(config, kind, output),
        Commands::ExportForm {
            form,
            format,
            output,
        } => commands::export::form(config, form, format, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
