use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::memo::{ListOptions, MemoFields, SortKey};

#[derive(Parser)]
#[command(name = "memos")]
#[command(version)]
#[command(about = "Tagged, dated personal memos")]
struct Cli {
    /// Notebook file (overrides MEMOS_FILE and the config)
    #[arg(short, long, global = true)]
    file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a memo
    New {
        /// Title (defaults to the configured label)
        #[arg(short, long)]
        title: Option<String>,

        /// Body text
        #[arg(short, long)]
        content: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// Date as YYYY/MM/DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Change fields of a memo
    Edit {
        /// Memo ID
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New body text
        #[arg(short, long)]
        content: Option<String>,

        /// New tags (comma-separated, replaces existing)
        #[arg(long)]
        tags: Option<String>,

        /// New date as YYYY/MM/DD
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete a memo
    Rm {
        /// Memo ID to delete
        id: String,

        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },

    /// Show one memo in full
    Show {
        /// Memo ID
        id: String,
    },

    /// List memos
    List {
        /// Earliest date, YYYY/MM/DD
        #[arg(long)]
        from: Option<String>,

        /// Latest date, YYYY/MM/DD
        #[arg(long)]
        to: Option<String>,

        /// Only memos with this tag (repeat to accept any of several)
        #[arg(long)]
        tag: Vec<String>,

        /// Order by title or date instead of creation order
        #[arg(long, value_enum)]
        sort: Option<SortKey>,

        /// Reverse the listing order
        #[arg(short, long)]
        reverse: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List all tags
    Tags,

    /// Show the earliest and latest memo dates
    Range,

    /// Search titles and content
    Search {
        /// Text to find
        query: String,

        /// Match case exactly
        #[arg(short = 's', long)]
        case_sensitive: bool,
    },

    /// Append the memos of another notebook file
    Import {
        /// Notebook file to read
        source: String,
    },

    /// Export memos as plain text
    Export {
        /// Output file
        out: String,

        /// Memo IDs to export, in order (all when omitted)
        ids: Vec<String>,
    },

    /// View or set configuration
    Config {
        /// Config key
        key: Option<String>,

        /// Config value
        value: Option<String>,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("MEMOS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    init_tracing("warn");

    let cli = Cli::parse();
    let file = cli.file.as_deref();

    let result = match cli.command {
        Commands::New {
            title,
            content,
            tags,
            date,
        } => cli::memo::run_new(
            file,
            MemoFields {
                title,
                content,
                tags,
                date,
            },
        ),
        Commands::Edit {
            id,
            title,
            content,
            tags,
            date,
        } => cli::memo::run_edit(
            file,
            &id,
            MemoFields {
                title,
                content,
                tags,
                date,
            },
        ),
        Commands::Rm { id, force } => cli::memo::run_rm(file, &id, force),
        Commands::Show { id } => cli::memo::run_show(file, &id),
        Commands::List {
            from,
            to,
            tag,
            sort,
            reverse,
            json,
        } => cli::memo::run_list(
            file,
            ListOptions {
                from,
                to,
                tags: tag,
                sort,
                reverse,
                json,
            },
        ),
        Commands::Tags => cli::memo::run_tags(file),
        Commands::Range => cli::memo::run_range(file),
        Commands::Search {
            query,
            case_sensitive,
        } => cli::memo::run_search(file, &query, case_sensitive),
        Commands::Import { source } => cli::memo::run_import(file, &source),
        Commands::Export { out, ids } => cli::memo::run_export(file, &out, &ids),
        Commands::Config { key, value } => {
            cli::config::run_config(key.as_deref(), value.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
