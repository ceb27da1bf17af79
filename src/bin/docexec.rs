use clap::{Parser, Subcommand, ValueEnum};
use docexec::cli::{self, Command, OutputMode};
use docexec::config::EngineConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docexec", version, about = "Query and mutate a docexec database log", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Path to a config file (TOML). Falls back to DOCEXEC_CONFIG, then ./docexec.toml.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Database log path. Takes precedence over config/env.")]
    db: Option<PathBuf>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[arg(long, value_enum, default_value_t = Format::Plain, help = "Output format")]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Plain,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Insert one document")]
    Insert {
        #[arg(help = "Namespace, e.g. test.users")]
        ns: String,
        #[arg(help = "Document JSON (e.g., {\"name\":\"a\"})")]
        json: String,
    },
    #[command(about = "Print matching documents as NDJSON")]
    Find {
        ns: String,
        #[arg(help = "Filter JSON; matches everything when omitted")]
        filter: Option<String>,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, help = "Maximum results; 0 means unlimited, negative means one")]
        limit: i32,
    },
    #[command(about = "Delete documents matching a filter")]
    Delete {
        ns: String,
        filter: String,
        #[arg(long, help = "Delete only the first match")]
        just_one: bool,
    },
    #[command(about = "Replace the first document matching a filter")]
    Update {
        ns: String,
        filter: String,
        #[arg(help = "Replacement document JSON")]
        doc: String,
        #[arg(long, help = "Insert the document when nothing matches")]
        upsert: bool,
    },
    #[command(about = "List namespaces with record counts")]
    List,
    #[command(about = "Print version and compiled features")]
    Info,
}

impl From<Commands> for Command {
    fn from(c: Commands) -> Self {
        match c {
            Commands::Insert { ns, json } => Command::Insert { ns, json },
            Commands::Find { ns, filter, limit } => Command::Find { ns, filter_json: filter, limit },
            Commands::Delete { ns, filter, just_one } => Command::Delete { ns, filter_json: filter, just_one },
            Commands::Update { ns, filter, doc, upsert } => {
                Command::Update { ns, filter_json: filter, doc_json: doc, upsert }
            }
            Commands::List => Command::List,
            Commands::Info => Command::Info,
        }
    }
}

fn main() {
    let args = Cli::parse();
    // Precedence: CLI > env > config file > defaults
    let mut cfg = match EngineConfig::load(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    if let Some(db) = args.db {
        cfg.db_path = Some(db);
    }
    if let Some(level) = args.log_level {
        cfg.log.level = Some(level);
    }
    if cfg.log.dir.is_some() || cfg.log.level.is_some() {
        if let Err(e) = docexec::logger::configure_from(&cfg.log) {
            eprintln!("warning: {e}");
        }
    }
    let mode = match args.format {
        Format::Plain => OutputMode::Plain,
        Format::Json => OutputMode::Json,
    };

    let r = docexec::open(&cfg).and_then(|exec| {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        cli::run_with_format(&exec, args.command.into(), mode, &mut lock)
    });
    if let Err(e) = r {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
