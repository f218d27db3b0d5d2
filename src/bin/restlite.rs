use clap::{Parser, Subcommand, ValueEnum};
use restlite::cli::{self as prog_cli, Command, OutputMode, params_from_pairs, parse_body};
use restlite::store::{MemoryCollection, MemoryEngine};
use restlite::utils::logger;
use restlite::{Crud, EngineConfig, RestError, Schema};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "restlite", version, about = "Run query-string CRUD calls against an NDJSON collection", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). Falls back to RESTLITE_CONFIG, ~/.config/restlite.toml, ./restlite.toml.")]
    config: Option<PathBuf>,
    #[arg(long, help = "NDJSON file with one resource per line")]
    data: Option<PathBuf>,
    #[arg(long, default_value = "items", help = "Collection name")]
    collection: String,
    #[arg(long, help = "Identifier field (overrides config)")]
    id_field: Option<String>,
    #[arg(long = "hide", help = "Field never returned; repeatable")]
    hidden: Vec<String>,
    #[arg(long = "relation", value_name = "FIELD=FILE", help = "Relation field backed by another NDJSON file; repeatable")]
    relations: Vec<String>,
    #[arg(long, help = "Write the collection back to --data after a mutating command")]
    save: bool,
    #[arg(long, value_enum, default_value_t = Format::Pretty)]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Print the parsed query for the given parameters")]
    Parse {
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    #[command(about = "Read one resource by id, or a list")]
    Get {
        id: Option<String>,
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    #[command(about = "Create a resource from a JSON object")]
    Post {
        #[arg(long)]
        body: Option<String>,
    },
    #[command(about = "Replace a resource")]
    Put {
        id: String,
        #[arg(long)]
        body: Option<String>,
    },
    #[command(about = "Merge fields into a resource")]
    Patch {
        id: String,
        #[arg(long)]
        body: Option<String>,
    },
    #[command(about = "Delete a resource and print what was removed")]
    Delete { id: String },
}

fn to_command(c: Commands) -> Result<Command, RestError> {
    Ok(match c {
        Commands::Parse { params } => Command::Parse { params: params_from_pairs(params) },
        Commands::Get { id, params } => Command::Get { id, params: params_from_pairs(params) },
        Commands::Post { body } => Command::Post { body: parse_body(body.as_deref())? },
        Commands::Put { id, body } => Command::Put { id, body: parse_body(body.as_deref())? },
        Commands::Patch { id, body } => Command::Patch { id, body: parse_body(body.as_deref())? },
        Commands::Delete { id } => Command::Delete { id },
    })
}

fn load_collection(
    engine: &MemoryEngine,
    name: &str,
    cfg: &EngineConfig,
    schema: Schema,
    path: Option<&PathBuf>,
) -> Result<(), RestError> {
    let col = MemoryCollection::new(name, cfg.id_field.as_str(), schema).with_timestamps(cfg.timestamps);
    if let Some(p) = path.filter(|p| p.exists()) {
        let n = col.load_ndjson(File::open(p)?)?;
        log::info!("loaded {n} resources into {name} from {}", p.display());
    }
    engine.add_collection(col);
    Ok(())
}

async fn execute(cli: Cli) -> Result<String, RestError> {
    let mut cfg = EngineConfig::load(cli.config.as_deref())?;
    if let Some(f) = cli.id_field {
        cfg.id_field = f;
    }
    logger::configure_from_config(&cfg.log)?;

    let engine = MemoryEngine::new();
    let mut schema = Schema::new();
    for h in cli.hidden {
        schema = schema.hide(h);
    }
    for r in &cli.relations {
        let (field, file) = prog_cli::parse_param(r);
        let target = format!("{}_{field}", cli.collection);
        load_collection(&engine, &target, &cfg, Schema::new(), Some(&PathBuf::from(file)))?;
        schema = schema.relation(field, target);
    }
    load_collection(&engine, &cli.collection, &cfg, schema, cli.data.as_ref())?;

    let store = engine.store(&cli.collection)?;
    let crud = Crud::from_config(store.clone(), &cfg);
    let cmd = to_command(cli.command)?;
    let mutating = cmd.is_mutation();
    let value = prog_cli::run(&crud, cmd).await?;

    if cli.save && mutating && let Some(path) = &cli.data {
        store.collection().write_ndjson(BufWriter::new(File::create(path)?))?;
        log::info!("saved {} resources to {}", store.collection().len(), path.display());
    }
    let mode = match cli.format {
        Format::Json => OutputMode::Json,
        Format::Pretty => OutputMode::Pretty,
    };
    Ok(prog_cli::render(&value, mode))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(if e.is_usage() { 2 } else { 1 });
        }
    }
}
