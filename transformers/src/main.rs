//! Transformers CLI - render the blog store through registered strategies
//!
//! # Commands
//!
//! ```bash
//! transformers show users --include posts.tags,isOfAge   # Transform a collection
//! transformers show users --id 1 --strategy admin        # Transform one entity
//! transformers show posts --page 2 --per-page 5          # Transform one page
//! transformers strategies                                # List registered strategies
//! transformers serve --port 3000                         # Start HTTP server
//! ```
//!
//! `--data <file>` (or `TRANSFORMERS_DATA`) replaces the embedded seed data.

use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use transformers::api::AppState;
use transformers::blog::{strategies, Collection, Store};
use transformers::{logging, registry, Config, Locator, StrategyRegistry, Transformer};

#[derive(Parser)]
#[command(name = "transformers")]
#[command(about = "Transform entities to JSON with named strategies and relation includes", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Seed JSON file (default: embedded blog data)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a collection, a page of it, or one entity
    Show(ShowArgs),

    /// List registered strategies per entity type
    Strategies,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: TRANSFORMERS_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct ShowArgs {
    /// Collection: users, posts or tags
    collection: String,

    /// Transform only the entity with this id
    #[arg(long)]
    id: Option<u64>,

    /// Inclusion paths, comma separated or repeated
    #[arg(short, long, value_delimiter = ',')]
    include: Vec<String>,

    /// Strategy key (default: the type's default strategy)
    #[arg(short, long)]
    strategy: Option<String>,

    /// Page number (1-based); the whole collection when omitted
    #[arg(long)]
    page: Option<usize>,

    /// Page size (default: TRANSFORMERS_DEFAULT_PER_PAGE or 15)
    #[arg(long)]
    per_page: Option<usize>,

    /// Fail on inclusion names that are not relations, getters or attributes
    #[arg(long)]
    strict: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("⚠️  Logging disabled: {}", e);
    }

    if let Err(e) = run(cli).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?.with_data_path(cli.data);
    let registry = registry::install(strategies::registry())?;
    let store = Store::load(config.data_path.as_deref())?;

    match cli.command {
        Commands::Show(args) => cmd_show(registry, &store, &config, args),
        Commands::Strategies => cmd_strategies(registry),
        Commands::Serve { port } => cmd_serve(registry, store, config.with_port(port)).await,
    }
}

fn cmd_show(
    registry: &StrategyRegistry,
    store: &Arc<Store>,
    config: &Config,
    args: ShowArgs,
) -> Result<(), Box<dyn Error>> {
    let collection: Collection = args.collection.parse()?;

    let mut transformer = Transformer::new(registry, collection.entity_type())?
        .with(&args.include)
        .strict_inclusions(args.strict);
    if let Some(key) = args.strategy.as_deref() {
        transformer = transformer.set_transformation(key)?;
    }

    eprintln!(
        "📄 {} with '{}'{}",
        collection,
        transformer.strategy_name().unwrap_or_default(),
        if transformer.inclusions().is_empty() {
            String::new()
        } else {
            format!(", including {}", transformer.inclusions())
        }
    );

    let output = match (args.id, args.page) {
        (Some(id), _) => transformer.transform(store.find(collection, id)?)?,
        (None, Some(page)) => {
            let page = store.paginate(collection, page.max(1), config.per_page(args.per_page));
            eprintln!(
                "   Page {} of {} ({} total)",
                page.current_page(),
                page.last_page(),
                page.total()
            );
            transformer.transform(page)?
        }
        (None, None) => transformer.transform(store.all(collection))?,
    };

    let json = serde_json::to_string_pretty(&output)?;
    write_output(&json, args.output.as_deref())?;

    Ok(())
}

fn cmd_strategies(registry: &StrategyRegistry) -> Result<(), Box<dyn Error>> {
    for entity_type in registry.entity_types() {
        let strategies = registry.locate(entity_type)?;
        println!("{}", entity_type);
        for key in strategies.keys() {
            let marker = if key == strategies.default_key() { " (default)" } else { "" };
            println!("  - {}{}", key, marker);
        }
    }
    Ok(())
}

async fn cmd_serve(
    registry: &'static StrategyRegistry,
    store: Arc<Store>,
    config: Config,
) -> Result<(), Box<dyn Error>> {
    transformers::server::start_server(AppState::new(registry, store, config)).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
