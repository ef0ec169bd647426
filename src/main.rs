use clap::{Parser, Subcommand};
use simrec::loader::{self, CsvCatalogOptions, DEFAULT_NAME_COLUMN};
use simrec::{
    EntityResolver, IndexConfig, NeighborIndex, Recommender, ResolutionOutcome, TrigramResolver,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Find entities similar to the one you name
#[derive(Parser, Debug)]
#[command(name = "simrec")]
#[command(about = "Similar-item recommendations from a catalog and feature matrix")]
#[command(long_about = None)]
struct Args {
    /// CSV file with one entity per row
    #[arg(long)]
    catalog: PathBuf,

    /// JSON array of feature vectors, row-aligned with the catalog
    #[arg(long)]
    features: PathBuf,

    /// Catalog column holding entity names
    #[arg(long, default_value = DEFAULT_NAME_COLUMN)]
    name_column: String,

    /// Read at most this many catalog rows
    #[arg(long)]
    limit: Option<usize>,

    /// Fall back to trigram matching when no name contains the query
    #[arg(long)]
    fuzzy: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the distinct entity names, sorted
    List,
    /// Recommend entities similar to QUERY
    Recommend {
        query: String,

        /// Number of recommendations
        #[arg(short, long, default_value_t = 5)]
        k: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting simrec v{}", env!("CARGO_PKG_VERSION"));

    let options = CsvCatalogOptions {
        name_column: args.name_column.clone(),
        limit: args.limit,
    };
    let catalog = loader::load_catalog_csv(&args.catalog, &options)?;
    let matrix = loader::load_features_json(&args.features)?;

    let config = IndexConfig {
        default_k: match &args.command {
            Command::Recommend { k, .. } => (*k).max(1),
            Command::List => IndexConfig::default().default_k,
        },
        ..IndexConfig::default()
    };
    let index = NeighborIndex::with_config(matrix, config)?;

    if args.fuzzy {
        let recommender = Recommender::with_resolver(catalog, index, TrigramResolver::default())?;
        run(&recommender, &args.command)
    } else {
        run(&Recommender::new(catalog, index)?, &args.command)
    }
}

fn run<R: EntityResolver>(
    recommender: &Recommender<R>,
    command: &Command,
) -> anyhow::Result<ExitCode> {
    match command {
        Command::List => {
            for name in recommender.catalog().sorted_unique_names() {
                println!("{}", name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Recommend { query, k, json } => {
            if query.trim().is_empty() {
                eprintln!("Please provide a name to search for");
                return Ok(ExitCode::FAILURE);
            }

            let id = match recommender.resolve(query) {
                ResolutionOutcome::Found(id) => id,
                ResolutionOutcome::NotFound => {
                    eprintln!("No entity found with the name '{}'", query.trim());
                    return Ok(ExitCode::FAILURE);
                }
            };
            let result = recommender.index().query(id, *k)?;

            if *json {
                let rows: Vec<serde_json::Value> = result
                    .iter()
                    .filter_map(|neighbor| {
                        let entity = recommender.entity(neighbor.entity_id)?;
                        Some(serde_json::json!({
                            "id": entity.id,
                            "name": entity.display_name,
                            "distance": neighbor.distance,
                            "attributes": entity.attributes,
                        }))
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(ExitCode::SUCCESS);
            }

            if let Some(entity) = recommender.entity(id) {
                println!("Entities similar to '{}':", entity.display_name);
            }
            for neighbor in result.iter() {
                let Some(entity) = recommender.entity(neighbor.entity_id) else {
                    continue;
                };
                println!("  {} (distance {:.4})", entity.display_name, neighbor.distance);
                for (key, value) in &entity.attributes {
                    match value {
                        serde_json::Value::String(s) => println!("      {}: {}", key, s),
                        other => println!("      {}: {}", key, other),
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
