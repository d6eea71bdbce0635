use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use smartcart_api::RestApi;
use smartcart_core::{Catalog, QueryContext, RecommendationEngine, REQUIRED_FIELDS};
use smartcart_eval::{
    validate_embeddings, validate_table, ClusterSeparation, DiversityStats, EmbeddingAnalyzer, EmbeddingMatrix,
    EmbeddingStats, FusionWeights, RecommendationEvaluator, RelevanceJudgment, Table, TableStats, ValidationReport,
    DEFAULT_DIVERSITY_SAMPLE_SIZE, DEFAULT_K_VALUES,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Product recommender with analytics and offline evaluation
#[derive(Parser, Debug)]
#[command(name = "smartcart")]
#[command(about = "Product recommendations, analytics and evaluation", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST API
    Serve {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// HTTP API port
        #[arg(long, default_value_t = 8000)]
        http_port: u16,
    },
    /// Print recommendations for one request as JSON
    Recommend(RecommendArgs),
    /// Check the catalog records for missing fields and duplicates
    Validate {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Average ranking metrics over a JSON file of judgments
    Evaluate {
        /// JSON array of {"recommended": [...], "relevant": [...]}
        #[arg(long)]
        judgments: PathBuf,

        /// Cut-offs for the @K metrics
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_K_VALUES)]
        k: Vec<usize>,
    },
    /// Validate and analyze an embedding matrix
    Embeddings(EmbeddingsArgs),
}

#[derive(Args, Debug, Default)]
struct CatalogArgs {
    /// Product catalog JSON file; the bundled data set when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct RecommendArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[arg(long)]
    query: Option<String>,
    /// Exact category; empty means any
    #[arg(long)]
    category: Option<String>,
    /// Exact brand; empty means any
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    min_rating: Option<f64>,
    #[arg(long)]
    limit: Option<usize>,
}

impl RecommendArgs {
    fn to_context(&self) -> QueryContext {
        QueryContext {
            query: self.query.clone(),
            category: self.category.clone().filter(|c| !c.is_empty()),
            brand: self.brand.clone().filter(|b| !b.is_empty()),
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.min_rating,
            limit: self.limit,
        }
    }
}

#[derive(Args, Debug)]
struct EmbeddingsArgs {
    /// JSON array of rows
    #[arg(long)]
    matrix: PathBuf,

    /// Image embeddings to fuse with `--matrix` before analysis
    #[arg(long)]
    image: Option<PathBuf>,

    /// Text weight for fusion
    #[arg(long, default_value_t = 0.7)]
    alpha: f32,

    /// Image weight for fusion
    #[arg(long, default_value_t = 0.3)]
    beta: f32,

    /// JSON array of integer cluster labels, one per row
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Rows sampled for the diversity statistics
    #[arg(long, default_value_t = DEFAULT_DIVERSITY_SAMPLE_SIZE)]
    sample_size: usize,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct EmbeddingReport {
    validation: ValidationReport<EmbeddingStats>,
    diversity: Option<DiversityStats>,
    cluster_separation: Option<ClusterSeparation>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
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

    match cli.command {
        Command::Serve { catalog, host, http_port } => serve(&catalog, host, http_port).await,
        Command::Recommend(args) => {
            let catalog = load_catalog(&args.catalog)?;
            print_json(&RecommendationEngine::default().recommend(&catalog, &args.to_context()))
        }
        Command::Validate { catalog } => print_json(&validate_catalog(&catalog)?),
        Command::Evaluate { judgments, k } => {
            let judgments: Vec<RelevanceJudgment<String>> = read_json(&judgments)?;
            info!("Evaluating {} judgments at k = {:?}", judgments.len(), k);
            print_json(&RecommendationEvaluator::new(k).evaluate_many(&judgments))
        }
        Command::Embeddings(args) => print_json(&analyze_embeddings(&args)?),
    }
}

async fn serve(args: &CatalogArgs, host: String, http_port: u16) -> anyhow::Result<()> {
    info!("Starting SmartCart v{}", env!("CARGO_PKG_VERSION"));
    let catalog = Arc::new(load_catalog(args)?);
    info!("Catalog initialized: {} products", catalog.len());

    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(catalog, &host, http_port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn load_catalog(args: &CatalogArgs) -> anyhow::Result<Catalog> {
    match &args.catalog {
        Some(path) => Catalog::load(path).with_context(|| format!("loading catalog from {}", path.display())),
        None => Ok(Catalog::embedded()?),
    }
}

/// Validate the raw catalog records before any typed parsing
fn validate_catalog(args: &CatalogArgs) -> anyhow::Result<ValidationReport<TableStats>> {
    let table = match &args.catalog {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Table::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Table::from_json(Catalog::embedded_json())?,
    };
    Ok(validate_table(&table, &REQUIRED_FIELDS))
}

fn analyze_embeddings(args: &EmbeddingsArgs) -> anyhow::Result<EmbeddingReport> {
    let mut matrix: EmbeddingMatrix = read_json(&args.matrix)?;
    if let Some(image) = &args.image {
        let image: EmbeddingMatrix = read_json(image)?;
        let weights = FusionWeights {
            text: args.alpha,
            image: args.beta,
        };
        matrix = smartcart_eval::fuse(&matrix, &image, weights)?;
        info!("Fused embeddings: {} x {}", matrix.n_rows(), matrix.dim());
    }

    let validation = validate_embeddings(&matrix);
    if !validation.is_valid {
        warn!("Embeddings failed validation, skipping analysis");
        return Ok(EmbeddingReport {
            validation,
            diversity: None,
            cluster_separation: None,
        });
    }

    let mut analyzer = EmbeddingAnalyzer::new(args.sample_size);
    if let Some(seed) = args.seed {
        analyzer = analyzer.with_seed(seed);
    }

    let diversity = match analyzer.diversity(&matrix) {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("Diversity skipped: {}", e);
            None
        }
    };

    let cluster_separation = match &args.labels {
        Some(path) => {
            let labels: Vec<i64> = read_json(path)?;
            Some(analyzer.cluster_separation(&matrix, &labels)?)
        }
        None => None,
    };

    Ok(EmbeddingReport {
        validation,
        diversity,
        cluster_separation,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
