use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use crate::config::RagConfig;
use crate::flags::EmbedModeFlag;
use rag_graph::DependencyGraph;
use rag_indexer::{changed_files, CodebaseIndexer, IndexReport};
use rag_retrieval::ContextRetriever;
use rag_vector_store::paths::dependency_graph_path;
use rag_vector_store::{ChunkStorage, StoreStats};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

pub mod config;
mod flags;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    print_stdout(&serde_json::to_string_pretty(value)?)
}

#[derive(Parser)]
#[command(name = "review-rag")]
#[command(about = "Code-review context retrieval over a local index", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to review-rag.toml in the root, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository root
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Store directory, relative to the root unless absolute
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Override the embedding backend
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedModeFlag>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every supported file in the repository
    Index(IndexArgs),

    /// Re-index the given paths, or files changed since HEAD
    Update(UpdateArgs),

    /// Retrieve review context for a changed file
    Context(ContextArgs),

    /// Find stored code similar to a snippet
    Search(SearchArgs),

    /// Show store totals
    Stats,

    /// Delete the store and the dependency graph
    Reset,
}

#[derive(Args)]
struct IndexArgs {
    /// Output the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct UpdateArgs {
    /// Repository-relative paths; git-detected changes when empty
    paths: Vec<String>,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ContextArgs {
    /// Repository-relative path of the changed file
    file: String,

    /// Unified diff of the change (`-` reads stdin)
    #[arg(long)]
    diff: Option<PathBuf>,

    /// Items per list
    #[arg(long)]
    top_k: Option<usize>,
}

#[derive(Args)]
struct SearchArgs {
    /// Code snippet to look up
    snippet: String,

    /// Number of results
    #[arg(long)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct StatsOutput {
    db_dir: String,
    #[serde(flatten)]
    store: StoreStats,
    graph_nodes: usize,
}

/// Opened store and graph plus the settings they came from
struct Workspace {
    root: PathBuf,
    db_dir: PathBuf,
    config: RagConfig,
    storage: ChunkStorage,
    graph: DependencyGraph,
}

impl Workspace {
    async fn open(cli: &Cli) -> Result<Self> {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .canonicalize()
            .context("Invalid project root")?;

        let mut config = RagConfig::load(cli.config.as_deref(), &root)?;
        if let Some(db) = &cli.db {
            config.store.persist_dir = db.clone();
        }
        if let Some(mode) = cli.embed_mode {
            config.store.embedding.mode = Some(mode.as_domain());
        }
        let db_dir = config.resolve_db_dir(&root);

        let storage = ChunkStorage::open(&config.store)
            .await
            .with_context(|| format!("Failed to open store at {}", db_dir.display()))?;
        let graph = DependencyGraph::load(dependency_graph_path(&db_dir))
            .await
            .context("Failed to load dependency graph")?;

        Ok(Self {
            root,
            db_dir,
            config,
            storage,
            graph,
        })
    }

    fn indexer(&mut self) -> Result<CodebaseIndexer<'_>> {
        Ok(CodebaseIndexer::new(
            &self.root,
            self.config.indexer.clone(),
            &mut self.storage,
            &mut self.graph,
        )?)
    }

    fn retriever(&self) -> ContextRetriever<'_> {
        ContextRetriever::with_config(&self.storage, &self.graph, self.config.retriever.clone())
    }
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers
    let json_output = match &cli.command {
        Commands::Index(args) => args.json,
        Commands::Update(args) => args.json,
        _ => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut workspace = Workspace::open(&cli).await?;

    match cli.command {
        Commands::Index(args) => run_index(&mut workspace, args).await?,
        Commands::Update(args) => run_update(&mut workspace, args).await?,
        Commands::Context(args) => run_context(&workspace, args).await?,
        Commands::Search(args) => run_search(&workspace, args).await?,
        Commands::Stats => run_stats(&workspace).await?,
        Commands::Reset => run_reset(&mut workspace).await?,
    }

    Ok(())
}

async fn run_index(workspace: &mut Workspace, args: IndexArgs) -> Result<()> {
    let report = workspace.indexer()?.index_all().await?;
    print_report(&report, args.json)
}

async fn run_update(workspace: &mut Workspace, args: UpdateArgs) -> Result<()> {
    let paths = if args.paths.is_empty() {
        let changed = changed_files(&workspace.root).await;
        if changed.is_empty() {
            log::info!("No changed files detected");
        }
        changed
    } else {
        args.paths
    };

    let report = workspace.indexer()?.index_files(&paths).await?;
    print_report(&report, args.json)
}

fn print_report(report: &IndexReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    print_stdout(&format!(
        "Indexed {}/{} files, {} chunks in {}ms ({} errors, {} skipped)",
        report.success, report.total, report.chunks, report.time_ms, report.errors, report.skipped
    ))?;
    print_stdout(&format!(
        "Store: {} items, {} files, {} functions, {} dependencies",
        report.store.total_items,
        report.store.total_files,
        report.store.total_functions,
        report.store.total_dependencies
    ))
}

async fn run_context(workspace: &Workspace, args: ContextArgs) -> Result<()> {
    let diff = match &args.diff {
        Some(path) => Some(read_diff(path)?),
        None => None,
    };
    let file = repo_relative(&workspace.root, &args.file);

    let context = workspace
        .retriever()
        .get_context(&file, diff.as_deref(), args.top_k)
        .await;
    if !context.has_context() {
        log::info!("No context found for {file}");
    }
    print_json(&context)
}

async fn run_search(workspace: &Workspace, args: SearchArgs) -> Result<()> {
    let hits = workspace
        .retriever()
        .search_similar_code(&args.snippet, args.top_k)
        .await;
    print_json(&hits)
}

async fn run_stats(workspace: &Workspace) -> Result<()> {
    print_json(&StatsOutput {
        db_dir: workspace.db_dir.display().to_string(),
        store: workspace.storage.get_stats().await,
        graph_nodes: workspace.graph.len(),
    })
}

async fn run_reset(workspace: &mut Workspace) -> Result<()> {
    workspace
        .storage
        .reset()
        .await
        .context("Failed to reset store")?;
    workspace
        .graph
        .clear()
        .await
        .context("Failed to clear dependency graph")?;
    print_stdout(&format!("Reset store at {}", workspace.db_dir.display()))
}

fn read_diff(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut diff = String::new();
        io::stdin()
            .read_to_string(&mut diff)
            .context("Failed to read diff from stdin")?;
        return Ok(diff);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read diff {}", path.display()))
}

/// Store key for a user-supplied path: relative to the root, `/`-separated.
fn repo_relative(root: &Path, raw: &str) -> String {
    let normalized = raw.replace('\\', "/");
    let path = Path::new(&normalized);
    let relative = if path.is_absolute() {
        path.strip_prefix(root).unwrap_or(path)
    } else {
        path
    };
    relative
        .to_string_lossy()
        .trim_start_matches("./")
        .to_string()
}
