//! artres CLI
//!
//! Entry point for the `artres` command-line tool.

use artres::artifact::{
    ArtifactSet, AttributeContainer, AttributeMatchingSelector, BuildDependencyCollector,
    CollectingListener, ResolvedArtifactSet, VariantSelector, WorkerPoolQueue,
};
use artres::component::{ExcludeModules, ModuleComponentArtifactIdentifier, ModuleComponentIdentifier};
use artres::config::{EffectiveConfig, Settings};
use artres::graph::ComponentGraph;
use artres::logging;
use artres::resource::{
    CompositeFinder, FileStoreSearcher, FinderChainBuilder, HashValue,
    LocallyAvailableResourceFinder, MavenLocalRepositoryLocator, REPO_LOCAL_PROPERTY,
};
use artres_store::FileStore;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

/// Exit code for usage and configuration errors
const EXIT_USAGE: i32 = 2;

#[derive(Parser)]
#[command(name = "artres")]
#[command(about = "Artifact variant selection and local cache lookup", version)]
struct Cli {
    /// Path to user config file (default: ~/.config/artres/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Root caches directory
    #[arg(long, global = true)]
    caches_dir: Option<PathBuf>,

    /// Worker threads used to materialize artifacts
    #[arg(long, global = true)]
    workers: Option<u64>,

    /// Local Maven repository location, bypassing discovery
    #[arg(long, global = true)]
    maven_repo_local: Option<PathBuf>,

    /// Do not search the local Maven repository
    #[arg(long, global = true)]
    no_maven_local: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Identity of a module artifact
#[derive(Args)]
struct ArtifactArgs {
    /// Module coordinates (group:module:version)
    coordinates: String,

    /// Artifact name (default: the module name)
    #[arg(long)]
    name: Option<String>,

    /// Artifact type
    #[arg(long = "type", default_value = "jar")]
    artifact_type: String,

    /// File extension (default: the type)
    #[arg(long)]
    ext: Option<String>,

    /// Artifact classifier (e.g., "sources")
    #[arg(long)]
    classifier: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a local copy of an artifact by content hash
    Locate {
        #[command(flatten)]
        artifact: ArtifactArgs,

        /// Expected SHA-256 of the artifact content
        #[arg(long)]
        sha256: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List the local finders in search order
    Layouts {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// File store commands
    Store {
        #[command(subcommand)]
        action: StoreCommands,
    },

    /// Select variants of a component graph and materialize its artifacts
    Resolve {
        /// Path to the component graph (JSON)
        graph: PathBuf,

        /// Requested attribute (repeatable)
        #[arg(long = "attribute", short = 'a', value_name = "KEY=VALUE")]
        attributes: Vec<String>,

        /// Exclude a module from the result (repeatable)
        #[arg(long = "exclude", short = 'x', value_name = "GROUP:MODULE")]
        excludes: Vec<String>,

        /// Print build dependencies without materializing artifacts
        #[arg(long)]
        dependencies_only: bool,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum StoreCommands {
    /// Add a file to the file store
    Add {
        #[command(flatten)]
        artifact: ArtifactArgs,

        /// File to add
        file: PathBuf,

        /// Reject the file unless its content has this SHA-256
        #[arg(long)]
        sha256: Option<String>,
    },

    /// Show file store statistics
    Stats,

    /// Remove abandoned temporary files
    Clean {
        /// Minimum age of a temporary file, in seconds
        #[arg(long, default_value = "3600")]
        older_than_secs: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Error initializing logging: {}", e);
    }

    let config = load_config(&cli);

    match &cli.command {
        Commands::Locate {
            artifact,
            sha256,
            json,
        } => {
            run_locate(&load_settings(&config), artifact, sha256, *json);
        }
        Commands::Layouts { json } => {
            run_layouts(&load_settings(&config), *json);
        }
        Commands::Store { action } => match action {
            StoreCommands::Add {
                artifact,
                file,
                sha256,
            } => {
                run_store_add(&load_settings(&config), artifact, file, sha256.as_deref());
            }
            StoreCommands::Stats => {
                run_store_stats(&load_settings(&config));
            }
            StoreCommands::Clean { older_than_secs } => {
                run_store_clean(&load_settings(&config), *older_than_secs);
            }
        },
        Commands::Resolve {
            graph,
            attributes,
            excludes,
            dependencies_only,
        } => {
            run_resolve(
                &load_settings(&config),
                graph,
                attributes,
                excludes,
                *dependencies_only,
            );
        }
        Commands::Config => {
            run_config(&config);
        }
    }
}

fn load_config(cli: &Cli) -> EffectiveConfig {
    if let Some(path) = &cli.config {
        if !path.exists() {
            eprintln!("Config file not found: {}", path.display());
            process::exit(EXIT_USAGE);
        }
    }
    let user_path = cli
        .config
        .clone()
        .or_else(EffectiveConfig::default_user_config_path);

    match EffectiveConfig::build(
        user_path.as_deref(),
        EffectiveConfig::process_env_layer(),
        cli_overrides(cli),
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(EXIT_USAGE);
        }
    }
}

fn cli_overrides(cli: &Cli) -> Option<Value> {
    let mut overrides = serde_json::Map::new();
    if let Some(dir) = &cli.caches_dir {
        overrides.insert("caches_dir".to_string(), json!(dir.to_string_lossy()));
    }
    if let Some(workers) = cli.workers {
        overrides.insert("workers".to_string(), json!(workers));
    }

    let mut maven_local = serde_json::Map::new();
    if let Some(repo) = &cli.maven_repo_local {
        maven_local.insert("repo_local".to_string(), json!(repo.to_string_lossy()));
    }
    if cli.no_maven_local {
        maven_local.insert("enabled".to_string(), json!(false));
    }
    if !maven_local.is_empty() {
        overrides.insert("maven_local".to_string(), Value::Object(maven_local));
    }

    if overrides.is_empty() {
        None
    } else {
        Some(Value::Object(overrides))
    }
}

fn load_settings(config: &EffectiveConfig) -> Settings {
    match config.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(EXIT_USAGE);
        }
    }
}

fn build_chain(settings: &Settings) -> CompositeFinder {
    let store_dir = settings.file_store_dir();
    let store: Arc<dyn FileStoreSearcher> = Arc::new(FileStore::new(store_dir.clone()));
    let mut builder = FinderChainBuilder::new(settings.caches_dir.clone(), store)
        .with_file_store_description(store_dir.display().to_string());

    if settings.maven_local.enabled {
        let mut locator = MavenLocalRepositoryLocator::from_process_env();
        if let Some(repo) = &settings.maven_local.repo_local {
            locator = locator.with_property(REPO_LOCAL_PROPERTY, repo);
        }
        builder = builder.with_local_repository(Arc::new(locator));
    }

    match builder.build() {
        Ok(chain) => chain,
        Err(e) => {
            eprintln!("Error assembling cache finders: {}", e);
            process::exit(1);
        }
    }
}

fn artifact_criterion(args: &ArtifactArgs) -> ModuleComponentArtifactIdentifier {
    let component: ModuleComponentIdentifier = match args.coordinates.parse() {
        Ok(id) => id,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_USAGE);
        }
    };
    let name = args.name.clone().unwrap_or_else(|| component.module.clone());
    let extension = args.ext.clone().unwrap_or_else(|| args.artifact_type.clone());

    let mut criterion = ModuleComponentArtifactIdentifier::new(component, &name, &args.artifact_type)
        .with_extension(&extension);
    if let Some(classifier) = &args.classifier {
        criterion = criterion.with_classifier(classifier);
    }
    criterion
}

fn run_locate(settings: &Settings, args: &ArtifactArgs, sha256: &str, json: bool) {
    let criterion = artifact_criterion(args);
    let hash = match HashValue::parse(sha256) {
        Ok(hash) => hash,
        Err(e) => {
            eprintln!("Invalid --sha256: {}", e);
            process::exit(EXIT_USAGE);
        }
    };

    let chain = build_chain(settings);
    let found = chain
        .find_candidates(&criterion)
        .find_by_hash_value(&hash);

    if json {
        let output = json!({
            "artifact": criterion.to_string(),
            "sha256": hash.as_str(),
            "path": found.as_ref().map(|r| r.path().display().to_string()),
        });
        println!("{}", output);
    } else {
        match &found {
            Some(resource) => println!("{}", resource.path().display()),
            None => eprintln!("No local copy of {} with sha256 {}", criterion, hash),
        }
    }

    if found.is_none() {
        process::exit(1);
    }
}

fn run_layouts(settings: &Settings, json: bool) {
    let chain = build_chain(settings);
    let names: Vec<String> = chain
        .delegates()
        .iter()
        .map(|finder| finder.display_name())
        .collect();

    if json {
        println!("{}", json!(names));
    } else {
        for (i, name) in names.iter().enumerate() {
            println!("{:>2}. {}", i + 1, name);
        }
    }
}

fn run_store_add(settings: &Settings, args: &ArtifactArgs, file: &Path, sha256: Option<&str>) {
    let criterion = artifact_criterion(args);
    let store = FileStore::new(settings.file_store_dir());

    let reader = match File::open(file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open {}: {}", file.display(), e);
            process::exit(1);
        }
    };

    match store.add(&criterion.store_key(), sha256, reader) {
        Ok(stored) => {
            println!("{}", stored.path.display());
            println!("  sha256: {}", stored.sha256);
            println!("  size:   {} bytes", stored.size);
        }
        Err(e) => {
            eprintln!("Error adding {}: {}", criterion, e);
            process::exit(1);
        }
    }
}

fn run_store_stats(settings: &Settings) {
    let store = FileStore::new(settings.file_store_dir());
    match store.stats() {
        Ok(stats) => {
            println!("File store: {}", store.root().display());
            println!("  Files: {}", stats.files);
            println!("  Bytes: {}", stats.total_bytes);
        }
        Err(e) => {
            eprintln!("Error reading file store: {}", e);
            process::exit(1);
        }
    }
}

fn run_store_clean(settings: &Settings, older_than_secs: u64) {
    let store = FileStore::new(settings.file_store_dir());
    match store.cleanup_orphaned_temps(Duration::from_secs(older_than_secs)) {
        Ok(removed) => println!("Removed {} temporary file(s)", removed),
        Err(e) => {
            eprintln!("Error cleaning file store: {}", e);
            process::exit(1);
        }
    }
}

fn parse_attributes(attributes: &[String]) -> AttributeContainer {
    let mut container = AttributeContainer::new();
    for attribute in attributes {
        match attribute.split_once('=') {
            Some((name, value)) if !name.is_empty() => container.insert(name, value),
            _ => {
                eprintln!("Invalid attribute '{}': expected KEY=VALUE", attribute);
                process::exit(EXIT_USAGE);
            }
        }
    }
    container
}

fn run_resolve(
    settings: &Settings,
    graph_path: &Path,
    attributes: &[String],
    excludes: &[String],
    dependencies_only: bool,
) {
    let requested = parse_attributes(attributes);
    let filter = match ExcludeModules::parse(excludes.iter().map(String::as_str)) {
        Ok(filter) => filter,
        Err(entry) => {
            eprintln!("Invalid exclude '{}': expected GROUP:MODULE", entry);
            process::exit(EXIT_USAGE);
        }
    };

    let graph = match ComponentGraph::load(graph_path) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error loading {}: {}", graph_path.display(), e);
            process::exit(1);
        }
    };
    let base_dir = graph_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let finder: Arc<dyn LocallyAvailableResourceFinder> = Arc::new(build_chain(settings));
    let set = match graph.to_artifact_set(&base_dir, finder) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("Error in {}: {}", graph_path.display(), e);
            process::exit(1);
        }
    };

    let selector: Arc<dyn VariantSelector> = Arc::new(AttributeMatchingSelector::new(requested));
    let resolved = set.select(&filter, selector);

    let mut collector = BuildDependencyCollector::new();
    resolved.collect_build_dependencies(&mut collector);
    println!("Build dependencies:");
    for dependency in &collector.dependencies {
        println!("  {}", dependency);
    }
    for failure in &collector.failures {
        println!("  (unresolved) {}", failure);
    }

    if dependencies_only {
        return;
    }

    visit(resolved.as_ref(), settings.workers);
}

fn visit(resolved: &dyn ResolvedArtifactSet, workers: usize) {
    let queue = WorkerPoolQueue::new(workers);
    let listener = Arc::new(CollectingListener::new());
    let outcome = resolved.start_visit(&queue, listener.clone()).wait();

    println!("Artifacts:");
    for artifact in listener.available() {
        println!("  {} [{}] -> {}", artifact.id, artifact.variant, artifact.file.display());
    }

    if let Err(failure) = outcome {
        eprintln!("{}", failure);
        for cause in &failure.failures {
            eprintln!("  {}", cause);
        }
        process::exit(1);
    }
}

fn run_config(config: &EffectiveConfig) {
    match config.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            process::exit(1);
        }
    }
}
