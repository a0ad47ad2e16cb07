use clap::{Args, Parser, Subcommand};

use crate::bibliography::InputShape;
use crate::intent::ClassifierKind;

#[derive(Parser)]
#[command(name = "citegraph")]
#[command(about = "Resolve bibliographies against a canonical corpus and build a citation graph dataset")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import canonical records from a JSONL (or .jsonl.gz) dump into the store
    ImportCorpus(ImportCorpusArgs),

    /// Resolve citing-paper bibliographies and add them to the dataset
    Generate(GenerateArgs),

    /// Label citation contexts with an intent and write `<stem>_i.jsonl` files
    Enrich(EnrichArgs),

    /// Write the dataset reduced to structure and intent labels
    Strip(StripArgs),

    /// Show the statistics and invariant report of a dataset lineage
    Stats(StatsArgs),

    /// Clear the parsed flag on every canonical record
    Reset(ResetArgs),

    /// Export the dataset as JSONL and a Parquet citation edge table
    Export(ExportArgs),
}

/// Store location and dataset lineage, shared by every subcommand
#[derive(Args, Clone, Debug)]
pub struct StoreArgs {
    /// Path of the sled database
    #[arg(long, env = "CITEGRAPH_STORE", default_value = "citegraph.db")]
    pub store: String,

    /// Dataset generation lineage
    #[arg(long, env = "CITEGRAPH_DATASET", default_value = "citations")]
    pub dataset: String,
}

/// Intent classifier for context records that arrive without a label
#[derive(Args, Clone, Debug)]
pub struct ClassifierArgs {
    /// Classifier used for unlabelled contexts
    #[arg(long, value_enum, default_value = "none")]
    pub classify: ClassifierKind,

    /// Base URL of the classification service (with --classify http)
    #[arg(long, env = "CITEGRAPH_CLASSIFIER_URL")]
    pub classifier_url: Option<String>,

    /// Timeout in seconds per classification request
    #[arg(long, default_value = "10")]
    pub classifier_timeout: u64,

    /// Concurrent classification requests
    #[arg(long, default_value = "8")]
    pub classifier_concurrency: usize,
}

#[derive(Parser, Clone)]
pub struct ImportCorpusArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Canonical record dump (JSONL, gzipped when ending in .gz)
    #[arg(short, long, required = true)]
    pub input: String,

    /// Logging level (DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Directory of citing-paper JSON files
    #[arg(short, long, required = true)]
    pub input: String,

    /// Directory of citation-context JSONL files
    #[arg(short, long)]
    pub contexts: Option<String>,

    /// File-name suffix of context files
    #[arg(long, default_value = "_i.jsonl")]
    pub context_suffix: String,

    /// Bibliography shape of the input files
    #[arg(long, value_enum, default_value = "auto")]
    pub shape: InputShape,

    /// Skip citing papers already present in the dataset without parsing them
    #[arg(long, default_value = "false")]
    pub skip_existing: bool,

    /// Clear the lineage's dataset and statistics first
    #[arg(long, default_value = "false")]
    pub fresh_start: bool,

    /// Clear every parsed flag before processing
    #[arg(long, default_value = "false")]
    pub reset_parsed: bool,

    /// Attach the canonical record's DOI to references resolved without one
    #[arg(long, default_value = "false")]
    pub attach_canonical_doi: bool,

    #[command(flatten)]
    pub classifier: ClassifierArgs,

    /// Load the corpus into memory before resolving
    #[arg(long, default_value = "false")]
    pub preload_corpus: bool,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long, default_value = "1")]
    pub threads: usize,

    /// Number of runs kept in the run history
    #[arg(long, default_value = "100")]
    pub history_limit: usize,

    /// Logging level (DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct EnrichArgs {
    /// Directory of base citation-context JSONL files
    #[arg(short, long, required = true)]
    pub input: String,

    /// Directory for the labelled files (defaults to the input directory)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Suffix of labelled files; inputs already ending in it are skipped
    #[arg(long, default_value = "_i.jsonl")]
    pub context_suffix: String,

    /// Replace labels already present in the input
    #[arg(long, default_value = "false")]
    pub overwrite: bool,

    #[command(flatten)]
    pub classifier: ClassifierArgs,

    /// Logging level (DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct StripArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Output JSONL file
    #[arg(short, long, default_value = "stripped.jsonl")]
    pub output: String,

    /// Only compute and log the statistics
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Drop the raw bibliographic text from references
    #[arg(long, default_value = "false")]
    pub drop_raw_text: bool,

    /// Logging level (DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Exit with an error when an invariant fails
    #[arg(long, default_value = "false")]
    pub strict: bool,

    /// Logging level (DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct ResetArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Logging level (DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Output base path: writes <base>.jsonl and <base>_edges.parquet
    #[arg(short, long, default_value = "dataset.jsonl")]
    pub output: String,

    /// Logging level (DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}
