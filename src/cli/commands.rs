//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// EODH hub client
#[derive(Parser, Debug)]
#[command(name = "eodh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Hub deployment (production, staging, test)
    #[arg(short, long, global = true)]
    pub environment: Option<String>,

    /// Explicit base URL, overrides the environment
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Hub username
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// API token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the catalogue service is up
    Ping,

    /// List the conformance classes of the catalogue service
    Conformance {
        /// Fail unless the service conforms to this URI
        #[arg(long)]
        check: Option<String>,
    },

    /// List catalogs, at the root or below a catalog path
    Catalogs {
        /// Catalog path, e.g. `user-datasets/alice`
        #[arg(long)]
        catalog: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List the collections of a catalog
    Collections {
        /// Catalog path
        catalog: String,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List the items of a collection
    Items {
        /// Catalog path
        catalog: String,

        /// Collection id
        collection: String,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Search items across the catalogue
    Search {
        #[command(flatten)]
        search: SearchArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Free-text search over collections
    CollectionSearch {
        /// Search terms
        #[arg(long)]
        q: Option<String>,

        /// Bounding box `minx,miny,maxx,maxy`
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        bbox: Option<Vec<f64>>,

        /// Datetime or interval
        #[arg(long)]
        datetime: Option<String>,

        /// CQL2 text filter
        #[arg(long)]
        filter: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Count the items matching a search without listing them
    Count {
        #[command(flatten)]
        search: SearchArgs,
    },

    /// List the processes deployed to the user's ADES
    Processes {
        #[command(flatten)]
        page: PageArgs,
    },

    /// List the user's jobs
    Jobs {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one job
    Job {
        /// Job id
        job_id: String,

        /// Also fetch the job results
        #[arg(long)]
        results: bool,
    },
}

/// Item search criteria
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Collection ids
    #[arg(long, value_delimiter = ',')]
    pub collections: Vec<String>,

    /// Item ids
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Bounding box `minx,miny,maxx,maxy`
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub bbox: Option<Vec<f64>>,

    /// Datetime or interval
    #[arg(long)]
    pub datetime: Option<String>,

    /// Property query, e.g. `eo:cloud_cover<=10` (repeatable)
    #[arg(long = "query")]
    pub query: Vec<String>,

    /// Filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// Filter language (cql-json, cql2-json, cql2-text)
    #[arg(long, default_value = "cql2-text")]
    pub filter_lang: String,

    /// Search only below this catalog path
    #[arg(long)]
    pub catalog: Option<String>,
}

/// Paging options shared by list commands
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PageArgs {
    /// Maximum number of records to print
    #[arg(long)]
    pub max_records: Option<usize>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per line
    Json,
    /// Indented JSON
    Pretty,
}
