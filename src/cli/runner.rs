//! CLI runner - executes commands

use crate::catalog::{parse_query, CollectionSearchParams, FilterLang, Item, SearchParams};
use crate::cli::commands::{Cli, Commands, OutputFormat, PageArgs, SearchArgs};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{Error, Result, ResultExt};
use crate::pagination::PagedList;
use crate::record::Record;
use crate::types::{Environment, JsonValue};
use futures::TryStreamExt;
use serde_json::json;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.client_config()?;
        debug!(config = ?config, "resolved client configuration");
        let client = Client::new(config)?;

        match &self.cli.command {
            Commands::Ping => {
                let message = client.catalog_service().await?.ping().await?;
                self.output(&json!({ "message": message }))
            }
            Commands::Conformance { check } => {
                let service = client.catalog_service().await?;
                match check {
                    Some(uri) => {
                        service.check_conforms_to(uri).await?;
                        self.output(&json!({ "conformsTo": uri, "conforms": true }))
                    }
                    None => {
                        let uris = service.get_conformance().await?;
                        self.output(&json!({ "conformsTo": uris }))
                    }
                }
            }
            Commands::Catalogs { catalog, page } => {
                let service = client.catalog_service().await?;
                let list = match catalog {
                    Some(path) => service.get_catalog(path).await?.get_catalogs()?,
                    None => service.get_catalogs()?,
                };
                self.output_list(&list, *page, |c| c.raw()).await
            }
            Commands::Collections { catalog, page } => {
                let catalog = client.catalog_service().await?.get_catalog(catalog).await?;
                self.output_list(&catalog.get_collections()?, *page, |c| c.raw())
                    .await
            }
            Commands::Items {
                catalog,
                collection,
                page,
            } => {
                let collection = client
                    .catalog_service()
                    .await?
                    .get_catalog(catalog)
                    .await?
                    .get_collection(collection)
                    .await?;
                self.output_list(&collection.get_items()?, *page, Item::raw)
                    .await
            }
            Commands::Search { search, page } => {
                let list = search_list(&client, search).await?;
                self.output_list(&list, *page, Item::raw).await
            }
            Commands::CollectionSearch {
                q,
                bbox,
                datetime,
                filter,
                page,
            } => {
                let mut params = CollectionSearchParams::new();
                if let Some(q) = q {
                    params = params.q(q);
                }
                if let Some(bbox) = bbox {
                    params = params.bbox(bbox.clone());
                }
                if let Some(datetime) = datetime {
                    params = params.datetime(datetime);
                }
                if let Some(filter) = filter {
                    params = params.filter(filter);
                }
                let list = client
                    .catalog_service()
                    .await?
                    .collection_search(&params)?;
                self.output_list(&list, *page, |c| c.raw()).await
            }
            Commands::Count { search } => {
                let list = search_list(&client, search).await?;
                let count = list.total_count().await?;
                self.output(&json!({ "numberMatched": count }))
            }
            Commands::Processes { page } => {
                let list = client.ades().await?.get_processes()?;
                self.output_list(&list, *page, |p| p.raw()).await
            }
            Commands::Jobs { page } => {
                let list = client.ades().await?.get_jobs()?;
                self.output_list(&list, *page, |j| j.raw()).await
            }
            Commands::Job { job_id, results } => {
                let job = client.ades().await?.get_job(job_id).await?;
                self.output(job.raw())?;
                if *results {
                    self.output(&job.results().await?)?;
                }
                Ok(())
            }
        }
    }

    /// Config file (or defaults), then `EODH_*` variables, then flags
    pub fn client_config(&self) -> Result<ClientConfig> {
        let config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ClientConfig::default(),
        };
        self.apply_flags(config.with_env()?)
    }

    fn apply_flags(&self, mut config: ClientConfig) -> Result<ClientConfig> {
        if let Some(name) = &self.cli.environment {
            config.environment = Environment::parse(name)
                .ok_or_else(|| Error::config(format!("Unknown environment '{name}'")))?;
        }
        if let Some(url) = &self.cli.base_url {
            config.base_url = Some(url.clone());
        }
        if let Some(username) = &self.cli.username {
            config.username = Some(username.clone());
        }
        if let Some(token) = &self.cli.token {
            config.token = Some(token.clone());
        }
        config.validate()?;
        Ok(config)
    }

    /// Print every record of a paged list, up to `max_records`
    async fn output_list<T: Record>(
        &self,
        list: &PagedList<T>,
        page: PageArgs,
        raw: impl Fn(&T) -> &JsonValue,
    ) -> Result<()> {
        let view = list.slice(0, page.max_records, 1)?;
        let stream = view.stream();
        futures::pin_mut!(stream);

        let mut printed = 0usize;
        while let Some(record) = stream.try_next().await? {
            self.output(raw(&record))?;
            printed += 1;
        }

        if self.cli.verbose {
            eprintln!("{printed} records");
        }
        Ok(())
    }

    /// Output one JSON document
    fn output(&self, value: &JsonValue) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{line}");
        Ok(())
    }
}

/// Item search for the CLI arguments, at the root or below a catalog
async fn search_list(client: &Client, args: &SearchArgs) -> Result<PagedList<Item>> {
    let params = search_params(args, client.config().pagination_limit)?;
    let service = client.catalog_service().await?;
    match &args.catalog {
        Some(path) => service.get_catalog(path).await?.search(&params),
        None => service.search(&params),
    }
}

/// Translate search arguments into validated parameters
pub fn search_params(args: &SearchArgs, limit: u32) -> Result<SearchParams> {
    let mut params = SearchParams::new().limit(limit);
    if !args.collections.is_empty() {
        params = params.collections(args.collections.iter().cloned());
    }
    if !args.ids.is_empty() {
        params = params.ids(args.ids.iter().cloned());
    }
    if let Some(bbox) = &args.bbox {
        params = params.bbox(bbox.clone());
    }
    if let Some(datetime) = &args.datetime {
        params = params.datetime(datetime);
    }
    if !args.query.is_empty() {
        params = params.query(parse_query(&args.query)?);
    }
    if let Some(filter) = &args.filter {
        let lang = FilterLang::parse(&args.filter_lang)?;
        let filter = match lang {
            FilterLang::Cql2Text => JsonValue::String(filter.clone()),
            FilterLang::CqlJson | FilterLang::Cql2Json => serde_json::from_str(filter)?,
        };
        params = params.filter(filter, lang);
    }
    params.validate()?;
    Ok(params)
}
