//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::{load_config, MediatorConfig, PagingConfig};
use crate::error::{Error, Result};
use crate::http::HttpPageSource;
use crate::mediator::{PagedFetch, PagingMediator};
use crate::types::{JsonValue, StringMap};
use std::io::Write;
use tracing::{debug, info, warn};

/// Options for a simulated scroll
#[derive(Debug, Clone, Default)]
pub struct ScrollOptions {
    /// Items before the end at which the next page is requested
    pub load_offset: usize,
    /// Stop after rendering this many items
    pub max_items: Option<usize>,
    /// Extra query parameters for every page
    pub params: StringMap,
}

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
        match &self.cli.command {
            Commands::Validate => self.validate(),
            Commands::Scroll {
                viewport,
                max_items,
                page_size,
                load_offset,
                query,
            } => {
                let mut config = self.load_config()?;
                if let Some(page_size) = page_size {
                    config.paging.page_size = *page_size;
                }
                if let Some(load_offset) = load_offset {
                    config.paging.load_offset = *load_offset;
                }

                if let Some(viewport) = viewport {
                    check_viewport(&config.paging, *viewport);
                }

                let options = ScrollOptions {
                    load_offset: config.paging.load_offset,
                    max_items: *max_items,
                    params: query.iter().cloned().collect(),
                };
                self.scroll(&config, &options).await
            }
        }
    }

    fn load_config(&self) -> Result<MediatorConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("No config file specified. Use --config <file>"))?;
        load_config(path)
    }

    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        println!("{}", serde_yaml::to_string(&config)?);
        info!("Config is valid");
        Ok(())
    }

    async fn scroll(&self, config: &MediatorConfig, options: &ScrollOptions) -> Result<()> {
        let source_config = config
            .source
            .clone()
            .ok_or_else(|| Error::config("Config has no 'source' section to scroll"))?;
        let source = HttpPageSource::new(source_config)?;
        info!("Scrolling {}", source.endpoint());

        let mediator = PagingMediator::from_config(&config.paging, source)?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let rendered = scroll(&mediator, options, &mut out).await?;

        info!(
            "Rendered {} items over {} pages",
            rendered,
            mediator.current_page() - 1
        );
        Ok(())
    }
}

/// Warn when a page cannot fill the visible rows
fn check_viewport(paging: &PagingConfig, viewport: usize) {
    if (paging.page_size as usize) < viewport {
        warn!(
            "Page size {} is smaller than the viewport ({} rows); the trigger row may never be rendered",
            paging.page_size, viewport
        );
    }
}

/// Render items one at a time, paging in more when the mediator says so
///
/// Each rendered item is written to `out` as one JSON line. Returns the
/// number of items rendered.
pub async fn scroll<F, W>(
    mediator: &PagingMediator<StringMap, JsonValue, F>,
    options: &ScrollOptions,
    out: &mut W,
) -> Result<usize>
where
    F: PagedFetch<StringMap, JsonValue>,
    W: Write,
{
    let mut rendered: Vec<JsonValue> = Vec::new();
    if let Some(items) = mediator.get_results(options.params.clone()).await? {
        rendered.extend(items);
    }

    let limit = options.max_items.unwrap_or(usize::MAX);
    let mut index = 0;
    while index < rendered.len() && index < limit {
        writeln!(out, "{}", serde_json::to_string(&rendered[index])?)?;

        if mediator.should_load_more_with_offset(index + 1, rendered.len(), options.load_offset) {
            debug!(
                "Row {} of {} reached, loading page {}",
                index + 1,
                rendered.len(),
                mediator.current_page()
            );
            if let Some(items) = mediator.get_results(options.params.clone()).await? {
                rendered.extend(items);
            }
        }

        index += 1;
    }

    Ok(index)
}
