//! Command line interface for the webmarks bookmark collection.
//!
//! Connects to the configured row source (Google Sheets or Airtable),
//! fetches the bookmark table, and answers search, facet, and sort
//! queries from the normalized batch.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};

use webmarks_core::{parse_sort_mode, FacetField, QueryState, SortMode};
use webmarks_sources::{
    available_sources, clear_config, default_config_path, parse_provider, resolve_config,
    ConnectionConfig, RefreshOutcome, ResolvedConfig, Session,
};

#[derive(Parser)]
#[command(name = "webmarks", about = "Bookmark collection backed by a shared spreadsheet", version)]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported row sources.
    Sources,
    /// Show or change the stored connection settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Fetch the bookmark table and print batch and facet counts.
    Fetch,
    /// Fetch and list bookmarks, optionally filtered and sorted.
    List {
        /// Case-insensitive substring to match against name, URL, notes, and list values.
        #[arg(long)]
        search: Option<String>,
        /// Keep only bookmarks carrying exactly this type value.
        #[arg(long = "type", value_name = "VALUE")]
        type_: Option<String>,
        /// Keep only bookmarks carrying exactly this tag value.
        #[arg(long, value_name = "VALUE")]
        tag: Option<String>,
        /// Sort order: none, name-asc, name-desc, or latest-first.
        #[arg(long, value_parser = parse_sort_arg, default_value = "none")]
        sort: SortMode,
        /// Print the matching records as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print the distinct type values in the current batch.
    Types,
    /// Print the distinct tag values in the current batch.
    Tags,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active settings and where they came from.
    Show,
    /// Update the stored settings. Omitted flags keep their stored value.
    Set {
        /// Row source: google-sheets or airtable.
        #[arg(long)]
        provider: Option<String>,
        /// API key or personal access token for the source.
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
        /// Spreadsheet id, or Airtable "<base>/<table>".
        #[arg(long, value_name = "ID")]
        locator: Option<String>,
        /// Sheet range or Airtable view. Blank uses the source default.
        #[arg(long, value_name = "NAME")]
        view: Option<String>,
    },
    /// Delete the stored settings.
    Clear,
    /// Print the stored settings path.
    Path,
}

fn parse_sort_arg(raw: &str) -> Result<SortMode, String> {
    parse_sort_mode(raw).ok_or_else(|| {
        format!("unknown sort mode {raw:?} (expected none, name-asc, name-desc, or latest-first)")
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path().ok_or("no config directory available on this platform")?,
    };

    match cli.command {
        Commands::Sources => cmd_sources(),
        Commands::Config { action } => cmd_config(&config_path, action)?,
        Commands::Fetch => cmd_fetch(&config_path).await?,
        Commands::List {
            search,
            type_,
            tag,
            sort,
            json,
        } => {
            let state = QueryState {
                search: search.unwrap_or_default(),
                selected_type: type_,
                selected_tag: tag,
                sort,
            };
            cmd_list(&config_path, state, json).await?;
        }
        Commands::Types => cmd_facet(&config_path, FacetField::Types).await?,
        Commands::Tags => cmd_facet(&config_path, FacetField::Tags).await?,
    }

    Ok(())
}

/// Resolve the connection settings and run one fetch. Returns `None`
/// when nothing is configured, after printing setup guidance.
async fn open_session(config_path: &Path) -> Result<Option<Session>, Box<dyn std::error::Error>> {
    let config = match resolve_config(config_path) {
        ResolvedConfig::Loaded { config, .. } => config,
        ResolvedConfig::Unconfigured => {
            print_unconfigured();
            return Ok(None);
        }
    };

    let session = Session::new(&config);
    match session.refresh().await? {
        RefreshOutcome::Applied { .. } => Ok(Some(session)),
        RefreshOutcome::NotConfigured => {
            print_unconfigured();
            Ok(None)
        }
        // A single refresh has nothing to race against.
        RefreshOutcome::Superseded => Ok(None),
    }
}

fn print_unconfigured() {
    println!("webmarks is not configured.");
    println!("Set WEBMARKS_API_KEY and WEBMARKS_LOCATOR in the environment, or run:");
    println!("  webmarks config set --api-key <KEY> --locator <SPREADSHEET_ID>");
}

fn cmd_sources() {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["ID", "NAME", "API KEY", "DESCRIPTION"]);
    for source in available_sources() {
        table.add_row(vec![
            source.id.to_string(),
            source.name.to_string(),
            if source.requires_api_key { "required" } else { "none" }.to_string(),
            source.description.to_string(),
        ]);
    }
    println!("{table}");
}

fn cmd_config(config_path: &Path, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            match resolve_config(config_path) {
                ResolvedConfig::Loaded { config, source } => {
                    println!("origin:   {}", source.as_str());
                    println!("provider: {}", config.provider);
                    println!("api key:  {}", mask_key(&config.api_key));
                    println!("locator:  {}", config.locator);
                    if config.view.trim().is_empty() {
                        println!("view:     (source default)");
                    } else {
                        println!("view:     {}", config.view);
                    }
                }
                ResolvedConfig::Unconfigured => print_unconfigured(),
            }
            Ok(())
        }
        ConfigAction::Set {
            provider,
            api_key,
            locator,
            view,
        } => {
            let mut config = ConnectionConfig::load(config_path).unwrap_or_default();
            if let Some(raw) = provider {
                config.provider = parse_provider(&raw)
                    .ok_or_else(|| format!("unknown provider {raw:?} (expected google-sheets or airtable)"))?;
            }
            if let Some(key) = api_key {
                config.api_key = key;
            }
            if let Some(locator) = locator {
                config.locator = locator;
            }
            if let Some(view) = view {
                config.view = view;
            }
            config.save(config_path)?;
            println!("Saved {}", config_path.display());
            Ok(())
        }
        ConfigAction::Clear => {
            clear_config(config_path)?;
            println!("Cleared {}", config_path.display());
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

async fn cmd_fetch(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let Some(session) = open_session(config_path).await? else {
        return Ok(());
    };

    let facets = session.facets();
    println!(
        "Fetched {} bookmarks from {}",
        session.record_count(),
        session.source_metadata().name
    );
    println!("types: {}", facets.types.len());
    println!("tags:  {}", facets.tags.len());
    if let Some(at) = session.last_fetched_at() {
        println!("at:    {}", at.to_rfc3339());
    }
    Ok(())
}

async fn cmd_list(
    config_path: &Path,
    state: QueryState,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(session) = open_session(config_path).await? else {
        return Ok(());
    };

    let records = session.view(&state);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No bookmarks matched.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["ID", "NAME", "URL", "TYPES", "TAGS"]);
    for record in &records {
        table.add_row(vec![
            record.id.clone(),
            record.name.clone(),
            record.url.clone(),
            record.types.join(", "),
            record.tags.join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn cmd_facet(
    config_path: &Path,
    field: FacetField,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(session) = open_session(config_path).await? else {
        return Ok(());
    };

    let facets = session.facets();
    let values = match field {
        FacetField::Types => facets.types,
        FacetField::Tags => facets.tags,
    };
    if values.is_empty() {
        println!("No {} in the current batch.", field.as_str());
    }
    for value in values {
        println!("{value}");
    }
    Ok(())
}

/// Mask an API key down to its last four characters.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        "****".to_string()
    } else {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{tail}")
    }
}
