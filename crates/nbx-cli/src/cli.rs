//! Argument parsing and command dispatch for the `nbx` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nbx_api_models::{Device, DeviceRole, Location, Manufacturer, Rack, Region, Site, SiteGroup};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::client::{AppContext, CliDependencies, CliResult};
use crate::commands;
use crate::config;
use crate::endpoints;
use crate::output;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Parses CLI arguments, executes the requested command, and handles
/// user-facing telemetry emission. Returns the process exit code.
pub async fn run() -> i32 {
    init_tracing();

    let cli = Cli::parse();
    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let deps = match CliDependencies::from_env(&cli, &trace_id) {
        Ok(deps) => deps,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };
    let telemetry = deps.telemetry.clone();

    let result = dispatch(cli, &deps).await;

    let (exit_code, message, outcome) = match result {
        Ok(()) => (0, None, "success"),
        Err(err) => {
            let exit_code = err.exit_code();
            let message = err.display_message();
            eprintln!("error: {message}");
            (exit_code, Some(message), "error")
        }
    };

    if let Some(emitter) = &telemetry {
        emitter
            .emit(
                &trace_id,
                &command_name,
                outcome,
                exit_code,
                message.as_deref(),
            )
            .await;
    }

    exit_code
}

async fn dispatch(cli: Cli, deps: &CliDependencies) -> CliResult<()> {
    let environment = config::resolve_environment(cli.config.as_deref(), &cli.env, cli.token)?;
    tracing::debug!(
        environment = %environment.name,
        url = %environment.base_url,
        "resolved environment"
    );

    let ctx = AppContext {
        client: deps.client.clone(),
        base_url: environment.base_url,
        token: environment.token,
    };
    let format = cli.output;

    match cli.command {
        Command::Region(verb) => {
            commands::dispatch::<Region>(&ctx, &endpoints::REGIONS, verb, format, output::region_block)
                .await
        }
        Command::SiteGroup(verb) => {
            commands::dispatch::<SiteGroup>(
                &ctx,
                &endpoints::SITE_GROUPS,
                verb,
                format,
                output::site_group_block,
            )
            .await
        }
        Command::Site(verb) => {
            commands::dispatch::<Site>(&ctx, &endpoints::SITES, verb, format, output::site_block)
                .await
        }
        Command::Location(verb) => {
            commands::dispatch::<Location>(
                &ctx,
                &endpoints::LOCATIONS,
                verb,
                format,
                output::location_block,
            )
            .await
        }
        Command::Rack(verb) => {
            commands::dispatch::<Rack>(&ctx, &endpoints::RACKS, verb, format, output::rack_block)
                .await
        }
        Command::Manufacturer(verb) => {
            commands::dispatch::<Manufacturer>(
                &ctx,
                &endpoints::MANUFACTURERS,
                verb,
                format,
                output::manufacturer_block,
            )
            .await
        }
        Command::DeviceRole(verb) => {
            commands::dispatch::<DeviceRole>(
                &ctx,
                &endpoints::DEVICE_ROLES,
                verb,
                format,
                output::device_role_block,
            )
            .await
        }
        Command::Device(verb) => {
            commands::dispatch::<Device>(
                &ctx,
                &endpoints::DEVICES,
                verb,
                format,
                output::device_block,
            )
            .await
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(name = "nbx", about = "Command-line client for the NetBox DCIM REST API")]
pub(crate) struct Cli {
    /// Named environment to target, from the config file.
    #[arg(long, env = "NBX_ENV")]
    pub(crate) env: String,
    /// Path to the environments config file.
    #[arg(long, global = true, env = "NBX_CONFIG")]
    pub(crate) config: Option<PathBuf>,
    /// API token override for the selected environment.
    #[arg(long, global = true, env = "NBX_TOKEN")]
    pub(crate) token: Option<String>,
    /// HTTP timeout in seconds.
    #[arg(
        long,
        global = true,
        env = "NBX_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    /// Output format for commands that render structured data.
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Human
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// DCIM regions.
    #[command(subcommand)]
    Region(ResourceVerb),
    /// DCIM site groups.
    #[command(subcommand)]
    SiteGroup(ResourceVerb),
    /// DCIM sites.
    #[command(subcommand)]
    Site(ResourceVerb),
    /// DCIM locations.
    #[command(subcommand)]
    Location(ResourceVerb),
    /// DCIM racks.
    #[command(subcommand)]
    Rack(ResourceVerb),
    /// DCIM manufacturers.
    #[command(subcommand)]
    Manufacturer(ResourceVerb),
    /// DCIM device roles.
    #[command(subcommand)]
    DeviceRole(ResourceVerb),
    /// DCIM devices.
    #[command(subcommand)]
    Device(ResourceVerb),
}

/// Verbs shared by every resource subcommand.
#[derive(Subcommand)]
pub(crate) enum ResourceVerb {
    /// List objects.
    Ls(ListArgs),
    /// Fetch one object by ID.
    Show(ShowArgs),
    /// Create an object from a JSON payload.
    Create(CreateArgs),
    /// Patch one object by ID with a JSON payload.
    Update(UpdateArgs),
    /// Patch many objects with a JSON array carrying their IDs.
    BulkUpdate(DataArgs),
    /// Delete one object by ID.
    Delete(DeleteArgs),
    /// Delete many objects with a JSON array of `{"id": N}` entries.
    BulkDelete(DataArgs),
}

#[derive(Args, Default)]
pub(crate) struct ListArgs {
    /// Maximum number of results per page.
    #[arg(long)]
    pub(crate) limit: Option<u32>,
    /// Skip this many results.
    #[arg(long)]
    pub(crate) offset: Option<u32>,
    /// Free-text search.
    #[arg(long)]
    pub(crate) q: Option<String>,
    /// Filter by exact name.
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Filter by slug.
    #[arg(long)]
    pub(crate) slug: Option<String>,
    /// Filter by parent slug or ID, for hierarchical resources.
    #[arg(long)]
    pub(crate) parent: Option<String>,
    /// Filter by region slug or ID.
    #[arg(long)]
    pub(crate) region: Option<String>,
    /// Filter by site slug or ID.
    #[arg(long)]
    pub(crate) site: Option<String>,
    /// Filter by role slug or ID.
    #[arg(long)]
    pub(crate) role: Option<String>,
    /// Extra query filter as key=value; repeatable.
    #[arg(long = "filter", value_parser = parse_filter)]
    pub(crate) filters: Vec<Filter>,
}

#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Numeric object ID.
    #[arg(long)]
    pub(crate) id: u64,
}

#[derive(Args)]
pub(crate) struct CreateArgs {
    /// JSON payload: inline, @path, or - for stdin.
    #[arg(long)]
    pub(crate) data: String,
}

#[derive(Args)]
pub(crate) struct UpdateArgs {
    /// Numeric object ID.
    #[arg(long)]
    pub(crate) id: u64,
    /// JSON payload: inline, @path, or - for stdin.
    #[arg(long)]
    pub(crate) data: String,
}

#[derive(Args)]
pub(crate) struct DataArgs {
    /// JSON array payload: inline, @path, or - for stdin.
    #[arg(long)]
    pub(crate) data: String,
}

#[derive(Args)]
pub(crate) struct DeleteArgs {
    /// Numeric object ID.
    #[arg(long)]
    pub(crate) id: u64,
}

/// One `key=value` query filter passed through to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Filter {
    pub(crate) key: String,
    pub(crate) value: String,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Labeled, color-coded blocks.
    #[default]
    Human,
    /// Pretty-printed JSON.
    Json,
}

fn parse_filter(input: &str) -> Result<Filter, String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| "expected format key=value".to_string())?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return Err("filter key and value must be non-empty".to_string());
    }
    Ok(Filter {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn command_label(command: &Command) -> String {
    let (resource, verb) = match command {
        Command::Region(verb) => ("region", verb),
        Command::SiteGroup(verb) => ("site_group", verb),
        Command::Site(verb) => ("site", verb),
        Command::Location(verb) => ("location", verb),
        Command::Rack(verb) => ("rack", verb),
        Command::Manufacturer(verb) => ("manufacturer", verb),
        Command::DeviceRole(verb) => ("device_role", verb),
        Command::Device(verb) => ("device", verb),
    };
    format!("{resource}_{}", verb_label(verb))
}

const fn verb_label(verb: &ResourceVerb) -> &'static str {
    match verb {
        ResourceVerb::Ls(_) => "ls",
        ResourceVerb::Show(_) => "show",
        ResourceVerb::Create(_) => "create",
        ResourceVerb::Update(_) => "update",
        ResourceVerb::BulkUpdate(_) => "bulk_update",
        ResourceVerb::Delete(_) => "delete",
        ResourceVerb::BulkDelete(_) => "bulk_delete",
    }
}
