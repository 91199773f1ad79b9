use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use geonames_client::{ClientConfig, GeoNamesClient, ParamValue, RequestParams};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(
    name = "geonames-cli",
    version,
    about = "Small async CLI for querying the GeoNames web services"
)]
struct Cli {
    /// Service host. Defaults to api.geonames.org.
    #[arg(long, env = "GEONAMES_HOST")]
    host: Option<String>,

    /// GeoNames username sent with every request.
    #[arg(long, env = "GEONAMES_USERNAME")]
    username: Option<String>,

    /// Timezone label applied when coercing `datetime` fields.
    #[arg(long)]
    timezone: Option<String>,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List registered operations and their allowed parameters.
    Operations {
        /// Filter operations by substring match on the name (case-insensitive).
        #[arg(long)]
        filter: Option<String>,
    },
    /// Call an operation by name.
    Call {
        /// Operation name (for example: search).
        operation: String,

        /// Query parameter in form key=value. Repeat as needed; repeating
        /// the same key builds a multi-valued parameter.
        #[arg(long = "param", value_name = "KEY=VALUE")]
        param: Vec<String>,

        /// Print the unparsed response body instead of post-processed JSON.
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // `operations` is metadata-only; it does not require an HTTP client.
    if let Command::Operations { filter } = &cli.command {
        print_operations(filter.as_deref());
        return Ok(());
    }

    let mut config = ClientConfig::new();
    if let Some(host) = &cli.host {
        config = config.with_host(host.clone());
    }
    if let Some(username) = &cli.username {
        config = config.with_username(username.clone());
    }
    if let Some(timezone) = &cli.timezone {
        config = config.with_timezone(timezone.clone());
    }
    let client = GeoNamesClient::new(config).context("failed to create client")?;

    match &cli.command {
        Command::Operations { .. } => unreachable!("handled above"),
        Command::Call {
            operation,
            param,
            raw,
        } => {
            let params =
                parse_params(param).context("failed to parse --param arguments")?;
            if *raw {
                let body = client
                    .call_text(operation, &params)
                    .await
                    .with_context(|| format!("operation call failed: '{operation}'"))?;
                println!("{body}");
            } else {
                let value = client
                    .call(operation, &params)
                    .await
                    .with_context(|| format!("operation call failed: '{operation}'"))?;
                print_json(&value, cli.compact).context("failed to print JSON output")?;
            }
        }
    }
    Ok(())
}

/// Prints the operation catalogue, one line per operation.
fn print_operations(filter: Option<&str>) {
    let filter = filter.map(str::to_ascii_lowercase);

    let operations: Vec<_> = GeoNamesClient::operations()
        .iter()
        .filter(|operation| {
            filter
                .as_ref()
                .is_none_or(|needle| operation.name.to_ascii_lowercase().contains(needle))
        })
        .collect();

    let name_width = operations
        .iter()
        .map(|operation| operation.name.len())
        .max()
        .unwrap_or(0);

    for operation in operations {
        println!(
            "{:<name_width$}  {}",
            operation.name,
            operation.params.join(",")
        );
    }
}

/// Parses repeated `key=value` arguments into request parameters.
///
/// Repeating a key accumulates its values into a list, which the client
/// serializes as repeated query pairs.
fn parse_params(values: &[String]) -> Result<RequestParams> {
    let mut params = RequestParams::new();
    for item in values {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid --param value '{item}': expected key=value");
        };
        if key.is_empty() {
            bail!("invalid --param value '{item}': empty key");
        }
        match params.get(key).map(ParamValue::query_values) {
            Some(mut items) => {
                items.push(value.to_owned());
                params.insert(key, items);
            }
            None => params.insert(key, value),
        }
    }
    Ok(params)
}

/// Prints a JSON value either compact or pretty-formatted.
fn print_json(value: &Value, compact: bool) -> Result<()> {
    if compact {
        println!(
            "{}",
            serde_json::to_string(value).context("Failed to render JSON")?
        );
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to render JSON")?
        );
    }
    Ok(())
}
