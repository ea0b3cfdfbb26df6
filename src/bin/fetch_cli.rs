//! fetch-cli — 发起单个 REST / JSON-RPC 请求并打印规范化响应的命令行工具
//!
//! Usage:
//!   fetch-cli <get|post|put|patch|delete> <url> [OPTIONS]
//!
//! Exit codes: 0 success, 2 canonical error response, 1 usage or configuration error.

use anyhow::{anyhow, bail, Context};
use fetch_api::protocol::JsonSchemaValidator;
use fetch_api::{
    ApiResponse, ClientConfig, ErrorOutput, FetchClient, HttpMethod, JsonRpcEnvelope, ParseKind,
    RequestDescriptor, RequestOptions, RequestProtocol,
};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, PartialEq)]
struct Invocation {
    method: HttpMethod,
    url: String,
    protocol: RequestProtocol,
    body: Option<Value>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    rpc_id: Option<Value>,
    blob: bool,
    raw_errors: bool,
    schema: Option<PathBuf>,
    config: Option<PathBuf>,
    timeout_ms: Option<u64>,
}

enum Command {
    Run(Box<Invocation>),
    Help,
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(Command::Run(inv)) => inv,
        Ok(Command::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("fetch-cli {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!();
            print_usage();
            return ExitCode::from(1);
        }
    };

    match run(*invocation).await {
        Ok(response) => {
            let rendered = serde_json::to_string_pretty(&response.to_envelope())
                .unwrap_or_else(|_| response.to_envelope().to_string());
            println!("{rendered}");
            if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"fetch-cli — 单次请求命令行工具

USAGE:
    fetch-cli <METHOD> <URL> [OPTIONS]

METHODS:
    get | post | put | patch | delete

OPTIONS:
    --protocol <rest|json-rpc|pure-rest>   Wire protocol (default: rest)
    --body <JSON>                          Request body
    --query <key=value>                    Query parameter (repeatable)
    --header <name:value>                  Request header (repeatable)
    --rpc-id <ID>                          JSON-RPC correlation id (default: random)
    --blob                                 Read a successful body as bytes
    --raw-errors                           Show raw error text instead of error keys
    --schema <FILE>                        JSON Schema for the response payload
    --config <FILE>                        YAML client configuration
    --timeout-ms <N>                       Override the request timeout

ENVIRONMENT:
    FETCH_API_TIMEOUT_MS, FETCH_API_ACCEPTABLE_STATUSES,
    FETCH_API_ABORTABLE, FETCH_API_PROXY_URL, RUST_LOG"#
    );
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    match args.first().map(String::as_str) {
        None => bail!("missing method"),
        Some("help" | "--help" | "-h") => return Ok(Command::Help),
        Some("version" | "--version" | "-V") => return Ok(Command::Version),
        Some(_) => {}
    }

    let method: HttpMethod = args[0].parse().map_err(|e: String| anyhow!(e))?;
    let url = args.get(1).ok_or_else(|| anyhow!("missing url"))?.clone();

    let mut inv = Invocation {
        method,
        url,
        protocol: RequestProtocol::Rest,
        body: None,
        query: Vec::new(),
        headers: Vec::new(),
        rpc_id: None,
        blob: false,
        raw_errors: false,
        schema: None,
        config: None,
        timeout_ms: None,
    };

    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .cloned()
                .ok_or_else(|| anyhow!("{flag} expects a value"))
        };
        match flag.as_str() {
            "--protocol" => inv.protocol = value()?.parse().map_err(|e: String| anyhow!(e))?,
            "--body" => {
                let raw = value()?;
                inv.body = Some(serde_json::from_str(&raw).context("--body is not valid JSON")?);
            }
            "--query" => inv.query.push(split_pair(&value()?, '=')?),
            "--header" => inv.headers.push(split_pair(&value()?, ':')?),
            "--rpc-id" => {
                let raw = value()?;
                inv.rpc_id = Some(match raw.parse::<i64>() {
                    Ok(n) => Value::from(n),
                    Err(_) => Value::String(raw),
                });
            }
            "--blob" => inv.blob = true,
            "--raw-errors" => inv.raw_errors = true,
            "--schema" => inv.schema = Some(PathBuf::from(value()?)),
            "--config" => inv.config = Some(PathBuf::from(value()?)),
            "--timeout-ms" => {
                inv.timeout_ms = Some(value()?.parse().context("--timeout-ms expects a number")?)
            }
            other => bail!("unknown option {other}"),
        }
    }

    Ok(Command::Run(Box::new(inv)))
}

fn split_pair(raw: &str, sep: char) -> anyhow::Result<(String, String)> {
    let (k, v) = raw
        .split_once(sep)
        .ok_or_else(|| anyhow!("expected '{{key}}{sep}{{value}}', got '{raw}'"))?;
    Ok((k.trim().to_string(), v.trim().to_string()))
}

async fn run(inv: Invocation) -> anyhow::Result<ApiResponse> {
    let mut config = match &inv.config {
        Some(path) => ClientConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::from_env(),
    };
    if let Some(ms) = inv.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    let client = FetchClient::builder().config(config).build()?;

    let mut options = RequestOptions::new();
    for (k, v) in inv.headers {
        options = options.header(k, v);
    }
    for (k, v) in inv.query {
        options = options.query(k, v);
    }
    if let Some(body) = inv.body {
        options = options.json(body);
    }
    if inv.blob {
        options = options.parse_kind(ParseKind::Blob);
    }
    if inv.raw_errors {
        options = options.error_output(ErrorOutput::Straight);
    }
    if inv.protocol == RequestProtocol::JsonRpc {
        let envelope = match inv.rpc_id {
            Some(id) => JsonRpcEnvelope::new(id),
            None => JsonRpcEnvelope::generate(),
        };
        options = options.json_rpc(envelope);
    }
    if let Some(path) = &inv.schema {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        options = options.schema(JsonSchemaValidator::from_json_str(&raw)?);
    }

    let descriptor = RequestDescriptor::new(inv.method, inv.protocol, inv.url, options)?;
    Ok(client.execute(&descriptor).await)
}
