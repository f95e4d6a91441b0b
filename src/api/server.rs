use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::api::dto::{ErrorDto, ProgramDto};
use crate::domain::error::ExtractError;
use crate::domain::options::ExtractOptions;
use crate::infrastructure::JsonGraphLoader;
use crate::ports::TypeGraphSource;

#[derive(Debug, Deserialize)]
struct CommandReq {
    command: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ExtractParams {
    path: PathBuf,
    #[serde(default)]
    options: Option<ExtractOptions>,
}

/// Serves line-delimited JSON commands on `127.0.0.1:<port>`, one thread
/// per connection. `defaults` apply to EXTRACT requests without options.
pub fn start_server(port: u16, defaults: ExtractOptions) -> Result<()> {
    let address = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("Failed to bind to {}", address))?;

    info!(%address, "extraction daemon listening");
    let defaults = Arc::new(defaults);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let defaults = Arc::clone(&defaults);
                thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, &defaults) {
                        error!("connection error: {:#}", e);
                    }
                });
            }
            Err(e) => error!("accept error: {}", e),
        }
    }

    Ok(())
}

fn handle_connection(mut stream: TcpStream, defaults: &ExtractOptions) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match process_command(trimmed, defaults) {
            Ok(data) => json!({
                "status": "success",
                "data": data
            }),
            Err(e) => error_response(&e),
        };

        let response_str = serde_json::to_string(&response)?;
        stream.write_all(response_str.as_bytes())?;
        stream.write_all(b"\n")?;

        if let Ok(req) = serde_json::from_str::<CommandReq>(trimmed) {
            if req.command == "SHUTDOWN" {
                info!("shutdown requested");
                std::process::exit(0);
            }
        }
    }
    Ok(())
}

/// Extraction failures keep their source position on the wire.
fn error_response(e: &anyhow::Error) -> serde_json::Value {
    let mut response = json!({
        "status": "error",
        "message": format!("{:#}", e),
    });
    if let Some(extract) = e.downcast_ref::<ExtractError>() {
        let dto = ErrorDto::from(extract);
        response["message"] = json!(dto.error);
        if let Some(file) = dto.file {
            response["file"] = json!(file);
        }
        if let Some(line) = dto.line {
            response["line"] = json!(line);
        }
        if let Some(column) = dto.column {
            response["column"] = json!(column);
        }
    }
    response
}

fn process_command(json_str: &str, defaults: &ExtractOptions) -> Result<serde_json::Value> {
    let req: CommandReq = serde_json::from_str(json_str)
        .context("Invalid JSON format")?;

    match req.command.as_str() {
        "PING" => Ok(json!("PONG")),
        "EXTRACT" => handle_extract(req.params, defaults),
        "SHUTDOWN" => Ok(json!("Shutting down...")),
        _ => anyhow::bail!("Unknown command: {}", req.command),
    }
}

fn handle_extract(params: Option<serde_json::Value>, defaults: &ExtractOptions) -> Result<serde_json::Value> {
    let params = params.ok_or_else(|| anyhow::anyhow!("Missing params for EXTRACT"))?;
    let params: ExtractParams = serde_json::from_value(params)
        .context("Invalid params for EXTRACT")?;

    if !params.path.exists() {
        anyhow::bail!("Type graph not found: {}", params.path.display());
    }

    info!(path = %params.path.display(), "extracting");
    let graph = JsonGraphLoader.load(&params.path)?;
    let options = params.options.as_ref().unwrap_or(defaults);
    let program = crate::domain::extract(&graph, options)?;

    Ok(serde_json::to_value(ProgramDto::from(program))?)
}
