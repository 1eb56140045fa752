//! CCTV CLI - command-line client for the footage request service

use anyhow::{Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9530";

#[derive(Parser)]
#[command(name = "cctv")]
#[command(about = "CCTV footage request service CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "CCTV_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Staff token for staff commands
    #[arg(long, env = "CCTV_STAFF_TOKEN", hide_env_values = true)]
    staff_token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a footage request
    Submit(SubmitArgs),

    /// Look up a request by tracking ID
    Track {
        /// e.g. REQ-20240501-4242
        tracking_id: String,
    },

    /// Change a request's status (staff)
    Update {
        /// Request ID (not the tracking ID)
        id: String,

        /// pending, verifying, searching, completed or rejected
        status: String,

        #[arg(short, long)]
        note: Option<String>,
    },

    /// Show one request in full (staff)
    Get { id: String },

    /// List requests, newest first (staff)
    List {
        #[arg(short, long)]
        status: Option<String>,

        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Dashboard counters (staff)
    Stats,
}

#[derive(clap::Args)]
struct SubmitArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    national_id: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    event_type: String,
    #[arg(long)]
    event_subtype: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    date: String,
    /// HH:MM
    #[arg(long)]
    time_start: String,
    /// HH:MM
    #[arg(long)]
    time_end: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    location: String,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,

    /// chat_app or in_person
    #[arg(long, default_value = "chat_app")]
    delivery: String,

    #[arg(long)]
    id_card: Option<PathBuf>,
    #[arg(long)]
    report: Option<PathBuf>,
    /// Repeatable
    #[arg(long)]
    scene: Vec<PathBuf>,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct HistoryEntry {
    status: String,
    timestamp: i64,
    note: String,
}

#[derive(Tabled)]
struct HistoryRow {
    status: String,
    timestamp: i64,
    note: String,
}

#[derive(Deserialize)]
struct ListedRequest {
    id: String,
    tracking_id: String,
    status: String,
    applicant: Value,
    incident: Value,
}

#[derive(Tabled)]
struct ListRow {
    id: String,
    tracking_id: String,
    status: String,
    applicant: String,
    event: String,
    location: String,
}

impl From<ListedRequest> for ListRow {
    fn from(r: ListedRequest) -> Self {
        let text = |v: &Value, key: &str| v[key].as_str().unwrap_or_default().to_string();
        Self {
            id: r.id,
            tracking_id: r.tracking_id,
            status: r.status,
            applicant: text(&r.applicant, "name"),
            event: text(&r.incident, "event_type"),
            location: text(&r.incident, "location"),
        }
    }
}

/// `✓ <id> -> <status>` for an update_status result
fn update_summary(id: &str, result: &Value) -> String {
    let status = result["entry"]["status"].as_str().unwrap_or("-");
    format!("✓ {} -> {}", id, status)
}

async fn call_rpc(url: &str, method: &str, params: Value) -> Result<Value> {
    // The server takes one positional object
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params: json!([params]),
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("pdf") => "application/pdf",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

fn file_param(slot: &str, path: &Path) -> Result<Value> {
    let bytes = std::fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("attachment");

    Ok(json!({
        "slot": slot,
        "filename": filename,
        "mime_type": mime_for(path),
        "base64": base64::engine::general_purpose::STANDARD.encode(bytes),
    }))
}

fn submit_params(args: SubmitArgs) -> Result<Value> {
    let mut files = Vec::new();
    if let Some(path) = &args.id_card {
        files.push(file_param("id_card", path)?);
    }
    if let Some(path) = &args.report {
        files.push(file_param("report", path)?);
    }
    for path in &args.scene {
        files.push(file_param("scene", path)?);
    }

    // The server expects HH:MM:SS
    let time = |t: &str| if t.len() == 5 { format!("{}:00", t) } else { t.to_string() };

    Ok(json!({
        "applicant": {
            "name": args.name,
            "national_id": args.national_id,
            "phone": args.phone,
            "email": args.email,
        },
        "incident": {
            "event_type": args.event_type,
            "event_subtype": args.event_subtype,
            "date": args.date,
            "time_start": time(&args.time_start),
            "time_end": time(&args.time_end),
            "description": args.description,
            "location": args.location,
            "lat": args.lat,
            "lng": args.lng,
        },
        "delivery_method": args.delivery,
        "files": files,
    }))
}

fn print_history(history: &Value) -> Result<()> {
    let entries: Vec<HistoryEntry> = serde_json::from_value(history.clone())?;
    let rows: Vec<HistoryRow> = entries
        .into_iter()
        .map(|e| HistoryRow {
            status: e.status,
            timestamp: e.timestamp,
            note: e.note,
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}

fn staff(params: Value, token: &Option<String>) -> Value {
    let mut params = params;
    if let (Some(obj), Some(token)) = (params.as_object_mut(), token) {
        obj.insert("staff_token".to_string(), json!(token));
    }
    params
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let url = cli.rpc_url.as_str();
    let token = &cli.staff_token;

    match cli.command {
        Commands::Submit(args) => {
            let params = submit_params(args)?;
            let result = call_rpc(url, "request.submit.v1", params).await?;

            println!("{}", "✓ Request submitted".green().bold());
            println!(
                "  {} {}",
                "Tracking ID:".bold(),
                result["tracking_id"].as_str().unwrap_or_default().cyan()
            );
        }

        Commands::Track { tracking_id } => {
            let result = call_rpc(
                url,
                "request.track.v1",
                json!({ "tracking_id": tracking_id }),
            )
            .await?;

            println!("{}", format!("Request {}", tracking_id).cyan().bold());
            println!("  {} {}", "Status:".bold(), result["status"].as_str().unwrap_or("-"));
            println!("  {} {}", "Event:".bold(), result["event_type"].as_str().unwrap_or("-"));
            println!("  {} {}", "Location:".bold(), result["location"].as_str().unwrap_or("-"));
            println!();
            print_history(&result["status_history"])?;
        }

        Commands::Update { id, status, note } => {
            let params = staff(json!({ "id": id, "status": status, "note": note }), token);
            let result = call_rpc(url, "request.update_status.v1", params).await?;

            println!("{}", update_summary(&id, &result).green().bold());
            println!("  {} {}", "Note:".bold(), result["entry"]["note"].as_str().unwrap_or("-"));
        }

        Commands::Get { id } => {
            let result = call_rpc(url, "request.get.v1", staff(json!({ "id": id }), token)).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::List { status, limit } => {
            let params = staff(json!({ "status": status, "limit": limit }), token);
            let result = call_rpc(url, "request.list.v1", params).await?;

            let requests: Vec<ListedRequest> = serde_json::from_value(result["requests"].clone())?;
            if requests.is_empty() {
                println!("{}", "No requests".yellow());
            } else {
                let rows: Vec<ListRow> = requests.into_iter().map(ListRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }

        Commands::Stats => {
            let stats = call_rpc(url, "admin.stats.v1", staff(json!({}), token)).await?;

            println!("{}", "Dashboard".cyan().bold());
            println!("  {} {}", "Total:".bold(), stats["total"]);
            for row in stats["by_status"].as_array().into_iter().flatten() {
                println!("  {:<10} {}", row["status"].as_str().unwrap_or("?"), row["count"]);
            }
            println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("id.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("report.pdf")), "application/pdf");
        assert_eq!(mime_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_staff_token_is_added() {
        let params = staff(json!({ "id": "r1" }), &Some("s3cret".to_string()));
        assert_eq!(params["staff_token"], "s3cret");

        let params = staff(json!({ "id": "r1" }), &None);
        assert!(params.get("staff_token").is_none());
    }

    #[test]
    fn test_update_summary() {
        let result = json!({ "entry": { "status": "completed", "note": "done" } });
        assert_eq!(update_summary("r1", &result), "✓ r1 -> completed");
        assert_eq!(update_summary("r1", &json!({})), "✓ r1 -> -");
    }

    #[test]
    fn test_file_param_encodes_content() {
        let path = std::env::temp_dir().join("cctv-cli-test-scene.png");
        std::fs::write(&path, b"hello").unwrap();

        let param = file_param("scene", &path).unwrap();
        assert_eq!(param["slot"], "scene");
        assert_eq!(param["filename"], "cctv-cli-test-scene.png");
        assert_eq!(param["mime_type"], "image/png");
        assert_eq!(param["base64"], "aGVsbG8=");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_cli_parses_submit() {
        let cli = Cli::try_parse_from([
            "cctv",
            "submit",
            "--name",
            "Somchai",
            "--national-id",
            "1100000000001",
            "--phone",
            "0812345678",
            "--event-type",
            "ACCIDENT",
            "--date",
            "2024-05-01",
            "--time-start",
            "09:00",
            "--time-end",
            "09:30",
            "--location",
            "Rawai Beach",
            "--lat",
            "7.78",
            "--lng",
            "98.31",
        ])
        .unwrap();

        let Commands::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        let params = submit_params(args).unwrap();
        assert_eq!(params["incident"]["time_start"], "09:00:00");
        assert_eq!(params["incident"]["lat"], 7.78);
        assert_eq!(params["delivery_method"], "chat_app");
        assert_eq!(params["files"].as_array().unwrap().len(), 0);
    }
}
