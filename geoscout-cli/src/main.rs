//! geoscout-cli — command-line frontend for the GeoScout discovery server.
//!
//! Talks to the HTTP API of a running `geoscout-server`.
//!
//! # Subcommands
//! - `search <query> [--lat --lng] [--image PATH] [--json]` — grounded place discovery
//! - `context <place-name>`                                 — historical context
//! - `itinerary`                                            — one-day plan over saved places
//! - `favorites`                                            — list saved places
//! - `recent`                                               — list recent search queries
//! - `status`                                               — show server health

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8765";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "geoscout-cli",
    version,
    about = "GeoScout — AI-grounded location discovery from the terminal"
)]
struct Cli {
    /// GeoScout HTTP server URL (overrides GEOSCOUT_HTTP_URL env var)
    #[arg(long, env = "GEOSCOUT_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for places with AI grounding
    Search {
        /// Query text ("rooftop bars with a view")
        query: String,

        /// Latitude to bias results toward
        #[arg(long)]
        lat: Option<f64>,

        /// Longitude to bias results toward
        #[arg(long)]
        lng: Option<f64>,

        /// Image file for visual search (JPEG or PNG)
        #[arg(long)]
        image: Option<PathBuf>,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Fetch historical context for a place
    Context {
        /// Place name as it appeared in a search result
        place_name: String,
    },

    /// Generate a one-day itinerary from saved places
    Itinerary,

    /// List saved places
    Favorites,

    /// List recent search queries
    Recent,

    /// Show GeoScout server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaceRow {
    pub name: String,
    pub description: String,
    pub address: Option<String>,
    pub vibe: String,
    #[serde(rename = "crowdLevel")]
    pub crowd_level: String,
    #[serde(rename = "priceRange")]
    pub price_range: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub result: ResultData,
    pub took_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ResultData {
    pub places: Vec<PlaceRow>,
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn http_client(timeout_secs: u64) -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}

fn post_json(
    server: &str,
    endpoint: &str,
    body: &serde_json::Value,
    timeout_secs: u64,
) -> anyhow::Result<serde_json::Value> {
    let client = http_client(timeout_secs)?;
    let url = format!("{}{}", server, endpoint);

    let resp = match client.post(&url).json(body).send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("geoscout-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    let status = resp.status();
    let value: serde_json::Value = resp.json().unwrap_or_default();

    if !status.is_success() {
        let message = value["error"].as_str().unwrap_or("unknown error");
        eprintln!("geoscout-cli: server returned {}: {}", status, message);
        std::process::exit(1);
    }

    Ok(value)
}

fn get_json(server: &str, endpoint: &str) -> anyhow::Result<serde_json::Value> {
    let client = http_client(10)?;
    let url = format!("{}{}", server, endpoint);

    match client.get(&url).send() {
        Ok(r) if r.status().is_success() => Ok(r.json().unwrap_or_default()),
        Ok(r) => {
            eprintln!("geoscout-cli: server returned HTTP {}", r.status());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("geoscout-cli: cannot reach {}: {}", url, e);
            std::process::exit(1);
        }
    }
}

// ============================================================================
// Subcommand implementations
// ============================================================================

fn do_search(
    server: &str,
    query: &str,
    lat: Option<f64>,
    lng: Option<f64>,
    image: Option<PathBuf>,
    json_output: bool,
) -> anyhow::Result<()> {
    let mut body = serde_json::json!({ "query": query });

    if let (Some(lat), Some(lng)) = (lat, lng) {
        body["latitude"] = serde_json::json!(lat);
        body["longitude"] = serde_json::json!(lng);
    }

    if let Some(path) = image {
        let bytes = std::fs::read(&path)?;
        let mime = match path.extension().and_then(|e| e.to_str()) {
            Some("png") => "image/png",
            _ => "image/jpeg",
        };
        body["image_base64"] = serde_json::json!(BASE64.encode(bytes));
        body["image_mime_type"] = serde_json::json!(mime);
    }

    // Grounded calls can take a while; generous timeout.
    let value = post_json(server, "/search", &body, 90)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let data: SearchData = serde_json::from_value(value)?;
    if data.result.places.is_empty() {
        eprintln!("No places found for: {}", query);
        return Ok(());
    }

    for (i, p) in data.result.places.iter().enumerate() {
        println!("{}. {}  [{} | {} | {}]", i + 1, p.name, p.vibe, p.crowd_level, p.price_range);
        if let Some(address) = &p.address {
            println!("   {}", address);
        }
        println!("   {}", p.description);
        if let Some(url) = &p.url {
            println!("   {}", url);
        }
        println!();
    }
    if let Some(ms) = data.took_ms {
        println!("({} places in {} ms)", data.result.places.len(), ms);
    }

    Ok(())
}

fn do_context(server: &str, place_name: &str) -> anyhow::Result<()> {
    let body = serde_json::json!({ "place_name": place_name });
    let value = post_json(server, "/context", &body, 60)?;

    println!("{}", value["historical_context"].as_str().unwrap_or("?"));
    Ok(())
}

fn do_itinerary(server: &str) -> anyhow::Result<()> {
    let value = post_json(server, "/itinerary", &serde_json::json!({}), 60)?;

    let steps = value["steps"].as_array().cloned().unwrap_or_default();
    if steps.is_empty() {
        eprintln!("No itinerary generated.");
        return Ok(());
    }

    for step in steps {
        println!(
            "{}  {} — {}",
            step["time"].as_str().unwrap_or("?"),
            step["placeName"].as_str().unwrap_or("?"),
            step["activity"].as_str().unwrap_or("?")
        );
    }
    Ok(())
}

fn do_favorites(server: &str) -> anyhow::Result<()> {
    let value = get_json(server, "/favorites")?;

    let favorites = value["favorites"].as_array().cloned().unwrap_or_default();
    if favorites.is_empty() {
        println!("No saved places.");
        return Ok(());
    }

    for p in favorites {
        println!(
            "{}  [{}]",
            p["name"].as_str().unwrap_or("?"),
            p["vibe"].as_str().unwrap_or("?")
        );
    }
    Ok(())
}

fn do_recent(server: &str) -> anyhow::Result<()> {
    let value = get_json(server, "/recent")?;

    let recent = value["recent_searches"].as_array().cloned().unwrap_or_default();
    if recent.is_empty() {
        println!("No recent searches.");
        return Ok(());
    }

    for q in recent {
        println!("{}", q.as_str().unwrap_or("?"));
    }
    Ok(())
}

fn do_status(server: &str) -> anyhow::Result<()> {
    let body = get_json(server, "/health")?;

    println!("GeoScout server: {}", body["status"].as_str().unwrap_or("unknown"));
    println!("Version:         {}", body["version"].as_str().unwrap_or("?"));
    println!("Search model:    {}", body["search_model"].as_str().unwrap_or("?"));
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Search {
            query,
            lat,
            lng,
            image,
            json,
        } => do_search(&server, &query, lat, lng, image, json),
        Commands::Context { place_name } => do_context(&server, &place_name),
        Commands::Itinerary => do_itinerary(&server),
        Commands::Favorites => do_favorites(&server),
        Commands::Recent => do_recent(&server),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("geoscout-cli: {}", e);
        std::process::exit(1);
    }
}
