// src/bin/geocode.rs
// DOCUMENTATION: Operator CLI for the studio geocoding batch
// PURPOSE: Drive /api/admin/geocoding/* from a terminal and print the run report
//
// Usage: geocode <run [limit] | status | stop | pending | clear-cache>
// Env:   API_BASE_URL (default http://127.0.0.1:8080), ADMIN_TOKEN (admin JWT)

use anyhow::{anyhow, bail, Context, Result};
use dotenv::dotenv;
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::process;
use std::time::Duration;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Deserialize, Debug, Default)]
struct Outcome {
    name: String,
    status: String,
    #[serde(default)]
    from_cache: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct Report {
    #[serde(default)]
    processed: u32,
    #[serde(default)]
    updated: u32,
    #[serde(default)]
    cache_hits: u32,
    #[serde(default)]
    api_requests: u32,
    #[serde(default)]
    skipped: u32,
    #[serde(default)]
    failed: u32,
    #[serde(default)]
    rate_limit_retries: u32,
    #[serde(default)]
    stopped: bool,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    outcomes: Vec<Outcome>,
}

#[derive(Deserialize, Debug)]
struct Status {
    running: bool,
    #[serde(default)]
    stop_requested: bool,
    #[serde(default)]
    last_report: Option<Report>,
    #[serde(default)]
    last_error: Option<String>,
}

struct GeocodeOperator {
    base_url: String,
    admin_token: String,
    client: Client,
}

impl GeocodeOperator {
    fn new(base_url: String, admin_token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_token,
            client,
        })
    }

    async fn send(&self, method: Method, path: &str) -> Result<Response> {
        let url = format!("{}/api/admin/geocoding{}", self.base_url, path);
        let response = self
            .client
            .request(method, &url)
            .bearer_auth(&self.admin_token)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(anyhow!("HTTP {} - {}", status, body))
        }
    }

    async fn status(&self) -> Result<Status> {
        self.send(Method::GET, "/status")
            .await?
            .json::<Status>()
            .await
            .context("Failed to parse status JSON")
    }

    async fn run(&self, limit: Option<u32>) -> Result<()> {
        let path = match limit {
            Some(limit) => format!("/run?limit={}", limit),
            None => "/run".to_string(),
        };
        self.send(Method::POST, &path).await?;
        println!("{}🚀 Geocoding batch started{}", BOLD, RESET);

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            let status = self.status().await?;
            if status.running {
                print!(".");
                continue;
            }
            println!();
            if let Some(error) = status.last_error {
                bail!("batch aborted: {}", error);
            }
            print_report(status.last_report.as_ref());
            return Ok(());
        }
    }

    async fn stop(&self) -> Result<()> {
        let body: Value = self.send(Method::POST, "/stop").await?.json().await?;
        if body["stop_requested"].as_bool().unwrap_or(false) {
            println!("{}⏹  Stop requested; the batch ends after the current studio{}", YELLOW, RESET);
        } else {
            println!("No geocoding batch is running");
        }
        Ok(())
    }

    async fn pending(&self) -> Result<()> {
        let body: Value = self.send(Method::GET, "/pending").await?.json().await?;
        println!("{}{} studios without coordinates{}", BOLD, body["count"], RESET);
        if let Some(studios) = body["studios"].as_array() {
            for studio in studios {
                println!("  {} ({})", studio["name"].as_str().unwrap_or("?"), studio["id"]);
            }
        }
        Ok(())
    }

    async fn clear_cache(&self) -> Result<()> {
        let body: Value = self.send(Method::DELETE, "/cache").await?.json().await?;
        println!("{}🧹 Removed {} cached addresses{}", GREEN, body["removed"], RESET);
        Ok(())
    }
}

fn print_report(report: Option<&Report>) {
    let Some(report) = report else {
        println!("No report available");
        return;
    };

    println!("\n{}📋 Geocoding Summary{}", BOLD, RESET);
    println!("──────────────────────────────────────────────");
    for outcome in &report.outcomes {
        let color = match outcome.status.as_str() {
            "UPDATED" => GREEN,
            "SKIPPED" => CYAN,
            _ => RED,
        };
        println!(
            "{}{:<8}{} {:<32} {}{}",
            color,
            outcome.status,
            RESET,
            outcome.name,
            if outcome.from_cache { "(cache) " } else { "" },
            outcome.message.as_deref().unwrap_or("")
        );
    }
    println!("──────────────────────────────────────────────");
    println!("Processed:          {}", report.processed);
    println!("Updated:            {}{}{}", GREEN, report.updated, RESET);
    println!("Cache hits:         {}", report.cache_hits);
    println!("API requests:       {}", report.api_requests);
    println!("Skipped:            {}", report.skipped);
    println!("Failed:             {}{}{}", RED, report.failed, RESET);
    println!("Rate-limit retries: {}", report.rate_limit_retries);
    println!("Duration:           {:.1}s", report.duration_ms as f64 / 1000.0);
    if report.stopped {
        println!("{}Batch was stopped before finishing{}", YELLOW, RESET);
    }
}

fn usage() -> ! {
    eprintln!("Usage: geocode <run [limit] | status | stop | pending | clear-cache>");
    process::exit(2);
}

async fn dispatch(operator: &GeocodeOperator, command: &str, args: &[String]) -> Result<()> {
    match command {
        "run" => {
            let limit = match args.get(1) {
                Some(raw) => Some(raw.parse::<u32>().context("limit must be a positive number")?),
                None => None,
            };
            operator.run(limit).await
        }
        "status" => {
            let status = operator.status().await?;
            println!(
                "running: {}, stop requested: {}",
                status.running, status.stop_requested
            );
            if let Some(error) = status.last_error {
                println!("{}last error: {}{}", RED, error, RESET);
            }
            print_report(status.last_report.as_ref());
            Ok(())
        }
        "stop" => operator.stop().await,
        "pending" => operator.pending().await,
        "clear-cache" => operator.clear_cache().await,
        _ => usage(),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let admin_token = match env::var("ADMIN_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            eprintln!("{}ADMIN_TOKEN must be set in .env{}", RED, RESET);
            process::exit(1);
        }
    };
    let base_url = env::var("API_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else { usage() };

    let result = match GeocodeOperator::new(base_url, admin_token) {
        Ok(operator) => dispatch(&operator, command, &args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{}❌ {:#}{}", RED, e, RESET);
        process::exit(1);
    }
}
