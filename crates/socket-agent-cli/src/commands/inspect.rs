//! Inspect command - Fetch and summarize a live descriptor
//!
//! Usage:
//! ```bash
//! socket-agent inspect http://localhost:8000
//! socket-agent inspect https://api.example.com --raw
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use socket_agent_core::{ServiceDescriptor, SizeLimits, SizeStatus, WELL_KNOWN_PATH};
use std::time::Duration;

use super::check::SizeReport;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Base URL of the service
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// Print the descriptor JSON instead of a summary
    #[arg(long)]
    raw: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

/// Descriptor URL for a service base URL
pub fn descriptor_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), WELL_KNOWN_PATH)
}

/// Fetch and parse a service's descriptor
pub async fn fetch_descriptor(base_url: &str, timeout: Duration) -> Result<ServiceDescriptor> {
    let url = descriptor_url(base_url);
    tracing::debug!(url = %url, "Fetching descriptor");

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?
        .error_for_status()
        .with_context(|| format!("Descriptor request to {} failed", url))?;

    response
        .json::<ServiceDescriptor>()
        .await
        .context("Failed to parse descriptor JSON")
}

/// Run the inspect command
pub async fn run(args: InspectArgs) -> Result<()> {
    let descriptor = fetch_descriptor(&args.base_url, Duration::from_secs(args.timeout)).await?;

    if args.raw {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        return Ok(());
    }

    let report = SizeReport::of(&descriptor, SizeLimits::default())?;

    println!("{}", descriptor.name.bold().cyan());
    println!("{}", "═".repeat(40).cyan());
    println!("{}", descriptor.description);
    println!();
    println!("  {} {}", "Base URL:".dimmed(), descriptor.base_url);
    println!("  {} {}", "Spec:".dimmed(), descriptor.spec_version);
    println!("  {} {}", "Size:".dimmed(), report.summary());
    println!();

    println!("{table}", table = endpoint_table(&descriptor));
    println!();

    println!("{}", "Authentication:".bold());
    println!("  {} {}", "Type:".dimmed(), descriptor.auth.auth_type.as_str());
    if let Some(url) = &descriptor.auth.identity_service_url {
        println!("  {} {}", "Identity service:".dimmed(), url);
    }
    if let Some(audience) = &descriptor.auth.audience {
        println!("  {} {}", "Audience:".dimmed(), audience);
    }
    if let Some(validation) = &descriptor.auth.token_validation {
        println!(
            "  {} {} (cached {}s)",
            "Validation:".dimmed(),
            validation.validate_endpoint,
            validation.cache_ttl
        );
    }

    if !descriptor.examples.is_empty() {
        println!();
        println!("{}", "Examples:".bold());
        for example in &descriptor.examples {
            println!("  {} {}", "•".cyan(), example.green());
        }
    }

    if report.status == SizeStatus::OverHard {
        println!();
        crate::print_warning("Descriptor exceeds the 8KB limit");
    }

    Ok(())
}

fn endpoint_table(descriptor: &ServiceDescriptor) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Method").fg(Color::Cyan),
            Cell::new("Path").fg(Color::Cyan),
            Cell::new("Summary").fg(Color::Cyan),
            Cell::new("Auth").fg(Color::Cyan),
        ]);

    for endpoint in &descriptor.endpoints {
        let auth = match (&endpoint.scopes, endpoint.auth_required) {
            (Some(scopes), true) => scopes.join(", "),
            (None, true) => "required".to_string(),
            _ => "-".to_string(),
        };

        table.add_row(vec![
            Cell::new(&endpoint.method).fg(Color::Green),
            Cell::new(&endpoint.path),
            Cell::new(&endpoint.summary),
            Cell::new(auth).fg(Color::Yellow),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_descriptor_url() {
        assert_eq!(
            descriptor_url("http://localhost:8000/"),
            "http://localhost:8000/.well-known/socket-agent"
        );
    }

    #[tokio::test]
    async fn test_fetch_descriptor() {
        let server = MockServer::start().await;
        let mut descriptor =
            ServiceDescriptor::new("Todo API", "Simple todo list", server.uri());
        descriptor.examples.push("curl /todos".to_string());

        Mock::given(method("GET"))
            .and(path("/.well-known/socket-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&descriptor))
            .expect(1)
            .mount(&server)
            .await;

        let fetched = fetch_descriptor(&server.uri(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(fetched, descriptor);
        assert!(endpoint_table(&fetched).to_string().contains("Method"));
    }

    #[tokio::test]
    async fn test_fetch_descriptor_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/.well-known/socket-agent"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = fetch_descriptor(&server.uri(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed"));
    }
}
