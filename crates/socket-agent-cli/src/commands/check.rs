//! Check command - Validate a descriptor file
//!
//! Usage:
//! ```bash
//! socket-agent check descriptor.json
//! ```

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use socket_agent_core::{ServiceDescriptor, SizeLimits, SizeStatus};
use std::path::PathBuf;

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// Descriptor JSON file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

/// Size of a descriptor against the limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReport {
    pub bytes: usize,
    pub status: SizeStatus,
    pub limits: SizeLimits,
}

impl SizeReport {
    pub fn of(descriptor: &ServiceDescriptor, limits: SizeLimits) -> Result<Self> {
        let bytes = descriptor
            .size_bytes()
            .context("Failed to encode descriptor")?;
        Ok(Self {
            bytes,
            status: limits.classify(bytes),
            limits,
        })
    }

    pub fn kb(&self) -> f64 {
        self.bytes as f64 / 1024.0
    }

    /// One-line summary, colored by status
    pub fn summary(&self) -> String {
        let line = format!(
            "{:.2}KB ({} bytes; soft {}KB, hard {}KB)",
            self.kb(),
            self.bytes,
            self.limits.soft / 1024,
            self.limits.hard / 1024
        );
        match self.status {
            SizeStatus::Ok => line.green().to_string(),
            SizeStatus::OverSoft => line.yellow().to_string(),
            SizeStatus::OverHard => line.red().to_string(),
        }
    }
}

/// Parse descriptor JSON
pub fn parse_descriptor(content: &str) -> Result<ServiceDescriptor> {
    serde_json::from_str(content).context("Failed to parse descriptor JSON")
}

/// Run the check command
pub fn run(args: CheckArgs) -> Result<()> {
    println!("{}", "socket-agent Descriptor Check".bold().cyan());
    println!("{}", "═".repeat(40).cyan());
    println!();

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read descriptor file: {}", args.file.display()))?;
    let descriptor = parse_descriptor(&content)?;
    let report = SizeReport::of(&descriptor, SizeLimits::default())?;

    println!("  {} {}", "File:".dimmed(), args.file.display());
    println!("  {} {}", "Service:".dimmed(), descriptor.name);
    println!("  {} {}", "Endpoints:".dimmed(), descriptor.endpoints.len());
    println!("  {} {}", "Auth:".dimmed(), descriptor.auth.auth_type.as_str());
    println!("  {} {}", "Size:".dimmed(), report.summary());
    println!();

    match report.status {
        SizeStatus::Ok => crate::print_success("Descriptor is within limits"),
        SizeStatus::OverSoft => crate::print_warning(
            "Descriptor exceeds the recommended 3KB; consider trimming schemas",
        ),
        SizeStatus::OverHard => {
            crate::print_error("Descriptor exceeds the 8KB limit");
            bail!(
                "descriptor is {} bytes, limit is {} bytes",
                report.bytes,
                report.limits.hard
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use socket_agent_core::EndpointInfo;

    fn descriptor_with(endpoints: usize, summary_len: usize) -> ServiceDescriptor {
        let mut descriptor =
            ServiceDescriptor::new("Todo API", "Simple todo list", "http://localhost:8000");
        for i in 0..endpoints {
            descriptor.endpoints.push(EndpointInfo {
                path: format!("/items/{}", i),
                method: "GET".to_string(),
                summary: "x".repeat(summary_len),
                auth_required: false,
                scopes: None,
            });
        }
        descriptor
    }

    #[test]
    fn test_classifies_small_descriptor() {
        let report = SizeReport::of(&descriptor_with(3, 10), SizeLimits::default()).unwrap();
        assert_eq!(report.status, SizeStatus::Ok);
        assert!(report.bytes < 1024);
    }

    #[test]
    fn test_classifies_warning_and_too_large() {
        let warning = SizeReport::of(&descriptor_with(40, 60), SizeLimits::default()).unwrap();
        assert_eq!(warning.status, SizeStatus::OverSoft);

        let too_large = SizeReport::of(&descriptor_with(100, 100), SizeLimits::default()).unwrap();
        assert_eq!(too_large.status, SizeStatus::OverHard);
    }

    #[test]
    fn test_parse_descriptor_file_contents() {
        let json = r#"{
            "name": "Todo API",
            "description": "Simple todo list",
            "base_url": "http://localhost:8000",
            "endpoints": [{"path": "/todos", "method": "GET", "summary": "List todos"}],
            "specVersion": "2025-01-01"
        }"#;
        let descriptor = parse_descriptor(json).unwrap();
        assert_eq!(descriptor.endpoints.len(), 1);
        assert!(!descriptor.auth.is_bearer());

        assert!(parse_descriptor("{\"name\": 1}").is_err());
    }

    #[test]
    fn test_run_fails_over_hard_limit() {
        let path = std::env::temp_dir().join(format!("socket-agent-check-{}.json", std::process::id()));
        let json = serde_json::to_string(&descriptor_with(100, 100)).unwrap();
        std::fs::write(&path, json).unwrap();

        let result = run(CheckArgs { file: path.clone() });
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }
}
