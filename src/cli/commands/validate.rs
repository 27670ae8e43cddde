//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Satchel configuration file.

use crate::config::{load_config, SatchelConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading validates as well
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        for line in summary_lines(&config) {
            println!("{line}");
        }
        println!();
        Ok(0)
    }
}

/// Human-readable overview; never includes secrets
fn summary_lines(config: &SatchelConfig) -> Vec<String> {
    let mut lines = vec![
        "Configuration Summary:".to_string(),
        format!("  Environment: {:?}", config.environment),
        format!("  Log Level: {}", config.application.log_level),
        format!("  Output Directory: {}", config.output.directory),
        format!(
            "  HTTP: timeout {}s, {} retries, tls_verify={}",
            config.http.timeout_seconds, config.http.retry.max_retries, config.http.tls_verify
        ),
    ];

    if let Some(c) = &config.edumate {
        lines.push(format!("  Edumate: {} (client {})", c.base_url, c.client_id));
    }
    if let Some(c) = &config.engage {
        lines.push(format!("  Engage: {} (user {})", c.base_url, c.username));
    }
    if let Some(c) = &config.pcschool {
        lines.push(format!("  PCSchool: {} (user {})", c.base_url, c.username));
    }
    if let Some(c) = &config.sentral {
        lines.push(format!("  Sentral: {} (tenant {})", c.base_url, c.tenant_id));
    }
    if let Some(c) = &config.tass {
        lines.push(format!(
            "  TASS: {} (app {}, company {})",
            c.endpoint, c.app_code, c.company_code
        ));
    }
    if let Some(c) = &config.mssql {
        lines.push(format!("  SQL Server: {}:{}/{}", c.host, c.port, c.database));
    }

    let vendors: Vec<String> = config
        .configured_vendors()
        .iter()
        .map(|k| k.to_string())
        .collect();
    lines.push(format!("  Vendors: {}", vendors.join(", ")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
[engage]
base_url = "https://engage.example"
username = "svc"
password = "hunter2"
"#;

    #[test]
    fn test_summary_hides_secrets() {
        let config = parse_config(CONFIG).unwrap();
        let text = summary_lines(&config).join("\n");
        assert!(text.contains("Engage: https://engage.example (user svc)"));
        assert!(text.contains("Vendors: engage"));
        assert!(!text.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_exit_codes() {
        let mut valid = NamedTempFile::new().unwrap();
        valid.write_all(CONFIG.as_bytes()).unwrap();
        let code = ValidateArgs {}
            .execute(valid.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);

        let mut invalid = NamedTempFile::new().unwrap();
        invalid.write_all(b"[http]\ntimeout_seconds = 5\n").unwrap();
        let code = ValidateArgs {}
            .execute(invalid.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
