//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "satchel.toml")]
    pub output: String,

    /// Include every vendor section with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Satchel configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} and keep the section for your SIS", self.output);
                println!("  2. Put credentials in a .env file, e.g. SENTRAL_API_KEY=...");
                println!("  3. Validate configuration: satchel validate-config");
                println!("  4. List collections: satchel collections --vendor sentral");
                println!("  5. Run a sync: satchel sync --vendor sentral");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Satchel Configuration File
# School information system sync tool

[application]
log_level = "info"
dry_run = false

[output]
directory = "./satchel-out"

[sentral]
base_url = "https://sentral.school.example"
api_key = "${SENTRAL_API_KEY}"
tenant_id = "school"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Satchel Configuration File
# School information system sync tool
#
# Keep the section for each SIS the school runs and delete the rest.
# ${VAR_NAME} placeholders are read from the environment (or a .env file),
# and any key can be overridden with SATCHEL_<SECTION>_<KEY>.

# development | staging | production
environment = "development"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (fetch and count, don't write records)
dry_run = false

# ============================================================================
# HTTP Settings (all REST vendors)
# ============================================================================
[http]
# Per-request timeout; also the SQL Server connect timeout
timeout_seconds = 30

# Must stay true in production
tls_verify = true

# Safety limit on followed pagination links
max_pages = 10000

[http.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Output
# ============================================================================
[output]
# One <vendor>_<collection>.jsonl file per synced collection
directory = "./satchel-out"

# ============================================================================
# Logging
# ============================================================================
[logging]
# Write JSON logs to local_path in addition to the console
local_enabled = false
local_path = "./logs"

# daily | hourly | never
local_rotation = "daily"

# ============================================================================
# Vendors
# ============================================================================

# ----------------------------------------------------------------------------
# Sentral
# ----------------------------------------------------------------------------
[sentral]
base_url = "https://sentral.school.example"
api_key = "${SENTRAL_API_KEY}"
tenant_id = "school"

# limit used for paginated persons/phones/emails requests (1-1000)
page_limit = 200

# ----------------------------------------------------------------------------
# Edumate
# ----------------------------------------------------------------------------
# [edumate]
# base_url = "https://edumate.school.example/school/web/app.php/api/"
# client_id = "satchel"
# client_secret = "${EDUMATE_CLIENT_SECRET}"
# # Relationship types that make a contact a carer
# carer_relationships = ["CHILD", "STEP CHILD", "FOSTER CHILD", "STEPCHILD", "CHARGE"]

# ----------------------------------------------------------------------------
# Engage
# ----------------------------------------------------------------------------
# [engage]
# base_url = "https://engage.school.example"
# username = "satchel"
# password = "${ENGAGE_PASSWORD}"

# ----------------------------------------------------------------------------
# PCSchool
# ----------------------------------------------------------------------------
# [pcschool]
# base_url = "https://pcschool.school.example"
# username = "enrol"
# password = "${PCSCHOOL_PASSWORD}"
# api_key = "${PCSCHOOL_API_KEY}"
# private_key = "${PCSCHOOL_PRIVATE_KEY}"

# ----------------------------------------------------------------------------
# TASS (calendar and LMS share this section)
# ----------------------------------------------------------------------------
# [tass]
# endpoint = "https://tass.school.example/tassweb/api/"
# app_code = "SATCHEL"
# company_code = "10"
# # Base64 AES-128/192/256 key issued by TASS
# token_key = "${TASS_TOKEN_KEY}"
# calendar_version = "2"
# lms_version = "3"
# calendar_days_back = 90
# calendar_days_forward = 1000
# student_code = "all"

# ----------------------------------------------------------------------------
# SQL Server
# ----------------------------------------------------------------------------
# [mssql]
# host = "sql.school.example"
# port = 1433
# username = "satchel"
# password = "${MSSQL_PASSWORD}"
# database = "SIS"
# query = "SELECT * FROM ST"
# # Never in production
# trust_cert = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    fn with_key(template: String) -> String {
        template.replace("${SENTRAL_API_KEY}", "test-key")
    }

    #[test]
    fn test_init_args_defaults() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            init: InitArgs,
        }

        let args = Wrapper::parse_from(["init"]).init;
        assert_eq!(args.output, "satchel.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_parse() {
        for template in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config = parse_config(&with_key(template)).unwrap();
            assert!(config.sentral.is_some());
            assert!(config.edumate.is_none());
        }
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("satchel.toml");
        std::fs::write(&path, "keep me").unwrap();

        let mut args = InitArgs {
            output: path.to_str().unwrap().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");

        args.force = true;
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(std::fs::read_to_string(&path).unwrap().contains("[sentral]"));
    }
}
