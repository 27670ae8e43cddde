//! Configuration management for Satchel.
//!
//! Satchel reads a single TOML file. The shared sections (`[application]`,
//! `[http]`, `[output]`, `[logging]`) all have defaults; each SIS the school
//! runs gets its own optional section.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use satchel::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("satchel.toml")?;
//!
//! if let Some(sentral) = &config.sentral {
//!     println!("Sentral tenant: {}", sentral.tenant_id);
//! }
//! println!("Writing records to {}", config.output.directory);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [http]
//! timeout_seconds = 30
//!
//! [edumate]
//! base_url = "https://edumate.school.edu.au/school/web/app.php/api/"
//! client_id = "satchel"
//! client_secret = "${EDUMATE_CLIENT_SECRET}"
//!
//! [tass]
//! endpoint = "https://tass.school.edu.au/tassweb/api/"
//! app_code = "SATCHEL"
//! company_code = "10"
//! token_key = "${TASS_TOKEN_KEY}"
//! ```
//!
//! # Environment Variables
//!
//! `${VAR_NAME}` placeholders are substituted before parsing, and any key can
//! be overridden afterwards with `SATCHEL_<SECTION>_<KEY>`:
//!
//! ```bash
//! export EDUMATE_CLIENT_SECRET="secret"
//! export SATCHEL_HTTP_TIMEOUT_SECONDS=60
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, EdumateConfig, EngageConfig, Environment, HttpConfig, LoggingConfig,
    MssqlConfig, OutputConfig, PcSchoolConfig, RetryConfig, SatchelConfig, SentralConfig,
    TassConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
