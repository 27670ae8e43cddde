//! Configuration schema types
//!
//! Every vendor section is optional; a deployment usually talks to one SIS.
//! Validation only inspects the sections that are present.

use crate::config::SecretString;
use crate::domain::VendorKind;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Satchel configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatchelConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// HTTP behaviour shared by every REST vendor
    #[serde(default)]
    pub http: HttpConfig,

    /// Where fetched records are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edumate: Option<EdumateConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engage: Option<EngageConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcschool: Option<PcSchoolConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentral: Option<SentralConfig>,

    /// Shared by the calendar and LMS clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tass: Option<TassConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mssql: Option<MssqlConfig>,
}

impl SatchelConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a human-readable message naming the offending key.
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.http.validate(&self.environment)?;
        self.output.validate()?;
        self.logging.validate()?;

        if let Some(ref c) = self.edumate {
            c.validate()?;
        }
        if let Some(ref c) = self.engage {
            c.validate()?;
        }
        if let Some(ref c) = self.pcschool {
            c.validate()?;
        }
        if let Some(ref c) = self.sentral {
            c.validate()?;
        }
        if let Some(ref c) = self.tass {
            c.validate()?;
        }
        if let Some(ref c) = self.mssql {
            c.validate(&self.environment)?;
        }

        if self.configured_vendors().is_empty() {
            return Err(
                "no vendor configured; add at least one of [edumate], [engage], [pcschool], \
                 [sentral], [tass] or [mssql]"
                    .to_string(),
            );
        }
        Ok(())
    }

    /// Vendors that have a configuration section
    pub fn configured_vendors(&self) -> Vec<VendorKind> {
        let mut vendors = Vec::new();
        if self.edumate.is_some() {
            vendors.push(VendorKind::Edumate);
        }
        if self.engage.is_some() {
            vendors.push(VendorKind::Engage);
        }
        if self.mssql.is_some() {
            vendors.push(VendorKind::Mssql);
        }
        if self.pcschool.is_some() {
            vendors.push(VendorKind::PcSchool);
        }
        if self.sentral.is_some() {
            vendors.push(VendorKind::Sentral);
        }
        if self.tass.is_some() {
            vendors.push(VendorKind::TassCalendar);
            vendors.push(VendorKind::TassLms);
        }
        vendors
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (fetch and filter, but don't write records)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(format!(
                "http.retry.max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "http.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        Ok(())
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Must stay `true` in production; enforced by validation.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Upper bound on pages followed for a single collection
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
            max_pages: default_max_pages(),
            retry: RetryConfig::default(),
        }
    }
}

impl HttpConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if self.timeout_seconds == 0 {
            return Err("http.timeout_seconds must be > 0".to_string());
        }
        if self.max_pages == 0 {
            return Err("http.max_pages must be > 0".to_string());
        }
        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                 Set 'http.tls_verify = true' or use environment = \"development\"."
                    .to_string(),
            );
        }
        self.retry.validate()
    }
}

/// Record output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one `<vendor>_<collection>.jsonl` file per sync
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("output.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Edumate REST API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdumateConfig {
    /// API root, e.g. `https://edumate.school.edu.au/school/web/app.php/api/`
    pub base_url: String,

    /// OAuth client id from the Edumate admin section
    pub client_id: String,

    /// OAuth client secret from the Edumate admin section
    pub client_secret: SecretString,

    /// Relationship types that make a contact a carer; compared case-insensitively
    #[serde(default = "default_carer_relationships")]
    pub carer_relationships: Vec<String>,
}

impl EdumateConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("edumate.base_url", &self.base_url)?;
        require("edumate.client_id", &self.client_id)?;
        require_secret("edumate.client_secret", &self.client_secret)?;
        if self.carer_relationships.is_empty() {
            return Err("edumate.carer_relationships cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Engage (Projects Horizon) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngageConfig {
    /// Root URL the Engage instance sits on
    pub base_url: String,

    pub username: String,

    pub password: SecretString,
}

impl EngageConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("engage.base_url", &self.base_url)?;
        require("engage.username", &self.username)?;
        require_secret("engage.password", &self.password)
    }
}

/// PCSchool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcSchoolConfig {
    pub base_url: String,

    /// HTTP Basic username
    pub username: String,

    /// HTTP Basic password
    pub password: SecretString,

    /// Public API key, signed together with the timestamp
    pub api_key: SecretString,

    /// HMAC signing key
    pub private_key: SecretString,
}

impl PcSchoolConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("pcschool.base_url", &self.base_url)?;
        require("pcschool.username", &self.username)?;
        require_secret("pcschool.password", &self.password)?;
        require_secret("pcschool.api_key", &self.api_key)?;
        require_secret("pcschool.private_key", &self.private_key)
    }
}

/// Sentral REST API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentralConfig {
    /// School Sentral URL; `/restapi` is appended
    pub base_url: String,

    pub api_key: SecretString,

    pub tenant_id: String,

    /// `limit` query parameter for paginated endpoints
    #[serde(default = "default_sentral_page_limit")]
    pub page_limit: u32,
}

impl SentralConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("sentral.base_url", &self.base_url)?;
        require_secret("sentral.api_key", &self.api_key)?;
        require("sentral.tenant_id", &self.tenant_id)?;
        if self.page_limit == 0 || self.page_limit > 1000 {
            return Err(format!(
                "sentral.page_limit must be between 1 and 1000, got {}",
                self.page_limit
            ));
        }
        Ok(())
    }
}

/// TASS web API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TassConfig {
    /// Full endpoint URL the encrypted request is sent to
    pub endpoint: String,

    pub app_code: String,

    pub company_code: String,

    /// Base64 AES key issued by TASS
    pub token_key: SecretString,

    /// API version sent as `v` by the calendar client
    #[serde(default = "default_tass_calendar_version")]
    pub calendar_version: String,

    /// API version sent as `v` by the LMS client
    #[serde(default = "default_tass_lms_version")]
    pub lms_version: String,

    /// Calendar window start, days before today
    #[serde(default = "default_calendar_days_back")]
    pub calendar_days_back: i64,

    /// Calendar window end, days after today
    #[serde(default = "default_calendar_days_forward")]
    pub calendar_days_forward: i64,

    /// Student code passed to `getStudentSubjects`
    #[serde(default = "default_student_code")]
    pub student_code: String,
}

impl TassConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("tass.endpoint", &self.endpoint)?;
        require("tass.app_code", &self.app_code)?;
        require("tass.company_code", &self.company_code)?;
        require_secret("tass.token_key", &self.token_key)?;
        if self.calendar_days_back < 0 || self.calendar_days_forward < 0 {
            return Err("tass.calendar_days_back/forward must be >= 0".to_string());
        }
        Ok(())
    }
}

/// SQL Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MssqlConfig {
    pub host: String,

    #[serde(default = "default_mssql_port")]
    pub port: u16,

    pub username: String,

    pub password: SecretString,

    pub database: String,

    /// Query whose rows are exported
    #[serde(default = "default_mssql_query")]
    pub query: String,

    /// Accept the server certificate without validation
    #[serde(default)]
    pub trust_cert: bool,
}

impl MssqlConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        require("mssql.host", &self.host)?;
        require("mssql.username", &self.username)?;
        require_secret("mssql.password", &self.password)?;
        require("mssql.database", &self.database)?;
        require("mssql.query", &self.query)?;
        if *environment == Environment::Production && self.trust_cert {
            return Err("mssql.trust_cert cannot be enabled in production environments".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

fn validate_url(key: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{key} cannot be empty"));
    }
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(format!("{key} must start with http:// or https://"));
    }
    url::Url::parse(value).map_err(|e| format!("{key} is not a valid URL: {e}"))?;
    Ok(())
}

fn require(key: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{key} cannot be empty"));
    }
    Ok(())
}

fn require_secret(key: &str, value: &SecretString) -> Result<(), String> {
    if value.expose_secret().is_empty() {
        return Err(format!("{key} cannot be empty"));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_pages() -> usize {
    10_000
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_output_directory() -> String {
    "./satchel-out".to_string()
}

/// Relationship types treated as carers when none are configured
pub fn default_carer_relationships() -> Vec<String> {
    ["CHILD", "STEP CHILD", "FOSTER CHILD", "STEPCHILD", "CHARGE"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_sentral_page_limit() -> u32 {
    200
}

fn default_tass_calendar_version() -> String {
    "2".to_string()
}

fn default_tass_lms_version() -> String {
    "3".to_string()
}

fn default_calendar_days_back() -> i64 {
    90
}

fn default_calendar_days_forward() -> i64 {
    1000
}

fn default_student_code() -> String {
    "all".to_string()
}

fn default_mssql_port() -> u16 {
    1433
}

fn default_mssql_query() -> String {
    "SELECT * FROM ST".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
