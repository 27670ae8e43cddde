//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SatchelConfig;
use super::secret::secret_string;
use crate::domain::errors::SatchelError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SatchelConfig
/// 4. Applies environment variable overrides (SATCHEL_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`SatchelError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is malformed, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use satchel::config::loader::load_config;
///
/// let config = load_config("satchel.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SatchelConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SatchelError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SatchelError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let config = parse_config(&contents)?;
    tracing::debug!(
        path = %path.display(),
        vendors = ?config.configured_vendors(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Parses configuration text with the same substitution, override and
/// validation steps as [`load_config`]
pub fn parse_config(contents: &str) -> Result<SatchelConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SatchelConfig = toml::from_str(&contents)
        .map_err(|e| SatchelError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SatchelError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder regex"))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_regex();
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(SatchelError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            SatchelError::Configuration(format!("{name} has an invalid value '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using SATCHEL_* prefix
///
/// Environment variables follow the pattern: SATCHEL_<SECTION>_<KEY>, for
/// example `SATCHEL_SENTRAL_API_KEY` or `SATCHEL_HTTP_TIMEOUT_SECONDS`.
/// Vendor overrides only apply to sections present in the file.
fn apply_env_overrides(config: &mut SatchelConfig) -> Result<()> {
    if let Some(val) = env("SATCHEL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parse("SATCHEL_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    if let Some(val) = env_parse("SATCHEL_HTTP_TIMEOUT_SECONDS")? {
        config.http.timeout_seconds = val;
    }
    if let Some(val) = env_parse("SATCHEL_HTTP_TLS_VERIFY")? {
        config.http.tls_verify = val;
    }
    if let Some(val) = env_parse("SATCHEL_HTTP_MAX_PAGES")? {
        config.http.max_pages = val;
    }
    if let Some(val) = env_parse("SATCHEL_HTTP_RETRY_MAX_RETRIES")? {
        config.http.retry.max_retries = val;
    }

    if let Some(val) = env("SATCHEL_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }

    if let Some(ref mut edumate) = config.edumate {
        if let Some(val) = env("SATCHEL_EDUMATE_BASE_URL") {
            edumate.base_url = val;
        }
        if let Some(val) = env("SATCHEL_EDUMATE_CLIENT_ID") {
            edumate.client_id = val;
        }
        if let Some(val) = env("SATCHEL_EDUMATE_CLIENT_SECRET") {
            edumate.client_secret = secret_string(val);
        }
    }

    if let Some(ref mut engage) = config.engage {
        if let Some(val) = env("SATCHEL_ENGAGE_BASE_URL") {
            engage.base_url = val;
        }
        if let Some(val) = env("SATCHEL_ENGAGE_USERNAME") {
            engage.username = val;
        }
        if let Some(val) = env("SATCHEL_ENGAGE_PASSWORD") {
            engage.password = secret_string(val);
        }
    }

    if let Some(ref mut pcschool) = config.pcschool {
        if let Some(val) = env("SATCHEL_PCSCHOOL_BASE_URL") {
            pcschool.base_url = val;
        }
        if let Some(val) = env("SATCHEL_PCSCHOOL_USERNAME") {
            pcschool.username = val;
        }
        if let Some(val) = env("SATCHEL_PCSCHOOL_PASSWORD") {
            pcschool.password = secret_string(val);
        }
        if let Some(val) = env("SATCHEL_PCSCHOOL_API_KEY") {
            pcschool.api_key = secret_string(val);
        }
        if let Some(val) = env("SATCHEL_PCSCHOOL_PRIVATE_KEY") {
            pcschool.private_key = secret_string(val);
        }
    }

    if let Some(ref mut sentral) = config.sentral {
        if let Some(val) = env("SATCHEL_SENTRAL_BASE_URL") {
            sentral.base_url = val;
        }
        if let Some(val) = env("SATCHEL_SENTRAL_API_KEY") {
            sentral.api_key = secret_string(val);
        }
        if let Some(val) = env("SATCHEL_SENTRAL_TENANT_ID") {
            sentral.tenant_id = val;
        }
    }

    if let Some(ref mut tass) = config.tass {
        if let Some(val) = env("SATCHEL_TASS_ENDPOINT") {
            tass.endpoint = val;
        }
        if let Some(val) = env("SATCHEL_TASS_APP_CODE") {
            tass.app_code = val;
        }
        if let Some(val) = env("SATCHEL_TASS_COMPANY_CODE") {
            tass.company_code = val;
        }
        if let Some(val) = env("SATCHEL_TASS_TOKEN_KEY") {
            tass.token_key = secret_string(val);
        }
    }

    if let Some(ref mut mssql) = config.mssql {
        if let Some(val) = env("SATCHEL_MSSQL_HOST") {
            mssql.host = val;
        }
        if let Some(val) = env_parse("SATCHEL_MSSQL_PORT")? {
            mssql.port = val;
        }
        if let Some(val) = env("SATCHEL_MSSQL_USERNAME") {
            mssql.username = val;
        }
        if let Some(val) = env("SATCHEL_MSSQL_PASSWORD") {
            mssql.password = secret_string(val);
        }
        if let Some(val) = env("SATCHEL_MSSQL_DATABASE") {
            mssql.database = val;
        }
        if let Some(val) = env("SATCHEL_MSSQL_QUERY") {
            mssql.query = val;
        }
    }

    if let Some(val) = env_parse("SATCHEL_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("SATCHEL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env("SATCHEL_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("SATCHEL_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${SATCHEL_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"");
        std::env::remove_var("SATCHEL_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("SATCHEL_LOADER_MISSING_VAR");
        let input = "password = \"${SATCHEL_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("SATCHEL_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("SATCHEL_LOADER_COMMENTED");
        let input = "# api_key = \"${SATCHEL_LOADER_COMMENTED}\"\nname = \"x\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("nonexistent-satchel.toml").unwrap_err();
        assert!(matches!(err, SatchelError::Configuration(_)));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[http]
timeout_seconds = 10

[edumate]
base_url = "https://edumate.school.edu.au/school/web/app.php/api/"
client_id = "satchel"
client_secret = "s3cret"

[mssql]
host = "sql.school.local"
username = "reader"
password = "pw"
database = "Maze"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.http.timeout_seconds, 10);
        assert_eq!(config.http.max_pages, 10_000);

        let edumate = config.edumate.unwrap();
        assert_eq!(edumate.client_secret.expose_secret().as_str(), "s3cret");
        assert_eq!(edumate.carer_relationships.len(), 5);

        let mssql = config.mssql.unwrap();
        assert_eq!(mssql.port, 1433);
        assert_eq!(mssql.query, "SELECT * FROM ST");
        assert!(!mssql.trust_cert);
    }

    #[test]
    fn test_parse_config_rejects_bad_toml() {
        let err = parse_config("[sentral\nbase_url = ").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }
}
