//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::MedstarConfig;
use crate::config::secret_string;
use crate::domain::errors::EtlError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MedstarConfig
/// 4. Applies environment variable overrides (MEDSTAR_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use medstar::config::loader::load_config;
///
/// let config = load_config("medstar.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MedstarConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(EtlError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        EtlError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: MedstarConfig = toml::from_str(&contents)
        .map_err(|e| EtlError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        EtlError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. Every missing variable is reported in a
/// single error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| EtlError::Configuration(format!("Invalid substitution pattern: {e}")))?;
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
                    processed_line = processed_line.replace(&cap[0], &value);
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
        return Err(EtlError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        EtlError::Configuration(format!("Invalid value '{value}' in environment variable {name}"))
    })
}

fn env_override<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => parse_override(name, &val).map(Some),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using MEDSTAR_* prefix
///
/// Environment variables follow the pattern: MEDSTAR_<SECTION>_<KEY>
/// For example: MEDSTAR_WAREHOUSE_CONNECTION_STRING, MEDSTAR_ETL_CHUNK_SIZE
fn apply_env_overrides(config: &mut MedstarConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("MEDSTAR_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_override("MEDSTAR_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Database overrides
    for (prefix, db) in [
        ("MEDSTAR_SOURCE", &mut config.source),
        ("MEDSTAR_WAREHOUSE", &mut config.warehouse),
    ] {
        if let Ok(val) = std::env::var(format!("{prefix}_CONNECTION_STRING")) {
            db.connection_string = secret_string(val);
        }
        if let Some(val) = env_override(&format!("{prefix}_MAX_CONNECTIONS"))? {
            db.max_connections = val;
        }
        if let Some(val) = env_override(&format!("{prefix}_CONNECTION_TIMEOUT_SECONDS"))? {
            db.connection_timeout_seconds = val;
        }
        if let Some(val) = env_override(&format!("{prefix}_STATEMENT_TIMEOUT_SECONDS"))? {
            db.statement_timeout_seconds = val;
        }
        if let Ok(val) = std::env::var(format!("{prefix}_SSL_MODE")) {
            db.ssl_mode = val;
        }
    }

    // ETL overrides
    if let Some(val) = env_override("MEDSTAR_ETL_CHUNK_SIZE")? {
        config.etl.chunk_size = val;
    }
    if let Ok(val) = std::env::var("MEDSTAR_ETL_LOAD_MODE") {
        config.etl.load_mode = val.parse().map_err(EtlError::Configuration)?;
    }
    if let Some(val) = env_override("MEDSTAR_ETL_CALENDAR_START")? {
        config.etl.calendar_start = val;
    }
    if let Some(val) = env_override("MEDSTAR_ETL_CALENDAR_END")? {
        config.etl.calendar_end = val;
    }
    if let Some(val) = env_override("MEDSTAR_ETL_READMISSION_WINDOW_DAYS")? {
        config.etl.readmission_window_days = val;
    }
    if let Ok(val) = std::env::var("MEDSTAR_ETL_INPATIENT_ENCOUNTER_TYPE") {
        config.etl.inpatient_encounter_type = val;
    }
    if let Some(val) = env_override("MEDSTAR_ETL_INITIALIZE_SCHEMA")? {
        config.etl.initialize_schema = val;
    }
    if let Some(val) = env_override("MEDSTAR_ETL_AS_OF_DATE")? {
        config.etl.as_of_date = Some(val);
    }

    // Verification overrides
    if let Some(val) = env_override("MEDSTAR_VERIFICATION_ENABLE_VERIFICATION")? {
        config.verification.enable_verification = val;
    }

    // Logging overrides
    if let Some(val) = env_override("MEDSTAR_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("MEDSTAR_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("MEDSTAR_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
