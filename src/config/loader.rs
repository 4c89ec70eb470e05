//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::HealthportConfig;
use crate::domain::errors::HealthportError;
use crate::domain::result::Result;
use crate::domain::RecordCategory;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into HealthportConfig
/// 4. Applies environment variable overrides (HEALTHPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use healthport::config::loader::load_config;
///
/// let config = load_config("healthport.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<HealthportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HealthportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        HealthportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Builds the configuration from defaults and `HEALTHPORT_*` overrides alone
///
/// Used when no configuration file is given.
pub fn load_default_config() -> Result<HealthportConfig> {
    let mut config = HealthportConfig::default();
    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Parses configuration text, then applies overrides and validation
pub fn parse_config(contents: &str) -> Result<HealthportConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: HealthportConfig = toml::from_str(&contents)
        .map_err(|e| HealthportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &HealthportConfig) -> Result<()> {
    config.validate().map_err(|e| {
        HealthportError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| HealthportError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
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
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(HealthportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using HEALTHPORT_* prefix
///
/// Environment variables follow the pattern: HEALTHPORT_<SECTION>_<KEY>
/// For example: HEALTHPORT_INPUT_PATH, HEALTHPORT_EXPORT_CONCURRENT
fn apply_env_overrides(config: &mut HealthportConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("HEALTHPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Input overrides
    if let Ok(val) = std::env::var("HEALTHPORT_INPUT_PATH") {
        config.input.path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("HEALTHPORT_INPUT_CDA_FILE") {
        config.input.cda_file = val;
    }
    if let Ok(val) = std::env::var("HEALTHPORT_INPUT_EXPORT_FILE") {
        config.input.export_file = val;
    }
    if let Ok(val) = std::env::var("HEALTHPORT_INPUT_CDA_NAMESPACE") {
        config.input.cda_namespace = val;
    }

    // Output overrides
    if let Ok(val) = std::env::var("HEALTHPORT_OUTPUT_PATH") {
        config.output.path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("HEALTHPORT_OUTPUT_SUBDIRECTORY") {
        config.output.subdirectory = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("HEALTHPORT_EXPORT_CATEGORIES") {
        config.export.categories = parse_categories(&val)?;
    }
    if let Ok(val) = std::env::var("HEALTHPORT_EXPORT_CONCURRENT") {
        config.export.concurrent = parse_bool("HEALTHPORT_EXPORT_CONCURRENT", &val)?;
    }
    if let Ok(val) = std::env::var("HEALTHPORT_EXPORT_INCLUDE_MEASUREMENT") {
        config.export.include_measurement =
            parse_bool("HEALTHPORT_EXPORT_INCLUDE_MEASUREMENT", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("HEALTHPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("HEALTHPORT_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("HEALTHPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("HEALTHPORT_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

/// Parses a comma-separated category list such as `cda,workouts`
fn parse_categories(value: &str) -> Result<Vec<RecordCategory>> {
    value
        .split(',')
        .filter(|item| !item.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Parses a boolean override; only `true` and `false` are accepted, in any case
fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(HealthportError::Configuration(format!(
            "Invalid value for {name}: '{value}'. Expected true or false"
        ))),
    }
}

/// Serializes unit tests that read or write `HEALTHPORT_*` variables
#[cfg(test)]
static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        let _guard = env_lock();
        std::env::set_var("HEALTHPORT_TEST_VAR", "test_value");
        let input = "path = \"${HEALTHPORT_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "path = \"test_value\"\n");
        std::env::remove_var("HEALTHPORT_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let _guard = env_lock();
        std::env::remove_var("HEALTHPORT_MISSING_VAR");
        let input = "path = \"${HEALTHPORT_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("HEALTHPORT_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# path = \"${HEALTHPORT_NEVER_SET}\"\n";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(HealthportError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let _guard = env_lock();
        let toml_content = r#"
[application]
log_level = "debug"

[input]
path = "/data/apple_health_export"

[output]
path = "/data/out"
subdirectory = "csv"

[export]
categories = ["workouts", "activity_summaries"]
concurrent = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(
            config.input.path,
            PathBuf::from("/data/apple_health_export")
        );
        assert_eq!(config.output.directory(), PathBuf::from("/data/out/csv"));
        assert_eq!(
            config.export.categories,
            vec![RecordCategory::Workouts, RecordCategory::ActivitySummaries]
        );
        assert!(config.export.concurrent);
    }

    #[test]
    fn test_parse_config_rejects_invalid_values() {
        let _guard = env_lock();
        let err = parse_config("[application]\nlog_level = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("Configuration validation failed"));

        let err = parse_config("[export]\ncategories = [\"vitals\"]\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_env_overrides() {
        let _guard = env_lock();
        std::env::set_var("HEALTHPORT_INPUT_PATH", "/override/input");
        std::env::set_var("HEALTHPORT_EXPORT_CATEGORIES", "cda, workouts");
        std::env::set_var("HEALTHPORT_EXPORT_INCLUDE_MEASUREMENT", "true");

        let config = load_default_config();

        std::env::remove_var("HEALTHPORT_INPUT_PATH");
        std::env::remove_var("HEALTHPORT_EXPORT_CATEGORIES");
        std::env::remove_var("HEALTHPORT_EXPORT_INCLUDE_MEASUREMENT");

        let config = config.unwrap();
        assert_eq!(config.input.path, PathBuf::from("/override/input"));
        assert_eq!(
            config.export.categories,
            vec![RecordCategory::ClinicalObservations, RecordCategory::Workouts]
        );
        assert!(config.export.include_measurement);
    }

    #[test]
    fn test_invalid_category_override() {
        let _guard = env_lock();
        std::env::set_var("HEALTHPORT_EXPORT_CATEGORIES", "cda,vitals");
        let result = load_default_config();
        std::env::remove_var("HEALTHPORT_EXPORT_CATEGORIES");

        assert!(matches!(result, Err(HealthportError::Configuration(_))));
    }

    #[test]
    fn test_invalid_boolean_override() {
        let _guard = env_lock();
        std::env::set_var("HEALTHPORT_EXPORT_CONCURRENT", "yes");
        let result = load_default_config();
        std::env::remove_var("HEALTHPORT_EXPORT_CONCURRENT");

        let err = result.unwrap_err();
        assert!(matches!(err, HealthportError::Configuration(_)));
        assert!(err.to_string().contains("HEALTHPORT_EXPORT_CONCURRENT"));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", " TRUE ").unwrap());
        assert!(!parse_bool("X", "False").unwrap());
        assert!(parse_bool("X", "1").is_err());
        assert!(parse_bool("X", "").is_err());
    }

    #[test]
    fn test_parse_categories() {
        assert_eq!(
            parse_categories("flat,active-summary").unwrap(),
            vec![RecordCategory::Records, RecordCategory::ActivitySummaries]
        );
        assert!(parse_categories("").unwrap().is_empty());
    }
}
