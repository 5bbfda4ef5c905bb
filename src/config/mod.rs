mod schema;

pub use schema::{Config, RateLimitConfig, RuleDefinition};

use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::conditions;

const CONFIG_ENV_VAR: &str = "MSGRULE_CONFIG";

/// resolve the config path: explicit override, then env var, then
/// ~/.msgrule/config.json5
pub fn get_config_path(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".msgrule")
        .join("config.json5"))
}

/// parse config file contents (JSON5, so plain JSON works too)
pub fn parse(content: &str) -> Result<Config> {
    json5::from_str(content).map_err(|e| anyhow!("invalid config: {}", e))
}

pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Verify configuration file and return a list of problems
pub fn verify(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let config = load(path)?;
    Ok(verify_config(&config))
}

/// collect every problem in a parsed config instead of stopping at the first
pub fn verify_config(config: &Config) -> Vec<String> {
    let mut errors = Vec::new();

    // validate rules
    let mut seen = HashSet::new();
    for (name, definition) in &config.rules {
        let prefix = format!("rules.{}", name);

        if let Err(e) = definition.to_spec(name) {
            errors.push(format!("{}: {}", prefix, e));
        }

        if !seen.insert(name.to_lowercase()) {
            errors.push(format!(
                "{}: duplicate rule name (names are case-insensitive)",
                prefix
            ));
        }

        for problem in definition.lint(name) {
            errors.push(format!("{}: {}", prefix, problem));
        }
    }

    // validate expression
    if config.expression.trim().is_empty() {
        errors.push("expression: missing".to_string());
    } else {
        match conditions::parse_expression(&config.expression) {
            Ok(expr) => {
                let mut reported = HashSet::new();
                for name in expr.identifiers() {
                    if !seen.contains(name) && reported.insert(name) {
                        errors.push(format!("expression: unknown rule '{}'", name));
                    }
                }
            }
            Err(e) => errors.push(format!("expression: {}", e)),
        }
    }

    // validate rate limit
    if let Err(e) = config.rate_limit.settings() {
        errors.push(format!("rate_limit: {}", e));
    }

    errors
}
