use anyhow::{Context, Result};
use marquee_etl::{config, Config};

/// Show the current effective configuration.
pub fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    let path = config::config_file_path();
    println!("Config file: {}", path.display());
    println!(
        "File exists: {}\n",
        if path.exists() { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    for key in KEYS {
        println!("  {}: {}", key, value_of(config, key)?);
    }

    println!("\nPriority: CLI args > ENV vars (MARQUEE_*) > Config file > Defaults");

    Ok(())
}

const KEYS: [&str; 4] = [
    "database_path",
    "wikidata_user_agent",
    "enrichment_pacing_ms",
    "log_level",
];

fn value_of(config: &Config, key: &str) -> Result<String> {
    Ok(match key {
        "database_path" => config.database_path.display().to_string(),
        "wikidata_user_agent" => config.wikidata_user_agent.clone(),
        "enrichment_pacing_ms" => config.enrichment_pacing_ms.to_string(),
        "log_level" => config.log_level.clone(),
        _ => anyhow::bail!(
            "Unknown config key: {}\n\nValid keys: {}",
            key,
            KEYS.join(", ")
        ),
    })
}

/// Print one config value, or the whole config file when no key is given.
pub fn get_config(config: &Config, key: Option<&str>) -> Result<()> {
    if let Some(key) = key {
        println!("{}", value_of(config, key)?);
        return Ok(());
    }

    let config_path = config::config_file_path();
    if config_path.exists() {
        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        print!("{}", contents);
    } else {
        println!("Config file does not exist: {}", config_path.display());
        println!("\nRun 'marquee config init' to create it.");
    }

    Ok(())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure marquee.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_has_a_value() {
        let config = Config::default();
        for key in KEYS {
            assert!(value_of(&config, key).is_ok(), "{key}");
        }
        assert_eq!(value_of(&config, "log_level").unwrap(), "info");
    }

    #[test]
    fn test_unknown_key_lists_valid_keys() {
        let err = value_of(&Config::default(), "acoustid_api_key").unwrap_err();
        assert!(err.to_string().contains("enrichment_pacing_ms"));
    }
}
