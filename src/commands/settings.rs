//! Configuration commands

use gizi::config::Config;
use gizi::error::Result;

/// Print the config file location
pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}

/// Print the effective configuration as TOML
pub fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;
    let text = toml::to_string_pretty(&config)
        .map_err(|e| gizi::GiziError::ConfigError(e.to_string()))?;
    print!("{}", text);
    Ok(())
}

/// Write the default configuration file
pub fn cmd_config_init(force: bool) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        println!("Config already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    Config::default().save()?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
