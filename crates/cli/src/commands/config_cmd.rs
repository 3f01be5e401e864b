//! `turnwise config`: show the effective configuration.

use turnwise_config::AppConfig;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let config_path = AppConfig::config_dir().join("config.toml");

    println!("Config file: {}", config_path.display());
    println!("API key:     {}", if config.has_api_key() { "set" } else { "not set" });
    println!();
    println!("{config:#?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn config_path_is_valid() {
        let path = turnwise_config::AppConfig::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().contains(".turnwise"));
    }
}
