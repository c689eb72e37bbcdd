use anyhow::Result;

use crate::config::Config;

pub async fn show_config(path_override: Option<&str>) -> Result<()> {
    let config = Config::load(path_override)?;
    let config_str = toml::to_string_pretty(&config)?;

    println!("Current Configuration");
    println!("────────────────────────────────");
    println!();
    println!("{}", config_str);

    Ok(())
}

pub async fn init_config(path_override: Option<&str>, force: bool) -> Result<()> {
    let config_file = Config::config_file(path_override)?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config::default();
    config.save(&config_file)?;

    println!("✓ Configuration initialized at: {}", config_file.display());

    Ok(())
}
