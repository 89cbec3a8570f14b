//! `annai onboard` — write a default configuration file.

use annai_config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(&config_path, AppConfig::default_toml())?;

    println!("Wrote default config to {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set an LLM API key:       export OPENAI_API_KEY=sk-...");
    println!("  2. (optional) weather data:  export OPENWEATHER_API_KEY=...");
    println!("  3. Start chatting:           annai chat");

    Ok(())
}
