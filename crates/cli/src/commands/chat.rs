//! `annai chat` — interactive or single-message chat mode.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use annai_agent::Pipeline;
use annai_config::AppConfig;
use annai_core::session::SessionId;
use annai_memory::FileSessionStore;

pub async fn run(message: Option<String>) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    // Check for an API key early — give a clear error
    let Some(provider) = annai_providers::from_config(&config) else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export OPENAI_API_KEY=sk-...");
        eprintln!("    export ANNAI_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!(
            "    {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
        anyhow::bail!("No API key found. See above for setup instructions.");
    };

    let tools = Arc::new(annai_tools::default_registry(&config));
    let store = Arc::new(FileSessionStore::new(AppConfig::sessions_dir()));
    let pipeline = Pipeline::new(provider, tools, store, &config);

    // One session spans the whole invocation, so follow-up questions keep
    // their context.
    let session = SessionId::new();

    if let Some(msg) = message {
        // Single message mode
        let outcome = pipeline
            .handle(&session, msg.trim())
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        println!("{}", outcome.response);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Annai — Tokyo Travel Assistant");
    println!();
    println!("  Model:   {}", config.default_model);
    println!("  Tools:   search_tokyo_info, get_weather_info");
    println!("  Session: {session}");
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'quit' or Ctrl+C to exit.");
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("  Goodbye!");
            break;
        }

        match pipeline.handle(&session, input).await {
            Ok(outcome) => {
                println!("  Annai > {}\n", outcome.response);
            }
            Err(e) => {
                // Classifier outages land here; keep the session usable.
                tracing::error!(error = %e, "Turn failed");
                println!("  Annai > Something went wrong, please try again.\n");
            }
        }
    }

    Ok(())
}
