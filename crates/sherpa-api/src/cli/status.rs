//! Configuration status command.

use anyhow::Result;
use console::style;

use std::path::Path;

use sherpa_infra::config::read_secret;
use sherpa_types::config::GlobalConfig;

/// Display the resolved configuration and credential presence.
///
/// Works without any credentials, so it can diagnose a failing `serve`.
pub fn status(data_dir: &Path, config: &GlobalConfig, json: bool) -> Result<()> {
    let credentials = [
        ("llm", config.llm.api_key_env.as_str()),
        ("places", config.places.api_key_env.as_str()),
        ("narration", config.narration.api_key_env.as_str()),
    ];

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": data_dir.display().to_string(),
            "config": config,
            "credentials": credentials
                .iter()
                .map(|(name, env)| (name.to_string(), read_secret(env).is_some()))
                .collect::<std::collections::HashMap<_, _>>(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Sherpa v{}",
        style("🧭").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  {}", style("── Generation ──").dim());
    println!(
        "  Provider: {} ({})",
        style(&config.llm.provider).bold(),
        config.llm.provider_type
    );
    println!("  Model:    {}", style(&config.llm.model).cyan());
    println!();
    println!("  {}", style("── Enrichment ──").dim());
    println!("  Radius:   {} m", config.places.radius_meters);
    println!("  Types:    {}", config.places.included_types.join(", "));
    println!("  Wiki:     {}", config.background.endpoint);
    println!();
    println!("  {}", style("── Credentials ──").dim());
    for (name, env) in credentials {
        let mark = if read_secret(env).is_some() {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {mark} {name:<10} {}", style(env).dim());
    }
    println!();
    println!(
        "  Narration: {}",
        if config.narration.enabled {
            style("enabled").green()
        } else {
            style("disabled").dim()
        }
    );
    println!("  Data dir:  {}", style(data_dir.display()).dim());
    println!();
    Ok(())
}
