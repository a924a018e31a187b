//! `stratus config` implementation.

use anyhow::Result;
use colored::Colorize;
use stratus_core::ClientConfig;

pub fn show(config: &ClientConfig, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    let unset = || "(unset)".dimmed().to_string();
    println!("{}", "Stratus Configuration".bold().cyan());
    println!("  Project:     {}", if config.project.is_empty() { unset() } else { config.project.clone() });
    println!("  Location:    {}", config.location);
    println!("  Endpoint:    {}", config.base_url());
    println!("  Timeout:     {}s", config.request_timeout_secs);
    println!(
        "  Staging:     {}",
        config.staging_bucket.clone().unwrap_or_else(unset)
    );
    println!(
        "  Encryption:  {}",
        config.encryption_spec_key_name.clone().unwrap_or_else(unset)
    );
    println!(
        "  Token:       {}",
        if config.access_token.is_some() { "set".green().to_string() } else { unset() }
    );
    Ok(())
}
