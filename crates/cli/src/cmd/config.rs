//! Show the effective configuration

use crate::system_config;
use anyhow::Result;
use owo_colors::OwoColorize;

pub async fn run() -> Result<()> {
    let config = system_config::load()?;

    match system_config::config_file_path() {
        Some(path) if path.exists() => {
            println!("{} {}", "Config file:".bold(), path.display());
        }
        Some(path) => {
            println!(
                "{} {} {}",
                "Config file:".bold(),
                path.display(),
                "(not present, using defaults)".dimmed()
            );
        }
        None => {
            println!("{}", "Config directory could not be determined".dimmed());
        }
    }
    println!();

    println!("{}", toml::to_string_pretty(&config)?);
    println!("{}", "Example:".bold());
    println!("{}", system_config::example_config().dimmed());

    Ok(())
}
