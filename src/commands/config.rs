use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use postgen_core::config::PostgenConfig;

use super::generate::URL_CACHE_FILE;

pub fn run(config: &PostgenConfig, explicit_path: Option<&Path>) -> Result<()> {
    let config_path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => PostgenConfig::config_path()?,
    };
    let cache_dir = config.cache_path();

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Cache:      {}", cache_dir.display());
    println!("  URL cache:  {}", cache_dir.join(URL_CACHE_FILE).display());

    println!("{}", "Sources".bold());
    println!("  Sheet:      {}", config.sheet_url);
    println!("  Form:       {}", config.form_url);
    println!("  Profiles:   {}<username>", config.profile_url_base);

    Ok(())
}
