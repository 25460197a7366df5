use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use postgen_core::Generator;
use postgen_core::clock::SystemClock;
use postgen_core::config::PostgenConfig;
use postgen_core::probe::{HttpStatusSource, LivenessProber};
use postgen_core::sheet::HttpSheetSource;
use postgen_core::store::{DirStore, JsonFileStore};

/// Liveness cache file inside the cache directory.
pub const URL_CACHE_FILE: &str = "urls.json";

pub fn run(config: &PostgenConfig, use_cache: bool, output: Option<&Path>) -> Result<()> {
    let client = config.http_client()?;
    let cache_dir = config.cache_path();

    let url_cache = JsonFileStore::open(cache_dir.join(URL_CACHE_FILE))
        .with_context(|| format!("Failed to open liveness cache in {}", cache_dir.display()))?;
    let prober = LivenessProber::new(
        HttpStatusSource::new(client.clone()),
        url_cache,
        config.probe.clone(),
    )
    .with_profile_url_base(&config.profile_url_base);

    let mut generator = Generator::new(
        HttpSheetSource::new(client, &config.sheet_url),
        DirStore::new(&cache_dir),
        prober,
        SystemClock,
    )
    .with_form_url(&config.form_url);

    let post = generator.generate(use_cache)?;

    match output {
        Some(path) => {
            std::fs::write(path, &post.markdown)
                .with_context(|| format!("Failed to write post to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote post");
        }
        None => println!("{}", post.markdown),
    }

    if post.regenerated {
        eprintln!(
            "{} {} ({} listed, {} removed)",
            "Generated".green(),
            post.fingerprint.dimmed(),
            post.accepted,
            post.removed
        );
    } else {
        eprintln!(
            "{} {} (sheet unchanged)",
            "Reused".yellow(),
            post.fingerprint.dimmed()
        );
    }

    Ok(())
}
