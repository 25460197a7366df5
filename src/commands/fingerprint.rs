use anyhow::Result;
use postgen_core::config::PostgenConfig;
use postgen_core::fingerprint::fingerprint;
use postgen_core::sheet::{HttpSheetSource, SheetSource};

/// Print the current sheet's fingerprint without recording it.
pub fn run(config: &PostgenConfig) -> Result<()> {
    let source = HttpSheetSource::new(config.http_client()?, &config.sheet_url);
    let raw = source.fetch()?;

    println!("{}", fingerprint(&raw));
    Ok(())
}
