//! Inspect command: run every extractor against one file

use anyhow::Result;
use std::path::Path;

use crate::extract::ExtractorRegistry;

pub fn run(registry: &ExtractorRegistry, path: &Path) -> Result<()> {
    println!("--- Processing {} ---", path.display());

    let outcomes = registry.probe(path);
    let mut selected = None;

    for outcome in &outcomes {
        println!("🔎 {} ({})", outcome.extractor_id, outcome.description);
        match &outcome.result {
            Ok(Some(metadata)) => {
                println!("   Succeeded");
                if selected.is_none() {
                    selected = Some((outcome.extractor_id.as_str(), metadata));
                }
            }
            Ok(None) => println!("   No metadata found"),
            Err(e) => println!("   Failed: {}", e),
        }
    }

    println!();
    match selected {
        Some((extractor_id, metadata)) => {
            println!("Selected metadata (from {}):", extractor_id);
            println!("{}", serde_json::to_string_pretty(metadata)?);
        }
        None => println!("No metadata could be extracted by any extractor."),
    }
    Ok(())
}
