//! Sync command implementation

use anyhow::Result;

use crate::gallery::Gallery;

pub fn run(gallery: &Gallery) -> Result<()> {
    println!("Scanning {} ...", gallery.image_root().display());

    let report = gallery.sync()?;

    println!("   Found {} new images", report.discovered);
    if report.failed > 0 {
        println!("   ⚠️  {} could not be inserted (see log)", report.failed);
    }
    println!("✅ Synced {} new images.", report.synced);
    Ok(())
}
