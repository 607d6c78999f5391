//! List command implementation

use anyhow::Result;

use crate::gallery::Gallery;
use crate::query::ListParams;

pub fn run(gallery: &Gallery, params: ListParams) -> Result<()> {
    let page_number = params.page;
    let page = gallery.list(params)?;

    if page.images.is_empty() {
        if page.total_database_count == 0 {
            println!("No images indexed. Run 'gallery sync' first.");
        } else {
            println!("No images on this page.");
        }
        return Ok(());
    }

    println!("{:<8} {:<8} {}", "ID", "Rating", "Path");
    println!("{}", "-".repeat(60));

    for image in &page.images {
        println!(
            "{:<8} {:<8} {}",
            image.id,
            stars(image.rating),
            image.image_path
        );
    }

    println!(
        "\nPage {} | {} matching | {} total",
        page_number, page.total_search_results_count, page.total_database_count
    );
    Ok(())
}

fn stars(rating: i64) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
