//! Single image commands: show, rate, delete

use anyhow::Result;

use crate::gallery::Gallery;

pub fn show(gallery: &Gallery, id: i64) -> Result<()> {
    let image = gallery.get(id)?;

    println!("\n{}", "=".repeat(80));
    println!("Image: {} ({})", image.id, image.image_path);
    println!("Rating: {} | Created: {}", image.rating, image.created_at);
    println!("{}", "=".repeat(80));

    if image.prompt.is_empty() && image.parameters.is_empty() {
        println!("\nNo generation metadata found.");
        return Ok(());
    }

    println!("\n[PROMPT]\n{}", image.prompt);
    if !image.negative_prompt.is_empty() {
        println!("\n[NEGATIVE PROMPT]\n{}", image.negative_prompt);
    }
    if !image.parameters.is_empty() {
        println!("\n[PARAMETERS]\n{}", image.parameters);
    }
    Ok(())
}

pub fn rate(gallery: &Gallery, id: i64, rating: i64) -> Result<()> {
    let rating = gallery.rate(id, Some(rating))?;
    println!("Rated image {} with {}", id, rating);
    Ok(())
}

pub fn delete(gallery: &Gallery, id: i64) -> Result<()> {
    gallery.delete(id)?;
    println!("Deleted image {}", id);
    Ok(())
}
