//! Example: Share one raw data handle across several retrievals
//!
//! Run with: cargo run --example shared_handle

use pixelset::{Coordinate, Extents, InMemoryClient, PixelSet, PixelSetDescriptor, PixelType, Region};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Pixelset Example: Shared Handle");
    println!("===============================\n");

    let extents = Extents::new(512, 512, 3, 1, 10)?;
    let descriptor = PixelSetDescriptor::new(7, extents, PixelType::UInt8);
    let client = InMemoryClient::from_fn(descriptor.clone(), |x, y, c, _, t| {
        ((x * y + c + t) % 256) as f64
    })?;
    let pixels = PixelSet::new(descriptor);

    // Without an outer guard each call acquires and releases its own handle
    for t in 0..3 {
        let region = Region::full().with_t(t, t);
        pixels.get_all_pixels_in(&client, &region).await?;
    }
    println!("Separate calls: {:?}", client.stats());

    // Holding a guard keeps one handle open for every call in its scope
    {
        let guard = pixels.open_raw_data(&client).await?;
        println!("Outer guard owns handle: {}", guard.is_owner());
        for t in 3..10 {
            let region = Region::full().with_t(t, t).with_c(0, 0);
            pixels.get_raw_pixels_in(&client, &region, 1).await?;
        }
        let corner = pixels
            .get_tile(&client, Coordinate::new(500, 500, 2, 0, 9), 12, 12)
            .await?;
        println!("Corner tile: {:?}", corner.dim());
    }
    println!("Shared handle:  {:?}", client.stats());

    println!("\n✓ Example complete!");
    Ok(())
}
