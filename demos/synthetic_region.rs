//! Example: Retrieve a clamped region of a synthetic 5D pixel set
//!
//! Run with: RUST_LOG=pixelset=debug cargo run --example synthetic_region

use pixelset::{
    Extents, FetchConfig, InMemoryClient, PhysicalLength, PixelSet, PixelSetDescriptor,
    PixelType, Region,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Pixelset Example: Synthetic Region");
    println!("==================================\n");

    // 2 channels, 2 z-sections, 3 time points of 12000 x 40 pixels
    let extents = Extents::new(12_000, 40, 2, 2, 3)?;
    let descriptor = PixelSetDescriptor::new(42, extents, PixelType::UInt16)
        .with_physical_sizes(
            Some(PhysicalLength::micrometers(0.325)),
            Some(PhysicalLength::micrometers(0.325)),
            Some(PhysicalLength::micrometers(1.5)),
        )
        .with_time_increment(30.0);

    let client = InMemoryClient::from_fn(descriptor.clone(), |x, y, c, z, t| {
        ((x + y) % 4096 + 4096 * c + 1024 * z + t) as f64
    })?;

    let pixels = PixelSet::new(descriptor).with_config(FetchConfig::default())?;
    println!(
        "Pixel set: {} x {} x {} x {} x {} ({})",
        pixels.size_x(),
        pixels.size_y(),
        pixels.size_c(),
        pixels.size_z(),
        pixels.size_t(),
        pixels.pixel_type()
    );

    // Out-of-range bounds are clamped: x starts at 0, t ends at the last time point
    let region = Region::full()
        .with_x(-100, 10_999)
        .with_y(10, 29)
        .with_c(1, 1)
        .with_t(2, 99);
    let bounds = pixels.bounds(&region);
    println!("Requested region resolves to {} .. {}", bounds.start(), bounds.end());

    let samples = pixels.get_all_pixels_in(&client, &region).await?;
    println!("Samples (T, Z, C, Y, X): {:?}", samples.dim());

    let raw = pixels.get_raw_pixels_in(&client, &region, 2).await?;
    println!("Raw bytes: {} ({} per plane)", raw.len(), raw.plane_len());

    let stats = client.stats();
    println!(
        "Handles acquired/released: {}/{}, tile requests: {}",
        stats.acquired, stats.released, stats.tile_requests
    );

    println!("\n✓ Example complete!");
    Ok(())
}
