use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use log::info;

use crate::color::UnsignedColor;
use crate::resource::Resource;

/// Persists a finished render target as an 8-bit RGB PNG.
pub fn save_resource(resource: &Resource<UnsignedColor>, path: &Path) -> Result<()> {
    ensure!(
        resource.stride() > 0 && resource.count() % resource.stride() == 0,
        "render target is not a 2D resource"
    );

    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(
        writer,
        resource.width() as u32,
        resource.height() as u32,
    );
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut png_writer = encoder
        .write_header()
        .with_context(|| format!("Failed to write PNG header for {:?}", path))?;
    png_writer
        .write_image_data(bytemuck::cast_slice(resource.data()))
        .with_context(|| format!("Failed to write PNG data to {:?}", path))?;

    info!("Saved {}x{} image to {:?}", resource.width(), resource.height(), path);
    Ok(())
}
