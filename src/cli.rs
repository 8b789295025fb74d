// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::settings::Settings;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RenderMode {
    /// Scanline rasterizer
    Raster,
    /// Recursive path/ray tracer
    Trace,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "scanray")]
#[command(about = "Offline software rasterizer and ray tracer", long_about = None)]
pub struct Cli {
    /// Which pipeline renders the frame
    #[arg(long, value_enum, default_value = "raster")]
    pub mode: RenderMode,

    /// JSON settings file; flags below override its fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// OBJ model to render
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Output image path
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<usize>,

    #[arg(long)]
    pub height: Option<usize>,

    /// Maximum ray recursion depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Samples per pixel
    #[arg(long)]
    pub samples: Option<u32>,

    /// Seed for the stochastic sampler
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.model_path = model.clone();
        }
        if let Some(output) = &self.output {
            settings.result_path = output.clone();
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(depth) = self.depth {
            settings.raytracing_depth = depth;
        }
        if let Some(samples) = self.samples {
            settings.accumulation_num = samples;
        }
        if let Some(seed) = self.seed {
            settings.sample_seed = seed;
        }
    }
}
