use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use spot_palette_wasm::{
    extract_palette_bytes, snap_image_bytes, DesignColor, ExtractOptions, ExtractStrategy, Mode,
};

/// Extract spot-color palettes from images (native wrapper).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Treat inputs as full-color (photographic) instead of spot-color
    #[arg(long)]
    full_color: bool,

    /// Use the centroid (k-means) strategy instead of the histogram one
    #[arg(long)]
    centroid: bool,

    /// Cap the palette at this many colors
    #[arg(short = 'n', long)]
    num_colors: Option<usize>,

    /// Sample every Nth pixel
    #[arg(short, long, default_value_t = 1)]
    stride: usize,

    /// JSON file with a fixed design palette: [{"id": "...", "hex": "#RRGGBB"}]
    #[arg(short = 'd', long)]
    design_palette: Option<PathBuf>,

    /// Also write a PNG with every pixel snapped onto the extracted palette
    #[arg(long)]
    snap: bool,

    /// Output directory for snapped images
    #[arg(short = 'o', long)]
    out_dir: Option<PathBuf>,

    /// Snapped-image filename prefix (ignored when --out-dir supplied)
    #[arg(short = 'p', long, default_value = "snapped_")]
    prefix: String,
}

fn load_design_palette(path: &Path) -> Result<Vec<DesignColor>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading design palette {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing design palette {}", path.display()))?;
    let entries = value
        .as_array()
        .context("design palette must be a JSON array")?;

    entries
        .iter()
        .map(|entry| {
            let id = entry
                .get("id")
                .and_then(|v| v.as_str())
                .context("design palette entry missing \"id\"")?;
            let hex = entry
                .get("hex")
                .and_then(|v| v.as_str())
                .context("design palette entry missing \"hex\"")?;
            Ok(DesignColor::new(id, hex)?)
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut options = ExtractOptions::new().sample_stride(args.stride);
    if args.centroid {
        options = options.strategy(ExtractStrategy::Centroid);
    }
    if let Some(n) = args.num_colors {
        options = options.num_colors(n);
    }
    if let Some(path) = &args.design_palette {
        options = options.design_palette(load_design_palette(path)?);
    }
    let mode = if args.full_color { Mode::FullColor } else { Mode::SpotColor };

    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;

        let palette = if args.snap {
            let (png, palette) = snap_image_bytes(&bytes, mode, &options)
                .with_context(|| format!("snapping {}", input.display()))?;

            let out_path = if let Some(dir) = &args.out_dir {
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                dir.join(format!("{stem}.png"))
            } else {
                let stem = input.file_name().unwrap().to_string_lossy();
                PathBuf::from(format!("{}{}", args.prefix, stem))
            };
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out_path, png)?;
            eprintln!("Saved → {}", out_path.display());
            palette
        } else {
            extract_palette_bytes(&bytes, mode, &options)
                .with_context(|| format!("extracting palette from {}", input.display()))?
        };

        let entries: Vec<_> = palette
            .iter()
            .map(|e| json!({ "hex": e.hex(), "count": e.count, "percent": e.percent }))
            .collect();
        let report = json!({
            "file": input.display().to_string(),
            "totalSamples": palette.total_samples(),
            "palette": entries,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
