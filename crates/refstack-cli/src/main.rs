use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use refstack_core::{
    classify, ImageNormalizer, LabelRenderer, LabelStyle, ReferenceAssembler, ReferenceRequest,
    ScratchDir,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod manifest;
mod sources;

use config::Config;
use manifest::Manifest;
use sources::{FsAssetSource, FsSelfieSource};

#[derive(Parser)]
#[command(name = "refstack", about = "Reference-image composition for headshot generation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the reference set described by a request manifest
    Build {
        /// TOML manifest (selfies, style, aspect ratio)
        #[arg(short, long)]
        manifest: PathBuf,
        /// Also write each reference as reference-NN.png here
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Overrides the manifest's generation id
        #[arg(long)]
        generation_id: Option<String>,
    },
    /// Orientation-correct and downsample one image
    Normalize {
        image: PathBuf,
        /// Write the normalized PNG here
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render one text label to PNG
    Label {
        text: String,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, default_value_t = 16)]
        font_size: u32,
        #[arg(long, default_value = "#1f2937")]
        color: String,
        #[arg(long, default_value_t = 12)]
        padding: u32,
    },
    /// Partition selfie ids by angle tag
    Classify {
        /// `<id>=<tag>` or a bare `<id>` for an untagged selfie
        #[arg(short, long = "selfie", required = true)]
        selfies: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Build {
            manifest,
            out_dir,
            generation_id,
        } => build(&config, &manifest, out_dir.as_deref(), generation_id).await,
        Commands::Normalize { image, out } => normalize(&config, &image, out.as_deref()).await,
        Commands::Label {
            text,
            out,
            font_size,
            color,
            padding,
        } => {
            let labels = label_renderer(&config);
            let png = labels
                .render_png(&text, &LabelStyle::new(font_size, color, padding))
                .context("failed to render label")?;
            tokio::fs::write(&out, png)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("{}", out.display());
            Ok(())
        }
        Commands::Classify { selfies } => {
            let (ids, types) = parse_selfie_args(&selfies)?;
            let groups = classify(&ids, &types);
            println!("{}", serde_json::to_string_pretty(&groups)?);
            Ok(())
        }
    }
}

async fn build(
    config: &Config,
    manifest_path: &Path,
    out_dir: Option<&Path>,
    generation_id: Option<String>,
) -> Result<()> {
    let manifest = Manifest::load(manifest_path).await?;
    let generation_id = generation_id
        .or_else(|| manifest.generation_id.clone())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let selfie_ids = manifest.selfie_ids();
    let selfie_types = manifest.selfie_types();

    let manifest_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let selfies = FsSelfieSource::new(manifest_dir);
    let assets = FsAssetSource::new(&config.asset_dir);

    let mut assembler = ReferenceAssembler::new()
        .with_normalizer(ImageNormalizer::new(config.max_dimension))
        .with_label_renderer(label_renderer(config));
    if config.debug_enabled {
        assembler = assembler.with_debug_sink(ScratchDir::new(&config.debug_dir));
    }

    tracing::info!(
        generation_id = %generation_id,
        selfies = selfie_ids.len(),
        "building references"
    );
    let request = ReferenceRequest {
        generation_id: &generation_id,
        style: &manifest.style,
        selfie_ids: &selfie_ids,
        selfie_types: &selfie_types,
        aspect_ratio: &manifest.aspect_ratio,
    };
    let references = assembler
        .build_references(&request, &selfies, &assets)
        .await
        .context("failed to build references")?;

    if let Some(dir) = out_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
        for (index, reference) in references.iter().enumerate() {
            let path = dir.join(format!("reference-{:02}.png", index + 1));
            let png = reference.decode_payload()?;
            tokio::fs::write(&path, png)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        tracing::info!(dir = %dir.display(), count = references.len(), "references written");
    }

    println!("{}", serde_json::to_string_pretty(&references)?);
    Ok(())
}

async fn normalize(config: &Config, image: &Path, out: Option<&Path>) -> Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read {}", image.display()))?;
    let normalized = ImageNormalizer::new(config.max_dimension)
        .normalize(&bytes)
        .with_context(|| format!("failed to normalize {}", image.display()))?;

    if let Some(out) = out {
        tokio::fs::write(out, normalized.to_png()?)
            .await
            .with_context(|| format!("failed to write {}", out.display()))?;
    }

    let summary = serde_json::json!({
        "sourceOrientation": normalized.source_orientation().exif_value(),
        "width": normalized.width(),
        "height": normalized.height(),
        "resized": normalized.was_resized(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn label_renderer(config: &Config) -> LabelRenderer {
    match &config.font_dir {
        Some(dir) => LabelRenderer::with_font_dir(dir),
        None => LabelRenderer::new(),
    }
}

/// Split `id=tag` arguments into an id list and a tag map.
fn parse_selfie_args(args: &[String]) -> Result<(Vec<String>, HashMap<String, String>)> {
    let mut ids = Vec::with_capacity(args.len());
    let mut types = HashMap::new();
    for arg in args {
        let (id, tag) = match arg.split_once('=') {
            Some((id, tag)) => (id.trim(), Some(tag.trim())),
            None => (arg.trim(), None),
        };
        if id.is_empty() {
            bail!("empty selfie id in {arg:?}");
        }
        ids.push(id.to_string());
        if let Some(tag) = tag {
            types.insert(id.to_string(), tag.to_string());
        }
    }
    Ok((ids, types))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_selfie_args() {
        let (ids, types) = parse_selfie_args(&args(&["a=front_view", "b", "c = full_body"])).unwrap();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(types.len(), 2);
        assert_eq!(types["a"], "front_view");
        assert_eq!(types["c"], "full_body");
    }

    #[test]
    fn test_parse_selfie_args_rejects_empty_id() {
        assert!(parse_selfie_args(&args(&["=front_view"])).is_err());
    }

    #[test]
    fn test_cli_parses_build() {
        let cli = Cli::try_parse_from([
            "refstack",
            "build",
            "--manifest",
            "req.toml",
            "--out-dir",
            "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Build {
                manifest, out_dir, ..
            } => {
                assert_eq!(manifest, PathBuf::from("req.toml"));
                assert_eq!(out_dir, Some(PathBuf::from("out")));
            }
            _ => panic!("expected build"),
        }
    }
}
