use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::GrayImage;
use log::info;
use serde::Serialize;
use trakem2_adjacency::{
    AdjacencyConfig, BoundaryConfig, Image, LayerReport, MeasureConfig, PruneConfig, Registry,
    RegistryConfig, boundary_stats, export_csv, load_registry, measure_into,
};

#[derive(Parser, Debug)]
#[command(name = "tk")]
#[command(about = "Measure cell-boundary adjacency in segmented TrakEM2 projects")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Measure adjacencies and write them into an adjacency document
    #[command(name = "measure")]
    Measure(MeasureArgs),
    /// Write per-boundary centroid, area and length statistics as JSON
    #[command(name = "stats")]
    Stats(StatsArgs),
    /// Flatten an adjacency document into CSV rows
    #[command(name = "export-csv")]
    ExportCsv(ExportCsvArgs),
    /// Save the display matrix of every boundary of one object as PNG
    #[command(name = "render")]
    Render(RenderArgs),
}

#[derive(Args, Debug, Clone)]
struct MeasureArgs {
    /// TrakEM2 project file
    trakem2: PathBuf,
    /// Adjacency document; created when missing, updated in place otherwise
    output: PathBuf,
    /// Max distance between two boundary pixels considered in contact
    #[arg(short = 'p', long, default_value_t = 10.0)]
    pixel_radius: f64,
    #[command(flatten)]
    boundary: BoundaryArgs,
    /// Worker threads per layer
    #[arg(short = 'n', long, default_value_t = 1)]
    nproc: usize,
    /// Layers to process, separated by ','. Defaults to all layers.
    #[arg(short = 'l', long, value_delimiter = ',')]
    layers: Option<Vec<String>>,
    /// Objects never measured, separated by ','
    #[arg(long, value_delimiter = ',', default_values_t = ["Pharynx".to_owned(), "Phi_Marker".to_owned()])]
    exclude: Vec<String>,
    /// Write a JSON run summary here
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct BoundaryArgs {
    /// Boundaries enclosing at most this many px^2 are ignored
    #[arg(short = 't', long, default_value_t = 200.0)]
    area_thresh: f64,
    /// Bounding-box growth factor used when pruning candidate pairs
    #[arg(short = 's', long, default_value_t = 1.1)]
    scale_bounding_box: f64,
}

impl BoundaryArgs {
    fn config(&self) -> BoundaryConfig {
        BoundaryConfig {
            area_threshold: self.area_thresh,
            scale_bounding_box: self.scale_bounding_box,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct StatsArgs {
    trakem2: PathBuf,
    output: PathBuf,
    #[arg(short = 't', long, default_value_t = 200.0)]
    area_thresh: f64,
    #[arg(short = 'l', long, value_delimiter = ',')]
    layers: Option<Vec<String>>,
}

#[derive(Args, Debug, Clone)]
struct ExportCsvArgs {
    adjacency: PathBuf,
    output: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct RenderArgs {
    trakem2: PathBuf,
    out_dir: PathBuf,
    #[arg(long)]
    layer: String,
    #[arg(long)]
    object: String,
    #[arg(short = 's', long, default_value_t = 1.0)]
    scale_bounding_box: f64,
}

#[derive(Debug, Clone, Serialize)]
struct RunSummary {
    trakem2: String,
    output: String,
    pixel_radius: f64,
    area_thresh: f64,
    scale_bounding_box: f64,
    nproc: usize,
    excluded: Vec<String>,
    layers: Vec<LayerSummaryDto>,
    total_adjacencies: usize,
    total_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
struct LayerSummaryDto {
    name: String,
    boundaries: usize,
    candidate_pairs: usize,
    adjacencies: usize,
    seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
struct BoundaryStatsDto {
    layer: String,
    name: String,
    index: usize,
    centx: f64,
    centy: f64,
    area: f64,
    length: usize,
}

#[derive(Debug, Clone, Serialize)]
struct RenderedDto {
    index: usize,
    file: String,
    width: usize,
    height: usize,
    min_x: i64,
    min_y: i64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Measure(args) => run_measure(args),
        Command::Stats(args) => run_stats(args),
        Command::ExportCsv(args) => run_export_csv(args),
        Command::Render(args) => run_render(args),
    }
}

fn run_measure(args: MeasureArgs) -> Result<()> {
    let cfg = MeasureConfig {
        registry: RegistryConfig::default(),
        boundary: args.boundary.config(),
        prune: PruneConfig {
            excluded: args.exclude.iter().cloned().collect::<BTreeSet<_>>(),
        },
        adjacency: AdjacencyConfig {
            pixel_radius: args.pixel_radius,
            workers: args.nproc,
        },
    };

    println!("TrakEM2 file: {}", args.trakem2.display());
    println!("Writing to file: {}", args.output.display());
    println!("Running {} workers", args.nproc.max(1));
    let registry = open_registry(&args.trakem2, &cfg.registry)?;
    let layers = select_layers(&registry, args.layers)?;

    let total = layers.len();
    let started = Instant::now();
    let reports = measure_into(&registry, &layers, &cfg, &args.output, |i, report| {
        print_progress(i + 1, total, report, started.elapsed());
    })
    .with_context(|| format!("measuring adjacency into {}", args.output.display()))?;
    println!("finished");

    if let Some(path) = args.summary {
        let summary = RunSummary {
            trakem2: args.trakem2.display().to_string(),
            output: args.output.display().to_string(),
            pixel_radius: args.pixel_radius,
            area_thresh: cfg.boundary.area_threshold,
            scale_bounding_box: cfg.boundary.scale_bounding_box,
            nproc: args.nproc,
            excluded: cfg.prune.excluded.iter().cloned().collect(),
            total_adjacencies: reports.iter().map(|r| r.records.len()).sum(),
            layers: reports.iter().map(layer_summary_dto).collect(),
            total_seconds: started.elapsed().as_secs_f64(),
        };
        write_json(path, &summary)?;
    }
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<()> {
    let registry = open_registry(&args.trakem2, &RegistryConfig::default())?;
    let layers = select_layers(&registry, args.layers)?;
    let cfg = BoundaryConfig {
        area_threshold: args.area_thresh,
        ..BoundaryConfig::default()
    };

    let stats = boundary_stats(&registry, &layers, &cfg).context("computing boundary stats")?;
    let dtos: Vec<_> = stats
        .into_iter()
        .map(|s| BoundaryStatsDto {
            layer: s.layer,
            name: s.name,
            index: s.index,
            centx: s.centroid.x,
            centy: s.centroid.y,
            area: s.area,
            length: s.boundary_length,
        })
        .collect();
    info!("{} boundaries across {} layers", dtos.len(), layers.len());
    write_json(args.output, &dtos)
}

fn run_export_csv(args: ExportCsvArgs) -> Result<()> {
    ensure_file_exists(&args.adjacency, "adjacency")?;
    let rows = export_csv(&args.adjacency, &args.output).with_context(|| {
        format!(
            "exporting {} -> {}",
            args.adjacency.display(),
            args.output.display()
        )
    })?;
    info!("wrote {rows} rows to {}", args.output.display());
    Ok(())
}

fn run_render(args: RenderArgs) -> Result<()> {
    let registry = open_registry(&args.trakem2, &RegistryConfig::default())?;
    if registry.area_list(&args.object).is_none() {
        bail!("object '{}' not found in {}", args.object, args.trakem2.display());
    }

    let cfg = BoundaryConfig {
        scale_bounding_box: args.scale_bounding_box,
        ..BoundaryConfig::default()
    };
    let only = [args.object.clone()];
    let boundaries = registry
        .boundaries_in_layer(&args.layer, &cfg, Some(only.as_slice()))
        .with_context(|| format!("collecting boundaries of layer {}", args.layer))?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    let mut rendered = Vec::new();
    for b in boundaries.get(&args.object) {
        let matrix = b
            .display_matrix()
            .with_context(|| format!("rendering {}[{}]", b.name(), b.index()))?;
        let file = format!("{}_{}_{}.png", args.layer, args.object, b.index());
        save_matrix(args.out_dir.join(&file), &matrix)?;

        let (min_x, min_y) = b.bounding_box().map(|bb| (bb.min.x, bb.min.y)).unwrap_or_default();
        rendered.push(RenderedDto {
            index: b.index(),
            file,
            width: matrix.width(),
            height: matrix.height(),
            min_x,
            min_y,
        });
    }
    info!(
        "rendered {} boundaries of {} in layer {}",
        rendered.len(),
        args.object,
        args.layer
    );
    write_json(args.out_dir.join("meta.json"), &rendered)
}

fn open_registry(path: &Path, cfg: &RegistryConfig) -> Result<Registry> {
    ensure_file_exists(path, "trakem2")?;
    println!("Loading TrakEM2 file...");
    let registry =
        load_registry(path, cfg).with_context(|| format!("loading {}", path.display()))?;
    println!("Extracted {} layers.", registry.num_layers());
    println!("Extracted {} area lists.", registry.num_area_lists());
    Ok(registry)
}

/// Requested layers in the given order, or every layer sorted by name.
fn select_layers(registry: &Registry, requested: Option<Vec<String>>) -> Result<Vec<String>> {
    let Some(layers) = requested else {
        println!("Analyzing all layers.");
        return Ok(registry.layer_names());
    };

    let unknown: Vec<_> = layers
        .iter()
        .filter(|l| registry.layer(l).is_none())
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        bail!("unknown layer(s): {}", unknown.join(", "));
    }
    println!("Analyzing layers: {}", layers.join(","));
    Ok(layers)
}

fn print_progress(done: usize, total: usize, report: &LayerReport, elapsed: Duration) {
    println!(
        "processed {done}/{total} layers. last layer: {}. found {} adjacencies. layer time: {:.3} sec. total time: {}",
        report.layer,
        report.records.len(),
        report.elapsed.as_secs_f64(),
        format_elapsed(elapsed)
    );
}

/// `days:hours:minutes:seconds`, unpadded.
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3_600;
    let minutes = secs % 3_600 / 60;
    let seconds = secs % 60;
    format!("{days}:{hours}:{minutes}:{seconds}")
}

fn layer_summary_dto(report: &LayerReport) -> LayerSummaryDto {
    LayerSummaryDto {
        name: report.layer.clone(),
        boundaries: report.boundaries,
        candidate_pairs: report.candidate_pairs,
        adjacencies: report.records.len(),
        seconds: report.elapsed.as_secs_f64(),
    }
}

fn save_matrix(path: PathBuf, matrix: &Image<u8>) -> Result<()> {
    let data = matrix.map(|v| if v > 0 { 255 } else { 0 }).into_data();
    let gray = GrayImage::from_raw(matrix.width() as u32, matrix.height() as u32, data)
        .context("constructing GrayImage from display matrix")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
