#![forbid(unsafe_code)]

//! pixel-map CLI - render geographic data as a colored terminal map.
//!
//! # Commands
//!
//! - `render`: Rasterize GeoJSON features (plus optional basemap imagery)
//!   into color-escaped terminal text
//! - `inspect`: Summarize the features a file contains without rendering

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pm_core::{
    BasemapStyle, BasemapUnavailable, Feature, GeoExtent, RenderConfig, RendererKind, Rgb,
    project_lonlat,
};
use pm_parser::parse_geojson;
use pm_raster::{BasemapImage, BasemapProvider, NoBasemap, Rgba};
use pm_render_term::render_map;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// pixel-map CLI - render geographic data as a colored terminal map.
#[derive(Debug, Parser)]
#[command(
    name = "pixel-map",
    version,
    about = "Render geographic data as a colored terminal map",
    long_about = "Renders vector features (GeoJSON) and optional basemap imagery\n\
        into a grid of colored glyphs sized for the current terminal."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render files to color-escaped terminal text.
    Render {
        /// Input file paths, or "-" for stdin.
        #[arg(required_unless_present = "bbox")]
        files: Vec<String>,

        /// Clip to a bounding box: four comma-separated lon/lat degrees
        /// (min_lon,min_lat,max_lon,max_lat)
        #[arg(short, long)]
        bbox: Option<String>,

        /// Output width in terminal columns (defaults to the terminal width)
        #[arg(short = 'W', long)]
        width: Option<u16>,

        /// Output height in terminal rows (defaults to the terminal height)
        #[arg(short = 'H', long)]
        height: Option<u16>,

        /// Raster pixels per cell column
        #[arg(long)]
        dpi: Option<u16>,

        /// Quantization strategy (block, half, quadrant, braille)
        #[arg(short, long)]
        renderer: Option<String>,

        /// Color style preset
        #[arg(short, long, value_enum)]
        style: Option<StyleArg>,

        /// Basemap style (positron, dark-matter, voyager)
        #[arg(long)]
        basemap: Option<String>,

        /// Pre-fetched basemap image covering the rendered extent
        #[arg(long, value_name = "PATH")]
        basemap_image: Option<PathBuf>,

        /// Feature color as a hex triple (e.g. #1f77b4)
        #[arg(long)]
        color: Option<String>,

        /// Background color as a hex triple
        #[arg(long)]
        background: Option<String>,

        /// Feature opacity in 0.0..=1.0
        #[arg(long)]
        opacity: Option<f32>,

        /// Map title drawn over the top border
        #[arg(short, long)]
        title: Option<String>,

        /// Subtitle drawn under the title
        #[arg(long)]
        subtitle: Option<String>,

        /// Disable the border frame
        #[arg(long)]
        no_border: bool,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,

        /// TOML file with default options
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Print render metadata as JSON to stderr
        #[arg(long)]
        json: bool,
    },

    /// Summarize the features a file contains.
    Inspect {
        /// Input file path, or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Color style preset selector.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum StyleArg {
    Light,
    Dark,
}

/// Defaults loadable from a TOML file, merged beneath the flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    width: Option<u16>,
    height: Option<u16>,
    dpi: Option<u16>,
    renderer: Option<String>,
    style: Option<String>,
    basemap: Option<String>,
    color: Option<String>,
    background: Option<String>,
    opacity: Option<f32>,
    title: Option<String>,
    subtitle: Option<String>,
    border: Option<bool>,
}

/// Render metadata emitted with `--json`.
#[derive(Debug, Serialize)]
struct RenderMeta {
    renderer: String,
    width: u16,
    height: u16,
    zoom: u8,
    extent: [f64; 4],
    feature_count: usize,
    parse_time_ms: f64,
    render_time_ms: f64,
    total_time_ms: f64,
    warnings: Vec<String>,
}

/// Summary emitted by the inspect command.
#[derive(Debug, Serialize)]
struct InspectResult {
    feature_count: usize,
    points: usize,
    linestrings: usize,
    polygons: usize,
    coordinate_count: usize,
    extent: Option<[f64; 4]>,
    warnings: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Render {
            files,
            bbox,
            width,
            height,
            dpi,
            renderer,
            style,
            basemap,
            basemap_image,
            color,
            background,
            opacity,
            title,
            subtitle,
            no_border,
            output,
            config,
            json,
        } => {
            let args = RenderArgs {
                files,
                bbox,
                width,
                height,
                dpi,
                renderer,
                style,
                basemap,
                basemap_image,
                color,
                background,
                opacity,
                title,
                subtitle,
                no_border,
                output,
                config,
                json,
            };
            cmd_render(args)
        }

        Command::Inspect { input, json } => cmd_inspect(&input, json),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_writer(io::stderr)
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

// =============================================================================
// Command: render
// =============================================================================

#[derive(Debug)]
struct RenderArgs {
    files: Vec<String>,
    bbox: Option<String>,
    width: Option<u16>,
    height: Option<u16>,
    dpi: Option<u16>,
    renderer: Option<String>,
    style: Option<StyleArg>,
    basemap: Option<String>,
    basemap_image: Option<PathBuf>,
    color: Option<String>,
    background: Option<String>,
    opacity: Option<f32>,
    title: Option<String>,
    subtitle: Option<String>,
    no_border: bool,
    output: Option<String>,
    config: Option<PathBuf>,
    json: bool,
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let total_start = Instant::now();

    // Parse
    let parse_start = Instant::now();
    let mut features: Vec<Feature> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    for file in &args.files {
        let source = load_input(file)?;
        let parsed =
            parse_geojson(&source).context(format!("parsing geographic data: {file}"))?;
        for warning in &parsed.warnings {
            warn!("{file}: {warning}");
        }
        warnings.extend(parsed.warnings.iter().map(|w| format!("{file}: {w}")));
        features.extend(parsed.features);
    }
    let parse_time = parse_start.elapsed();

    debug!("Parsed {} features from {} files", features.len(), args.files.len());

    let override_bounds = args
        .bbox
        .as_deref()
        .map(parse_bbox)
        .transpose()
        .context("parsing --bbox")?;

    // Configure (fails fast on unknown renderer names, before any raster work)
    let file_config = load_file_config(args.config.as_deref())?;
    let config = build_config(&args, &file_config).context("configuring render")?;

    let provider: Box<dyn BasemapProvider> = match &args.basemap_image {
        Some(path) => Box::new(ImageFileBasemap::new(path.clone())),
        None => Box::new(NoBasemap),
    };

    // Render
    let render_start = Instant::now();
    let render = render_map(&features, override_bounds, &config, provider.as_ref())
        .context("rendering map")?;
    let render_time = render_start.elapsed();
    let total_time = total_start.elapsed();

    if args.json {
        let meta = RenderMeta {
            renderer: config.renderer.as_str().to_string(),
            width: config.width,
            height: config.height,
            zoom: render.zoom,
            extent: [
                render.extent.min_x,
                render.extent.min_y,
                render.extent.max_x,
                render.extent.max_y,
            ],
            feature_count: features.len(),
            parse_time_ms: parse_time.as_secs_f64() * 1000.0,
            render_time_ms: render_time.as_secs_f64() * 1000.0,
            total_time_ms: total_time.as_secs_f64() * 1000.0,
            warnings,
        };
        let json_str = serde_json::to_string_pretty(&meta)?;
        eprintln!("{json_str}");
    }

    let mut text = render.text;
    text.push('\n');
    write_output(args.output.as_deref(), &text)?;

    info!(
        "Rendered {} features at zoom {} in {:.2}ms",
        features.len(),
        render.zoom,
        total_time.as_secs_f64() * 1000.0
    );

    Ok(())
}

fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let source = std::fs::read_to_string(path)
        .context(format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&source).context(format!("Failed to parse config file: {}", path.display()))
}

/// Merge precedence: command-line flag, then config file, then preset.
fn build_config(args: &RenderArgs, file: &FileConfig) -> Result<RenderConfig> {
    let basemap = match args.basemap.as_deref().or(file.basemap.as_deref()) {
        Some(name) => Some(name.parse::<BasemapStyle>().map_err(anyhow::Error::msg)?),
        None => None,
    };

    let style = match (args.style, file.style.as_deref()) {
        (Some(style), _) => style,
        (None, Some("dark")) => StyleArg::Dark,
        (None, Some("light")) => StyleArg::Light,
        (None, Some(other)) => anyhow::bail!("unknown style '{other}' (expected light or dark)"),
        // Dark imagery pairs with the dark palette unless told otherwise.
        (None, None) if basemap.is_some_and(BasemapStyle::is_dark) => StyleArg::Dark,
        (None, None) => StyleArg::Light,
    };

    let (term_cols, term_rows) = terminal_size();
    let width = args.width.or(file.width).unwrap_or(term_cols).max(1);
    let height = args.height.or(file.height).unwrap_or(term_rows).max(1);

    let mut config = match style {
        StyleArg::Light => RenderConfig::light(width, height),
        StyleArg::Dark => RenderConfig::dark(width, height),
    };
    config.basemap = basemap;
    config.border = !args.no_border && file.border.unwrap_or(true);

    if let Some(dpi) = args.dpi.or(file.dpi) {
        config.dpi = dpi.max(1);
    }
    if let Some(name) = args.renderer.as_deref().or(file.renderer.as_deref()) {
        config.renderer = RendererKind::from_name(name)?;
    }
    if let Some(hex) = args.color.as_deref().or(file.color.as_deref()) {
        config.colors.feature = parse_color(hex)?;
    }
    if let Some(hex) = args.background.as_deref().or(file.background.as_deref()) {
        config.colors.background = parse_color(hex)?;
    }
    if let Some(opacity) = args.opacity.or(file.opacity) {
        config.opacity = opacity.clamp(0.0, 1.0);
    }
    config.title = args.title.clone().or_else(|| file.title.clone());
    config.subtitle = args.subtitle.clone().or_else(|| file.subtitle.clone());

    Ok(config)
}

fn parse_color(hex: &str) -> Result<Rgb> {
    hex.parse::<Rgb>().map_err(anyhow::Error::msg)
}

/// Four comma-separated lon/lat degrees, projected to Web Mercator meters.
fn parse_bbox(value: &str) -> Result<[f64; 4]> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .context("bounding box values must be numbers")?;
    let [min_lon, min_lat, max_lon, max_lat] = parts.as_slice() else {
        anyhow::bail!(
            "expected 4 comma-separated values (min_lon,min_lat,max_lon,max_lat), got {}",
            parts.len()
        );
    };

    let min = project_lonlat(*min_lon, *min_lat);
    let max = project_lonlat(*max_lon, *max_lat);
    Ok([min.x, min.y, max.x, max.y])
}

/// Probe the terminal, reserving one row for the shell prompt. Falls back
/// to 80x24 when not attached to a terminal.
fn terminal_size() -> (u16, u16) {
    match crossterm::terminal::size() {
        Ok((cols, rows)) => (cols.max(1), rows.saturating_sub(1).max(1)),
        Err(_) => (80, 24),
    }
}

/// Basemap provider backed by a pre-fetched image file assumed to cover
/// the rendered extent.
#[derive(Debug, Clone)]
struct ImageFileBasemap {
    path: PathBuf,
}

impl ImageFileBasemap {
    const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BasemapProvider for ImageFileBasemap {
    fn fetch(&self, _zoom: u8, extent: &GeoExtent) -> Result<BasemapImage, BasemapUnavailable> {
        let image = image::open(&self.path).map_err(|err| {
            BasemapUnavailable::new(format!("{}: {err}", self.path.display()))
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        let pixels = rgba
            .pixels()
            .map(|p| Rgba {
                r: p.0[0],
                g: p.0[1],
                b: p.0[2],
                a: p.0[3],
            })
            .collect();
        BasemapImage::new(*extent, width, height, pixels)
    }
}

// =============================================================================
// Command: inspect
// =============================================================================

fn cmd_inspect(input: &str, json: bool) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_geojson(&source).context(format!("parsing geographic data: {input}"))?;

    let mut points = 0_usize;
    let mut linestrings = 0_usize;
    let mut polygons = 0_usize;
    let mut coordinate_count = 0_usize;
    for feature in &parsed.features {
        coordinate_count += feature.geometry.point_count();
        match feature.geometry.kind() {
            "point" => points += 1,
            "linestring" => linestrings += 1,
            _ => polygons += 1,
        }
    }

    let extent = pm_core::resolve_extent(&parsed.features, None)
        .ok()
        .map(|e| [e.min_x, e.min_y, e.max_x, e.max_y]);

    let result = InspectResult {
        feature_count: parsed.features.len(),
        points,
        linestrings,
        polygons,
        coordinate_count,
        extent,
        warnings: parsed.warnings,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("features:    {}", result.feature_count);
        println!("  points:      {}", result.points);
        println!("  linestrings: {}", result.linestrings);
        println!("  polygons:    {}", result.polygons);
        println!("coordinates: {}", result.coordinate_count);
        match result.extent {
            Some([min_x, min_y, max_x, max_y]) => {
                println!("extent:      [{min_x:.1}, {min_y:.1}, {max_x:.1}, {max_y:.1}]");
            }
            None => println!("extent:      (none)"),
        }
        for warning in &result.warnings {
            println!("warning:     {warning}");
        }
    }

    Ok(())
}
