//! bitfont CLI
//!
//! Bake font cache files, inspect them and render text to PNG.

use anyhow::{bail, Context, Result};
use bitfont_core::{Color, PixelBuffer};
use bitfont_text::file::{self, FontImage};
use bitfont_text::{
    Alignment, Decoration, FontParams, FontSystem, FontSystemConfig, FontWeight,
    RasterizationProvider, SyntheticRasterizer, SystemRasterizer, TextLook, TextStyle, ZlibCodec,
    KERN_UNSET,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "bitfont")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bitmap font baking and rendering", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Font system configuration (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use the built-in block glyphs instead of system fonts
    #[arg(long, global = true)]
    synthetic: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Font selection shared by several commands
#[derive(Args)]
struct FontArgs {
    /// Facename
    #[arg(short, long, default_value = "Verdana")]
    face: String,

    /// Line height in measurement units
    #[arg(long, default_value = "20")]
    size: f32,

    /// Numeric weight (100-900) or a name such as "bold"
    #[arg(short, long, default_value = "regular")]
    weight: String,

    /// Extra pixels between glyphs
    #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
    tracking: i32,

    /// Advance every glyph by this many pixels
    #[arg(long)]
    fixed: Option<u32>,

    #[arg(long)]
    italic: bool,
}

impl FontArgs {
    fn params(&self) -> Result<FontParams> {
        let weight = match self.weight.parse::<u16>() {
            Ok(weight) => weight,
            Err(_) => FontWeight::from_name(&self.weight)
                .with_context(|| format!("unknown weight '{}'", self.weight))?
                .to_number(),
        };

        let mut params = FontParams::new(self.face.clone(), self.size, weight)
            .with_tracking(self.tracking)
            .with_fixed_width(self.fixed.unwrap_or(0));
        if self.italic {
            params = params.italic();
        }
        Ok(params)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a font and write it to the cache folder
    Bake {
        #[command(flatten)]
        font: FontArgs,

        /// Cache folder (created if missing)
        #[arg(long)]
        cache: PathBuf,

        /// zlib compression level (0-9)
        #[arg(long, default_value_t = ZlibCodec::DEFAULT_LEVEL)]
        level: u32,
    },

    /// Print the contents of a font file
    Inspect {
        /// Font file
        file: PathBuf,

        /// Also list every kerned pair
        #[arg(long)]
        pairs: bool,
    },

    /// Render text to a PNG image
    Render {
        #[command(flatten)]
        font: FontArgs,

        /// Text to draw; `\n` starts a new line
        #[arg(long)]
        text: String,

        /// Output image
        #[arg(short, long)]
        out: PathBuf,

        #[arg(long, default_value = "400")]
        width: u32,

        #[arg(long, default_value = "120")]
        height: u32,

        /// normal, shadowed or embossed
        #[arg(long, default_value = "normal")]
        style: String,

        /// Paragraph alignment, e.g. top_left, middle_center, fit
        #[arg(long, default_value = "fit")]
        align: String,

        /// Text color (#RRGGBB or #AARRGGBB)
        #[arg(long, default_value = "#ffffff")]
        color: String,

        /// Bottom color for a vertical gradient
        #[arg(long)]
        color2: Option<String>,

        /// Background color
        #[arg(long, default_value = "#202020")]
        background: String,

        #[arg(long, default_value = "4")]
        padding: i64,
    },

    /// List facenames the rasterizer can use
    Faces,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = match &cli.config {
        Some(path) => FontSystemConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FontSystemConfig::standard(),
    };
    let provider: Arc<dyn RasterizationProvider> = if cli.synthetic {
        Arc::new(SyntheticRasterizer::new())
    } else {
        Arc::new(SystemRasterizer::new())
    };

    match cli.command {
        Commands::Bake { font, cache, level } => {
            let codec = ZlibCodec::new().with_level(level);
            cmd_bake(config, provider, codec, &font, &cache)
        }
        Commands::Inspect { file, pairs } => cmd_inspect(&file, pairs),
        Commands::Render {
            font,
            text,
            out,
            width,
            height,
            style,
            align,
            color,
            color2,
            background,
            padding,
        } => {
            let look = look_from_args(&style, &color, color2.as_deref())?;
            let alignment = Alignment::from_name(&align)
                .with_context(|| format!("unknown alignment '{align}'"))?;
            let request = RenderRequest {
                text: text.replace("\\n", "\n"),
                out,
                width,
                height,
                style: TextStyle::new(look, alignment).with_padding(padding),
                background: parse_color(&background)?,
            };
            cmd_render(config, provider, &font, &request)
        }
        Commands::Faces => cmd_faces(provider),
    }
}

fn cmd_bake(
    config: FontSystemConfig,
    provider: Arc<dyn RasterizationProvider>,
    codec: ZlibCodec,
    font: &FontArgs,
    cache: &Path,
) -> Result<()> {
    std::fs::create_dir_all(cache)
        .with_context(|| format!("Failed to create {}", cache.display()))?;

    let params = font.params()?;
    let config = FontSystemConfig {
        caching: true,
        ..config
    }
    .with_cache_dir(cache);
    let system = FontSystem::with_codec(config, provider, Arc::new(codec));

    let path = system
        .cache_path(&params)
        .context("Caching is not available for this font")?;
    let font = system.get_font(&params);
    if !path.exists() {
        bail!("Font was generated but {} was not written", path.display());
    }

    let missing = (0x20u8..=0x7e).filter(|&c| font.glyph(c).width() == 0).count();
    if missing > 0 {
        warn!("{} printable ASCII glyphs are blank", missing);
    }
    info!(
        "Baked '{}' at {}px into {}",
        params.facename,
        font.height(),
        path.display()
    );
    Ok(())
}

fn cmd_inspect(path: &Path, pairs: bool) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let image: FontImage = file::decode(&bytes, &ZlibCodec::new())
        .with_context(|| format!("{} is not a valid font file", path.display()))?;
    let header = &image.header;

    println!("{}", path.display());
    println!("==================");
    println!("Facename:    {}", header.facename);
    println!("Line height: {}px", header.height);
    println!("Weight:      {}", header.weight);
    println!("Tracking:    {}", header.tracking);
    println!("Fixed width: {}", header.fixed_width);
    println!("Italic:      {}", header.italic);
    println!("Symbolic:    {}", header.symbolic);
    println!();

    let present = image.glyphs.iter().filter(|g| g.width > 0).count();
    let spans: usize = image.glyphs.iter().map(|g| g.spans.len()).sum();
    let computed: usize = image
        .glyphs
        .iter()
        .map(|g| g.kerning.iter().filter(|&&k| k != KERN_UNSET).count())
        .sum();
    println!("Glyphs:         {present} / {}", image.glyphs.len());
    println!("Spans:          {spans}");
    println!("Kerning:        {computed} pairs computed");
    println!();

    println!("Widths (printable ASCII):");
    for row in (0x20u8..0x7f).collect::<Vec<_>>().chunks(16) {
        let line: Vec<String> = row
            .iter()
            .map(|&c| format!("{}:{:>2}", c as char, image.glyphs[c as usize].width))
            .collect();
        println!("  {}", line.join(" "));
    }

    if pairs {
        println!();
        println!("Kerned pairs:");
        for (first, glyph) in image.glyphs.iter().enumerate() {
            for (second, &kern) in glyph.kerning.iter().enumerate() {
                if kern != KERN_UNSET && kern != 0 {
                    println!(
                        "  {:?}{:?} {kern}",
                        char::from(first as u8),
                        char::from(second as u8)
                    );
                }
            }
        }
    }
    Ok(())
}

struct RenderRequest {
    text: String,
    out: PathBuf,
    width: u32,
    height: u32,
    style: TextStyle,
    background: Color,
}

fn cmd_render(
    config: FontSystemConfig,
    provider: Arc<dyn RasterizationProvider>,
    font: &FontArgs,
    request: &RenderRequest,
) -> Result<()> {
    let params = font.params()?;
    let system = FontSystem::new(config, provider);
    let font = system.get_font(&params);

    let mut surface = PixelBuffer::new(request.width, request.height);
    surface.fill(surface.bounds(), request.background);
    let bounds = surface.bounds();
    let fits = font.draw_paragraph(&mut surface, &request.text, bounds, &request.style, None);
    if !fits {
        warn!("Text does not fit in {}x{}", request.width, request.height);
    }

    let image = image::RgbaImage::from_raw(request.width, request.height, surface.to_rgba8())
        .context("Surface size does not match image size")?;
    image
        .save(&request.out)
        .with_context(|| format!("Failed to write {}", request.out.display()))?;

    let area = bounds.deflate(request.style.padding, request.style.padding);
    info!(
        "Rendered {} line(s) with '{}' at {}px to {}",
        font.line_count(area.width(), &request.text),
        params.facename,
        font.height(),
        request.out.display()
    );
    Ok(())
}

fn cmd_faces(provider: Arc<dyn RasterizationProvider>) -> Result<()> {
    let names = provider.facenames();
    if names.is_empty() {
        warn!("No facenames found");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn look_from_args(style: &str, color: &str, color2: Option<&str>) -> Result<TextLook> {
    let decoration = match style.to_ascii_lowercase().as_str() {
        "normal" => Decoration::Normal,
        "shadowed" | "shadow" => Decoration::Shadowed,
        "embossed" | "emboss" => Decoration::Embossed,
        other => bail!("unknown style '{other}'"),
    };
    let top = parse_color(color)?;
    let bottom = match color2 {
        Some(c) => parse_color(c)?,
        None => top,
    };
    Ok(TextLook::new(decoration, top, bottom))
}

/// `#RRGGBB` (opaque) or `#AARRGGBB`
fn parse_color(value: &str) -> Result<Color> {
    let hex = value.trim_start_matches('#');
    let parsed = u32::from_str_radix(hex, 16).with_context(|| format!("invalid color '{value}'"))?;
    match hex.len() {
        6 => Ok(Color::from_hex(parsed)),
        8 => Ok(Color(parsed)),
        _ => bail!("invalid color '{value}', expected #RRGGBB or #AARRGGBB"),
    }
}
