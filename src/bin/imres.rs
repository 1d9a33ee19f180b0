use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "imres", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List decodable formats and their decoders.
    Formats,
    /// Print size, format, opacity, and frame count.
    Info(InfoArgs),
    /// Decode fully and print every frame delay.
    Frames(FramesArgs),
    /// Render one frame as a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input image.
    input: PathBuf,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input image.
    input: PathBuf,

    /// Apply the display-compat delay rule.
    #[arg(long)]
    compat: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input image.
    input: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Frame index (0-based); wraps around the frame count.
    #[arg(long, default_value_t = 0)]
    frame: usize,

    /// Integer downscale ratio.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    ratio: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Formats => cmd_formats(),
        Command::Info(args) => cmd_info(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))
}

fn cmd_formats() -> anyhow::Result<()> {
    for format in imres::supported_formats() {
        let desc = imres::decoder_description(format).unwrap_or("-");
        println!("{format}\t{desc}");
    }
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let bytes = read_input(&args.input)?;
    let info = imres::decode_info(&bytes)
        .with_context(|| format!("probe '{}'", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }
    let frames = info
        .frame_count
        .map_or_else(|| "unknown".to_string(), |n| n.to_string());
    println!(
        "{} {}x{} opaque={} frames={frames}",
        info.format, info.width, info.height, info.opaque
    );
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let bytes = read_input(&args.input)?;
    let opts = imres::DecodeOpts {
        display_compat: args.compat,
        ..imres::DecodeOpts::default()
    };
    let res = imres::decode_with(&bytes, &opts)
        .with_context(|| format!("decode '{}'", args.input.display()))?;

    let count = res.frame_count()?;
    for i in 0..count {
        let delay = res.delay(i)?;
        if delay == imres::DELAY_FOREVER {
            println!("{i}\tforever");
        } else {
            println!("{i}\t{delay}");
        }
    }
    eprintln!(
        "{} frame(s), {} bytes decoded",
        count,
        res.byte_count()?
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let bytes = read_input(&args.input)?;
    let res = imres::decode(&bytes, false)
        .with_context(|| format!("decode '{}'", args.input.display()))?;

    let mut renderer = res.create_renderer()?;
    for _ in 0..args.frame % res.frame_count()? {
        renderer.advance()?;
    }

    let ratio = args.ratio.min(res.width().min(res.height()).max(1));
    let mut surface = imres::Surface::try_new(
        res.width() / ratio,
        res.height() / ratio,
        imres::PixelConfig::Rgba8888,
    )?;
    let blit = imres::Blit::full(res.width(), res.height()).with_ratio(ratio);
    renderer.render(&mut surface, blit, Some(imres::Rgba8::TRANSPARENT))?;
    renderer.recycle()?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        surface.data(),
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
