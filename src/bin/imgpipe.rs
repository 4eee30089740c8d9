use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use imgpipe::{
    Area, BuiltinDecoderOpts, Color32, ColorFormat, Compositor, CompositorOpts, DecodeDescriptor,
    DecodeSession, DecoderRegistry, DrawImageDsc, ImageHeader, ImageSource, PixelBuf,
    PixelBufMut, SessionState,
};

#[derive(Parser, Debug)]
#[command(name = "imgpipe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the header and capabilities of an image as JSON.
    Info(InfoArgs),
    /// Decode an image, draw it onto a solid canvas and write a PNG.
    Blit(BlitArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Image file, or symbol text with `--symbol`.
    source: String,

    /// Treat SOURCE as symbol text instead of a path.
    #[arg(long)]
    symbol: bool,
}

#[derive(Parser, Debug)]
struct BlitArgs {
    /// Input image file.
    #[arg(long)]
    src: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Canvas size as WxH (defaults to the image size).
    #[arg(long, value_parser = parse_pair::<'x'>)]
    canvas: Option<(i32, i32)>,

    /// Top-left corner of the image on the canvas, as X,Y.
    #[arg(long, value_parser = parse_pair::<','>, default_value = "0,0")]
    at: (i32, i32),

    /// Draw descriptor as JSON, e.g. '{"angle":900,"pivot":{"x":8,"y":8}}'.
    #[arg(long)]
    dsc: Option<String>,

    /// Canvas color as RRGGBB hex.
    #[arg(long, default_value = "000000")]
    bg: String,
}

fn parse_pair<const SEP: char>(s: &str) -> Result<(i32, i32), String> {
    let (a, b) = s
        .split_once(SEP)
        .ok_or_else(|| format!("expected two numbers separated by '{SEP}'"))?;
    let a = a.trim().parse::<i32>().map_err(|e| e.to_string())?;
    let b = b.trim().parse::<i32>().map_err(|e| e.to_string())?;
    Ok((a, b))
}

#[derive(serde::Serialize)]
struct InfoReport<'a> {
    source: String,
    decoder: &'a str,
    header: ImageHeader,
    caps: imgpipe::DecoderCaps,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Blit(args) => cmd_blit(args),
    }
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let registry = DecoderRegistry::with_builtins(BuiltinDecoderOpts::default());
    let src = if args.symbol {
        ImageSource::symbol(&args.source)?
    } else {
        ImageSource::file(&args.source)?
    };

    let (id, caps) = registry
        .find_accepting(&src)
        .with_context(|| format!("no decoder accepts {src}"))?;
    let decoder = registry.get(id).map(|d| d.name()).unwrap_or("?");
    let header = registry.get_info(&src)?;

    let report = InfoReport {
        source: src.to_string(),
        decoder,
        header,
        caps,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_blit(args: BlitArgs) -> anyhow::Result<()> {
    let dsc: DrawImageDsc = match &args.dsc {
        Some(json) => serde_json::from_str(json).with_context(|| "parse --dsc JSON")?,
        None => DrawImageDsc::default(),
    };
    dsc.validate()?;
    let bg = u32::from_str_radix(args.bg.trim_start_matches('#'), 16)
        .with_context(|| format!("parse --bg '{}'", args.bg))?;

    let registry = DecoderRegistry::with_builtins(BuiltinDecoderOpts::default());
    let (header, pixels) = decode_to_colors(&registry, &args.src)?;
    let (img_w, img_h) = (header.w as i32, header.h as i32);

    let (cw, ch) = args.canvas.unwrap_or((img_w, img_h));
    anyhow::ensure!(cw > 0 && ch > 0, "canvas must not be empty");
    let mut canvas = vec![Color32::hex(bg); (cw * ch) as usize];

    {
        let src = PixelBuf::new(&pixels, header.w.max(1) as usize)?;
        let mut dest = PixelBufMut::new(&mut canvas, cw as usize)?;
        let mut compositor = Compositor::software(CompositorOpts::default());
        compositor.blit(
            &mut dest,
            Area::from_size(args.at.0, args.at.1, img_w, img_h),
            &src,
            Area::from_size(0, 0, img_w, img_h),
            &dsc,
            header.cf,
        );
    }

    write_png(&args.out, &canvas, cw as u32, ch as u32)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// Decode the first frame of `path` into native pixels, reading lines for streaming decoders.
fn decode_to_colors(
    registry: &DecoderRegistry,
    path: &Path,
) -> anyhow::Result<(ImageHeader, Vec<Color32>)> {
    let src = ImageSource::file(&path.to_string_lossy())?;
    let session = DecodeSession::open(registry, DecodeDescriptor::new(src))?;
    let header = session.header();
    anyhow::ensure!(header.w > 0 && header.h > 0, "image is empty");

    let state = session.state();
    let pixels = match state {
        SessionState::Buffered => session
            .pixels()
            .context("buffered session without pixels")?
            .as_colors()?
            .to_vec(),
        _ => {
            let mut session = session;
            let bpp = header.cf.bytes_per_pixel().max(1);
            let mut row = vec![0u8; header.w as usize * bpp];
            let mut out = Vec::with_capacity(header.w as usize * header.h as usize);
            for y in 0..header.h {
                session.read_line(0, y, header.w, &mut row)?;
                match header.cf {
                    ColorFormat::Alpha8 => {
                        out.extend(row.iter().map(|&a| Color32::BLACK.with_alpha(a)))
                    }
                    _ => out.extend_from_slice(bytemuck::cast_slice::<u8, Color32>(&row)),
                }
            }
            out
        }
    };
    Ok((header, pixels))
}

fn write_png(path: &Path, pixels: &[Color32], w: u32, h: u32) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let rgba: Vec<u8> = pixels
        .iter()
        .flat_map(|c| [c.r, c.g, c.b, 255])
        .collect();
    image::save_buffer_with_format(
        path,
        &rgba,
        w,
        h,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
