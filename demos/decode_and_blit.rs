//! Decode an in-memory PNG and an animated GIF, then draw them rotated onto a canvas.
//!
//! `cargo run --example decode_and_blit -- out.png`

use std::io::Cursor;
use std::path::PathBuf;

use imgpipe::{
    Area, BuiltinDecoderOpts, Color32, Compositor, CompositorOpts, DecodeDescriptor,
    DecodeSession, DecoderRegistry, DrawImageDsc, ImageSource, PixelBuf, PixelBufMut,
};

const CANVAS: (i32, i32) = (96, 48);

fn arrow_png() -> anyhow::Result<Vec<u8>> {
    let img = image::RgbaImage::from_fn(32, 32, |x, y| {
        let shaft = x < 20 && (12..20).contains(&y);
        let head = x >= 20 && y.abs_diff(16) <= 31 - x;
        if shaft || head {
            image::Rgba([240, 180, 40, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

fn blinking_gif() -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut enc = image::codecs::gif::GifEncoder::new(&mut buf);
        for shade in [60u8, 200] {
            let img = image::RgbaImage::from_pixel(16, 16, image::Rgba([shade, shade, 255, 255]));
            let delay = image::Delay::from_numer_denom_ms(250, 1);
            enc.encode_frame(image::Frame::from_parts(img, 0, 0, delay))?;
        }
    }
    Ok(buf)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let out = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("decode_and_blit.png"));

    let registry = DecoderRegistry::with_builtins(BuiltinDecoderOpts::default());
    let mut canvas = vec![Color32::hex(0x12141c); (CANVAS.0 * CANVAS.1) as usize];
    let mut compositor = Compositor::software(CompositorOpts::default());

    // Arrow rotated a quarter turn about its center, at 75% opacity.
    let arrow = DecodeSession::open(
        &registry,
        DecodeDescriptor::new(ImageSource::buffer(arrow_png()?)),
    )?;
    let header = arrow.header();
    let pixels = arrow
        .pixels()
        .ok_or_else(|| anyhow::anyhow!("arrow decoded without a pixel buffer"))?
        .as_colors()?;
    let dsc = DrawImageDsc::new()
        .with_angle(900)
        .with_pivot(16, 16)
        .with_opa(192);
    let area = Area::from_size(0, 0, header.w as i32, header.h as i32);
    {
        let mut dest = PixelBufMut::new(&mut canvas, CANVAS.0 as usize)?;
        let src = PixelBuf::new(pixels, header.w as usize)?;
        compositor.blit(
            &mut dest,
            Area::from_size(8, 8, 32, 32),
            &src,
            area,
            &dsc,
            header.cf,
        );
    }
    drop(arrow);

    // Second GIF frame, recolored towards red.
    let mut gif = DecodeSession::open(
        &registry,
        DecodeDescriptor::new(ImageSource::buffer(blinking_gif()?)),
    )?;
    gif.advance_to(1)?;
    let header = gif.header();
    let pixels = gif
        .pixels()
        .ok_or_else(|| anyhow::anyhow!("gif decoded without a pixel buffer"))?
        .as_colors()?;
    let dsc = DrawImageDsc::new().with_recolor(Color32::rgb(255, 0, 0), 96);
    {
        let mut dest = PixelBufMut::new(&mut canvas, CANVAS.0 as usize)?;
        let src = PixelBuf::new(pixels, header.w as usize)?;
        let size = Area::from_size(0, 0, header.w as i32, header.h as i32);
        compositor.blit(
            &mut dest,
            Area::from_size(60, 16, header.w as i32, header.h as i32),
            &src,
            size,
            &dsc,
            header.cf,
        );
    }
    tracing::info!(frame = 1, total = gif.context().map(|c| c.total_frames), "drew gif frame");

    let rgba: Vec<u8> = canvas.iter().flat_map(|c| [c.r, c.g, c.b, 255]).collect();
    image::save_buffer_with_format(
        &out,
        &rgba,
        CANVAS.0 as u32,
        CANVAS.1 as u32,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
