use std::path::PathBuf;

use anyhow::{Context, bail};
use rawkit_rs::image_pipeline::{
    CropRect, DecodeGateway, ThumbnailConfig, ThumbnailPipeline,
};
use rawkit_rs::logger;

use tracing::info;

const USAGE: &str = "usage: rawkit_rs <input.raw> <output[.jpg|.jpeg|.png|.tif|.tiff]> [quality] [--crop x0,y0,x1,y1]";

struct Args {
    input: PathBuf,
    output: PathBuf,
    config: ThumbnailConfig,
}

fn parse_crop(value: &str) -> anyhow::Result<CropRect> {
    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid crop {value:?}"))?;
    match parts[..] {
        [x0, y0, x1, y1] => Ok(CropRect::new(x0, y0, x1, y1)),
        _ => bail!("crop needs four values x0,y0,x1,y1, got {value:?}"),
    }
}

fn parse_args() -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut builder = ThumbnailConfig::builder();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--crop" {
            let value = args.next().context("--crop needs a value")?;
            builder = builder.crop(parse_crop(&value)?);
        } else {
            positional.push(arg);
        }
    }

    match positional.as_slice() {
        [input, output] => Ok(Args {
            input: input.into(),
            output: output.into(),
            config: builder.build(),
        }),
        [input, output, quality] => {
            let quality = quality
                .parse::<u8>()
                .with_context(|| format!("invalid quality {quality:?}"))?;
            Ok(Args {
                input: input.into(),
                output: output.into(),
                config: builder.quality(quality).build(),
            })
        }
        _ => bail!(USAGE),
    }
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let args = parse_args()?;

    let gateway = DecodeGateway::new();
    if let Some(version) = gateway.native_version()? {
        info!("Native decoder version {}", version);
    }

    let photo = gateway
        .decode(&args.input)
        .with_context(|| format!("decoding {}", args.input.display()))?;

    let metadata = &photo.metadata;
    info!(
        width = photo.image.width(),
        height = photo.image.height(),
        channels = photo.image.channels().count(),
        "Decoded {} {}",
        metadata.normalized_make,
        metadata.normalized_model
    );
    info!(
        iso = metadata.iso,
        shutter = metadata.shutter_speed,
        aperture = metadata.aperture,
        focal_length = metadata.focal_length,
        orientation = ?metadata.orientation(),
        "Exposure"
    );

    let written = ThumbnailPipeline::new()
        .create_thumbnail(&photo.image, &args.output, &args.config)
        .with_context(|| format!("writing thumbnail to {}", args.output.display()))?;

    info!("Thumbnail written to {}", written.display());
    Ok(())
}
