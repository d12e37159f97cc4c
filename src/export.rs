//! Frame naming, recompression and encoding.
//!
//! Every written frame is named `frame_<index>_<HH-MM-SS>.<ext>`, with the
//! index zero-padded to a width shared by the whole run so lexicographic
//! order matches index order.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use image::{
    ExtendedColorType, ImageEncoder, ImageError, RgbImage,
    codecs::{
        bmp::BmpEncoder,
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
    },
};

use crate::{configuration::OutputFormat, error::FramedumpError, utilities};

/// Minimum number of digits in the index part of a file name.
pub const MIN_INDEX_WIDTH: usize = 4;

/// JPEG quality used for the lossy recompression pass.
pub const COMPRESSED_JPEG_QUALITY: u8 = 50;

/// JPEG quality of the final encode, matching OpenCV's `imwrite` default.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// A frame that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    /// Index of the frame in the video.
    pub frame_number: u64,
    /// Presentation offset of the frame.
    pub timestamp: Duration,
    /// File name within the output directory.
    pub file_name: String,
    /// Full path of the written file.
    pub path: PathBuf,
}

/// Digits needed for the index part of file names when `last_frame` is the
/// largest sampled index.
///
/// Never less than [`MIN_INDEX_WIDTH`].
pub fn index_width(last_frame: Option<u64>) -> usize {
    let digits = last_frame.map_or(1, |frame| frame.checked_ilog10().unwrap_or(0) as usize + 1);
    digits.max(MIN_INDEX_WIDTH)
}

/// Build the file name of one frame.
///
/// ```
/// use std::time::Duration;
///
/// use framedump::{OutputFormat, frame_file_name};
///
/// let name = frame_file_name(75, Duration::from_millis(2_500), OutputFormat::Jpg, 4);
/// assert_eq!(name, "frame_0075_00-00-02.jpg");
/// ```
pub fn frame_file_name(
    frame_number: u64,
    timestamp: Duration,
    format: OutputFormat,
    index_width: usize,
) -> String {
    format!(
        "frame_{frame_number:0index_width$}_{}.{}",
        utilities::format_timestamp(timestamp),
        format.extension(),
    )
}

/// Apply the format-specific recompression pass.
///
/// JPEG frames go through a lossy encode at [`COMPRESSED_JPEG_QUALITY`] and
/// are decoded back. PNG frames go through a best-compression encode and are
/// decoded back, which leaves the pixels unchanged. BMP frames are returned
/// as is.
pub(crate) fn compress_frame(
    image: RgbImage,
    format: OutputFormat,
) -> Result<RgbImage, ImageError> {
    if format == OutputFormat::Bmp {
        return Ok(image);
    }

    let mut buffer = Vec::new();
    encode(
        &image,
        &mut buffer,
        format,
        COMPRESSED_JPEG_QUALITY,
        CompressionType::Best,
    )?;
    let decoded = image::load_from_memory_with_format(&buffer, format.to_image_format())?;
    Ok(decoded.into_rgb8())
}

/// Encode `image` and write it to `path`.
///
/// PNG files are written with best compression when `compress` is set. If
/// encoding fails after the file was created, the partial file is removed.
pub(crate) fn write_frame(
    image: &RgbImage,
    path: &Path,
    format: OutputFormat,
    compress: bool,
) -> Result<(), FramedumpError> {
    let png_compression = if compress {
        CompressionType::Best
    } else {
        CompressionType::Default
    };

    let mut writer = BufWriter::new(File::create(path)?);
    let written = encode(
        image,
        &mut writer,
        format,
        DEFAULT_JPEG_QUALITY,
        png_compression,
    )
    .map_err(FramedumpError::from)
    .and_then(|()| writer.flush().map_err(FramedumpError::from));
    drop(writer);

    if let Err(error) = written {
        if let Err(remove_error) = fs::remove_file(path) {
            log::warn!("Could not remove partial frame {}: {remove_error}", path.display());
        }
        return Err(error);
    }
    Ok(())
}

fn encode<W: Write>(
    image: &RgbImage,
    mut writer: W,
    format: OutputFormat,
    jpeg_quality: u8,
    png_compression: CompressionType,
) -> Result<(), ImageError> {
    let (width, height) = image.dimensions();
    let pixels = image.as_raw();

    match format {
        OutputFormat::Jpg => JpegEncoder::new_with_quality(writer, jpeg_quality).write_image(
            pixels,
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
        OutputFormat::Png => PngEncoder::new_with_quality(
            writer,
            png_compression,
            FilterType::Adaptive,
        )
        .write_image(pixels, width, height, ExtendedColorType::Rgb8),
        OutputFormat::Bmp => BmpEncoder::new(&mut writer).write_image(
            pixels,
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
    }
}
