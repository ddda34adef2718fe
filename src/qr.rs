//! QR codes for short links

use core::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::ImageBuffer;
use image::ImageFormat;
use image::Rgba;
use qrcode::QrCode;
use qrcode::render::svg;
use qrcode::types::Color;
use qrcode::types::QrError;

/// Pixels per QR module
const SCALE: u32 = 10;

/// Quiet zone around the code, in modules
const MARGIN: u32 = 4;

/// Supported image formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QrFormat {
    /// `image/png`
    Png,

    /// `image/svg+xml`
    Svg,
}

impl QrFormat {
    /// Content type of the rendered image
    pub fn content_type(self) -> &'static str {
        match self {
            QrFormat::Png => "image/png",
            QrFormat::Svg => "image/svg+xml",
        }
    }
}

/// The image extension is not supported
#[derive(Debug, PartialEq, Eq)]
pub struct UnsupportedFormat(pub String);

impl FromStr for QrFormat {
    type Err = UnsupportedFormat;

    fn from_str(extension: &str) -> Result<Self, Self::Err> {
        match extension {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            other => Err(UnsupportedFormat(other.to_string())),
        }
    }
}

/// Rendering errors
#[derive(Debug)]
pub enum Error {
    /// The data does not fit in a QR code
    Encode(QrError),

    /// The image could not be written
    Image(image::ImageError),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Encode(error) => write!(f, "Could not encode QR code: {error}"),
            Error::Image(error) => write!(f, "Could not write QR image: {error}"),
        }
    }
}

/// Render the URL as QR image on a transparent background
pub fn render(url: &str, format: QrFormat) -> Result<Vec<u8>, Error> {
    let code = QrCode::new(url.as_bytes()).map_err(Error::Encode)?;

    match format {
        QrFormat::Png => render_png(&code),
        QrFormat::Svg => Ok(render_svg(&code).into_bytes()),
    }
}

/// Every dark module becomes a black square, everything else stays transparent
fn render_png(code: &QrCode) -> Result<Vec<u8>, Error> {
    let module_count =
        u32::try_from(code.width()).map_err(|_| Error::Encode(QrError::DataTooLong))?;
    let image_size = (module_count + MARGIN * 2) * SCALE;

    let mut image = ImageBuffer::from_pixel(image_size, image_size, Rgba([0u8, 0, 0, 0]));

    for y in 0..module_count {
        for x in 0..module_count {
            if code[(x as usize, y as usize)] != Color::Dark {
                continue;
            }

            let x0 = (x + MARGIN) * SCALE;
            let y0 = (y + MARGIN) * SCALE;

            for dy in 0..SCALE {
                for dx in 0..SCALE {
                    image.put_pixel(x0 + dx, y0 + dy, Rgba([0u8, 0, 0, 255]));
                }
            }
        }
    }

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(Error::Image)?;

    Ok(bytes)
}

fn render_svg(code: &QrCode) -> String {
    code.render::<svg::Color>()
        .min_dimensions(200, 200)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("none"))
        .build()
}
