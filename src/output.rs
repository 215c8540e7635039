//! # Output Module
//!
//! Display collaborators for the rendered frame buffer:
//! - PNG export of the gamma encoded display values
//! - EXR export of linear HDR values (display gamma removed)
//! - Streaming to TEV (The EXR Viewer), also linear
//!
//! Failures are logged and never abort the render session.

use exr::prelude::*;
use image::{ImageBuffer, Rgb};
use log::{debug, info, warn};
use std::net::TcpStream;
use std::path::Path;
use tev_client::{PacketCreateImage, PacketUpdateImage, TevClient};

use crate::render::{linear_pixel, FrameBuffer};

/// Default TEV port when the address omits one.
pub const TEV_DEFAULT_PORT: u16 = 14158;

const TEV_IMAGE_NAME: &str = "oceantracer";

/// Supported output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// 8-bit, display gamma
    Png,
    /// 32-bit float, linear
    Exr,
}

impl OutputFormat {
    /// Pick the format from the file extension, case-insensitively.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "exr" => Some(Self::Exr),
            _ => None,
        }
    }
}

/// Write `buffer` to `path` in `format`.
pub fn save_image(buffer: &FrameBuffer, path: &str, format: OutputFormat) {
    match format {
        OutputFormat::Png => save_image_as_png(buffer, path),
        OutputFormat::Exr => save_image_as_exr(buffer, path),
    }
}

/// Quantize the display buffer to 8 bits per channel.
///
/// The buffer already carries display gamma, so values are only clamped and
/// scaled.
pub fn to_ldr(buffer: &FrameBuffer) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
    ImageBuffer::from_fn(buffer.width(), buffer.height(), |x, y| {
        let p = buffer.get_pixel(x, y);
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        Rgb([q(p[0]), q(p[1]), q(p[2])])
    })
}

/// Save the display buffer as an 8-bit PNG.
pub fn save_image_as_png(buffer: &FrameBuffer, output_path: &str) {
    match to_ldr(buffer).save(output_path) {
        Ok(_) => info!("Image saved as {}", output_path),
        Err(e) => warn!("Failed to save image: {}", e),
    }
}

/// Save the buffer as a linear HDR EXR.
pub fn save_image_as_exr(buffer: &FrameBuffer, output_path: &str) {
    let width = buffer.width() as usize;
    let result = write_rgb_file(output_path, width, buffer.height() as usize, |x, y| {
        let c = linear_pixel(buffer, x as u32, y as u32);
        (c.x, c.y, c.z)
    });

    match result {
        Ok(_) => info!("HDR image saved as EXR: {}", output_path),
        Err(e) => warn!("Failed to save EXR image: {}", e),
    }
}

/// Add the default TEV port if `address` has none.
pub fn tev_address(address: &str) -> String {
    if address.contains(':') {
        address.to_string()
    } else {
        format!("{}:{}", address, TEV_DEFAULT_PORT)
    }
}

/// Planar (RRR...GGG...BBB...) linear copy of the buffer, as TEV expects.
fn planar_linear(buffer: &FrameBuffer) -> Vec<f32> {
    let (width, height) = buffer.dimensions();
    let pixel_count = width as usize * height as usize;
    let mut data = vec![0.0; pixel_count * 3];
    for y in 0..height {
        for x in 0..width {
            let i = (y * width + x) as usize;
            let c = linear_pixel(buffer, x, y);
            data[i] = c.x;
            data[pixel_count + i] = c.y;
            data[2 * pixel_count + i] = c.z;
        }
    }
    data
}

/// Send the frame to a TEV instance for viewing.
pub fn send_image_to_tev(buffer: &FrameBuffer, address: &str) {
    let address = tev_address(address);
    let (width, height) = buffer.dimensions();

    debug!("Attempting to connect to TEV at {}", address);

    let stream = match TcpStream::connect(&address) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to connect to TEV on {}: {}", address, e);
            return;
        }
    };
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Failed to set TCP_NODELAY: {}", e);
    }
    let mut client = TevClient::wrap(stream);

    let create_packet = PacketCreateImage {
        image_name: TEV_IMAGE_NAME,
        width,
        height,
        channel_names: &["R", "G", "B"],
        grab_focus: true,
    };
    if let Err(e) = client.send(create_packet) {
        warn!("Failed to create image in TEV: {}", e);
        return;
    }

    let data = planar_linear(buffer);
    let start_time = std::time::Instant::now();
    let pixels = (width * height) as u64;

    let update_packet = PacketUpdateImage {
        image_name: TEV_IMAGE_NAME,
        grab_focus: false,
        channel_names: &["R", "G", "B"],
        x: 0,
        y: 0,
        width,
        height,
        channel_offsets: &[0, pixels, 2 * pixels],
        channel_strides: &[1, 1, 1],
        data: &data,
    };

    match client.send(update_packet) {
        Ok(_) => info!("Image sent to TEV at {} in {:.2?}", address, start_time.elapsed()),
        Err(e) => warn!("Failed to send image data to TEV: {}", e),
    }
}
