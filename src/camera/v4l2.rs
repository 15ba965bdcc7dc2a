use crate::camera::{Frame, FrameSource};
use crate::config::CameraConfig;
use crate::error::{FaceGateError, Result};
use image::{DynamicImage, ImageBuffer, Luma};
use std::io::Cursor;
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

pub struct Camera {
    device: Device,
    config: CameraConfig,
}

/// Streaming session: the stream is opened and the sensor warmed up once,
/// so captures within the session just dequeue the next buffer.
pub struct CameraSession<'a> {
    stream: v4l::io::mmap::Stream<'a>,
    fourcc: String,
    width: u32,
    height: u32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Result<Self> {
        tracing::debug!("opening camera device {}", config.device_index);

        let device = Device::new(config.device_index as usize).map_err(|e| {
            FaceGateError::CaptureUnavailable(format!(
                "failed to open camera {}: {}", config.device_index, e
            ))
        })?;

        let mut fmt = device
            .format()
            .map_err(|e| FaceGateError::CaptureUnavailable(format!("failed to get format: {}", e)))?;

        fmt.width = config.width;
        fmt.height = config.height;

        // Keep GREY for IR sensors, otherwise request MJPG
        if fmt.fourcc.str().ok() != Some("GREY") {
            fmt.fourcc = FourCC::new(b"MJPG");
        }

        if let Err(e) = device.set_format(&fmt) {
            tracing::warn!("could not set requested camera format: {}. Using device defaults.", e);
        }

        let final_fmt = device
            .format()
            .map_err(|e| FaceGateError::CaptureUnavailable(format!("failed to get format: {}", e)))?;
        if final_fmt.width != config.width || final_fmt.height != config.height {
            tracing::warn!(
                "camera resolution {}x{} differs from requested {}x{}",
                final_fmt.width, final_fmt.height, config.width, config.height
            );
        }

        Ok(Self { device, config: config.clone() })
    }

    /// Start a streaming session for the run. The session holds the device
    /// exclusively until it is dropped.
    pub fn start_session(&mut self) -> Result<CameraSession<'_>> {
        let fmt = self
            .device
            .format()
            .map_err(|e| FaceGateError::CaptureUnavailable(format!("failed to get format: {}", e)))?;
        let fourcc = fmt.fourcc.str().unwrap_or("UNKNOWN").to_string();

        let mut stream = v4l::io::mmap::Stream::with_buffers(&mut self.device, Type::VideoCapture, 4)
            .map_err(|e| {
                FaceGateError::CaptureUnavailable(format!("failed to create stream: {}", e))
            })?;

        // Let the sensor settle once, before the first real frame
        tracing::debug!("warming up camera");
        for _ in 0..self.config.warmup_frames {
            stream.next().map_err(|e| {
                FaceGateError::CaptureUnavailable(format!("failed to capture warmup frame: {}", e))
            })?;
            std::thread::sleep(std::time::Duration::from_millis(self.config.warmup_delay_ms));
        }

        Ok(CameraSession { stream, fourcc, width: fmt.width, height: fmt.height })
    }
}

impl FrameSource for CameraSession<'_> {
    fn capture(&mut self) -> Result<Frame> {
        let (buf, _meta) = self
            .stream
            .next()
            .map_err(|e| FaceGateError::CaptureUnavailable(format!("failed to capture: {}", e)))?;

        let image = decode(&self.fourcc, buf, self.width, self.height)?;
        encode_png(&image)
    }
}

fn decode(fourcc: &str, data: &[u8], width: u32, height: u32) -> Result<DynamicImage> {
    match fourcc {
        "GREY" => {
            let buffer = ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data.to_vec())
                .ok_or_else(|| {
                    FaceGateError::CaptureUnavailable("grayscale buffer size mismatch".into())
                })?;
            Ok(DynamicImage::ImageLuma8(buffer))
        }
        "MJPG" => image::load_from_memory(data).map_err(|e| {
            FaceGateError::CaptureUnavailable(format!("failed to decode MJPG frame: {}", e))
        }),
        other => Err(FaceGateError::CaptureUnavailable(format!(
            "unsupported camera format {}", other
        ))),
    }
}

fn encode_png(image: &DynamicImage) -> Result<Frame> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .map_err(|e| {
            FaceGateError::CaptureUnavailable(format!("failed to encode frame: {}", e))
        })?;
    Ok(Frame::new(png))
}
