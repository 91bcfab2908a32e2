//! Simple collaborators that make the session usable without a face
//! detector or an embedding network: the whole frame is the face, and the
//! embedding is a block-averaged thumbnail.

use crate::collaborators::{
    BoundingBox, CaptureSource, Command, CommandSource, Cropper, Detector, Encoder,
};
use facegate_core::{Embedding, Error, Result};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_FACE_SIZE: u32 = 64;
pub const DEFAULT_GRID: u32 = 16;

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Treats the whole image as a single face
#[derive(Debug, Clone, Copy, Default)]
pub struct FullFrameDetector;

impl Detector for FullFrameDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<BoundingBox>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![BoundingBox::new(0, 0, width, height)])
    }
}

/// Crops, converts to grayscale and resizes to `size` x `size`
#[derive(Debug, Clone, Copy)]
pub struct ResizeCropper {
    size: u32,
}

impl ResizeCropper {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }
}

impl Default for ResizeCropper {
    fn default() -> Self {
        Self::new(DEFAULT_FACE_SIZE)
    }
}

impl Cropper for ResizeCropper {
    fn crop(&self, image: &RgbImage, bbox: BoundingBox) -> RgbImage {
        imageops::crop_imm(image, bbox.xmin, bbox.ymin, bbox.width(), bbox.height()).to_image()
    }

    fn process(&self, image: &RgbImage) -> GrayImage {
        let gray = imageops::grayscale(image);
        imageops::resize(&gray, self.size, self.size, FilterType::Triangle)
    }
}

/// Deterministic `grid * grid` embedding: block-averaged intensities,
/// mean-centred and scaled to unit length
#[derive(Debug, Clone, Copy)]
pub struct GridEncoder {
    grid: u32,
}

impl GridEncoder {
    pub fn new(grid: u32) -> Self {
        Self { grid: grid.max(1) }
    }

    pub fn dim(&self) -> usize {
        (self.grid * self.grid) as usize
    }

    fn encode_one(&self, image: &GrayImage) -> Result<Embedding> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::Encoder("cannot encode an empty image".to_string()));
        }

        let thumb = imageops::resize(image, self.grid, self.grid, FilterType::Triangle);
        let mut data: Vec<f32> = thumb.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
        let mean = data.iter().sum::<f32>() / data.len() as f32;
        for x in &mut data {
            *x -= mean;
        }

        let mut embedding = Embedding::new(data);
        embedding.normalize();
        Ok(embedding)
    }
}

impl Default for GridEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_GRID)
    }
}

impl Encoder for GridEncoder {
    fn encode(&self, images: &[GrayImage]) -> Result<Vec<Embedding>> {
        images.iter().map(|image| self.encode_one(image)).collect()
    }
}

/// Replays the images of a directory, in name order, as an endless
/// camera stream
pub struct DirectoryCapture {
    frames: Vec<PathBuf>,
    next: usize,
    released: bool,
}

impl DirectoryCapture {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut frames = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_frame = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_frame && path.is_file() {
                frames.push(path);
            }
        }
        frames.sort();

        if frames.is_empty() {
            return Err(Error::Capture(format!("no frames found in {}", dir.display())));
        }
        info!("Capturing {} frames from {:?}", frames.len(), dir);

        Ok(Self {
            frames,
            next: 0,
            released: false,
        })
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl CaptureSource for DirectoryCapture {
    fn get_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.released {
            return Err(Error::Capture("capture source already released".to_string()));
        }

        let path = &self.frames[self.next];
        self.next = (self.next + 1) % self.frames.len();

        match image::open(path) {
            Ok(image) => Ok(Some(image.to_rgb8())),
            Err(e) => {
                warn!("Dropping unreadable frame {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            info!("Capture source released");
        }
    }
}

/// One command per input line; end of input quits
pub struct LineCommands<R> {
    reader: R,
}

impl<R: BufRead> LineCommands<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> CommandSource for LineCommands<R> {
    fn next_command(&mut self) -> Result<Command> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(Command::Quit);
        }

        let key = line.trim();
        Ok(Command::from_key(key).unwrap_or_else(|| {
            warn!("Unknown command {:?}", key);
            Command::Continue
        }))
    }
}
