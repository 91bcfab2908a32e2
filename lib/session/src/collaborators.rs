// Narrow interfaces to the parts of the pipeline the engine does not own:
// detection, cropping, encoding, capture and user input.

use facegate_core::{Embedding, Result};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Face location in pixel coordinates; `xmax`/`ymax` are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: u32,
    pub ymin: u32,
    pub xmax: u32,
    pub ymax: u32,
}

impl BoundingBox {
    #[inline]
    #[must_use]
    pub fn new(xmin: u32, ymin: u32, xmax: u32, ymax: u32) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.xmax.saturating_sub(self.xmin)
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.ymax.saturating_sub(self.ymin)
    }

    /// Clip to a `width` x `height` image; `None` if nothing is left
    pub fn clamp(&self, width: u32, height: u32) -> Option<BoundingBox> {
        let clipped = BoundingBox {
            xmin: self.xmin.min(width),
            ymin: self.ymin.min(height),
            xmax: self.xmax.min(width),
            ymax: self.ymax.min(height),
        };
        (clipped.width() > 0 && clipped.height() > 0).then_some(clipped)
    }
}

pub trait Detector {
    /// Zero or more face boxes; order is irrelevant
    fn detect(&self, image: &RgbImage) -> Result<Vec<BoundingBox>>;
}

pub trait Cropper {
    /// Cut `bbox` out of `image`. The box is already clamped to the image.
    fn crop(&self, image: &RgbImage, bbox: BoundingBox) -> RgbImage;

    /// Normalize a crop into the fixed-size image the encoder expects
    fn process(&self, image: &RgbImage) -> GrayImage;
}

pub trait Encoder {
    /// One embedding per input image, same dimension across calls
    fn encode(&self, images: &[GrayImage]) -> Result<Vec<Embedding>>;
}

pub trait CaptureSource {
    /// Blocks for the next frame. `None` is a dropped frame, not the end.
    fn get_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Release the device. Calling it again is a no-op.
    fn release(&mut self);
}

/// What the user asked for after a frame was shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// No input; go on to the next frame
    Continue,
    Quit,
    /// Write the annotated frame to the snapshot path
    SaveFrame,
    /// Enroll the selected face under its predicted identity
    Enroll,
    /// Enroll the selected face as a brand-new identity
    EnrollNew,
    /// Remove every stored sample of the selected identity
    Delete,
}

impl Command {
    /// Map a key (or typed line) to a command
    pub fn from_key(key: &str) -> Option<Command> {
        match key {
            "" => Some(Command::Continue),
            "q" | "quit" | "\u{1b}" => Some(Command::Quit),
            "s" | "save" => Some(Command::SaveFrame),
            "a" | "add" => Some(Command::Enroll),
            "n" | "new" => Some(Command::EnrollNew),
            "d" | "delete" => Some(Command::Delete),
            _ => None,
        }
    }
}

pub trait CommandSource {
    /// Blocks for the next user command
    fn next_command(&mut self) -> Result<Command>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_clamp() {
        let b = BoundingBox::new(5, 5, 50, 50);
        assert_eq!(b.clamp(20, 30), Some(BoundingBox::new(5, 5, 20, 30)));
        assert_eq!(b.clamp(5, 30), None);
        assert_eq!(BoundingBox::new(4, 4, 2, 8).clamp(10, 10), None);
    }

    #[test]
    fn test_command_keys() {
        assert_eq!(Command::from_key("q"), Some(Command::Quit));
        assert_eq!(Command::from_key("\u{1b}"), Some(Command::Quit));
        assert_eq!(Command::from_key("a"), Some(Command::Enroll));
        assert_eq!(Command::from_key("n"), Some(Command::EnrollNew));
        assert_eq!(Command::from_key("d"), Some(Command::Delete));
        assert_eq!(Command::from_key("s"), Some(Command::SaveFrame));
        assert_eq!(Command::from_key(""), Some(Command::Continue));
        assert_eq!(Command::from_key("x"), None);
    }
}
