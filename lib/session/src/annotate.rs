//! Frame annotation: a box outline per face plus the predicted uid drawn
//! with a 3x5 pixel font in the box's top-left corner.

use crate::collaborators::BoundingBox;
use facegate_core::Identity;
use image::{Rgb, RgbImage};

pub const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const UNKNOWN_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;
const LABEL_MARGIN: u32 = 2;

/// Rows of a 3x5 glyph, most significant of the low three bits is the left column
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];
const UNKNOWN: [u8; 5] = [0b111, 0b001, 0b011, 0b000, 0b010];

/// Outline `bbox` and label it with `identity`. The box must already be
/// clamped to the image.
pub fn annotate(image: &mut RgbImage, bbox: BoundingBox, identity: Identity) {
    let color = match identity {
        Identity::Existing(_) => BOX_COLOR,
        Identity::New => UNKNOWN_COLOR,
    };
    draw_box(image, bbox, color);
    draw_label(image, bbox, identity, color);
}

/// One-pixel rectangle outline
fn draw_box(image: &mut RgbImage, bbox: BoundingBox, color: Rgb<u8>) {
    let (right, bottom) = (bbox.xmax - 1, bbox.ymax - 1);
    for x in bbox.xmin..bbox.xmax {
        image.put_pixel(x, bbox.ymin, color);
        image.put_pixel(x, bottom, color);
    }
    for y in bbox.ymin..bbox.ymax {
        image.put_pixel(bbox.xmin, y, color);
        image.put_pixel(right, y, color);
    }
}

fn glyphs(identity: Identity) -> Vec<[u8; 5]> {
    match identity {
        Identity::New => vec![UNKNOWN],
        Identity::Existing(uid) => uid
            .to_string()
            .bytes()
            .map(|b| DIGITS[(b - b'0') as usize])
            .collect(),
    }
}

/// Glyphs scale with the box and are clipped to its interior
fn draw_label(image: &mut RgbImage, bbox: BoundingBox, identity: Identity, color: Rgb<u8>) {
    let scale = (bbox.height() / 48).max(1);
    let origin_x = bbox.xmin + LABEL_MARGIN;
    let origin_y = bbox.ymin + LABEL_MARGIN;
    let advance = (GLYPH_WIDTH + 1) * scale;

    for (n, glyph) in glyphs(identity).iter().enumerate() {
        let glyph_x = origin_x + n as u32 * advance;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = glyph_x + col * scale + dx;
                        let y = origin_y + row as u32 * scale + dy;
                        if x + 1 < bbox.xmax && y + 1 < bbox.ymax {
                            image.put_pixel(x, y, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facegate_core::Uid;

    const BACKGROUND: Rgb<u8> = Rgb([7, 7, 7]);

    fn canvas(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, BACKGROUND)
    }

    /// Pixels set inside the label area, as rows of '#' and '.'
    fn label_rows(image: &RgbImage, width: u32) -> Vec<String> {
        (0..GLYPH_HEIGHT)
            .map(|row| {
                (0..width)
                    .map(|col| {
                        let pixel = image.get_pixel(LABEL_MARGIN + col, LABEL_MARGIN + row);
                        if *pixel == BACKGROUND { '.' } else { '#' }
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_known_face_label() {
        let mut image = canvas(20, 20);
        annotate(&mut image, BoundingBox::new(0, 0, 20, 20), Identity::Existing(Uid(17)));

        assert_eq!(*image.get_pixel(0, 0), BOX_COLOR);
        assert_eq!(*image.get_pixel(19, 19), BOX_COLOR);
        assert_eq!(
            label_rows(&image, 7),
            vec![".#..###", "##....#", ".#....#", ".#....#", "###...#"]
        );
        assert_eq!(*image.get_pixel(3, 2), BOX_COLOR);
        assert_eq!(*image.get_pixel(10, 10), BACKGROUND);
    }

    #[test]
    fn test_unknown_face_label() {
        let mut image = canvas(12, 12);
        annotate(&mut image, BoundingBox::new(0, 0, 12, 12), Identity::New);

        assert_eq!(*image.get_pixel(0, 0), UNKNOWN_COLOR);
        assert_eq!(label_rows(&image, 3), vec!["###", "..#", ".##", "...", ".#."]);
    }

    #[test]
    fn test_label_scales_with_box() {
        let mut image = canvas(100, 100);
        annotate(&mut image, BoundingBox::new(0, 0, 100, 100), Identity::Existing(Uid(1)));

        // "1" at scale 2: the top row's set column becomes a 2x2 block
        assert_eq!(*image.get_pixel(4, 2), BOX_COLOR);
        assert_eq!(*image.get_pixel(5, 3), BOX_COLOR);
        assert_eq!(*image.get_pixel(2, 2), BACKGROUND);
    }

    #[test]
    fn test_label_is_clipped_to_small_box() {
        let mut image = canvas(30, 30);
        let bbox = BoundingBox::new(10, 10, 14, 14);
        annotate(&mut image, bbox, Identity::Existing(Uid(8888)));

        for y in 0..30 {
            for x in 0..30 {
                let inside = (10..14).contains(&x) && (10..14).contains(&y);
                if !inside {
                    assert_eq!(*image.get_pixel(x, y), BACKGROUND, "pixel ({x}, {y})");
                }
            }
        }
    }
}
