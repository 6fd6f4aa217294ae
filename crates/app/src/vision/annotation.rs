use image::{Rgb, RgbImage};
use ml_core::{FaceBox, face_number};

use crate::vision::data::FramePacket;

pub(crate) const CAPTION: &str = "Live Webcam - Face Detection";
pub(crate) const PLACEHOLDER_TEXT: &str = "Camera not active";

const FACE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const COUNT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const COUNT_ORIGIN: (i32, i32) = (10, 30);
const BOX_THICKNESS: i32 = 2;
const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: i32 = 7;
const GLYPH_ADVANCE: i32 = 6;

pub(crate) fn count_caption(count: usize) -> String {
    format!("Faces Detected: {count}")
}

fn face_label(number: usize) -> String {
    format!("Face #{number}")
}

fn label_origin(face: &FaceBox) -> (i32, i32) {
    (face.x, face.y - 10)
}

fn caption_origin(image: &RgbImage) -> (i32, i32) {
    (10, image.height() as i32 - 10)
}

/// Draw boxes, per-face labels, the face count and the caption onto a copy of
/// `image`. The source image is left untouched.
pub(crate) fn annotate_frame(
    image: &RgbImage,
    faces: Vec<FaceBox>,
    timestamp_ms: i64,
    frame_number: u64,
) -> FramePacket {
    let mut canvas = image.clone();

    for (index, face) in faces.iter().enumerate() {
        draw_rectangle(&mut canvas, face, FACE_COLOR, BOX_THICKNESS);
        let label = face_label(face_number(&faces, index));
        draw_text(&mut canvas, &label, label_origin(face), 1, FACE_COLOR);
    }

    draw_text(&mut canvas, &count_caption(faces.len()), COUNT_ORIGIN, 2, COUNT_COLOR);
    let origin = caption_origin(&canvas);
    draw_text(&mut canvas, CAPTION, origin, 1, TEXT_COLOR);

    FramePacket {
        image: canvas,
        faces,
        timestamp_ms,
        frame_number,
    }
}

/// Black frame with a notice, streamed while no annotated frame is published.
pub(crate) fn placeholder_frame(width: u32, height: u32) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);
    let origin = (50, (height as i32 / 2).min(240));
    draw_text(&mut canvas, PLACEHOLDER_TEXT, origin, 2, TEXT_COLOR);
    canvas
}

fn put_pixel(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_rectangle(image: &mut RgbImage, face: &FaceBox, color: Rgb<u8>, thickness: i32) {
    for inset in 0..thickness {
        let left = face.x + inset;
        let top = face.y + inset;
        let right = face.right() - inset;
        let bottom = face.bottom() - inset;
        if left > right || top > bottom {
            break;
        }
        for x in left..=right {
            put_pixel(image, x, top, color);
            put_pixel(image, x, bottom, color);
        }
        for y in top..=bottom {
            put_pixel(image, left, y, color);
            put_pixel(image, right, y, color);
        }
    }
}

/// Top-left corner of every lit font cell of `text`. The origin is the bottom
/// left corner of the text, as with the usual CV text primitives.
fn glyph_cells(
    text: &str,
    origin: (i32, i32),
    scale: i32,
) -> impl Iterator<Item = (i32, i32)> + '_ {
    let (x, y) = origin;
    let top = y - GLYPH_HEIGHT * scale;
    text.chars()
        .flat_map(char::to_uppercase)
        .enumerate()
        .filter_map(|(position, ch)| glyph_bits(ch).map(|glyph| (position as i32, glyph)))
        .flat_map(move |(position, glyph)| {
            let left = x + position * GLYPH_ADVANCE * scale;
            (0..GLYPH_HEIGHT).flat_map(move |row| {
                (0..GLYPH_WIDTH)
                    .filter(move |col| (glyph[row as usize] >> (GLYPH_WIDTH - 1 - col)) & 1 == 1)
                    .map(move |col| (left + col * scale, top + row * scale))
            })
        })
}

/// Render `text` with the built-in bitmap font.
fn draw_text(image: &mut RgbImage, text: &str, origin: (i32, i32), scale: i32, color: Rgb<u8>) {
    for (x, y) in glyph_cells(text, origin, scale) {
        for dy in 0..scale {
            for dx in 0..scale {
                put_pixel(image, x + dx, y + dy, color);
            }
        }
    }
}

/// Every on-canvas pixel `draw_text` would set for `text` has `color`.
#[cfg(test)]
fn text_is_drawn(
    image: &RgbImage,
    text: &str,
    origin: (i32, i32),
    scale: i32,
    color: Rgb<u8>,
) -> bool {
    let matches = |x: i32, y: i32| {
        x < 0
            || y < 0
            || x as u32 >= image.width()
            || y as u32 >= image.height()
            || *image.get_pixel(x as u32, y as u32) == color
    };
    glyph_cells(text, origin, scale)
        .all(|(x, y)| (0..scale).all(|dy| (0..scale).all(|dx| matches(x + dx, y + dy))))
}

#[cfg(test)]
pub(crate) fn shows_count(image: &RgbImage, count: usize) -> bool {
    text_is_drawn(image, &count_caption(count), COUNT_ORIGIN, 2, COUNT_COLOR)
}

#[cfg(test)]
pub(crate) fn shows_caption(image: &RgbImage) -> bool {
    text_is_drawn(image, CAPTION, caption_origin(image), 1, TEXT_COLOR)
}

#[cfg(test)]
pub(crate) fn shows_label(image: &RgbImage, face: &FaceBox, number: usize) -> bool {
    text_is_drawn(image, &face_label(number), label_origin(face), 1, FACE_COLOR)
}

fn glyph_bits(ch: char) -> Option<[u8; 7]> {
    let bits = match ch {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b01110, 0b00001, 0b00001, 0b10001, 0b01110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '#' => [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
        ':' => [0, 0b00110, 0b00110, 0, 0b00110, 0b00110, 0],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        '.' => [0, 0, 0, 0, 0, 0b00110, 0b00110],
        ' ' => [0; 7],
        _ => return None,
    };
    Some(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([40, 40, 40]))
    }

    #[test]
    fn annotates_two_faces_with_boxes_labels_and_count() {
        let source = gray_frame(640, 480);
        let faces = vec![FaceBox::new(100, 120, 80, 80), FaceBox::new(360, 60, 90, 90)];

        let packet = annotate_frame(&source, faces.clone(), 1_000, 7);

        assert_eq!(packet.faces, faces);
        assert_eq!(packet.frame_number, 7);
        assert_eq!(packet.timestamp_ms, 1_000);
        assert!(shows_count(&packet.image, 2));
        assert!(!shows_count(&packet.image, 3));
        assert!(shows_caption(&packet.image));
        assert!(shows_label(&packet.image, &faces[0], 2));
        assert!(shows_label(&packet.image, &faces[1], 1));

        for face in &faces {
            assert_eq!(packet.image.get_pixel(face.x as u32, face.y as u32), &FACE_COLOR);
            assert_eq!(
                packet.image.get_pixel(face.right() as u32, face.bottom() as u32),
                &FACE_COLOR
            );
            let centre = (face.x + face.width / 2, face.y + face.height / 2);
            assert_eq!(
                packet.image.get_pixel(centre.0 as u32, centre.1 as u32),
                &Rgb([40, 40, 40])
            );
        }
    }

    #[test]
    fn labels_follow_vertical_order() {
        let faces = vec![FaceBox::new(10, 300, 50, 50), FaceBox::new(200, 100, 50, 50)];
        let packet = annotate_frame(&gray_frame(640, 480), faces.clone(), 0, 1);

        assert!(shows_label(&packet.image, &faces[0], 2));
        assert!(shows_label(&packet.image, &faces[1], 1));
        assert!(!shows_label(&packet.image, &faces[0], 1));
        // Ten pixels above the top edge, so the row just above the box stays clear.
        assert_eq!(packet.image.get_pixel(10, 299), &Rgb([40, 40, 40]));
    }

    #[test]
    fn leaves_source_untouched() {
        let source = gray_frame(64, 48);
        let _ = annotate_frame(&source, vec![FaceBox::new(4, 4, 20, 20)], 0, 1);
        assert!(source.pixels().all(|pixel| *pixel == Rgb([40, 40, 40])));
    }

    #[test]
    fn zero_faces_still_draws_count_and_caption() {
        let packet = annotate_frame(&gray_frame(320, 240), Vec::new(), 0, 1);
        assert!(packet.faces.is_empty());
        assert!(shows_count(&packet.image, 0));
        assert!(shows_caption(&packet.image));
        assert!(!packet.image.pixels().any(|pixel| *pixel == FACE_COLOR));
    }

    #[test]
    fn boxes_beyond_the_edge_are_clipped() {
        let packet = annotate_frame(&gray_frame(50, 50), vec![FaceBox::new(-20, 30, 100, 40)], 0, 1);
        assert_eq!(packet.image.get_pixel(0, 30), &FACE_COLOR);
    }

    #[test]
    fn placeholder_is_black_with_white_notice() {
        let frame = placeholder_frame(640, 480);
        assert_eq!(frame.dimensions(), (640, 480));
        assert_eq!(frame.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert!(text_is_drawn(&frame, PLACEHOLDER_TEXT, (50, 240), 2, TEXT_COLOR));
    }

    #[test]
    fn glyph_cells_advance_one_glyph_per_character() {
        let cells: Vec<_> = glyph_cells("--", (0, 7), 1).collect();
        assert_eq!(cells.len(), 10);
        assert_eq!(cells[0], (0, 3));
        assert_eq!(cells[5], (6, 3));
    }

    #[test]
    fn every_rendered_character_has_a_glyph() {
        let texts = [CAPTION, PLACEHOLDER_TEXT, "Faces Detected: 1234567890", "Face #9"];
        for text in texts {
            for ch in text.chars().flat_map(char::to_uppercase) {
                assert!(glyph_bits(ch).is_some(), "missing glyph for {ch:?}");
            }
        }
    }
}
