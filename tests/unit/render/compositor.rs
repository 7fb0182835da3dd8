use super::*;

fn png_source(name: &str, width: u32, height: u32, rgba: [u8; 4]) -> ImageSource {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageSource::from_bytes(name, buf)
}

fn px(frame: &FrameRgba, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn assert_px_close(actual: [u8; 4], expected: [u8; 4]) {
    let close = actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff(*e) <= 3);
    assert!(close, "expected {expected:?}, got {actual:?}");
}

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

#[test]
fn stacked_places_primary_top_and_stretches_secondary() {
    let base = png_source("couch", 300, 300, RED);
    let fabric = png_source("linen", 40, 10, BLUE);
    let out = render(&base, &fabric, LayoutVariant::Stacked).unwrap();
    assert_eq!((out.width, out.height), (500, 500));

    let frame = out.to_rgba().unwrap();
    assert_eq!((frame.width, frame.height), (500, 500));
    // primary spans x 125..375, y 0..250
    assert_px_close(px(&frame, 250, 125), RED);
    assert_px_close(px(&frame, 130, 240), RED);
    assert_px_close(px(&frame, 50, 125), WHITE);
    assert_px_close(px(&frame, 450, 125), WHITE);
    // secondary fills the whole bottom half
    assert_px_close(px(&frame, 1, 252), BLUE);
    assert_px_close(px(&frame, 250, 375), BLUE);
    assert_px_close(px(&frame, 498, 498), BLUE);
}

#[test]
fn stacked_wide_primary_leaves_white_bands() {
    let base = png_source("wide", 1000, 400, RED);
    let fabric = png_source("f", 8, 8, BLUE);
    let frame = render(&base, &fabric, LayoutVariant::Stacked)
        .unwrap()
        .to_rgba()
        .unwrap();
    // primary spans y 25..225 across the full width
    assert_px_close(px(&frame, 250, 10), WHITE);
    assert_px_close(px(&frame, 2, 125), RED);
    assert_px_close(px(&frame, 250, 240), WHITE);
}

#[test]
fn transparent_primary_shows_white_background() {
    let base = png_source("ghost", 100, 100, [0, 0, 0, 0]);
    let fabric = png_source("f", 8, 8, BLUE);
    let frame = render(&base, &fabric, LayoutVariant::Stacked)
        .unwrap()
        .to_rgba()
        .unwrap();
    assert_px_close(px(&frame, 250, 125), WHITE);
    assert_eq!(px(&frame, 250, 125)[3], 255);
}

#[test]
fn side_by_side_fills_both_zones() {
    let base = png_source("couch", 400, 500, RED);
    let fabric = png_source("linen", 400, 500, BLUE);
    let out = render(&base, &fabric, LayoutVariant::SideBySide).unwrap();
    assert_eq!((out.width, out.height), (800, 500));

    let frame = out.to_rgba().unwrap();
    assert_px_close(px(&frame, 2, 2), RED);
    assert_px_close(px(&frame, 200, 250), RED);
    assert_px_close(px(&frame, 600, 250), BLUE);
    assert_px_close(px(&frame, 797, 497), BLUE);
}

#[test]
fn side_by_side_centers_wide_image_in_zone() {
    let base = png_source("wide", 800, 400, RED);
    let fabric = png_source("linen", 400, 500, BLUE);
    let frame = render(&base, &fabric, LayoutVariant::SideBySide)
        .unwrap()
        .to_rgba()
        .unwrap();
    // primary is 400x200 at y 150..350
    assert_px_close(px(&frame, 200, 50), WHITE);
    assert_px_close(px(&frame, 200, 250), RED);
    assert_px_close(px(&frame, 200, 450), WHITE);
}

#[test]
fn rendering_is_deterministic() {
    let base = png_source("couch", 333, 217, RED);
    let fabric = png_source("linen", 41, 13, BLUE);
    let a = render(&base, &fabric, LayoutVariant::Stacked).unwrap();
    let b = render(&base, &fabric, LayoutVariant::Stacked).unwrap();
    assert_eq!(a.png, b.png);
}

#[test]
fn corrupt_secondary_is_a_decode_error() {
    let base = png_source("couch", 10, 10, RED);
    let fabric = ImageSource::from_bytes("torn", b"\x89PNG garbage".to_vec());
    let err = render(&base, &fabric, LayoutVariant::Stacked).unwrap_err();
    assert!(matches!(err, OverlayError::Decode(_)), "{err}");
}

#[test]
fn prepared_compose_matches_render() {
    let base = png_source("couch", 10, 10, RED);
    let fabric = png_source("linen", 10, 10, BLUE);
    let prepared_base = CpuCompositor.prepare(&base).unwrap();
    let prepared_fabric = CpuCompositor.prepare(&fabric).unwrap();
    let via_trait = CpuCompositor
        .compose(&prepared_base, &prepared_fabric, LayoutVariant::SideBySide)
        .unwrap();
    let direct = render(&base, &fabric, LayoutVariant::SideBySide).unwrap();
    assert_eq!(via_trait, direct);
}

#[test]
fn prepare_reports_the_broken_source() {
    let broken = ImageSource::from_bytes("torn-swatch", b"garbage".to_vec());
    match CpuCompositor.prepare(&broken) {
        Err(OverlayError::Decode(msg)) => assert!(msg.contains("torn-swatch"), "{msg}"),
        other => panic!("expected decode error, got {other:?}"),
    }
}
