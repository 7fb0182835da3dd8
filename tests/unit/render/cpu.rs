use super::*;

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

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PreparedImage {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        data.extend_from_slice(&rgba);
    }
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(data),
    }
}

#[test]
fn oversized_canvas_is_unavailable() {
    let err = CpuSurface::new(Canvas {
        width: 70_000,
        height: 10,
    })
    .err()
    .unwrap();
    assert!(matches!(err, OverlayError::CanvasUnavailable(_)), "{err}");
}

#[test]
fn fill_covers_every_pixel() {
    let mut s = CpuSurface::new(Canvas {
        width: 16,
        height: 8,
    })
    .unwrap();
    s.fill(Rgba8::WHITE);
    let frame = s.finish();
    assert_eq!((frame.width, frame.height), (16, 8));
    assert!(frame.data.iter().all(|&b| b == 255));
}

#[test]
fn draw_image_scales_into_destination() {
    let mut s = CpuSurface::new(Canvas {
        width: 40,
        height: 40,
    })
    .unwrap();
    s.fill(Rgba8::WHITE);
    s.draw_image(
        &solid(2, 2, [255, 0, 0, 255]),
        Rect::new(10.0, 10.0, 30.0, 30.0),
    )
    .unwrap();
    let frame = s.finish();

    assert_px_close(px(&frame, 20, 20), [255, 0, 0, 255]);
    assert_px_close(px(&frame, 11, 28), [255, 0, 0, 255]);
    assert_px_close(px(&frame, 5, 5), [255, 255, 255, 255]);
    assert_px_close(px(&frame, 35, 20), [255, 255, 255, 255]);
}

#[test]
fn empty_destination_draws_nothing() {
    let mut s = CpuSurface::new(Canvas {
        width: 8,
        height: 8,
    })
    .unwrap();
    s.fill(Rgba8::WHITE);
    s.draw_image(&solid(1, 1, [0, 0, 0, 255]), Rect::new(2.0, 2.0, 2.0, 6.0))
        .unwrap();
    let frame = s.finish();
    assert!(frame.data.iter().all(|&b| b == 255));
}

#[test]
fn mismatched_pixel_buffer_is_rejected() {
    let bad = PreparedImage {
        width: 4,
        height: 4,
        rgba8_premul: Arc::new(vec![0u8; 12]),
    };
    let mut s = CpuSurface::new(Canvas {
        width: 8,
        height: 8,
    })
    .unwrap();
    assert!(s.draw_image(&bad, Rect::new(0.0, 0.0, 8.0, 8.0)).is_err());
}

#[test]
fn unpremultiply_restores_straight_alpha() {
    let mut px = [64u8, 32, 0, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [128, 64, 0, 128]);

    let mut clear = [0u8, 0, 0, 0];
    unpremultiply_rgba8_in_place(&mut clear);
    assert_eq!(clear, [0, 0, 0, 0]);
}
