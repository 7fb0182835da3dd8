use super::*;

fn assert_rect_close(actual: Rect, expected: Rect) {
    let eps = 1e-9;
    assert!(
        (actual.x0 - expected.x0).abs() < eps
            && (actual.y0 - expected.y0).abs() < eps
            && (actual.x1 - expected.x1).abs() < eps
            && (actual.y1 - expected.y1).abs() < eps,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn canvases_are_fixed_per_variant() {
    assert_eq!(
        LayoutVariant::Stacked.canvas(),
        Canvas {
            width: 500,
            height: 500
        }
    );
    assert_eq!(
        LayoutVariant::SideBySide.canvas(),
        Canvas {
            width: 800,
            height: 500
        }
    );
}

#[test]
fn stacked_very_wide_primary_fits_full_width() {
    let plan = LayoutVariant::Stacked.plan(Size::new(1000.0, 400.0), Size::new(10.0, 10.0));
    // 500x200 at (0, 25)
    assert_rect_close(plan.primary, Rect::new(0.0, 25.0, 500.0, 225.0));
}

#[test]
fn stacked_square_primary_fits_band_height() {
    let plan = LayoutVariant::Stacked.plan(Size::new(300.0, 300.0), Size::new(10.0, 10.0));
    // 250x250 at (125, 0)
    assert_rect_close(plan.primary, Rect::new(125.0, 0.0, 375.0, 250.0));
}

#[test]
fn stacked_aspect_exactly_two_uses_band_height() {
    let plan = LayoutVariant::Stacked.plan(Size::new(800.0, 400.0), Size::new(10.0, 10.0));
    assert_rect_close(plan.primary, Rect::new(0.0, 0.0, 500.0, 250.0));
}

#[test]
fn stacked_tall_primary_is_not_rounded() {
    let plan = LayoutVariant::Stacked.plan(Size::new(333.0, 1000.0), Size::new(10.0, 10.0));
    let w = 333.0 / 1000.0 * 250.0;
    assert_rect_close(
        plan.primary,
        Rect::new((500.0 - w) / 2.0, 0.0, (500.0 - w) / 2.0 + w, 250.0),
    );
    assert!(plan.primary.x0.fract() != 0.0);
}

#[test]
fn stacked_secondary_always_stretches_to_bottom_half() {
    for secondary in [
        Size::new(10.0, 10.0),
        Size::new(4000.0, 100.0),
        Size::new(37.0, 911.0),
    ] {
        let plan = LayoutVariant::Stacked.plan(Size::new(640.0, 480.0), secondary);
        assert_rect_close(plan.secondary, Rect::new(0.0, 250.0, 500.0, 500.0));
    }
}

#[test]
fn side_by_side_matching_aspect_fills_zones() {
    let plan =
        LayoutVariant::SideBySide.plan(Size::new(400.0, 500.0), Size::new(400.0, 500.0));
    assert_rect_close(plan.primary, Rect::new(0.0, 0.0, 400.0, 500.0));
    assert_rect_close(plan.secondary, Rect::new(400.0, 0.0, 800.0, 500.0));
}

#[test]
fn side_by_side_wide_image_fits_zone_width_and_centers_vertically() {
    let plan =
        LayoutVariant::SideBySide.plan(Size::new(800.0, 400.0), Size::new(100.0, 400.0));
    // aspect 2.0 > 0.8: 400x200, centered at y = 150
    assert_rect_close(plan.primary, Rect::new(0.0, 150.0, 400.0, 350.0));
    // aspect 0.25 <= 0.8: 125x500, centered in the right zone
    assert_rect_close(plan.secondary, Rect::new(537.5, 0.0, 662.5, 500.0));
}

#[test]
fn fit_into_zone_respects_zone_origin() {
    let zone = Rect::new(100.0, 50.0, 300.0, 150.0);
    let r = fit_into_zone(Size::new(50.0, 50.0), zone);
    assert_rect_close(r, Rect::new(150.0, 50.0, 250.0, 150.0));
}

#[test]
fn variant_parses_from_cli_spellings() {
    assert_eq!("stacked".parse::<LayoutVariant>().unwrap(), LayoutVariant::Stacked);
    assert_eq!(
        "Side-By-Side".parse::<LayoutVariant>().unwrap(),
        LayoutVariant::SideBySide
    );
    assert_eq!(
        "side_by_side".parse::<LayoutVariant>().unwrap(),
        LayoutVariant::SideBySide
    );
    assert!("diagonal".parse::<LayoutVariant>().is_err());
    assert_eq!(LayoutVariant::SideBySide.to_string(), "side-by-side");
}

#[test]
fn variant_serde_uses_snake_case() {
    let json = serde_json::to_string(&LayoutVariant::SideBySide).unwrap();
    assert_eq!(json, "\"side_by_side\"");
    let back: LayoutVariant = serde_json::from_str("\"stacked\"").unwrap();
    assert_eq!(back, LayoutVariant::Stacked);
}
