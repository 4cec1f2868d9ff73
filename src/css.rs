use hairfit_align::OverlayTransform;

/// Inline style for an absolutely positioned overlay element. The element is
/// translated by half its own size so `left`/`top` address its center.
pub fn style_declaration(transform: &OverlayTransform) -> String {
    match transform.placement() {
        None => "display: none;".to_string(),
        Some(p) => format!(
            "display: block; width: {:.2}px; left: {:.2}px; top: {:.2}px; \
             transform: translate(-50%, -50%) rotate({:.2}deg); \
             transform-origin: center center;",
            p.width_px, p.center_x, p.center_y, p.rotation_degrees
        ),
    }
}
