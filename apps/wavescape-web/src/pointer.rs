use wavescape_input::PointerButton;

/// Map a DOM `MouseEvent.button` value to a pointer button.
pub fn pointer_button(button: i16) -> Option<PointerButton> {
    match button {
        0 => Some(PointerButton::Primary),
        1 => Some(PointerButton::Middle),
        2 => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Viewport from `innerWidth`/`innerHeight`, which the DOM reports as floats.
pub fn viewport_from_inner(width: f64, height: f64) -> wavescape_common::Viewport {
    let clamp = |v: f64| if v.is_finite() && v > 0.0 { v.round() as u32 } else { 0 };
    wavescape_common::Viewport::new(clamp(width), clamp(height))
}
