use glam::Vec2;

/// A camera manipulation any host (browser, native window) can produce.
///
/// Hosts translate raw pointer events on the surface element into these;
/// the controller never sees platform events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlInput {
    /// Orbit around the target by a drag delta in pixels.
    Rotate(Vec2),
    /// Move the target by a drag delta in pixels.
    Pan(Vec2),
    /// Zoom steps: positive moves away from the target, negative toward it.
    Dolly(f32),
}

/// Pointer button as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Turns press/move/release/wheel events into [`ControlInput`]s.
///
/// Primary drag rotates, secondary drag pans and middle drag dollies.
#[derive(Debug, Default, Clone)]
pub struct PointerTracker {
    button: Option<PointerButton>,
    last: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, button: PointerButton, position: Vec2) {
        self.button = Some(button);
        self.last = Some(position);
    }

    pub fn pointer_move(&mut self, position: Vec2) -> Option<ControlInput> {
        let button = self.button?;
        let last = self.last.replace(position)?;
        let delta = position - last;
        if delta == Vec2::ZERO {
            return None;
        }
        Some(match button {
            PointerButton::Primary => ControlInput::Rotate(delta),
            PointerButton::Secondary => ControlInput::Pan(delta),
            PointerButton::Middle if delta.y == 0.0 => return None,
            PointerButton::Middle => ControlInput::Dolly(delta.y.signum()),
        })
    }

    pub fn pointer_up(&mut self) {
        self.button = None;
        self.last = None;
    }

    /// Wheel events only carry direction; their magnitude varies by device.
    pub fn wheel(&self, delta_y: f32) -> Option<ControlInput> {
        (delta_y != 0.0).then(|| ControlInput::Dolly(delta_y.signum()))
    }

    pub fn is_dragging(&self) -> bool {
        self.button.is_some()
    }
}
