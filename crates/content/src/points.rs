use glam::Vec3;

/// Points along the X axis from `start` to `end`, both included, `step` apart.
///
/// Positions are computed from the index rather than by repeated addition,
/// so the last point lands on `end`. A non-positive step or a reversed range
/// yields just `start`.
pub fn linear_points(start: f32, end: f32, step: f32) -> Vec<Vec3> {
    if !(step > 0.0) || end < start {
        return vec![Vec3::new(start, 0.0, 0.0)];
    }
    let count = ((end - start) / step).round() as usize;
    (0..=count)
        .map(|i| {
            let x = if i == count { end } else { start + step * i as f32 };
            Vec3::new(x, 0.0, 0.0)
        })
        .collect()
}
