use crate::types::Value;

// linearly map a number from one range to another
pub fn remap(s: Value, range_in: [Value; 2], range_out: [Value; 2]) -> Value {
    range_out[0] + (s - range_in[0]) * (range_out[1] - range_out[0]) / (range_in[1] - range_in[0])
}

// Linear interpolation
pub fn lerp(a: Value, b: Value, t: Value) -> Value {
    a + (b - a) * t
}

/// Returns `n` evenly spaced values from `start` to `end`, both inclusive.
///
/// A single sample sits at `start`; `n == 0` gives an empty vector.
pub fn linspace(n: usize, start: Value, end: Value) -> Vec<Value> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| remap(i as Value, [0., (n - 1) as Value], [start, end]))
            .collect(),
    }
}

/// Finds the table bracket `[idx, idx + 1]` holding `value` on an axis of `resolution`
/// uniformly spaced nodes over `[0, 1]`, and the fractional offset inside it.
///
/// `value` is clamped into the domain first (NaN counts as 0). The upper boundary `1.0`
/// lands in the last interior bracket `[resolution - 2, resolution - 1]` with offset `1.0`.
///
/// ```text
/// coord(i) = i / (R - 1)
/// idx      = clamp(floor(v * (R - 1)), 0, R - 2)
/// offset   = v * (R - 1) - idx
/// ```
///
/// # Panics
/// Panics if `resolution < 2`: such an axis has no bracket at all.
#[inline]
pub fn bracket(value: Value, resolution: usize) -> (usize, Value) {
    assert!(resolution >= 2, "axis needs at least two nodes, got {resolution}");
    let last = resolution - 1;
    let v = if value.is_nan() { 0. } else { value.clamp(0., 1.) };
    let scaled = v * last as Value;
    let idx = (scaled.floor() as usize).min(last - 1);
    (idx, scaled - idx as Value)
}

/// Trilinear blend of the 8 corners of a cell, indexed `corners[x][y][z]`.
///
/// Blends across X at each of the four `(y, z)` pairs, then across Y, then across Z.
#[inline]
pub fn trilinear(corners: &[[[Value; 2]; 2]; 2], xd: Value, yd: Value, zd: Value) -> Value {
    let c00 = lerp(corners[0][0][0], corners[1][0][0], xd);
    let c01 = lerp(corners[0][0][1], corners[1][0][1], xd);
    let c10 = lerp(corners[0][1][0], corners[1][1][0], xd);
    let c11 = lerp(corners[0][1][1], corners[1][1][1], xd);

    let c0 = lerp(c00, c10, yd);
    let c1 = lerp(c01, c11, yd);

    lerp(c0, c1, zd)
}
