// Math utilities and helper functions

use glam::Vec2;

/// Tolerance used when comparing normals and axis components
pub const NORMAL_EPSILON: f32 = 1e-4;

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Move `current` towards `target` by at most `max_delta`
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Remove the component of `vector` along `normal`.
///
/// A zero normal leaves the vector untouched.
pub fn project_on_plane(vector: Vec2, normal: Vec2) -> Vec2 {
    let length_squared = normal.length_squared();
    if length_squared < f32::EPSILON {
        return vector;
    }
    vector - normal * (vector.dot(normal) / length_squared)
}

/// Shorten `vector` so its length does not exceed `max_length`
pub fn clamp_magnitude(vector: Vec2, max_length: f32) -> Vec2 {
    if vector.length_squared() > max_length * max_length {
        vector.normalize_or_zero() * max_length
    } else {
        vector
    }
}

/// Check if two f32 values are approximately equal
pub fn approx_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Check if two vectors are approximately equal component-wise
pub fn approx_equal_vec(a: Vec2, b: Vec2, epsilon: f32) -> bool {
    approx_equal(a.x, b.x, epsilon) && approx_equal(a.y, b.y, epsilon)
}

/// Sign of an axis value as -1, 0 or 1
pub fn axis_sign(value: f32) -> f32 {
    if value == 0.0 {
        0.0
    } else if value > 0.0 {
        1.0
    } else {
        -1.0
    }
}
