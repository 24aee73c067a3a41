//! Small vector helpers shared by the inertial path.

/// Euclidean norm of a 3-vector.
#[inline]
#[must_use]
pub fn norm3(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Euclidean distance between two 3-vectors.
#[inline]
#[must_use]
pub fn dist3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    norm3(&d)
}

#[cfg(test)]
mod tests {
    use super::{dist3, norm3};

    #[test]
    fn norm_of_unit_axes() {
        assert!((norm3(&[1.0, 0.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!((norm3(&[0.0, 3.0, 4.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn dist_is_symmetric() {
        let a = [1.0, 2.0, 3.0];
        let b = [-1.0, 0.5, 2.0];
        assert!((dist3(&a, &b) - dist3(&b, &a)).abs() < 1e-12);
    }
}
