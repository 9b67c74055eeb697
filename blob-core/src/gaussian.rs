//! Circular Gaussian smoothing of boundary radii.

use crate::blob::BoundaryPoint;

const MIN_SIGMA: f32 = 1e-3;

/// Precomputed, normalized 1-D Gaussian kernel.
///
/// The kernel always has an odd number of taps so that it has a
/// well-defined center, and its weights sum to one so smoothing keeps
/// the mean radius of a boundary unchanged.
#[derive(Clone, Debug)]
pub struct GaussianKernel {
    weights: Vec<f32>,
    sigma: f32,
}

impl GaussianKernel {
    /// Builds a kernel with at least `size` taps.
    ///
    /// Even sizes are rounded up to the next odd number and zero becomes
    /// one. `sigma` is floored at a small positive value.
    pub fn new(size: usize, sigma: f32) -> Self {
        let size = if size % 2 == 0 { size + 1 } else { size };
        let sigma = if sigma.is_finite() {
            sigma.max(MIN_SIGMA)
        } else {
            MIN_SIGMA
        };
        let half = (size / 2) as i32;

        let mut weights: Vec<f32> = (-half..=half)
            .map(|x| {
                let x = x as f32;
                (-(x * x) / (2.0 * sigma * sigma)).exp()
            })
            .collect();

        let sum: f32 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }

        Self { weights, sigma }
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn size(&self) -> usize {
        self.weights.len()
    }

    pub fn half(&self) -> usize {
        self.weights.len() / 2
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Smooths the radii of a closed boundary in place.
    ///
    /// Fewer than three points do not form a polygon and are left alone.
    pub fn convolve(&self, points: &mut [BoundaryPoint]) {
        if points.len() < 3 {
            return;
        }
        let mut radii: Vec<f32> = points.iter().map(|p| p.radius).collect();
        let count = radii.len();
        self.convolve_array(&mut radii, count);
        for (p, r) in points.iter_mut().zip(radii) {
            p.radius = r;
        }
    }

    /// Smooths the first `count` entries of a packed radius buffer.
    ///
    /// Indices wrap around the closed loop instead of being zero-padded.
    pub fn convolve_array(&self, radii: &mut [f32], count: usize) {
        let n = count.min(radii.len());
        if n < 3 {
            return;
        }

        let source = radii[..n].to_vec();
        let half = self.half() as isize;
        let n_signed = n as isize;

        for (i, out) in radii[..n].iter_mut().enumerate() {
            let mut acc = 0.0;
            for (j, w) in self.weights.iter().enumerate() {
                let idx = (i as isize + j as isize - half).rem_euclid(n_signed) as usize;
                acc += source[idx] * w;
            }
            *out = acc;
        }
    }

    /// Population variance; zero for an empty slice.
    pub fn compute_variance(radii: &[f32]) -> f32 {
        if radii.is_empty() {
            return 0.0;
        }
        let n = radii.len() as f32;
        let mean = radii.iter().sum::<f32>() / n;
        radii.iter().map(|r| (r - mean) * (r - mean)).sum::<f32>() / n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use rand::Rng;

    fn points_from(radii: &[f32]) -> Vec<BoundaryPoint> {
        radii
            .iter()
            .enumerate()
            .map(|(i, &r)| BoundaryPoint::new(i as f32, 20.0, r))
            .collect()
    }

    fn mean(values: &[f32]) -> f32 {
        values.iter().sum::<f32>() / values.len() as f32
    }

    #[test]
    fn size_is_coerced_to_odd() {
        assert_eq!(GaussianKernel::new(4, 1.0).size(), 5);
        assert_eq!(GaussianKernel::new(5, 1.0).size(), 5);
        assert_eq!(GaussianKernel::new(0, 1.0).size(), 1);
        assert_eq!(GaussianKernel::new(0, 1.0).weights(), &[1.0]);
    }

    #[test]
    fn weights_are_normalized_and_symmetric() {
        for (size, sigma) in [(3, 0.5), (5, 1.0), (5, 1.2), (7, 2.0), (9, 3.5), (4, 0.8)] {
            let kernel = GaussianKernel::new(size, sigma);
            let w = kernel.weights();
            let sum: f32 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4, "sum {sum} for ({size}, {sigma})");
            for i in 0..w.len() {
                assert!((w[i] - w[w.len() - 1 - i]).abs() < 1e-6);
            }
            assert!(w[kernel.half()] >= w[0]);
        }
    }

    #[test]
    fn degenerate_sigma_is_a_delta_kernel() {
        let kernel = GaussianKernel::new(5, 0.0);
        let w = kernel.weights();
        assert!((w[2] - 1.0).abs() < 1e-6);
        assert!(w.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn uniform_signal_is_untouched() {
        let kernel = GaussianKernel::new(5, 1.2);
        let mut points = points_from(&[20.0; 8]);
        kernel.convolve(&mut points);
        for p in &points {
            assert!((p.radius - 20.0).abs() < 0.001);
        }
    }

    #[test]
    fn smoothing_lowers_variance_of_example() {
        let kernel = GaussianKernel::new(5, 1.0);
        let input = [18.0, 22.0, 19.0, 21.0, 20.0, 23.0, 17.0, 24.0];
        let mut points = points_from(&input);
        kernel.convolve(&mut points);
        let output: Vec<f32> = points.iter().map(|p| p.radius).collect();

        assert!(
            GaussianKernel::compute_variance(&output) < GaussianKernel::compute_variance(&input)
        );
        assert!((mean(&output) - mean(&input)).abs() < 0.01);
    }

    #[test]
    fn smoothing_properties_hold_for_random_boundaries() {
        let mut rng = create_rng(5);
        for _ in 0..200 {
            let n = rng.random_range(3..24);
            let size = rng.random_range(1..12);
            let sigma = rng.random_range(0.3..4.0);
            let kernel = GaussianKernel::new(size, sigma);

            let mut radii: Vec<f32> = (0..n).map(|_| rng.random_range(10.0..40.0)).collect();
            let before = radii.clone();
            kernel.convolve_array(&mut radii, n);

            let var_before = GaussianKernel::compute_variance(&before);
            let var_after = GaussianKernel::compute_variance(&radii);
            assert!(var_after <= var_before * 1.01 + 1e-6);
            assert!((mean(&radii) - mean(&before)).abs() < 0.01);
        }
    }

    #[test]
    fn too_few_points_are_left_alone() {
        let kernel = GaussianKernel::new(5, 1.0);
        let mut points = points_from(&[10.0, 30.0]);
        kernel.convolve(&mut points);
        assert_eq!(points[0].radius, 10.0);
        assert_eq!(points[1].radius, 30.0);

        let mut radii = [10.0, 30.0, 50.0, 70.0];
        kernel.convolve_array(&mut radii, 2);
        assert_eq!(radii, [10.0, 30.0, 50.0, 70.0]);
    }

    #[test]
    fn convolve_array_only_touches_prefix() {
        let kernel = GaussianKernel::new(3, 1.0);
        let mut radii = [10.0, 20.0, 30.0, 99.0];
        kernel.convolve_array(&mut radii, 3);
        assert_eq!(radii[3], 99.0);
        let smoothed_mean = (radii[0] + radii[1] + radii[2]) / 3.0;
        assert!((smoothed_mean - 20.0).abs() < 1e-4);
    }

    #[test]
    fn kernel_wider_than_boundary_still_wraps() {
        let kernel = GaussianKernel::new(11, 3.0);
        let mut radii = [10.0, 20.0, 30.0];
        kernel.convolve_array(&mut radii, 3);
        assert!((mean(&radii) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn variance_of_empty_is_zero() {
        assert_eq!(GaussianKernel::compute_variance(&[]), 0.0);
        assert_eq!(GaussianKernel::compute_variance(&[3.0, 3.0]), 0.0);
        assert!((GaussianKernel::compute_variance(&[1.0, 3.0]) - 1.0).abs() < 1e-6);
    }
}
