// z are locations, w are weights
#[derive(Debug)]
pub struct Quadrature {
    pub z: Vec<f64>,
    pub w: Vec<f64>,
}

// Jennison and Turnbull, 356
impl Quadrature {
    /// Simpson grid for a N(theta sqrt(info), 1) statistic restricted to
    /// (a, b); r controls the density, with at most 12r - 3 points
    pub fn new(theta: f64, info: f64, r: usize, a: f64, b: f64) -> Quadrature {
        let centre = theta * info.sqrt();
        let r_f = r as f64;

        // J&T, bottom of page 356
        let x_full: Vec<f64> = (1..6 * r)
            .map(|i| {
                let i_f = i as f64;
                let offset = if i < r {
                    -3.0 - 4.0 * (r_f / i_f).ln()
                } else if i <= 5 * r {
                    -3.0 + 3.0 * (i_f - r_f) / (2.0 * r_f)
                } else {
                    3.0 + 4.0 * (r_f / (6.0 * r_f - i_f)).ln()
                };
                centre + offset
            })
            .collect();

        // Trim to be within (a, b)
        let mut x: Vec<f64> = x_full.iter().copied().filter(|&x_i| x_i > a && x_i < b).collect();

        // No grid point inside (a, b) means there is virtually no mass
        // there; a single point stands in for the whole interval
        if x.is_empty() {
            return Quadrature {
                z: vec![(a + b) / 2.],
                w: vec![1.0],
            };
        }

        // Close the grid at the trimmed ends
        if x[0] != x_full[0] {
            x.insert(0, a);
        }
        if x[x.len() - 1] != x_full[x_full.len() - 1] {
            x.push(b);
        }

        //----------------------------------------
        // Locations, J&T top of page 357
        // Grid points on even indices, midpoints on odd ones
        let m = 2 * x.len() - 1;
        let z: Vec<f64> = (0..m)
            .map(|i| {
                if i % 2 == 0 {
                    x[i / 2]
                } else {
                    (x[i / 2] + x[i / 2 + 1]) / 2.0
                }
            })
            .collect();

        if m == 1 {
            return Quadrature { z, w: vec![1.0] };
        }

        //----------------------------------------
        // Simpson weights
        let one_sixth = 1.0 / 6.0;
        let four_sixths = 2.0 / 3.0;
        let w = (0..m)
            .map(|i| {
                if i == 0 {
                    one_sixth * (z[2] - z[0])
                } else if i == m - 1 {
                    one_sixth * (z[m - 1] - z[m - 3])
                } else if i % 2 == 0 {
                    one_sixth * (z[i + 2] - z[i - 2])
                } else {
                    four_sixths * (z[i + 1] - z[i - 1])
                }
            })
            .collect();

        Quadrature { z, w }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::std_normal::std_normal_pdf;

    fn integrate_std_normal(quad: &Quadrature) -> f64 {
        quad.z
            .iter()
            .zip(quad.w.iter())
            .map(|(z, w)| w * std_normal_pdf(*z))
            .sum()
    }

    #[test]
    fn basic_quadrature_indefinite() {
        let test_quad = Quadrature::new(0.0, 1.0, 4, f64::NEG_INFINITY, f64::INFINITY);
        assert_eq!(test_quad.z.len(), 12 * 4 - 3);
        assert!(test_quad.w.iter().all(|w_j| w_j.is_finite()));
        assert!(test_quad.z.iter().all(|z_j| z_j.is_finite()));
    }

    #[test]
    fn basic_quadrature_trimmed() {
        let test_quad = Quadrature::new(0.0, 1.0, 5, -1.0, 1.0);
        assert!(test_quad.z.last().unwrap() <= &1.0);
        assert!(test_quad.z[0] >= -1.0);
    }

    #[test]
    fn standard_normal_integral() {
        let test_quad = Quadrature::new(0.0, 1.0, 16, -1.959964, 1.959964);
        assert!((integrate_std_normal(&test_quad) - 0.95).abs() < 0.00000001);
    }

    #[test]
    fn standard_normal_integral_2() {
        let test_quad = Quadrature::new(0.0, 1.0, 16, -1.5, 2.7);
        assert!((integrate_std_normal(&test_quad) - 0.9297258).abs() < 0.0000001);
    }

    #[test]
    fn empty_interval_collapses_to_midpoint() {
        let test_quad = Quadrature::new(0.0, 1.0, 8, 20.0, 21.0);
        assert_eq!(test_quad.z, vec![20.5]);
        assert_eq!(test_quad.w, vec![1.0]);
    }
}
