//! Summary statistics shared by the analytics components

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Centered sums of squares and cross products
#[derive(Debug, Clone, Copy)]
pub(crate) struct Moments {
    pub mean_x: f64,
    pub mean_y: f64,
    pub sxx: f64,
    pub syy: f64,
    pub sxy: f64,
}

pub(crate) fn moments(x: &[f64], y: &[f64]) -> Option<Moments> {
    if x.len() != y.len() {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    Some(Moments {
        mean_x,
        mean_y,
        sxx,
        syy,
        sxy,
    })
}

/// Pearson correlation; `None` when either side has no variance
pub(crate) fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let m = moments(x, y)?;
    if m.sxx == 0.0 || m.syy == 0.0 {
        return None;
    }
    Some((m.sxy / (m.sxx.sqrt() * m.syy.sqrt())).clamp(-1.0, 1.0))
}

/// Trailing simple moving average.
///
/// The value at position `i` averages positions `i + 1 - window ..= i` and is
/// `None` until the window has filled or while any member is missing.
pub(crate) fn trailing_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let members = &values[i + 1 - window..=i];
            let sum = members.iter().try_fold(0.0, |acc, v| v.map(|v| acc + v))?;
            Some(sum / window as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_std() {
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - 2.138_089_935).abs() < 1e-6);
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn test_pearson_perfect_and_constant() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 5.0, 7.0, 9.0];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);

        let inverse = [9.0, 7.0, 5.0, 3.0];
        assert!((pearson(&x, &inverse).unwrap() + 1.0).abs() < 1e-12);

        assert!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]).is_none());
    }

    #[test]
    fn test_trailing_mean_uses_only_past_values() {
        let values = [Some(1.0), Some(2.0), Some(3.0), Some(10.0)];
        let smoothed = trailing_mean(&values, 3);
        assert_eq!(smoothed[0], None);
        assert_eq!(smoothed[1], None);
        assert_eq!(smoothed[2], Some(2.0));
        assert_eq!(smoothed[3], Some(5.0));
    }

    #[test]
    fn test_trailing_mean_missing_member() {
        let values = [Some(1.0), None, Some(3.0), Some(5.0)];
        let smoothed = trailing_mean(&values, 2);
        assert_eq!(smoothed, vec![None, None, None, Some(4.0)]);
    }
}
