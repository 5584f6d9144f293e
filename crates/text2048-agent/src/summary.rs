use serde::{Deserialize, Serialize};

/// Descriptive statistics over a set of `f32` values.
///
/// # Example
///
/// ```
/// use text2048_agent::summary::Summary;
///
/// let summary = Summary::new([4.0, 2.0, 6.0]).unwrap();
/// assert_eq!(summary.count, 3);
/// assert_eq!(summary.mean, 4.0);
/// assert_eq!(summary.min, 2.0);
/// assert_eq!(summary.max, 6.0);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f32,
    pub min: f32,
    pub max: f32,
    /// Population standard deviation.
    pub std_dev: f32,
}

impl Summary {
    /// Returns `None` for an empty input.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        let min = values.iter().copied().reduce(f32::min)?;
        let max = values.iter().copied().reduce(f32::max)?;
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        Some(Self {
            count: values.len(),
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(Summary::new(Vec::new()), None);
    }

    #[test]
    fn test_single_value() {
        let summary = Summary::new([3.5]).unwrap();
        assert_eq!(summary.count, 1);
        assert!((summary.mean - 3.5).abs() < f32::EPSILON);
        assert!(summary.std_dev.abs() < f32::EPSILON);
    }

    #[test]
    fn test_std_dev() {
        let summary = Summary::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((summary.mean - 5.0).abs() < 1e-6);
        assert!((summary.std_dev - 2.0).abs() < 1e-6);
    }
}
