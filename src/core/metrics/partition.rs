/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Split of the class around the mean. A total equal to the mean lands in
/// `below_or_equal`, so the two buckets always sum to the row count.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Partition {
    pub above: u64,
    pub below_or_equal: u64,
}

pub fn partition(values: &[f64], mean: f64) -> Partition {
    let mut p = Partition::default();
    for &v in values {
        if v > mean {
            p.above += 1;
        } else {
            p.below_or_equal += 1;
        }
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_values() {
        assert_eq!(mean(&[50.0, 70.0, 90.0]), Some(70.0));
        assert_eq!(mean(&[1.0, 2.0]), Some(1.5));
    }

    #[test]
    fn test_value_at_mean_counts_below() {
        let p = partition(&[50.0, 70.0, 90.0], 70.0);
        assert_eq!(p.above, 1);
        assert_eq!(p.below_or_equal, 2);
    }

    #[test]
    fn test_all_equal_is_all_below() {
        let p = partition(&[60.0; 4], 60.0);
        assert_eq!(p, Partition { above: 0, below_or_equal: 4 });
    }

    #[test]
    fn test_buckets_sum_to_len() {
        let values: Vec<f64> = (0..97).map(|i| ((i * 37) % 101) as f64 / 3.0).collect();
        let m = mean(&values).unwrap();
        let p = partition(&values, m);
        assert_eq!(p.above + p.below_or_equal, values.len() as u64);
    }
}
