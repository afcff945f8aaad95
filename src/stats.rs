use crate::analyzers::utility::{mean, median, quantile, sorted};

/// Descriptive statistics for one group of calendar rows.
///
/// `observations` counts every row, priced or not; the price figures only
/// look at rows that have a price and are `None` when there are none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceStats {
    pub observations: usize,
    pub priced: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub p25: Option<f64>,
    pub p75: Option<f64>,
}

impl PriceStats {
    pub fn from_prices<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut observations = 0usize;
        let mut values = Vec::new();

        for p in prices {
            observations += 1;
            if let Some(v) = p {
                values.push(v);
            }
        }

        let values = sorted(&values);

        PriceStats {
            observations,
            priced: values.len(),
            mean: mean(&values),
            median: median(&values),
            p25: quantile(&values, 0.25),
            p75: quantile(&values, 0.75),
        }
    }

    /// Share of observations that carried a price, in percent.
    pub fn priced_pct(&self) -> f64 {
        pct(self.priced, self.observations)
    }
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(pct(50, 100), 50.0);
        assert_eq!(pct(1, 4), 25.0);
    }

    #[test]
    fn test_from_prices_empty() {
        let stats = PriceStats::from_prices(std::iter::empty());
        assert_eq!(stats, PriceStats::default());
    }

    #[test]
    fn test_from_prices_known_series() {
        let prices = [100.0, 150.0, 150.0, 200.0, 300.0].map(Some);
        let stats = PriceStats::from_prices(prices);

        assert_eq!(stats.observations, 5);
        assert_eq!(stats.mean, Some(180.0));
        assert_eq!(stats.median, Some(150.0));
        assert_eq!(stats.p25, Some(150.0));
        assert_eq!(stats.p75, Some(200.0));
    }

    #[test]
    fn test_null_prices_count_but_do_not_price() {
        let stats = PriceStats::from_prices([Some(100.0), None, Some(300.0), None]);

        assert_eq!(stats.observations, 4);
        assert_eq!(stats.priced, 2);
        assert_eq!(stats.mean, Some(200.0));
        assert_eq!(stats.priced_pct(), 50.0);
    }

    #[test]
    fn test_all_null_prices() {
        let stats = PriceStats::from_prices([None, None]);

        assert_eq!(stats.observations, 2);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.median, None);
    }
}
