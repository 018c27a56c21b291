//! Pattern Classifier
//!
//! Turns a window of categorized transactions into per-category aggregates:
//! totals, a per-month average, a rising/falling/stable trend and outlier
//! flags. Income is excluded, and a category with no transactions in the
//! window is absent from the output rather than reported as zero.
//!
//! Aggregates are recomputed from the full transaction set on every call and
//! never cached.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use crate::models::{Category, CategoryAggregate, Transaction, Trend};
use crate::numeric::round_money;

/// Inclusive date range whose calendar months are the analysis periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

impl AnalysisWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "window start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Smallest window covering every transaction, or None for no transactions
    pub fn covering(transactions: &[Transaction]) -> Option<Self> {
        let start = transactions.iter().map(|t| t.date).min()?;
        let end = transactions.iter().map(|t| t.date).max()?;
        Some(Self { start, end })
    }

    /// Number of calendar months touched by the window
    pub fn periods(&self) -> usize {
        (month_ordinal(self.end) - month_ordinal(self.start) + 1) as usize
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Zero-based month index of `date` within the window
    fn period_of(&self, date: NaiveDate) -> usize {
        (month_ordinal(date) - month_ordinal(self.start)) as usize
    }
}

/// Money spent given a signed net amount (expenses are negative)
///
/// A net inflow, such as a month of refunds, is zero spending.
pub fn spending(net: Decimal) -> Decimal {
    (-net).max(Decimal::ZERO)
}

/// Classify the change in spending between two signed period totals
pub fn trend_between(prior: Decimal, recent: Decimal, threshold_pct: Decimal) -> Trend {
    let (prior, recent) = (spending(prior), spending(recent));
    if prior.is_zero() {
        return if recent.is_zero() {
            Trend::Stable
        } else {
            Trend::Rising
        };
    }

    let change_pct = (recent - prior) / prior * Decimal::ONE_HUNDRED;
    if change_pct > threshold_pct {
        Trend::Rising
    } else if change_pct < -threshold_pct {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

/// Groups transactions by category and derives aggregates
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    config: ClassifierConfig,
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }
}

impl PatternClassifier {
    /// Create a classifier, rejecting an invalid configuration
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify over the smallest window covering all transactions
    pub fn classify_all(&self, transactions: &[Transaction]) -> Vec<CategoryAggregate> {
        match AnalysisWindow::covering(transactions) {
            Some(window) => self.classify(transactions, window),
            None => Vec::new(),
        }
    }

    /// Aggregate every non-income category with transactions inside `window`
    ///
    /// Output is ordered by category. An empty window yields an empty result.
    pub fn classify(
        &self,
        transactions: &[Transaction],
        window: AnalysisWindow,
    ) -> Vec<CategoryAggregate> {
        let mut by_category: BTreeMap<Category, Vec<&Transaction>> = BTreeMap::new();
        let mut skipped = 0usize;

        for tx in transactions {
            if !window.contains(tx.date) {
                skipped += 1;
                continue;
            }
            if tx.category.is_income() {
                continue;
            }
            by_category.entry(tx.category).or_default().push(tx);
        }

        if skipped > 0 {
            tracing::debug!(skipped, "Ignored transactions outside the analysis window");
        }

        let periods = window.periods();
        let aggregates: Vec<CategoryAggregate> = by_category
            .into_iter()
            .map(|(category, txs)| self.aggregate(category, &txs, window, periods))
            .collect();

        tracing::debug!(
            categories = aggregates.len(),
            periods,
            "Pattern classification complete"
        );

        aggregates
    }

    fn aggregate(
        &self,
        category: Category,
        txs: &[&Transaction],
        window: AnalysisWindow,
        periods: usize,
    ) -> CategoryAggregate {
        let total: Decimal = txs.iter().map(|t| t.amount).sum();

        let mut period_totals = vec![Decimal::ZERO; periods];
        for tx in txs {
            period_totals[window.period_of(tx.date)] += tx.amount;
        }

        let threshold = self.config.trend_threshold_pct;
        let trends: Vec<Trend> = period_totals
            .windows(2)
            .map(|pair| trend_between(pair[0], pair[1], threshold))
            .collect();
        let trend = trends.last().copied().unwrap_or(Trend::Stable);
        let rising_streak = trends
            .iter()
            .rev()
            .take_while(|t| **t == Trend::Rising)
            .count();

        // Outliers are expenses judged against the mean transaction magnitude
        let count = Decimal::from(txs.len());
        let mean = txs.iter().map(|t| t.amount.abs()).sum::<Decimal>() / count;
        let cutoff = mean * self.config.outlier_multiple;
        let outlier_ids: Vec<i64> = txs
            .iter()
            .filter(|t| spending(t.amount) > cutoff)
            .map(|t| t.id)
            .collect();

        if !outlier_ids.is_empty() {
            tracing::debug!(
                category = %category,
                outliers = outlier_ids.len(),
                "Flagged outlier transactions"
            );
        }

        CategoryAggregate {
            category,
            total,
            average_per_period: round_money(total / Decimal::from(periods)),
            trend,
            rising_streak,
            transaction_count: txs.len(),
            periods,
            period_totals,
            is_outlier: !outlier_ids.is_empty(),
            outlier_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, tx};
    use rust_decimal_macros::dec;

    fn window(start: NaiveDate, end: NaiveDate) -> AnalysisWindow {
        AnalysisWindow::new(start, end).unwrap()
    }

    #[test]
    fn test_window_periods_are_calendar_months() {
        assert_eq!(window(date(2024, 1, 31), date(2024, 2, 1)).periods(), 2);
        assert_eq!(window(date(2024, 1, 1), date(2024, 1, 31)).periods(), 1);
        assert_eq!(window(date(2023, 11, 15), date(2024, 2, 3)).periods(), 4);
        assert!(AnalysisWindow::new(date(2024, 2, 1), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let classifier = PatternClassifier::default();
        assert!(classifier.classify_all(&[]).is_empty());
        assert!(classifier
            .classify(&[], window(date(2024, 1, 1), date(2024, 3, 31)))
            .is_empty());
    }

    #[test]
    fn test_groups_sums_and_averages() {
        let txs = vec![
            tx(1, date(2024, 1, 3), dec!(-800), Category::Housing),
            tx(2, date(2024, 2, 3), dec!(-800), Category::Housing),
            tx(3, date(2024, 1, 10), dec!(-45.50), Category::Food),
            tx(4, date(2024, 2, 12), dec!(-54.50), Category::Food),
            tx(5, date(2024, 1, 15), dec!(2000), Category::Income),
        ];

        let aggs = PatternClassifier::default().classify(&txs, window(date(2024, 1, 1), date(2024, 2, 29)));

        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].category, Category::Housing);
        assert_eq!(aggs[0].total, dec!(-1600));
        assert_eq!(aggs[0].average_per_period, dec!(-800));
        assert_eq!(aggs[0].trend, Trend::Stable);
        assert_eq!(aggs[1].category, Category::Food);
        assert_eq!(aggs[1].total, dec!(-100.00));
        assert_eq!(aggs[1].transaction_count, 2);
    }

    #[test]
    fn test_totals_match_non_income_sum() {
        let txs = vec![
            tx(1, date(2024, 3, 1), dec!(-12.34), Category::Transport),
            tx(2, date(2024, 3, 2), dec!(-56.78), Category::Entertainment),
            tx(3, date(2024, 4, 3), dec!(15.00), Category::Food),
            tx(4, date(2024, 4, 4), dec!(-90.12), Category::Food),
            tx(5, date(2024, 4, 5), dec!(1500), Category::Income),
            tx(6, date(2024, 5, 6), dec!(-3.33), Category::Other),
        ];

        let aggs = PatternClassifier::default().classify_all(&txs);
        let aggregate_sum: Decimal = aggs.iter().map(|a| a.total).sum();
        let expected: Decimal = txs
            .iter()
            .filter(|t| !t.category.is_income())
            .map(|t| t.amount)
            .sum();

        assert_eq!(aggregate_sum, expected);
    }

    #[test]
    fn test_absent_categories_are_omitted() {
        let txs = vec![tx(1, date(2024, 1, 5), dec!(-20), Category::Food)];
        let aggs = PatternClassifier::default().classify_all(&txs);

        assert_eq!(aggs.len(), 1);
        assert!(aggs.iter().all(|a| a.transaction_count > 0));
        assert!(!aggs.iter().any(|a| a.category == Category::Housing));
    }

    #[test]
    fn test_trend_detection() {
        let txs = vec![
            tx(1, date(2024, 1, 5), dec!(-100), Category::Food),
            tx(2, date(2024, 2, 5), dec!(-150), Category::Food),
            tx(3, date(2024, 1, 5), dec!(-100), Category::Entertainment),
            tx(4, date(2024, 2, 5), dec!(-50), Category::Entertainment),
            tx(5, date(2024, 1, 5), dec!(-100), Category::Transport),
            tx(6, date(2024, 2, 5), dec!(-105), Category::Transport),
        ];

        let aggs = PatternClassifier::default().classify_all(&txs);
        let trend_of = |c: Category| aggs.iter().find(|a| a.category == c).unwrap().trend;

        assert_eq!(trend_of(Category::Food), Trend::Rising);
        assert_eq!(trend_of(Category::Entertainment), Trend::Falling);
        assert_eq!(trend_of(Category::Transport), Trend::Stable);
    }

    #[test]
    fn test_trend_threshold_is_configurable() {
        let txs = vec![
            tx(1, date(2024, 1, 5), dec!(-100), Category::Food),
            tx(2, date(2024, 2, 5), dec!(-120), Category::Food),
        ];
        let lenient = PatternClassifier::new(ClassifierConfig {
            trend_threshold_pct: dec!(25),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(PatternClassifier::default().classify_all(&txs)[0].trend, Trend::Rising);
        assert_eq!(lenient.classify_all(&txs)[0].trend, Trend::Stable);
    }

    #[test]
    fn test_rising_streak_counts_consecutive_increases() {
        let txs = vec![
            tx(1, date(2024, 1, 5), dec!(-100), Category::Food),
            tx(2, date(2024, 2, 5), dec!(-130), Category::Food),
            tx(3, date(2024, 3, 5), dec!(-170), Category::Food),
            tx(4, date(2024, 4, 5), dec!(-220), Category::Food),
        ];

        let agg = &PatternClassifier::default().classify_all(&txs)[0];
        assert_eq!(agg.rising_streak, 3);
        assert_eq!(agg.period_totals, vec![dec!(-100), dec!(-130), dec!(-170), dec!(-220)]);
    }

    #[test]
    fn test_single_period_is_stable() {
        let txs = vec![tx(1, date(2024, 1, 5), dec!(-100), Category::Food)];
        let agg = &PatternClassifier::default().classify_all(&txs)[0];
        assert_eq!(agg.trend, Trend::Stable);
        assert_eq!(agg.rising_streak, 0);
    }

    #[test]
    fn test_outlier_flagged_not_excluded() {
        let mut txs: Vec<Transaction> = (1..=9)
            .map(|i| tx(i, date(2024, 1, i as u32), dec!(-10), Category::Entertainment))
            .collect();
        txs.push(tx(10, date(2024, 1, 20), dec!(-500), Category::Entertainment));

        let agg = &PatternClassifier::default().classify_all(&txs)[0];

        assert!(agg.is_outlier);
        assert_eq!(agg.outlier_ids, vec![10]);
        assert_eq!(agg.total, dec!(-590));
        assert_eq!(agg.transaction_count, 10);
    }

    #[test]
    fn test_uniform_spending_has_no_outlier() {
        let txs: Vec<Transaction> = (1..=5)
            .map(|i| tx(i, date(2024, 1, i as u32), dec!(-25), Category::Food))
            .collect();
        assert!(!PatternClassifier::default().classify_all(&txs)[0].is_outlier);
    }

    #[test]
    fn test_transactions_outside_window_ignored() {
        let txs = vec![
            tx(1, date(2023, 12, 31), dec!(-999), Category::Food),
            tx(2, date(2024, 1, 2), dec!(-10), Category::Food),
        ];
        let aggs = PatternClassifier::default().classify(&txs, window(date(2024, 1, 1), date(2024, 1, 31)));
        assert_eq!(aggs[0].total, dec!(-10));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = PatternClassifier::new(ClassifierConfig {
            outlier_multiple: dec!(0),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_trend_between_from_zero() {
        assert_eq!(trend_between(dec!(0), dec!(-5), dec!(10)), Trend::Rising);
        assert_eq!(trend_between(dec!(0), dec!(0), dec!(10)), Trend::Stable);
    }

    #[test]
    fn test_spending_clamps_inflows() {
        assert_eq!(spending(dec!(-42.50)), dec!(42.50));
        assert_eq!(spending(dec!(900)), Decimal::ZERO);
        assert_eq!(spending(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_refund_month_is_not_rising() {
        // A month of refunds is less spending, not more
        assert_eq!(trend_between(dec!(-100), dec!(1000), dec!(10)), Trend::Falling);
        assert_eq!(trend_between(dec!(50), dec!(-20), dec!(10)), Trend::Rising);

        let txs = vec![
            tx(1, date(2024, 1, 5), dec!(-100), Category::Other),
            tx(2, date(2024, 2, 5), dec!(1000), Category::Other),
        ];
        let agg = &PatternClassifier::default().classify_all(&txs)[0];
        assert_eq!(agg.total, dec!(900));
        assert_eq!(agg.trend, Trend::Falling);
        assert_eq!(agg.rising_streak, 0);
        // A large refund is not a one-time expense
        assert!(!agg.is_outlier);
    }
}
