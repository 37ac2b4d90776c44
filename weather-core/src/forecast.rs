//! Selection and aggregation over forecast samples.
//!
//! Everything here is pure: the handlers fetch the sample list once and hand it
//! to these functions together with the requested day or instant.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{DailySummary, ForecastSample};

/// Most frequent value in `values`. On equal counts the value seen first wins.
pub fn most_common<'a, I>(values: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&'a str, usize)> = Vec::new();

    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    // `counts` is in first-seen order, so only a strictly larger count replaces the leader.
    counts
        .into_iter()
        .fold(None, |best: Option<(&'a str, usize)>, (value, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((value, count)),
        })
        .map(|(value, _)| value)
}

/// Samples whose UTC date is `date`, in provider order.
pub fn samples_on(samples: &[ForecastSample], date: NaiveDate) -> Vec<&ForecastSample> {
    samples.iter().filter(|s| s.date() == date).collect()
}

/// The sample on the same UTC day as `target` that is closest to it.
///
/// Ties go to the earlier sample in provider order.
pub fn nearest_sample(samples: &[ForecastSample], target: DateTime<Utc>) -> Option<&ForecastSample> {
    let day = target.date_naive();

    samples
        .iter()
        .filter(|s| s.date() == day)
        // min_by_key keeps the first of several equal minima
        .min_by_key(|s| (s.time - target).num_seconds().abs())
}

/// Summarize one day's samples. Returns `None` when `samples` is empty.
pub fn summarize_day(date: NaiveDate, samples: &[&ForecastSample]) -> Option<DailySummary> {
    let condition = most_common(samples.iter().map(|s| s.condition.as_str()))?;

    let temps: Vec<f64> = samples.iter().map(|s| s.temperature_c).collect();
    let high_c = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low_c = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let average_c = temps.iter().sum::<f64>() / temps.len() as f64;

    Some(DailySummary {
        date,
        condition: condition.to_string(),
        high_c,
        low_c,
        average_c,
        sample_count: samples.len(),
    })
}

/// Summaries for every day in `[start, end]` that has at least one sample.
pub fn summarize_range(
    samples: &[ForecastSample],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailySummary> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&ForecastSample>> = BTreeMap::new();

    for sample in samples {
        let day = sample.date();
        if (start..=end).contains(&day) {
            by_day.entry(day).or_default().push(sample);
        }
    }

    by_day
        .into_iter()
        .filter_map(|(day, day_samples)| summarize_day(day, &day_samples))
        .collect()
}
