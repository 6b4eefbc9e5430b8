//! Calendar-year splitting of a chronological hourly index.

use std::ops::Range;

use chrono::{Datelike, NaiveDateTime};

/// Iterator over contiguous calendar-year spans of a chronological hourly index.
///
/// Yields `(year, range)` pairs where `range` indexes the hours of that year.
///
/// # Examples
///
/// ```
/// use baseload_sim::sim::calendar::YearSpans;
/// use chrono::NaiveDate;
///
/// let ts = |y| NaiveDate::from_ymd_opt(y, 12, 31).unwrap().and_hms_opt(23, 0, 0).unwrap();
/// let index = vec![ts(2022), ts(2023), ts(2023)];
///
/// let spans: Vec<_> = YearSpans::new(&index).collect();
/// assert_eq!(spans, vec![(2022, 0..1), (2023, 1..3)]);
/// ```
pub struct YearSpans<'a> {
    timestamps: &'a [NaiveDateTime],
    /// Start of the next span
    current: usize,
}

impl<'a> YearSpans<'a> {
    /// Creates the iterator. `timestamps` should be in chronological order.
    pub fn new(timestamps: &'a [NaiveDateTime]) -> Self {
        Self {
            timestamps,
            current: 0,
        }
    }
}

impl Iterator for YearSpans<'_> {
    type Item = (i32, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.current;
        let year = self.timestamps.get(start)?.year();
        let len = self.timestamps[start..]
            .iter()
            .take_while(|t| t.year() == year)
            .count();
        self.current = start + len;
        Some((year, start..self.current))
    }
}

/// Distinct calendar years in a chronological index.
pub fn years(timestamps: &[NaiveDateTime]) -> Vec<i32> {
    YearSpans::new(timestamps).map(|(year, _)| year).collect()
}
