use crate::types::granularity::Granularity;
use crate::types::scope::FilterScope;
use crate::utils::{datetime_millis, millis_to_naive, naive_to_millis};
use chrono::NaiveDateTime;
use log::debug;
use polars::prelude::*;
use std::iter;

/// Name of the bucket-start column in every resampled frame.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

pub trait ResampleExt {
    /// Restricts a series to `scope` and averages it into `granularity` buckets.
    ///
    /// The series is reduced to `time_column` (renamed to `timestamp`, cast to
    /// `Datetime[ms]`) plus `value_columns` (cast to `f64`). Rows without a timestamp are
    /// dropped and the scope is measured back from the latest remaining timestamp.
    /// Each bucket holds the mean of the non-null values of every column; buckets where
    /// every column is null are left out.
    ///
    /// An empty series yields an empty frame with the same columns, for every scope and
    /// granularity.
    ///
    /// # Errors
    ///
    /// Fails when a named column does not exist or cannot be cast.
    fn filter_resample(
        self,
        time_column: &str,
        value_columns: &[&str],
        scope: FilterScope,
        granularity: Granularity,
    ) -> PolarsResult<DataFrame>;
}

impl ResampleExt for LazyFrame {
    fn filter_resample(
        self,
        time_column: &str,
        value_columns: &[&str],
        scope: FilterScope,
        granularity: Granularity,
    ) -> PolarsResult<DataFrame> {
        let selection: Vec<Expr> = iter::once(
            col(time_column)
                .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                .alias(TIMESTAMP_COLUMN),
        )
        .chain(value_columns.iter().map(|c| col(*c).cast(DataType::Float64)))
        .collect();

        let series = self
            .select(selection)
            .filter(col(TIMESTAMP_COLUMN).is_not_null())
            .sort([TIMESTAMP_COLUMN], SortMultipleOptions::default())
            .collect()?;

        if series.height() == 0 {
            debug!("Empty series for {:?}, nothing to resample", value_columns);
            return Ok(series);
        }

        let latest = datetime_millis(series.column(TIMESTAMP_COLUMN)?)?
            .i64()?
            .max()
            .and_then(millis_to_naive);

        let input_rows = series.height();
        let mut lazy = series.lazy();
        if let Some(start) = latest.and_then(|max| scope.start_time(max)) {
            lazy = lazy.filter(
                col(TIMESTAMP_COLUMN)
                    .cast(DataType::Int64)
                    .gt_eq(lit(naive_to_millis(start))),
            );
        }

        let every = granularity.bucket_duration();
        let options = DynamicGroupOptions {
            index_column: TIMESTAMP_COLUMN.into(),
            every,
            period: every,
            offset: Duration::parse("0ns"),
            closed_window: ClosedWindow::Left,
            label: Label::Left,
            start_by: granularity.start_by(),
            ..Default::default()
        };
        let means: Vec<Expr> = value_columns.iter().map(|c| col(*c).mean()).collect();

        let mut resampled = lazy
            .group_by_dynamic(col(TIMESTAMP_COLUMN), Vec::<Expr>::new(), options)
            .agg(means);

        // A bucket is only kept if at least one column has a value
        if let Some(any_value) = value_columns
            .iter()
            .map(|c| col(*c).is_not_null())
            .reduce(|acc, next| acc.or(next))
        {
            resampled = resampled.filter(any_value);
        }

        let frame = resampled
            .sort([TIMESTAMP_COLUMN], SortMultipleOptions::default())
            .collect()?;
        debug!(
            "Resampled {} rows into {} {} buckets ({})",
            input_rows,
            frame.height(),
            granularity,
            scope
        );
        Ok(frame)
    }
}

/// Turns one column of a resampled frame into `(bucket start, value)` pairs.
pub fn series_points(
    frame: &DataFrame,
    column: &str,
) -> PolarsResult<Vec<(NaiveDateTime, Option<f64>)>> {
    let timestamps = datetime_millis(frame.column(TIMESTAMP_COLUMN)?)?;
    let values = frame.column(column)?.cast(&DataType::Float64)?;
    Ok(timestamps
        .i64()?
        .into_iter()
        .zip(values.f64()?)
        .filter_map(|(ts, value)| ts.and_then(millis_to_naive).map(|ts| (ts, value)))
        .collect())
}

/// One cell of a resampled frame in long format.
#[derive(Debug, Clone, PartialEq)]
pub struct LongPoint {
    pub timestamp: NaiveDateTime,
    pub series: String,
    pub value: Option<f64>,
}

/// Unpivots every non-timestamp column of a resampled frame into long rows.
///
/// Rows are emitted column by column, each column in timestamp order.
pub fn melt(frame: &DataFrame) -> PolarsResult<Vec<LongPoint>> {
    let mut points = Vec::with_capacity(frame.height() * frame.width().saturating_sub(1));
    for name in frame.get_column_names() {
        if name.as_str() == TIMESTAMP_COLUMN {
            continue;
        }
        for (timestamp, value) in series_points(frame, name.as_str())? {
            points.push(LongPoint {
                timestamp,
                series: name.to_string(),
                value,
            });
        }
    }
    Ok(points)
}
