use std::collections::BTreeMap;

use error_stack::{Report, bail};
use tracing::{debug, info};

use crate::error::IndicatorError;
use crate::indicator::composite::PriceVolume;
use crate::indicator::derived::DerivedMomentum;
use crate::indicator::ichimoku::Ichimoku;
use crate::indicator::ma::MovingAverages;
use crate::indicator::momentum::Momentum;
use crate::indicator::trend::Trend;
use crate::indicator::volatility::Volatility;
use crate::indicator::volume::Volume;
use crate::indicator::window::{Series, finite};
use crate::indicator::{Column, IndicatorGroup};
use crate::model::{Bar, BarSeries};

/// A group that failed during a pipeline run. Its columns are all absent.
#[derive(Debug)]
pub struct GroupFailure {
    pub group: &'static str,
    pub error: Report<IndicatorError>,
}

/// Runs every indicator group over a bar series and merges the results.
pub struct Pipeline {
    groups: Vec<Box<dyn IndicatorGroup>>,
}

impl Pipeline {
    /// The eight standard groups.
    pub fn standard() -> Self {
        Self::with_groups(vec![
            Box::new(Momentum),
            Box::new(Trend),
            Box::new(MovingAverages),
            Box::new(Volatility),
            Box::new(Volume),
            Box::new(PriceVolume),
            Box::new(Ichimoku),
            Box::new(DerivedMomentum),
        ])
    }

    pub fn with_groups(groups: Vec<Box<dyn IndicatorGroup>>) -> Self {
        Self { groups }
    }

    /// Never fails: a group that errors only blanks its own columns and is
    /// recorded in [`EnrichedSeries::failures`] for the caller to report.
    pub fn run(&self, series: &BarSeries) -> EnrichedSeries {
        let len = series.len();
        let short: Vec<&str> = Column::ALL
            .iter()
            .filter(|c| c.warm_up() > len)
            .map(|c| c.as_str())
            .collect();
        if !short.is_empty() {
            info!(
                symbol = series.symbol(),
                bars = len,
                columns = ?short,
                "history shorter than some warm-up windows, those columns stay absent"
            );
        }

        let mut columns = BTreeMap::new();
        let mut failures = Vec::new();

        for group in &self.groups {
            match compute_group(group.as_ref(), series) {
                Ok(produced) => {
                    debug!(group = group.name(), columns = produced.len(), "indicator group computed");
                    columns.extend(produced);
                }
                Err(error) => {
                    for &column in group.columns() {
                        columns.insert(column, vec![None; len]);
                    }
                    failures.push(GroupFailure {
                        group: group.name(),
                        error,
                    });
                }
            }
        }

        EnrichedSeries {
            series: series.clone(),
            columns,
            failures,
        }
    }
}

/// Validate a group's output against its declared columns and drop
/// non-finite values.
fn compute_group(
    group: &dyn IndicatorGroup,
    series: &BarSeries,
) -> Result<Vec<(Column, Series)>, Report<IndicatorError>> {
    let mut produced = group.compute(series)?.into_columns();
    let expected = series.len();

    let mut out = Vec::with_capacity(group.columns().len());
    for &column in group.columns() {
        let Some(pos) = produced.iter().position(|(c, _)| *c == column) else {
            bail!(IndicatorError::MissingColumn {
                group: group.name().to_owned(),
                column: column.to_string(),
            });
        };
        let (_, values) = produced.swap_remove(pos);
        if values.len() != expected {
            bail!(IndicatorError::LengthMismatch {
                group: group.name().to_owned(),
                column: column.to_string(),
                expected,
                actual: values.len(),
            });
        }
        out.push((column, values.into_iter().map(|v| v.and_then(finite)).collect()));
    }
    Ok(out)
}

/// The bar series plus one optional value per bar for every column.
#[derive(Debug)]
pub struct EnrichedSeries {
    series: BarSeries,
    columns: BTreeMap<Column, Series>,
    failures: Vec<GroupFailure>,
}

impl EnrichedSeries {
    pub fn series(&self) -> &BarSeries {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn column(&self, column: Column) -> Option<&[Option<f64>]> {
        self.columns.get(&column).map(Vec::as_slice)
    }

    pub fn value(&self, index: usize, column: Column) -> Option<f64> {
        self.column(column)?.get(index).copied().flatten()
    }

    pub fn latest(&self) -> EnrichedRecord<'_> {
        let index = self.len() - 1;
        EnrichedRecord {
            index,
            bar: self.series.last(),
            series: self,
        }
    }

    pub fn failures(&self) -> &[GroupFailure] {
        &self.failures
    }
}

/// One bar and its indicator values.
#[derive(Debug, Clone, Copy)]
pub struct EnrichedRecord<'a> {
    pub index: usize,
    pub bar: &'a Bar,
    series: &'a EnrichedSeries,
}

impl EnrichedRecord<'_> {
    pub fn get(&self, column: Column) -> Option<f64> {
        self.series.value(self.index, column)
    }
}
