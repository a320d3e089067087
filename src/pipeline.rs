use serde::{Deserialize, Serialize};

use crate::data::filter::filter_in_bounds;
use crate::data::model::Table;
use crate::error::{FenceError, Result};
use crate::fence::{compute_bounds_with, Bounds, TUKEY_MULTIPLIER};

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What to do with a column whose bounds are undefined (no usable values).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedPolicy {
    /// Stop the pipeline with [`FenceError::EmptyColumn`] or
    /// [`FenceError::UndefinedBounds`].
    #[default]
    Abort,
    /// Leave the table unchanged for that column and carry on.
    Skip,
}

/// Which table each column's bounds are computed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Bounds for column *i* come from the output of stage *i - 1*.
    #[default]
    Sequential,
    /// All bounds come from the input table, then are applied in order.
    Independent,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of filtering one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub column: String,
    /// `None` when the stage was skipped.
    pub bounds: Option<Bounds>,
    pub rows_in: usize,
    pub rows_out: usize,
    pub skipped: bool,
}

impl StageReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_in - self.rows_out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub stages: Vec<StageReport>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: Table,
    pub report: PipelineReport,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Ordered chain of per-column fence filters.
///
/// Every stage takes the previous stage's table and returns a new one; the
/// caller's table is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    columns: Vec<String>,
    multiplier: f64,
    on_undefined: UndefinedPolicy,
    mode: FilterMode,
}

impl Pipeline {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Pipeline {
            columns: columns.into_iter().map(Into::into).collect(),
            multiplier: TUKEY_MULTIPLIER,
            on_undefined: UndefinedPolicy::default(),
            mode: FilterMode::default(),
        }
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn on_undefined(mut self, policy: UndefinedPolicy) -> Self {
        self.on_undefined = policy;
        self
    }

    pub fn mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Run every stage over `table` according to the configured [`FilterMode`].
    pub fn run(&self, table: &Table) -> Result<PipelineOutput> {
        match self.mode {
            FilterMode::Sequential => self.run_sequential(table),
            FilterMode::Independent => self.run_with_reference(table, table),
        }
    }

    /// Compute every column's bounds on `reference`, then apply them in order
    /// to `table`.
    pub fn run_with_reference(&self, reference: &Table, table: &Table) -> Result<PipelineOutput> {
        let bounds = self
            .columns
            .iter()
            .map(|col| self.bounds_for(reference, col))
            .collect::<Result<Vec<_>>>()?;
        self.apply(table, |i, _| Ok(bounds[i]))
    }

    fn run_sequential(&self, table: &Table) -> Result<PipelineOutput> {
        self.apply(table, |i, current| self.bounds_for(current, &self.columns[i]))
    }

    /// Bounds for `column`, mapping an undefined result through the policy.
    fn bounds_for(&self, table: &Table, column: &str) -> Result<Option<Bounds>> {
        match compute_bounds_with(table, column, self.multiplier) {
            Ok(b) => Ok(Some(b)),
            Err(FenceError::EmptyColumn { .. } | FenceError::UndefinedBounds { .. })
                if self.on_undefined == UndefinedPolicy::Skip =>
            {
                log::warn!("{column}: bounds undefined, skipping");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn apply<F>(&self, table: &Table, mut bounds_at: F) -> Result<PipelineOutput>
    where
        F: FnMut(usize, &Table) -> Result<Option<Bounds>>,
    {
        let mut current = table.clone();
        let mut stages = Vec::with_capacity(self.columns.len());

        for (i, column) in self.columns.iter().enumerate() {
            let rows_in = current.len();
            let bounds = bounds_at(i, &current)?;
            if let Some(b) = &bounds {
                current = filter_in_bounds(&current, column, b)?;
            } else {
                current.require_column(column)?;
            }
            let stage = StageReport {
                column: column.clone(),
                bounds,
                rows_in,
                rows_out: current.len(),
                skipped: bounds.is_none(),
            };
            log::info!(
                "{column}: kept {}/{} rows (removed {})",
                stage.rows_out,
                stage.rows_in,
                stage.rows_removed()
            );
            stages.push(stage);
        }

        Ok(PipelineOutput {
            report: PipelineReport {
                input_rows: table.len(),
                output_rows: current.len(),
                stages,
            },
            table: current,
        })
    }
}
