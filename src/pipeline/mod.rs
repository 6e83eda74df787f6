//! Aggregation pipeline for document streams.
//!
//! A pipeline is a sequence of declarative [`Stage`]s (unwind, group, match,
//! project, sort) executed by Volcano-style pull operators, the same
//! row-at-a-time model the query executor uses for plain finds.

mod error;
mod operators;
mod stage;

pub use error::{PipelineError, PipelineResult};
pub use operators::{
    GroupOperator, MatchOperator, Operator, ProjectOperator, Row, ScanOperator, SortOperator,
    UnwindOperator,
};
pub use stage::{Accumulator, ProjectField, Stage};

/// Build an operator tree for the given stages over the input rows.
pub fn build(rows: Vec<Row>, stages: &[Stage]) -> Box<dyn Operator> {
    let mut op: Box<dyn Operator> = Box::new(ScanOperator::new(rows));
    for stage in stages {
        op = match stage {
            Stage::Unwind { path } => Box::new(UnwindOperator::new(op, path.clone())),
            Stage::Group { key, accumulators } => {
                Box::new(GroupOperator::new(op, key.clone(), accumulators.clone()))
            }
            Stage::Match(filter) => Box::new(MatchOperator::new(op, filter.clone())),
            Stage::Project(fields) => Box::new(ProjectOperator::new(op, fields.clone())),
            Stage::Sort { field, descending } => {
                Box::new(SortOperator::new(op, field.clone(), *descending))
            }
        };
    }
    op
}

/// Run a pipeline to completion, collecting the output rows.
pub fn run(rows: Vec<Row>, stages: &[Stage]) -> PipelineResult<Vec<Row>> {
    let mut op = build(rows, stages);
    let mut out = Vec::new();
    while let Some(row) = op.next_row()? {
        out.push(row);
    }
    Ok(out)
}
