//! Sales pipeline over CRM deals and stages.
//!
//! [`group_by_stage`] turns flat deal and stage lists into per-stage buckets
//! with totals. [`Pipeline`] loads the board through the repository and
//! applies stage moves.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod aggregate;
pub mod board;
pub mod model;

pub use aggregate::{PipelineSnapshot, StageBucket, group_by_stage, stage_total};
pub use board::{Pipeline, PipelineBoard, STAGE_FIELD};
pub use model::{ContactSummary, Deal, Stage, StageRef};
