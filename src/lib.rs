//! Marks and grade-distribution reports for a single class section.
//!
//! A run reads one sheet with `Total` and `Grade` columns, checks its shape,
//! and summarises it: the mean mark, how many students sit above it and at
//! or below it, and how many hold each grade on the fixed `A*`..`U` scale.
//! The [`report`] writers turn that summary into an HTML page, a short text
//! narrative, JSON, a cleaned CSV and an optional LaTeX export.

pub mod core;
pub mod report;

pub use crate::core::engine::{RunConfig, RunOutput, generate_report, generate_report_from_bytes};
pub use crate::core::error::{ProcessingError, ReportError};
