//! Calibration: reconcile an edited scene back into a DNA document.

pub mod calibrator;
pub mod reconcile;
pub mod report;
pub mod scope;
pub mod validate;

pub use calibrator::{CalibrationState, Calibrator, SideDataExporter};
pub use report::{CalibrationReport, CalibrationStats, CalibrationWarning, FixAction};
pub use validate::{ValidationOutcome, ValidationProblem, Validator};
