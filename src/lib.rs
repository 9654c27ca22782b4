#![forbid(unsafe_code)]
//! DNA rig-file calibration.
//!
//! A DNA document describes a parametric face or body rig: joints with neutral transforms,
//! meshes, and sparse blend-shape targets. This crate reads a document, compares it with an
//! edited copy living in a 3D scene, and writes back only what changed beyond fixed numeric
//! tolerances.
//!
//! ```no_run
//! use dna_calib::{CalibrationConfig, Calibrator, DnaStream, SceneSnapshot};
//!
//! # fn main() -> dna_calib::CalibResult<()> {
//! let mut dna = DnaStream::open("ada_head.dna")?;
//! dna.retarget("ada_head_calibrated.dna")?;
//! let scene = SceneSnapshot::from_path("ada_scene.json")?;
//! let report = Calibrator::new(&mut dna, &scene, CalibrationConfig::default())?.run()?;
//! if !report.success {
//!     eprintln!("{}: {}", report.title, report.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod calibrate;
pub mod config;
pub mod dna;
pub mod foundation;
pub mod scene;

pub use calibrate::{
    CalibrationReport, CalibrationState, CalibrationStats, CalibrationWarning, Calibrator,
    FixAction, SideDataExporter, ValidationOutcome, Validator,
};
pub use config::{CalibrationConfig, Component, Thresholds, ValidationChecks};
pub use dna::document::DnaDocument;
pub use dna::reader::DnaReader;
pub use dna::stream::{DnaStream, FileFormat};
pub use dna::writer::{DnaIo, DnaWriter, Status};
pub use foundation::core::{RotationUnit, SceneConvention, TranslationUnit, UpAxis};
pub use foundation::error::{CalibError, CalibResult};
pub use scene::{
    LiveBone, LiveMesh, LiveRig, LiveShapeKey, SceneSnapshot, SceneSource, mirror_document,
};
