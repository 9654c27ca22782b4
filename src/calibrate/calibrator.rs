use crate::calibrate::reconcile::{
    JointBaseline, TargetUpdate, VertexUpdate, reconcile_joints, reconcile_target_deltas,
    reconcile_vertex_positions,
};
use crate::calibrate::report::{CalibrationReport, CalibrationStats, CalibrationWarning};
use crate::calibrate::scope::{ScopedMesh, export_scope};
use crate::calibrate::validate::{ValidationOutcome, Validator};
use crate::config::{CalibrationConfig, Component};
use crate::dna::document::Vector3Array;
use crate::dna::reader::DnaReader;
use crate::dna::writer::DnaIo;
use crate::foundation::core::SceneConvention;
use crate::foundation::error::{CalibError, CalibResult};
use crate::scene::live::{LiveMesh, LiveShapeKey, SceneSource};
use crate::scene::sampler::{sample_bone_transforms, sample_vertices};
use rayon::prelude::*;
use std::collections::HashSet;

/// Progress of a [`Calibrator`]. Stages that are switched off are skipped, never entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CalibrationState {
    /// Export scope captured.
    Initialized,
    Validated,
    VerticesCalibrated,
    ShapeKeysCalibrated,
    BonesCalibrated,
    /// `write()` was invoked.
    Written,
    /// The writer reported OK after `write()`.
    Saved,
    Failed,
}

/// Exports data that lives next to the DNA file (textures, images) once it is saved.
pub trait SideDataExporter {
    fn export(&mut self, dna: &dyn DnaReader) -> CalibResult<()>;
}

/// Sequences validation, the vertex, shape-key and bone stages, and the final write for one
/// exclusively borrowed DNA handle.
pub struct Calibrator<'a> {
    dna: &'a mut dyn DnaIo,
    scene: &'a dyn SceneSource,
    config: CalibrationConfig,
    convention: SceneConvention,
    scope: Vec<ScopedMesh>,
    state: CalibrationState,
    warnings: Vec<CalibrationWarning>,
    stats: CalibrationStats,
    side_data: Option<Box<dyn SideDataExporter + 'a>>,
}

struct VertexJob<'s> {
    mesh_index: u16,
    scene_name: &'s str,
    stored: Vector3Array,
    live: &'s LiveMesh,
}

struct ShapeKeyJob<'s> {
    mesh_index: u16,
    scene_name: String,
    vertex_count: usize,
    basis: &'s LiveShapeKey,
    targets: Vec<(u16, &'s LiveShapeKey)>,
}

impl<'a> Calibrator<'a> {
    /// Capture the export scope. The convention defaults to one derived from the document's
    /// translation unit.
    pub fn new(
        dna: &'a mut dyn DnaIo,
        scene: &'a dyn SceneSource,
        config: CalibrationConfig,
    ) -> CalibResult<Self> {
        config.validate()?;
        let convention = config
            .convention
            .unwrap_or_else(|| SceneConvention::for_unit(dna.translation_unit()));
        let scope = export_scope(&*dna, scene, &config);
        tracing::debug!(meshes = scope.len(), "captured export scope");
        Ok(Self {
            dna,
            scene,
            config,
            convention,
            scope,
            state: CalibrationState::Initialized,
            warnings: Vec::new(),
            stats: CalibrationStats::default(),
            side_data: None,
        })
    }

    pub fn with_side_data(mut self, exporter: impl SideDataExporter + 'a) -> Self {
        self.side_data = Some(Box::new(exporter));
        self
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn scope(&self) -> &[ScopedMesh] {
        &self.scope
    }

    pub fn convention(&self) -> SceneConvention {
        self.convention
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Run the pre-flight checks without touching the writer.
    pub fn validate(&self) -> ValidationOutcome {
        Validator::new(&self.config).validate(&*self.dna, self.scene, &self.scope)
    }

    /// Validate, reconcile and write.
    ///
    /// A failed validation returns `Ok` with an unsuccessful report and leaves the writer
    /// untouched. Missing required data and a non-OK writer status after `write()` are errors.
    pub fn run(&mut self) -> CalibResult<CalibrationReport> {
        if self.state != CalibrationState::Initialized {
            return Err(CalibError::Other(anyhow::anyhow!(
                "calibrator already ran (state {:?})",
                self.state
            )));
        }
        let res = self.run_stages();
        if res.is_err() {
            self.state = CalibrationState::Failed;
        }
        res
    }

    fn run_stages(&mut self) -> CalibResult<CalibrationReport> {
        let outcome = self.validate();
        if !outcome.ok {
            self.state = CalibrationState::Failed;
            return Ok(CalibrationReport {
                success: false,
                title: outcome.title,
                message: outcome.message,
                fix: outcome.fix,
                warnings: Vec::new(),
                stats: CalibrationStats::default(),
            });
        }
        self.state = CalibrationState::Validated;

        if self.config.include_meshes {
            self.calibrate_vertex_positions()?;
            self.state = CalibrationState::VerticesCalibrated;
        }
        if self.config.include_shape_keys {
            self.calibrate_shape_keys()?;
            self.state = CalibrationState::ShapeKeysCalibrated;
        }
        if self.config.include_bones {
            self.calibrate_bone_transforms()?;
            self.state = CalibrationState::BonesCalibrated;
        }

        tracing::info!("saving DNA");
        self.dna.write();
        self.state = CalibrationState::Written;
        let status = self.dna.status();
        if !status.is_ok() {
            return Err(CalibError::write_status(status.message()));
        }
        self.state = CalibrationState::Saved;
        tracing::info!(
            vertices = self.stats.vertices_changed,
            targets = self.stats.targets_rewritten,
            joints = self.stats.joint_translations_changed,
            "DNA calibrated successfully"
        );

        if let Some(exporter) = self.side_data.as_mut()
            && let Err(e) = exporter.export(&*self.dna)
        {
            tracing::error!("side data export failed: {e}");
            self.warnings.push(CalibrationWarning::SideDataExport {
                message: e.to_string(),
            });
        }

        Ok(CalibrationReport::succeeded(
            std::mem::take(&mut self.warnings),
            self.stats,
        ))
    }

    #[tracing::instrument(skip(self))]
    fn calibrate_vertex_positions(&mut self) -> CalibResult<()> {
        let jobs: Vec<VertexJob<'_>> = self
            .scope
            .iter()
            .map(|m| {
                let live = self.scene.mesh(&m.scene_name).ok_or_else(|| {
                    CalibError::scene(format!(
                        "mesh object '{}' left the scene after the export scope was captured",
                        m.scene_name
                    ))
                })?;
                let stored = Vector3Array {
                    xs: self.dna.vertex_position_xs(m.mesh_index).to_vec(),
                    ys: self.dna.vertex_position_ys(m.mesh_index).to_vec(),
                    zs: self.dna.vertex_position_zs(m.mesh_index).to_vec(),
                };
                Ok(VertexJob {
                    mesh_index: m.mesh_index,
                    scene_name: &m.scene_name,
                    stored,
                    live,
                })
            })
            .collect::<CalibResult<_>>()?;

        let convention = self.convention;
        let epsilon = self.config.thresholds.vertex_epsilon;
        let updates: Vec<VertexUpdate> = map_jobs(
            self.config.parallel,
            self.config.threads,
            &jobs,
            |job: &VertexJob<'_>| {
                let (indices, positions) = sample_vertices(job.live, convention);
                reconcile_vertex_positions(&job.stored, &indices, &positions, epsilon)
            },
        )?;

        let mut changed = 0;
        for (job, update) in jobs.iter().zip(&updates) {
            tracing::info!(mesh = job.scene_name, changed = update.changed, "calibrated vertex positions");
            self.dna.set_vertex_positions(job.mesh_index, &update.rows)?;
            changed += update.changed;
        }
        self.stats.meshes_calibrated = jobs.len();
        self.stats.vertices_changed = changed;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn calibrate_shape_keys(&mut self) -> CalibResult<()> {
        if self.config.component != Component::Head {
            tracing::debug!(component = ?self.config.component, "shape keys are only calibrated for the head");
            return Ok(());
        }

        let jobs = self.shape_key_jobs()?;
        let convention = self.convention;
        let threshold = self.config.thresholds.shape_key_delta;
        let updates: Vec<Vec<TargetUpdate>> = map_jobs(
            self.config.parallel,
            self.config.threads,
            &jobs,
            |job: &ShapeKeyJob<'_>| -> Vec<TargetUpdate> {
                job.targets
                    .iter()
                    .map(|&(target_index, key)| {
                        reconcile_target_deltas(
                            target_index,
                            &job.basis.positions,
                            &key.positions,
                            job.vertex_count,
                            convention,
                            threshold,
                        )
                    })
                    .collect()
            },
        )?;

        for (job, targets) in jobs.iter().zip(&updates) {
            let mut largest = 0;
            for t in targets {
                self.dna.set_blend_shape_target_vertex_indices(
                    job.mesh_index,
                    t.target_index,
                    &t.vertex_indices,
                )?;
                self.dna
                    .set_blend_shape_target_deltas(job.mesh_index, t.target_index, &t.deltas)?;
                largest = largest.max(t.len());
            }
            tracing::debug!(
                mesh = %job.scene_name,
                targets = targets.len(),
                largest,
                "largest shape key delta count"
            );
            self.stats.targets_rewritten += targets.len();
            self.stats.largest_target = self.stats.largest_target.max(largest);
        }
        Ok(())
    }

    /// Resolve which live shape key feeds which target. Skips are logged and recorded; a mesh
    /// with shape keys but no basis aborts the run.
    fn shape_key_jobs(&mut self) -> CalibResult<Vec<ShapeKeyJob<'a>>> {
        let scene: &'a dyn SceneSource = self.scene;
        let basis_name = self.config.basis_shape_key.as_str();
        let max_len = self.config.shape_key_name_max_len;
        let mut seen = HashSet::new();
        let mut jobs = Vec::new();

        for lod in 0..self.dna.lod_count() {
            if self.dna.blend_shape_channel_indices_for_lod(lod).is_empty() {
                continue;
            }
            tracing::info!(lod, "calibrating shape keys");

            for &mesh_index in self.dna.mesh_indices_for_lod(lod) {
                if !seen.insert(mesh_index) {
                    continue;
                }
                let dna_name = self.dna.mesh_name(mesh_index);
                let scene_name = self.config.scene_mesh_name(dna_name);
                let Some(live) = scene.mesh(&scene_name) else {
                    tracing::error!(mesh = %scene_name, "mesh object not found for shape key calibration; skipping");
                    self.warnings
                        .push(CalibrationWarning::MissingSceneMesh { mesh: scene_name });
                    continue;
                };
                if live.shape_keys.is_empty() {
                    tracing::warn!(mesh = %scene_name, "mesh object has no shape keys; skipping");
                    self.warnings
                        .push(CalibrationWarning::NoShapeKeys { mesh: scene_name });
                    continue;
                }
                let Some(basis) = live.shape_key(basis_name) else {
                    return Err(CalibError::missing_data(format!(
                        "shape key '{basis_name}' not found for mesh '{scene_name}'; it is needed for calibration"
                    )));
                };

                let mut targets = Vec::new();
                for target_index in 0..self.dna.blend_shape_target_count(mesh_index) {
                    let channel = self.dna.blend_shape_channel_name(
                        self.dna.blend_shape_channel_index(mesh_index, target_index),
                    );
                    let key_name = self.config.shape_key_name(dna_name, channel);
                    if key_name.len() > max_len {
                        tracing::warn!(shape_key = %key_name, max_len, "shape key name too long; skipping");
                        self.warnings.push(CalibrationWarning::ShapeKeyNameTooLong {
                            mesh: scene_name.clone(),
                            shape_key: key_name,
                            max_len,
                        });
                        continue;
                    }
                    let Some(key) = live.shape_key(&key_name) else {
                        tracing::error!(shape_key = %key_name, mesh = %scene_name, "shape key not found; skipping");
                        self.warnings.push(CalibrationWarning::MissingShapeKey {
                            mesh: scene_name.clone(),
                            shape_key: key_name,
                        });
                        continue;
                    };
                    targets.push((target_index, key));
                }

                jobs.push(ShapeKeyJob {
                    mesh_index,
                    vertex_count: self.dna.vertex_position_count(mesh_index) as usize,
                    scene_name,
                    basis,
                    targets,
                });
            }
        }
        Ok(jobs)
    }

    #[tracing::instrument(skip(self))]
    fn calibrate_bone_transforms(&mut self) -> CalibResult<()> {
        let Some(rig) = self.scene.rig() else {
            tracing::warn!("no rig in the scene; skipping bone calibration");
            self.warnings.push(CalibrationWarning::MissingRig);
            return Ok(());
        };
        tracing::info!(rig = %rig.name, "calibrating bones");

        let bones = sample_bone_transforms(rig, &self.config.ignored_bones, self.convention);
        let baseline = JointBaseline::from_reader(&*self.dna);
        let update = reconcile_joints(&baseline, &bones, &self.config);

        self.dna.set_neutral_joint_translations(&update.translations)?;
        self.dna.set_neutral_joint_rotations(&update.rotations)?;

        self.stats.joint_translations_changed = update.translations_changed;
        self.stats.joint_rotations_changed = update.rotations_changed;
        self.warnings.extend(
            update
                .unmapped
                .into_iter()
                .map(|bone| CalibrationWarning::UnmappedBone { bone }),
        );
        Ok(())
    }
}

/// Map `f` over `jobs`, on a dedicated rayon pool when `parallel` is set. Output order matches
/// input order.
fn map_jobs<J, R, F>(parallel: bool, threads: Option<usize>, jobs: &[J], f: F) -> CalibResult<Vec<R>>
where
    J: Sync,
    R: Send,
    F: Fn(&J) -> R + Sync + Send,
{
    if !parallel || jobs.len() < 2 {
        return Ok(jobs.iter().map(f).collect());
    }
    let pool = build_thread_pool(threads)?;
    Ok(pool.install(|| jobs.par_iter().map(&f).collect()))
}

fn build_thread_pool(threads: Option<usize>) -> CalibResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CalibError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/calibrate/calibrator.rs"]
mod tests;
