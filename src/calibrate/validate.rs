use crate::calibrate::report::FixAction;
use crate::calibrate::scope::ScopedMesh;
use crate::config::{CalibrationConfig, Component};
use crate::dna::reader::DnaReader;
use crate::scene::live::SceneSource;
use std::collections::HashSet;
use std::fmt;

/// One failed precondition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationProblem {
    pub title: &'static str,
    pub message: String,
    pub fix: Option<FixAction>,
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Pre-flight verdict. When several checks fail, the title and fix come from the first problem
/// and the message lists every problem, one per line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub title: String,
    pub message: String,
    pub fix: Option<FixAction>,
    pub problems: Vec<ValidationProblem>,
}

impl ValidationOutcome {
    fn from_problems(problems: Vec<ValidationProblem>) -> Self {
        let Some(first) = problems.first() else {
            return Self {
                ok: true,
                title: "Valid".to_string(),
                message: "Validation successful.".to_string(),
                fix: None,
                problems,
            };
        };
        let message = problems
            .iter()
            .map(|p| p.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            ok: false,
            title: first.title.to_string(),
            fix: first.fix.clone(),
            message,
            problems,
        }
    }
}

/// Checks that must hold before any reconciliation touches the writer.
pub struct Validator<'c> {
    config: &'c CalibrationConfig,
}

impl<'c> Validator<'c> {
    pub fn new(config: &'c CalibrationConfig) -> Self {
        Self { config }
    }

    pub fn validate(
        &self,
        reader: &dyn DnaReader,
        scene: &dyn SceneSource,
        scope: &[ScopedMesh],
    ) -> ValidationOutcome {
        let cfg = self.config;
        let mut problems = Vec::new();

        if (cfg.include_meshes || cfg.include_shape_keys) && scope.is_empty() {
            problems.push(ValidationProblem {
                title: "No Meshes",
                message: format!(
                    "None of the {} DNA meshes has a matching object in the scene.",
                    reader.mesh_count()
                ),
                fix: Some(FixAction::SelectMeshes),
            });
        }

        if cfg.checks.vertex_counts && (cfg.include_meshes || cfg.include_shape_keys) {
            self.check_vertex_counts(reader, scene, scope, &mut problems);
        }
        if cfg.checks.vertex_counts && cfg.include_shape_keys {
            self.check_shape_key_lengths(scene, scope, &mut problems);
        }
        if cfg.checks.basis_shape_keys
            && cfg.include_shape_keys
            && cfg.component == Component::Head
        {
            self.check_basis_shape_keys(reader, scene, &mut problems);
        }
        if cfg.checks.rig_present && cfg.include_bones && scene.rig().is_none() {
            problems.push(ValidationProblem {
                title: "Missing Rig",
                message: "Bone calibration was requested but the scene has no rig.".to_string(),
                fix: Some(FixAction::AssignRig),
            });
        }

        let outcome = ValidationOutcome::from_problems(problems);
        if !outcome.ok {
            for p in &outcome.problems {
                tracing::warn!("validation failed: {p}");
            }
        }
        outcome
    }

    fn check_vertex_counts(
        &self,
        reader: &dyn DnaReader,
        scene: &dyn SceneSource,
        scope: &[ScopedMesh],
        problems: &mut Vec<ValidationProblem>,
    ) {
        for m in scope {
            let Some(live) = scene.mesh(&m.scene_name) else {
                continue;
            };
            let expected = reader.vertex_position_count(m.mesh_index) as usize;
            if live.vertex_count() != expected {
                problems.push(ValidationProblem {
                    title: "Invalid Topology",
                    message: format!(
                        "Mesh '{}' has {} vertices but DNA mesh '{}' has {expected}. \
                         Calibration needs the original vertex count and order.",
                        m.scene_name,
                        live.vertex_count(),
                        m.dna_name
                    ),
                    fix: Some(FixAction::RestoreTopology {
                        mesh: m.scene_name.clone(),
                    }),
                });
            }
        }
    }

    /// Shape keys hold absolute positions, one per mesh vertex.
    fn check_shape_key_lengths(
        &self,
        scene: &dyn SceneSource,
        scope: &[ScopedMesh],
        problems: &mut Vec<ValidationProblem>,
    ) {
        for m in scope {
            let Some(live) = scene.mesh(&m.scene_name) else {
                continue;
            };
            for key in &live.shape_keys {
                if key.positions.len() != live.vertex_count() {
                    problems.push(ValidationProblem {
                        title: "Invalid Shape Key",
                        message: format!(
                            "Shape key '{}' on mesh '{}' has {} positions but the mesh has {} vertices.",
                            key.name,
                            m.scene_name,
                            key.positions.len(),
                            live.vertex_count()
                        ),
                        fix: Some(FixAction::RestoreTopology {
                            mesh: m.scene_name.clone(),
                        }),
                    });
                }
            }
        }
    }

    /// Every mesh the shape-key stage would reach with shape keys must carry a basis key.
    fn check_basis_shape_keys(
        &self,
        reader: &dyn DnaReader,
        scene: &dyn SceneSource,
        problems: &mut Vec<ValidationProblem>,
    ) {
        let basis = self.config.basis_shape_key.as_str();
        let mut seen = HashSet::new();
        for lod in 0..reader.lod_count() {
            if reader.blend_shape_channel_indices_for_lod(lod).is_empty() {
                continue;
            }
            for &mesh_index in reader.mesh_indices_for_lod(lod) {
                if !seen.insert(mesh_index) {
                    continue;
                }
                let scene_name = self.config.scene_mesh_name(reader.mesh_name(mesh_index));
                let Some(live) = scene.mesh(&scene_name) else {
                    continue;
                };
                if !live.shape_keys.is_empty() && live.shape_key(basis).is_none() {
                    problems.push(ValidationProblem {
                        title: "Missing Basis Shape Key",
                        message: format!(
                            "Mesh '{scene_name}' has shape keys but no '{basis}' shape key."
                        ),
                        fix: Some(FixAction::AddBasisShapeKey { mesh: scene_name }),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/calibrate/validate.rs"]
mod tests;
