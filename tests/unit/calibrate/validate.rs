use super::*;
use crate::calibrate::scope::export_scope;
use crate::dna::fixture::sample_document;
use crate::foundation::core::{DVec3, SceneConvention};
use crate::scene::live::SceneSnapshot;
use crate::scene::mirror::mirror_document;

fn mirrored() -> SceneSnapshot {
    mirror_document(&sample_document(), SceneConvention::default(), None).unwrap()
}

fn run(cfg: &CalibrationConfig, scene: &SceneSnapshot) -> ValidationOutcome {
    let doc = sample_document();
    let scope = export_scope(&doc, scene, cfg);
    Validator::new(cfg).validate(&doc, scene, &scope)
}

#[test]
fn untouched_mirror_is_valid() {
    let outcome = run(&CalibrationConfig::default(), &mirrored());
    assert!(outcome.ok, "{}", outcome.message);
    assert!(outcome.fix.is_none());
}

#[test]
fn vertex_count_mismatch_offers_topology_fix() {
    let mut scene = mirrored();
    scene.meshes[0].positions.push(DVec3::ZERO);
    let outcome = run(&CalibrationConfig::default(), &scene);
    assert!(!outcome.ok);
    assert_eq!(outcome.title, "Invalid Topology");
    assert_eq!(
        outcome.fix,
        Some(FixAction::RestoreTopology {
            mesh: "head_lod0_mesh".to_string()
        })
    );
    assert!(outcome.message.contains("5 vertices"));
}

#[test]
fn missing_basis_is_reported_only_when_shape_keys_are_requested() {
    let mut scene = mirrored();
    scene.meshes[0].shape_keys.retain(|k| k.name != "Basis");

    let outcome = run(&CalibrationConfig::default(), &scene);
    assert_eq!(outcome.title, "Missing Basis Shape Key");

    let cfg = CalibrationConfig {
        include_shape_keys: false,
        ..Default::default()
    };
    assert!(run(&cfg, &scene).ok);
}

#[test]
fn body_component_skips_the_basis_check() {
    let mut scene = mirrored();
    scene.meshes[0].shape_keys.retain(|k| k.name != "Basis");
    let cfg = CalibrationConfig {
        component: Component::Body,
        ..Default::default()
    };
    assert!(run(&cfg, &scene).ok);
}

#[test]
fn every_problem_lands_in_the_message() {
    let mut scene = mirrored();
    scene.meshes[0].positions.pop();
    scene.meshes[0].shape_keys.clear();
    scene.rig = None;
    let outcome = run(&CalibrationConfig::default(), &scene);
    assert_eq!(outcome.problems.len(), 2);
    assert_eq!(outcome.title, "Invalid Topology");
    assert_eq!(outcome.message.lines().count(), 2);
    assert_eq!(outcome.problems[1].fix, Some(FixAction::AssignRig));
}

#[test]
fn empty_scope_needs_meshes() {
    let scene = SceneSnapshot {
        meshes: Vec::new(),
        rig: mirrored().rig,
    };
    let outcome = run(&CalibrationConfig::default(), &scene);
    assert_eq!(outcome.title, "No Meshes");
    assert_eq!(outcome.fix, Some(FixAction::SelectMeshes));

    let bones_only = CalibrationConfig {
        include_meshes: false,
        include_shape_keys: false,
        ..Default::default()
    };
    assert!(run(&bones_only, &scene).ok);
}

#[test]
fn topology_is_checked_for_shape_key_only_runs() {
    let mut scene = mirrored();
    let mesh = &mut scene.meshes[0];
    mesh.positions.pop();
    for key in &mut mesh.shape_keys {
        key.positions.pop();
    }
    let cfg = CalibrationConfig {
        include_meshes: false,
        ..Default::default()
    };
    let outcome = run(&cfg, &scene);
    assert!(!outcome.ok);
    assert_eq!(outcome.title, "Invalid Topology");
    assert_eq!(outcome.problems.len(), 1);
}

#[test]
fn short_shape_key_is_reported() {
    let mut scene = mirrored();
    let key = scene.meshes[0]
        .shape_keys
        .iter_mut()
        .find(|k| k.name != "Basis")
        .unwrap();
    key.positions.truncate(2);
    let outcome = run(&CalibrationConfig::default(), &scene);
    assert!(!outcome.ok);
    assert_eq!(outcome.title, "Invalid Shape Key");
    assert!(outcome.message.contains("has 2 positions"));
    assert_eq!(
        outcome.fix,
        Some(FixAction::RestoreTopology {
            mesh: "head_lod0_mesh".to_string()
        })
    );

    let cfg = CalibrationConfig {
        include_shape_keys: false,
        ..Default::default()
    };
    assert!(run(&cfg, &scene).ok);
}
