//! Integration tests for tensa-types.

use tensa_types::constants::{DEFAULT_MERGE_TOLERANCE, DEFAULT_THRESHOLD};
use tensa_types::{ParticleId, TensaError};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn particle_id_index() {
    let id = ParticleId(42);
    assert_eq!(id.index(), 42);
}

#[test]
fn particle_id_from_usize() {
    let id = ParticleId::from(7_usize);
    assert_eq!(id, ParticleId(7));
}

#[test]
fn ids_are_serializable() {
    let id = ParticleId(100);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: ParticleId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

#[test]
fn ids_are_ordered() {
    assert!(ParticleId(1) < ParticleId(2));
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = TensaError::InvalidGoal("spring stiffness must be non-negative".into());
    assert!(err.to_string().contains("stiffness"));
}

#[test]
fn unassigned_goal_display() {
    let err = TensaError::UnassignedGoal {
        goal: 3,
        name: "spring".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains('3'));
    assert!(msg.contains("spring"));
    assert!(msg.contains("assign_index"));
}

#[test]
fn out_of_bounds_display() {
    let err = TensaError::ParticleOutOfBounds { index: 12, count: 4 };
    let msg = err.to_string();
    assert!(msg.contains("12"));
    assert!(msg.contains("count: 4"));
}

#[test]
fn io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "scene.toml");
    let err: TensaError = io.into();
    assert!(matches!(err, TensaError::Io(_)));
}

// ─── Constant Tests ───────────────────────────────────────────

#[test]
fn defaults_are_sane() {
    assert!(DEFAULT_MERGE_TOLERANCE > 0.0);
    assert!(DEFAULT_THRESHOLD > 0.0 && DEFAULT_THRESHOLD < 1e-6);
}
