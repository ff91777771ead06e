//! Scene Registry Tests
//!
//! Tests for:
//! - Spawning, id allocation and GUID lookup
//! - Attach / detach with self-parent and cycle rejection
//! - Subtree removal and stale references
//! - Deep duplication with fresh identities
//! - Object capabilities and base-value fallback

use glam::Vec3;

use reel::animation::{Channel, Easing};
use reel::scene::{Capabilities, ObjectKind, SceneRegistry};
use reel::{ObjectId, ReelError};

fn sample_tree() -> (SceneRegistry, ObjectId, ObjectId, ObjectId) {
    let mut scene = SceneRegistry::new();
    let root = scene.spawn(ObjectKind::Empty, "root");
    let a = scene.spawn_child(ObjectKind::Cube, "a", root).unwrap();
    let b = scene.spawn_child(ObjectKind::Block, "b", a).unwrap();
    (scene, root, a, b)
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn ids_are_monotonic_and_never_reused() {
    let mut scene = SceneRegistry::new();
    let a = scene.spawn(ObjectKind::Cube, "a");
    let b = scene.spawn(ObjectKind::Cube, "b");
    assert!(b > a);
    scene.remove(b).unwrap();
    let c = scene.spawn(ObjectKind::Cube, "c");
    assert!(c > b);
}

#[test]
fn guid_lookup_finds_object() {
    let mut scene = SceneRegistry::new();
    let id = scene.spawn(ObjectKind::Item, "sword");
    let guid = scene.get(id).unwrap().guid();
    assert_eq!(scene.by_guid(guid).map(|o| o.id()), Some(id));
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn spawn_child_links_both_directions() {
    let (scene, root, a, b) = sample_tree();
    assert_eq!(scene.roots(), &[root]);
    assert_eq!(scene.get(a).unwrap().parent(), Some(root));
    assert_eq!(scene.get(root).unwrap().children(), &[a]);
    assert_eq!(scene.get(a).unwrap().children(), &[b]);
    assert!(scene.is_descendant_of(b, root));
    assert!(!scene.is_descendant_of(root, b));
}

#[test]
fn all_objects_lists_parents_before_children() {
    let (mut scene, root, a, b) = sample_tree();
    let c = scene.spawn_child(ObjectKind::Cube, "c", root).unwrap();
    let other = scene.spawn(ObjectKind::Cube, "other");
    assert_eq!(scene.all_objects(), vec![root, a, b, c, other]);
}

#[test]
fn self_parent_is_rejected() {
    let (mut scene, _, a, _) = sample_tree();
    let err = scene.attach(a, a).unwrap_err();
    assert!(matches!(err, ReelError::StructuralError { object, .. } if object == a));
}

#[test]
fn cycle_is_rejected_without_mutation() {
    let (mut scene, root, a, b) = sample_tree();
    assert!(matches!(scene.attach(root, b), Err(ReelError::StructuralError { .. })));
    assert_eq!(scene.roots(), &[root]);
    assert_eq!(scene.get(root).unwrap().parent(), None);
    assert_eq!(scene.get(b).unwrap().parent(), Some(a));
}

#[test]
fn reparent_moves_between_child_lists() {
    let (mut scene, root, a, b) = sample_tree();
    scene.attach(b, root).unwrap();
    assert_eq!(scene.get(root).unwrap().children(), &[a, b]);
    assert!(scene.get(a).unwrap().children().is_empty());

    scene.detach(b).unwrap();
    assert_eq!(scene.roots(), &[root, b]);
    assert_eq!(scene.get(b).unwrap().parent(), None);
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn remove_takes_the_subtree() {
    let (mut scene, root, a, b) = sample_tree();
    let removed = scene.remove(a).unwrap();
    assert_eq!(removed, vec![b, a]);
    assert!(!scene.contains(a));
    assert!(!scene.contains(b));
    assert!(scene.get(root).unwrap().children().is_empty());
    assert_eq!(scene.len(), 1);
}

#[test]
fn stale_ids_report_stale_reference() {
    let (mut scene, _, a, _) = sample_tree();
    scene.remove(a).unwrap();
    assert!(matches!(scene.object(a), Err(ReelError::StaleReference(id)) if id == a));
    assert!(matches!(scene.remove(a), Err(ReelError::StaleReference(_))));
    assert!(matches!(
        scene.spawn_child(ObjectKind::Cube, "x", a),
        Err(ReelError::StaleReference(_))
    ));
}

// ============================================================================
// Duplication
// ============================================================================

#[test]
fn duplicate_copies_subtree_with_fresh_identities() {
    let (mut scene, root, a, b) = sample_tree();
    scene
        .get_mut(b)
        .unwrap()
        .channels
        .track_mut(Channel::Alpha)
        .insert(3, 0.25, Easing::Instant)
        .unwrap();

    let copy = scene.duplicate(a).unwrap();
    assert_ne!(copy, a);
    assert_eq!(scene.get(root).unwrap().children(), &[a, copy]);

    let copy_obj = scene.get(copy).unwrap();
    assert_ne!(copy_obj.guid(), scene.get(a).unwrap().guid());
    assert_eq!(copy_obj.name, "a");
    let [copy_child] = copy_obj.children() else {
        panic!("expected one child");
    };
    let copy_child = *copy_child;
    assert_ne!(copy_child, b);
    assert_eq!(scene.get(copy_child).unwrap().parent(), Some(copy));
    assert_eq!(
        scene.get(copy_child).unwrap().channels.track(Channel::Alpha).sample(3.0),
        Some(0.25)
    );
    assert_eq!(scene.len(), 5);
}

#[test]
fn duplicate_root_stays_at_root_level() {
    let mut scene = SceneRegistry::new();
    let a = scene.spawn(ObjectKind::Cube, "a");
    let copy = scene.duplicate(a).unwrap();
    assert_eq!(scene.roots(), &[a, copy]);
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn capabilities_by_kind() {
    assert_eq!(ObjectKind::Cube.capabilities(), Capabilities::all());
    assert_eq!(ObjectKind::Camera.capabilities(), Capabilities::ROTATABLE);
    assert!(ObjectKind::PointLight.capabilities().is_empty());
}

#[test]
fn unanimated_channels_use_base_values() {
    let mut scene = SceneRegistry::new();
    let id = scene.spawn(ObjectKind::Cube, "cube");
    let obj = scene.get_mut(id).unwrap();
    obj.target_position = Vec3::new(1.0, 2.0, 3.0);
    obj.scale = Vec3::splat(2.0);
    obj.channels
        .track_mut(Channel::PositionZ)
        .insert(0, -4.0, Easing::Linear)
        .unwrap();

    let pose = obj.sample_local(10.0);
    assert_eq!(pose.position, Vec3::new(1.0, 2.0, -4.0));
    assert_eq!(pose.scale, Vec3::splat(2.0));
    assert_eq!(pose.alpha, 1.0);
    assert!(obj.has_keyframes());
}
