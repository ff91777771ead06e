//! Engine and Editing Tests
//!
//! Tests for:
//! - The keyframe editing surface (validation, capabilities, stale ids)
//! - Timeline auto-extension
//! - Tick gating, seek requests and write-back of animated values
//! - EditingContext selection, keying, clipboard and keyframe drag

use glam::Vec3;

use reel::animation::{Channel, Easing};
use reel::scene::ObjectKind;
use reel::{AnimationEngine, EditingContext, KeyframeRef, ObjectId, ReelError, TimelineSettings};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn engine_with_total(total_frames: u32) -> AnimationEngine {
    AnimationEngine::new(TimelineSettings {
        total_frames,
        ..Default::default()
    })
}

/// Engine with one cube animated on position.x: 0 → 0, 30 → 30.
fn animated_cube() -> (AnimationEngine, ObjectId) {
    let mut engine = engine_with_total(100);
    let cube = engine.scene.spawn(ObjectKind::Cube, "cube");
    engine.add_keyframe(cube, "position.x", 0, 0.0).unwrap();
    engine.add_keyframe(cube, "position.x", 30, 30.0).unwrap();
    (engine, cube)
}

fn frames(engine: &AnimationEngine, id: ObjectId, channel: Channel) -> Vec<u32> {
    engine
        .scene
        .get(id)
        .unwrap()
        .channels
        .track(channel)
        .iter()
        .map(|k| k.frame)
        .collect()
}

// ============================================================================
// Editing surface
// ============================================================================

#[test]
fn unknown_channel_is_rejected_without_write() {
    init_logger();
    let (mut engine, cube) = animated_cube();
    let err = engine.add_keyframe(cube, "opacity", 5, 1.0).unwrap_err();
    assert!(matches!(err, ReelError::InvalidChannel(_)));
    assert!(engine.has_channel_keyframes(cube, "bogus").is_err());
    assert_eq!(engine.scene.get(cube).unwrap().channels.keyframe_count(), 2);
}

#[test]
fn negative_frame_is_rejected() {
    let (mut engine, cube) = animated_cube();
    let err = engine.add_keyframe(cube, "alpha", -1, 1.0).unwrap_err();
    assert!(matches!(err, ReelError::InvalidFrame { frame: -1 }));
    assert!(!engine.has_channel_keyframes(cube, "alpha").unwrap());
}

#[test]
fn unsupported_channel_is_rejected_for_kind() {
    let mut engine = AnimationEngine::default();
    let camera = engine.scene.spawn(ObjectKind::Camera, "camera");
    assert!(engine.add_keyframe(camera, "rotation.y", 0, 45.0).is_ok());
    let err = engine.add_keyframe(camera, "scale.x", 0, 2.0).unwrap_err();
    assert!(matches!(err, ReelError::InvalidChannel(_)));
    assert!(!engine.has_channel_keyframes(camera, "scale.x").unwrap());
}

#[test]
fn edits_on_deleted_objects_are_noops() {
    init_logger();
    let (mut engine, cube) = animated_cube();
    assert_eq!(engine.delete_object(cube), vec![cube]);

    assert!(engine.add_keyframe(cube, "alpha", 3, 0.5).is_ok());
    assert!(!engine.remove_keyframe(cube, "position.x", 0).unwrap());
    assert!(!engine.has_keyframes(cube));
    assert!(engine.animated_position(cube).is_none());
    assert!(engine.delete_object(cube).is_empty());
}

#[test]
fn remove_keyframe_reports_removal() {
    let (mut engine, cube) = animated_cube();
    assert!(engine.remove_keyframe(cube, "position.x", 30).unwrap());
    assert!(!engine.remove_keyframe(cube, "position.x", 30).unwrap());
    assert!(engine.has_keyframes(cube));
    assert!(engine.remove_keyframe(cube, "position.x", 0).unwrap());
    assert!(!engine.has_keyframes(cube));
}

#[test]
fn keyframe_past_the_end_extends_timeline() {
    let (mut engine, cube) = animated_cube();
    engine.add_keyframe(cube, "alpha", 150, 0.0).unwrap();
    assert_eq!(engine.total_frames(), 250);
    engine.add_keyframe(cube, "alpha", 200, 0.0).unwrap();
    assert_eq!(engine.total_frames(), 250);
}

#[test]
fn animated_getters_follow_the_playhead() {
    let (mut engine, cube) = animated_cube();
    engine
        .add_keyframe_with_easing(cube, "scale.y", 0, 1.0, Easing::Instant)
        .unwrap();
    engine.add_keyframe(cube, "scale.y", 10, 3.0).unwrap();

    engine.begin_scrub();
    engine.scrub(15).unwrap();
    assert!(approx(engine.animated_position(cube).unwrap().x, 15.0));
    assert_eq!(engine.animated_scale(cube).unwrap(), Vec3::new(1.0, 3.0, 1.0));
    assert_eq!(engine.animated_rotation(cube).unwrap(), Vec3::ZERO);
    assert_eq!(engine.animated_alpha(cube), Some(1.0));
    engine.end_scrub();
}

// ============================================================================
// Tick
// ============================================================================

#[test]
fn hold_playback_through_engine() {
    let mut engine = engine_with_total(100);
    engine.play();
    for _ in 0..400 {
        engine.tick(0.5);
        assert!(engine.current_frame() <= 100);
    }
    assert_eq!(engine.current_frame(), 100);
    assert!(!engine.is_playing());
    assert_eq!(engine.tick_count(), 400);
}

#[test]
fn hold_playback_ends_on_last_keyframe_pose() {
    let mut engine = engine_with_total(100);
    let cube = engine.scene.spawn(ObjectKind::Cube, "cube");
    engine.add_keyframe(cube, "position.x", 0, 0.0).unwrap();
    engine.add_keyframe(cube, "position.x", 100, 100.0).unwrap();
    assert_eq!(engine.total_frames(), 100);

    engine.play();
    let mut ticks = 0;
    while engine.is_playing() {
        engine.tick(0.3);
        ticks += 1;
        assert!(ticks < 100, "playback never stopped");
    }

    assert_eq!(engine.current_frame(), 100);
    let obj = engine.scene.get(cube).unwrap();
    assert!(approx(engine.pose(cube).unwrap().position.x, 100.0));
    assert!(approx(obj.animated_position(engine.clock.evaluation_frame()).x, 100.0));
    assert!(approx(obj.target_position.x, 100.0));

    // stopped at the end: the next tick keeps the written-back pose
    assert!(!engine.tick(0.3));
    assert!(approx(engine.pose(cube).unwrap().position.x, 100.0));
}

#[test]
fn playback_writes_animated_values_back() {
    let (mut engine, cube) = animated_cube();
    engine.play();
    assert!(engine.tick(0.5));
    assert!(approx(engine.pose(cube).unwrap().position.x, 15.0));

    engine.stop();
    assert!(!engine.tick(0.5));
    assert!(approx(engine.scene.get(cube).unwrap().target_position.x, 15.0));
    assert!(approx(engine.pose(cube).unwrap().position.x, 15.0));
}

#[test]
fn manual_edits_stick_while_stopped() {
    let (mut engine, cube) = animated_cube();
    engine.tick(0.0);
    engine.scene.get_mut(cube).unwrap().target_position.y = 4.0;
    assert!(!engine.tick(0.1));
    assert!(approx(engine.pose(cube).unwrap().position.y, 4.0));
}

#[test]
fn seek_while_stopped_evaluates_once() {
    let (mut engine, cube) = animated_cube();
    engine.clock.seek(30).unwrap();
    assert!(engine.tick(0.0));
    assert!(approx(engine.pose(cube).unwrap().position.x, 30.0));
    assert!(!engine.tick(0.0));
}

#[test]
fn drag_overlay_opens_the_default_gate() {
    let (mut engine, _) = animated_cube();
    engine.clock.set_dragging_keyframe(true);
    assert!(engine.tick(0.016));
    assert!(engine.tick_with_drag(0.016));
    assert!(!engine.tick_without_drag(0.016));
}

#[test]
fn delete_drops_resolved_pose() {
    let (mut engine, cube) = animated_cube();
    engine.tick(0.0);
    assert!(engine.pose(cube).is_some());
    engine.delete_object(cube);
    assert!(engine.pose(cube).is_none());
    engine.tick(0.0);
    assert!(engine.poses().poses.is_empty());
}

#[test]
fn hierarchy_is_resolved_each_tick() {
    let mut engine = engine_with_total(100);
    let r = engine.scene.spawn(ObjectKind::Cube, "R");
    let c = engine.scene.spawn_child(ObjectKind::Cube, "C", r).unwrap();
    engine.add_keyframe(r, "alpha", 0, 0.5).unwrap();
    engine.add_keyframe(c, "alpha", 0, 0.6).unwrap();

    engine.clock.seek(0).unwrap();
    assert!(engine.tick(0.0));
    assert!(engine.poses().is_clean());
    assert!(approx(engine.pose(c).unwrap().effective_alpha, 0.3));

    let sub = engine.resolve_subtree(c);
    assert!(approx(sub.get(c).unwrap().effective_alpha, 0.3));
}

// ============================================================================
// Editing context
// ============================================================================

#[test]
fn selecting_another_object_clears_keyframe_selection() {
    let (mut engine, cube) = animated_cube();
    let other = engine.scene.spawn(ObjectKind::Cube, "other");
    let mut ctx = EditingContext::new();
    ctx.select_object(&mut engine, Some(cube));
    ctx.select_keyframe(KeyframeRef::new(cube, Channel::PositionX, 0), false);

    ctx.select_object(&mut engine, Some(cube));
    assert_eq!(ctx.selection_len(), 1);
    ctx.select_object(&mut engine, Some(other));
    assert_eq!(ctx.selection_len(), 0);
}

#[test]
fn key_current_pose_on_fresh_object_keys_all_supported_channels() {
    let mut engine = engine_with_total(100);
    let cube = engine.scene.spawn(ObjectKind::Cube, "cube");
    let camera = engine.scene.spawn(ObjectKind::Camera, "camera");
    let mut ctx = EditingContext::new();

    ctx.select_object(&mut engine, Some(cube));
    assert_eq!(ctx.key_current_pose(&mut engine), 10);

    ctx.select_object(&mut engine, Some(camera));
    assert_eq!(ctx.key_current_pose(&mut engine), 6);
    assert!(!engine.has_channel_keyframes(camera, "alpha").unwrap());
}

#[test]
fn key_current_pose_only_touches_animated_channels() {
    let (mut engine, cube) = animated_cube();
    let mut ctx = EditingContext::new();
    ctx.select_object(&mut engine, Some(cube));
    engine.clock.seek(10).unwrap();
    engine.scene.get_mut(cube).unwrap().target_position = Vec3::new(-2.0, 9.0, 0.0);

    assert_eq!(ctx.key_current_pose(&mut engine), 1);
    assert_eq!(frames(&engine, cube, Channel::PositionX), vec![0, 10, 30]);
    assert!(!engine.has_channel_keyframes(cube, "position.y").unwrap());
    let key = engine.scene.get(cube).unwrap().channels.track(Channel::PositionX).get(10).copied();
    assert_eq!(key.map(|k| k.value), Some(-2.0));
}

#[test]
fn copy_paste_keeps_relative_spacing() {
    let mut engine = engine_with_total(100);
    let cube = engine.scene.spawn(ObjectKind::Cube, "cube");
    engine.add_keyframe(cube, "position.x", 10, 1.0).unwrap();
    engine.add_keyframe(cube, "position.x", 20, 2.0).unwrap();
    engine.add_keyframe(cube, "alpha", 15, 0.5).unwrap();

    let mut ctx = EditingContext::new();
    ctx.select_object(&mut engine, Some(cube));
    assert_eq!(ctx.select_in_range(&mut engine, 0, 100).unwrap(), 3);
    assert_eq!(ctx.copy_selected(&engine), 3);

    assert_eq!(ctx.paste_at(&mut engine, 50).unwrap(), 3);
    assert_eq!(frames(&engine, cube, Channel::PositionX), vec![10, 20, 50, 60]);
    assert_eq!(frames(&engine, cube, Channel::Alpha), vec![15, 55]);

    // 105 is past the end and skipped
    assert_eq!(ctx.paste_at(&mut engine, 95).unwrap(), 2);
    assert_eq!(frames(&engine, cube, Channel::PositionX), vec![10, 20, 50, 60, 95]);
    assert_eq!(frames(&engine, cube, Channel::Alpha), vec![15, 55, 100]);
    assert!(ctx.has_clipboard());
    assert!(ctx.paste_at(&mut engine, -1).is_err());
}

#[test]
fn cut_is_consumed_by_first_paste() {
    let (mut engine, cube) = animated_cube();
    let mut ctx = EditingContext::new();
    ctx.select_object(&mut engine, Some(cube));
    ctx.select_keyframe(KeyframeRef::new(cube, Channel::PositionX, 30), false);

    assert_eq!(ctx.cut_selected(&mut engine), 1);
    assert_eq!(frames(&engine, cube, Channel::PositionX), vec![0]);
    assert_eq!(ctx.selection_len(), 0);

    assert_eq!(ctx.paste_at(&mut engine, 40).unwrap(), 1);
    assert_eq!(frames(&engine, cube, Channel::PositionX), vec![0, 40]);
    assert!(!ctx.has_clipboard());
    assert_eq!(ctx.paste_at(&mut engine, 60).unwrap(), 0);
}

#[test]
fn delete_and_easing_apply_to_selection() {
    let (mut engine, cube) = animated_cube();
    let mut ctx = EditingContext::new();
    ctx.select_object(&mut engine, Some(cube));
    ctx.select_keyframe(KeyframeRef::new(cube, Channel::PositionX, 0), false);

    assert_eq!(ctx.set_easing_for_selected(&mut engine, Easing::Instant), 1);
    let track = engine.scene.get(cube).unwrap().channels.track(Channel::PositionX);
    assert_eq!(track.get(0).map(|k| k.easing), Some(Easing::Instant));

    assert_eq!(ctx.delete_selected(&mut engine), 1);
    assert_eq!(frames(&engine, cube, Channel::PositionX), vec![30]);
}

#[test]
fn select_relative_to_playhead() {
    let (mut engine, cube) = animated_cube();
    engine.add_keyframe(cube, "position.x", 15, 4.0).unwrap();
    let mut ctx = EditingContext::new();
    ctx.select_object(&mut engine, Some(cube));
    engine.clock.seek(15).unwrap();
    engine.play();

    assert_eq!(ctx.select_before_marker(&mut engine), 1);
    assert!(ctx.is_selected(&KeyframeRef::new(cube, Channel::PositionX, 0)));
    assert!(!engine.is_playing());

    assert_eq!(ctx.select_after_marker(&mut engine), 1);
    assert!(ctx.is_selected(&KeyframeRef::new(cube, Channel::PositionX, 30)));

    assert_eq!(ctx.select_first_keyframes(&mut engine), 1);
    assert_eq!(ctx.select_last_keyframes(&mut engine), 1);
}

#[test]
fn select_in_loop_region_uses_region_bounds() {
    let (mut engine, cube) = animated_cube();
    engine.add_keyframe(cube, "position.x", 15, 4.0).unwrap();
    engine.add_keyframe(cube, "alpha", 20, 0.5).unwrap();
    let mut ctx = EditingContext::new();
    ctx.select_object(&mut engine, Some(cube));

    assert_eq!(ctx.select_in_loop_region(&mut engine), 0);

    engine.clock.set_loop_region(10, 20, false).unwrap();
    engine.play();
    assert_eq!(ctx.select_in_loop_region(&mut engine), 2);
    assert!(!engine.is_playing());
    assert!(ctx.is_selected(&KeyframeRef::new(cube, Channel::PositionX, 15)));
    assert!(ctx.is_selected(&KeyframeRef::new(cube, Channel::Alpha, 20)));
    assert!(!ctx.is_selected(&KeyframeRef::new(cube, Channel::PositionX, 30)));
}

#[test]
fn drag_moves_selection_with_collision_resolution() {
    let (mut engine, cube) = animated_cube();
    engine.add_keyframe(cube, "position.x", 10, 10.0).unwrap();
    let mut ctx = EditingContext::new();
    ctx.select_object(&mut engine, Some(cube));

    let anchor = KeyframeRef::new(cube, Channel::PositionX, 10);
    ctx.begin_drag(&mut engine, anchor).unwrap();
    assert!(engine.clock.is_dragging_keyframe());

    assert_eq!(ctx.drag_to(&mut engine, 20).unwrap(), 20);
    assert_eq!(engine.current_frame(), 30);
    assert_eq!(ctx.preview_frame(&anchor), Some(30));

    assert_eq!(ctx.end_drag(&mut engine), 1);
    assert!(!engine.clock.is_dragging_keyframe());
    // 30 is taken, the nearest free frame to the right wins
    assert_eq!(frames(&engine, cube, Channel::PositionX), vec![0, 30, 31]);
    assert!(ctx.is_selected(&KeyframeRef::new(cube, Channel::PositionX, 31)));
}

#[test]
fn drag_offset_is_clamped_to_timeline() {
    let (mut engine, cube) = animated_cube();
    let mut ctx = EditingContext::new();
    ctx.select_object(&mut engine, Some(cube));
    ctx.select_keyframe(KeyframeRef::new(cube, Channel::PositionX, 0), false);
    ctx.select_keyframe(KeyframeRef::new(cube, Channel::PositionX, 30), true);

    ctx.begin_drag(&mut engine, KeyframeRef::new(cube, Channel::PositionX, 30))
        .unwrap();
    assert_eq!(ctx.drag_to(&mut engine, -50).unwrap(), 0);
    assert_eq!(ctx.drag_to(&mut engine, 500).unwrap(), 70);
    assert_eq!(ctx.end_drag(&mut engine), 2);
    assert_eq!(frames(&engine, cube, Channel::PositionX), vec![70, 100]);
}

#[test]
fn drag_on_missing_keyframe_fails() {
    let (mut engine, cube) = animated_cube();
    let mut ctx = EditingContext::new();
    let err = ctx
        .begin_drag(&mut engine, KeyframeRef::new(cube, Channel::Alpha, 3))
        .unwrap_err();
    assert!(matches!(err, ReelError::InvalidFrame { frame: 3 }));
    assert!(!engine.clock.is_dragging_keyframe());
}
