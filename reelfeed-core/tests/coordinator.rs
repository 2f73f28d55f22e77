mod support;

use reelfeed_core::{ControlOp, CoordinatorConfig, CoordinatorError, CoordinatorState};
use reelfeed_model::{FeedEntry, MediaKind};

use support::{
    CallLog, RecordingChannel, RecordingPlayer, Rig, advance_ms, embedded_handle,
    id, item, native_handle, pass_quiet_window, settle, spawn, test_config,
    three_videos,
};

#[tokio::test(start_paused = true)]
async fn first_feed_autoplays_first_video_without_scrolling() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    settle().await;

    assert_eq!(rig.playing(), vec!["V1"]);
    assert!(rig.player("V1").muted_now());
    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V1")));
    assert_eq!(snapshot.locator_runs, 0);

    // The follow-up evaluation at offset 0 agrees and issues nothing new.
    pass_quiet_window().await;
    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.locator_runs, 1);
    assert_eq!(snapshot.transitions.noops, 1);
    assert_eq!(rig.log.ops_for("V1"), vec![ControlOp::Play, ControlOp::Mute]);
    assert_eq!(rig.log.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn scrolling_to_the_middle_switches_to_centered_video() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;

    rig.coordinator.on_scroll(500.0).await.unwrap();
    settle().await;
    pass_quiet_window().await;

    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V2")));
    assert_eq!(snapshot.transitions.switches, 1);
    assert_eq!(rig.playing(), vec!["V2"]);
    assert_eq!(
        rig.log.ops_for("V1"),
        vec![ControlOp::Play, ControlOp::Mute, ControlOp::Pause]
    );
    assert_eq!(rig.log.ops_for("V2"), vec![ControlOp::Play, ControlOp::Mute]);
    assert!(rig.log.ops_for("V3").is_empty());
}

#[tokio::test(start_paused = true)]
async fn scrolling_past_every_video_goes_idle() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;

    rig.coordinator.on_scroll(5000.0).await.unwrap();
    settle().await;
    pass_quiet_window().await;

    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Idle);
    assert_eq!(snapshot.transitions.deactivations, 1);
    assert!(rig.playing().is_empty());
    assert_eq!(rig.log.ops_for("V1").last(), Some(&ControlOp::Pause));
}

#[tokio::test(start_paused = true)]
async fn scroll_burst_runs_the_locator_once_after_the_last_event() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;
    let baseline = rig.coordinator.snapshot().await.unwrap().locator_runs;

    // Scrolls at t=0, 50 and 100ms; the window closes at 250ms.
    rig.coordinator.on_scroll(100.0).await.unwrap();
    settle().await;
    advance_ms(50).await;
    rig.coordinator.on_scroll(300.0).await.unwrap();
    settle().await;
    advance_ms(50).await;
    rig.coordinator.on_scroll(500.0).await.unwrap();
    settle().await;

    advance_ms(149).await;
    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.locator_runs, baseline);
    assert!(snapshot.debounce_pending);

    advance_ms(2).await;
    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.locator_runs, baseline + 1);
    assert!(!snapshot.debounce_pending);
    assert_eq!(snapshot.scroll_events, 3);
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V2")));
}

#[tokio::test(start_paused = true)]
async fn settling_on_the_same_video_issues_no_calls() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;
    let calls_before = rig.log.len();

    for offset in [10.0, 40.0, 80.0] {
        rig.coordinator.on_scroll(offset).await.unwrap();
        settle().await;
        pass_quiet_window().await;
    }

    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V1")));
    assert_eq!(rig.log.len(), calls_before);
    assert_eq!(snapshot.transitions.noops, 4);
}

#[tokio::test(start_paused = true)]
async fn at_most_one_video_plays_after_each_quiet_period() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;

    // Deterministic pseudo-random walk over the feed and past its end.
    let mut seed: u32 = 0x5eed;
    for _ in 0..24 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let offset = (seed >> 8) % 2_400;
        rig.coordinator.on_scroll(offset as f32).await.unwrap();
        settle().await;
        pass_quiet_window().await;

        let playing = rig.playing();
        assert!(playing.len() <= 1, "offset {offset}: {playing:?}");
        let snapshot = rig.coordinator.snapshot().await.unwrap();
        match snapshot.active_id() {
            Some(active) => assert_eq!(playing, vec![active.as_str()]),
            None => assert!(playing.is_empty()),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn unmounting_the_active_video_is_treated_as_absent() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;

    assert!(rig.coordinator.unregister_handle(&id("V1")).await);
    settle().await;
    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Idle);
    assert_eq!(snapshot.registered_handles, 2);

    // V1 still covers most of the viewport but has no handle, so V2 wins.
    pass_quiet_window().await;
    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V2")));
    assert!(!rig.log.ops_for("V1").contains(&ControlOp::Pause));
    assert!(!rig.coordinator.is_playing(&id("V1")).await);
    assert!(!rig.coordinator.unregister_handle(&id("V1")).await);
}

#[tokio::test(start_paused = true)]
async fn late_mount_of_the_active_video_replays_activation() {
    let coordinator = spawn(test_config());
    let log = CallLog::default();
    coordinator.set_feed(three_videos()).await.unwrap();
    settle().await;

    // Autoplay picked V1 before any handle existed.
    let snapshot = coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V1")));
    assert!(log.calls().is_empty());

    let v1 = RecordingPlayer::new("V1", &log);
    coordinator.register_handle("V1", native_handle(&v1)).await.unwrap();
    settle().await;

    assert!(v1.playing_now());
    assert!(v1.muted_now());
    assert!(coordinator.is_playing(&id("V1")).await);
    let snapshot = coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.transitions.replays, 1);
}

#[tokio::test(start_paused = true)]
async fn switching_cancels_a_stalled_activation() {
    let rig = Rig::three_videos(test_config()).await;
    rig.player("V1").stall_play();
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    rig.player("V1").play_started.notified().await;

    rig.coordinator.on_scroll(500.0).await.unwrap();
    settle().await;
    pass_quiet_window().await;

    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V2")));
    assert_eq!(snapshot.in_flight, 0);
    assert_eq!(rig.playing(), vec!["V2"]);
    // The stalled play never landed; only the pause reached V1.
    assert_eq!(rig.log.ops_for("V1"), vec![ControlOp::Pause]);
}

#[tokio::test(start_paused = true)]
async fn switching_back_cancels_the_outgoing_pause() {
    let rig = Rig::three_videos(test_config()).await;
    for name in ["V1", "V2", "V3"] {
        rig.player(name).slow_pause(300);
    }
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;

    // V1 -> V2, and V1's pause is still sleeping when the user scrolls back.
    rig.coordinator.on_scroll(500.0).await.unwrap();
    settle().await;
    pass_quiet_window().await;
    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V2")));
    assert_eq!(snapshot.pending_pauses, 1);

    rig.coordinator.on_scroll(0.0).await.unwrap();
    settle().await;
    pass_quiet_window().await;
    advance_ms(400).await;

    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V1")));
    assert_eq!(snapshot.pending_pauses, 0);
    assert_eq!(rig.playing(), vec!["V1"]);
    assert!(rig.coordinator.is_playing(&id("V1")).await);
    assert_eq!(
        rig.log.ops_for("V1"),
        vec![ControlOp::Play, ControlOp::Mute, ControlOp::Play, ControlOp::Mute]
    );
    assert_eq!(
        rig.log.ops_for("V2"),
        vec![ControlOp::Play, ControlOp::Mute, ControlOp::Pause]
    );

    // Later evaluations agree with what is actually playing.
    for offset in [20.0, 40.0] {
        rig.coordinator.on_scroll(offset).await.unwrap();
        settle().await;
        pass_quiet_window().await;
    }
    assert_eq!(rig.playing(), vec!["V1"]);
}

#[tokio::test(start_paused = true)]
async fn evaluate_now_skips_the_quiet_window() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;
    let baseline = rig.coordinator.snapshot().await.unwrap().locator_runs;

    rig.coordinator.on_scroll(500.0).await.unwrap();
    rig.coordinator.evaluate_now().await.unwrap();
    settle().await;

    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.locator_runs, baseline + 1);
    assert!(!snapshot.debounce_pending);
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V2")));
    assert_eq!(rig.playing(), vec!["V2"]);

    // The armed window was dropped, so nothing runs when it would have closed.
    pass_quiet_window().await;
    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.locator_runs, baseline + 1);
}

#[tokio::test(start_paused = true)]
async fn failing_native_calls_do_not_block_later_transitions() {
    let rig = Rig::three_videos(test_config()).await;
    rig.player("V1").fail_calls();
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;

    // The coordinator still believes V1 is active.
    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V1")));
    assert!(!rig.coordinator.is_playing(&id("V1")).await);

    rig.coordinator.on_scroll(1200.0).await.unwrap();
    settle().await;
    pass_quiet_window().await;
    assert_eq!(rig.playing(), vec!["V3"]);
}

#[tokio::test(start_paused = true)]
async fn embedded_videos_report_asserted_state() {
    let coordinator = spawn(test_config());
    let log = CallLog::default();
    let yt = RecordingChannel::new("YT", &log);
    let clip = RecordingPlayer::new("CLIP", &log);
    coordinator.register_handle("YT", embedded_handle(&yt)).await.unwrap();
    coordinator
        .register_handle("CLIP", native_handle(&clip))
        .await
        .unwrap();
    coordinator
        .set_feed(vec![
            item("YT", MediaKind::EmbeddedVideo, 0.0, 600.0),
            item("IMG", MediaKind::Image, 600.0, 400.0),
            item("CLIP", MediaKind::NativeVideo, 1000.0, 600.0),
        ])
        .await
        .unwrap();
    pass_quiet_window().await;

    assert!(coordinator.is_playing(&id("YT")).await);
    assert_eq!(
        yt.messages(),
        vec![
            r#"{"event":"command","func":"playVideo","args":[]}"#.to_owned(),
            r#"{"event":"command","func":"mute","args":[]}"#.to_owned(),
        ]
    );

    coordinator.on_scroll(1000.0).await.unwrap();
    settle().await;
    pass_quiet_window().await;

    assert!(!coordinator.is_playing(&id("YT")).await);
    assert!(clip.playing_now());
    assert_eq!(log.ops_for("YT").last(), Some(&ControlOp::Pause));
}

#[tokio::test(start_paused = true)]
async fn refused_embedded_commands_are_not_reported_as_playing() {
    let coordinator = spawn(test_config());
    let log = CallLog::default();
    let yt = RecordingChannel::new("YT", &log);
    yt.refuse_messages();
    coordinator.register_handle("YT", embedded_handle(&yt)).await.unwrap();
    coordinator
        .set_feed(vec![item("YT", MediaKind::EmbeddedVideo, 0.0, 600.0)])
        .await
        .unwrap();
    settle().await;

    // The coordinator still targets YT, but nothing was asserted to it.
    let snapshot = coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Active(id("YT")));
    assert!(!coordinator.is_playing(&id("YT")).await);
    assert!(yt.messages().is_empty());
    assert!(log.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn replacing_the_feed_pauses_a_vanished_active_item() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;

    rig.coordinator
        .set_feed(vec![
            item("V2", MediaKind::NativeVideo, 0.0, 600.0),
            item("V3", MediaKind::NativeVideo, 600.0, 600.0),
        ])
        .await
        .unwrap();
    settle().await;
    assert!(!rig.player("V1").playing_now());
    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Idle);

    // Autoplay only fires for the first feed; the next evaluation picks V2.
    pass_quiet_window().await;
    assert_eq!(rig.playing(), vec!["V2"]);
}

#[tokio::test(start_paused = true)]
async fn feed_entries_are_laid_out_before_use() {
    let rig = Rig::three_videos(test_config()).await;
    let items = rig
        .coordinator
        .set_feed_entries(vec![
            FeedEntry::new("V1", MediaKind::NativeVideo, "a.mp4"),
            FeedEntry::new("V2", MediaKind::NativeVideo, "b.mp4"),
            FeedEntry::new("V3", MediaKind::NativeVideo, "c.mp4"),
        ])
        .await
        .unwrap();
    assert_eq!(items[2].estimated_top, 1200.0);

    rig.coordinator.on_scroll(500.0).await.unwrap();
    settle().await;
    pass_quiet_window().await;
    assert_eq!(rig.playing(), vec!["V2"]);

    let invalid = rig
        .coordinator
        .set_feed_entries(vec![FeedEntry::new("", MediaKind::Image, "x")])
        .await;
    assert!(matches!(invalid, Err(CoordinatorError::Model(_))));
}

#[tokio::test(start_paused = true)]
async fn autoplay_and_mute_follow_configuration() {
    let config = CoordinatorConfig {
        autoplay_first: false,
        mute_on_activate: false,
        ..test_config()
    };
    let rig = Rig::three_videos(config).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    settle().await;
    assert!(rig.playing().is_empty());

    pass_quiet_window().await;
    assert_eq!(rig.playing(), vec!["V1"]);
    assert!(!rig.player("V1").muted_now());
    assert_eq!(rig.log.count(ControlOp::Mute), 0);
}

#[tokio::test(start_paused = true)]
async fn resizing_the_viewport_triggers_reevaluation() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;

    // Viewport [700, 900]: only V2 is visible.
    rig.coordinator.on_scroll(700.0).await.unwrap();
    rig.coordinator.resize_viewport(200.0).await.unwrap();
    settle().await;
    pass_quiet_window().await;

    let snapshot = rig.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.viewport.height, 200.0);
    assert_eq!(snapshot.state, CoordinatorState::Active(id("V2")));
}

#[tokio::test(start_paused = true)]
async fn shutdown_pauses_active_video_and_stops_evaluation() {
    let rig = Rig::three_videos(test_config()).await;
    rig.coordinator.set_feed(three_videos()).await.unwrap();
    pass_quiet_window().await;

    rig.coordinator.on_scroll(500.0).await.unwrap();
    settle().await;
    let last = rig.coordinator.shutdown().await.unwrap();

    assert_eq!(last.state, CoordinatorState::Idle);
    assert!(!last.debounce_pending);
    assert!(rig.playing().is_empty());
    assert_eq!(rig.log.ops_for("V1").last(), Some(&ControlOp::Pause));

    pass_quiet_window().await;
    assert!(rig.log.ops_for("V2").is_empty());
    assert!(matches!(
        rig.coordinator.on_scroll(0.0).await,
        Err(CoordinatorError::Closed)
    ));
    assert!(rig.coordinator.is_closed());
    // Unmounting after teardown is still safe.
    assert!(rig.coordinator.unregister_handle(&id("V1")).await);
}
