//! Integration tests for the playback session state machine.

use chorus_playback::{
    AudioSink, PlaybackError, PlaybackSession, PlaybackState, QueueTrack, Result, SessionEvent,
    SinkEvent,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SinkCommand {
    SetSource(String),
    Play,
    Pause,
    SetPosition(Duration),
}

/// Sink that records every command and can be told to reject play calls.
#[derive(Clone, Default)]
struct FakeSink {
    log: Rc<RefCell<Vec<SinkCommand>>>,
    fail_play: Rc<Cell<bool>>,
}

impl FakeSink {
    fn commands(&self) -> Vec<SinkCommand> {
        self.log.borrow().clone()
    }
}

impl AudioSink for FakeSink {
    fn set_source(&mut self, url: &str) {
        self.log.borrow_mut().push(SinkCommand::SetSource(url.into()));
    }

    fn play(&mut self) -> Result<()> {
        self.log.borrow_mut().push(SinkCommand::Play);
        if self.fail_play.get() {
            Err(PlaybackError::Sink("unplayable source".into()))
        } else {
            Ok(())
        }
    }

    fn pause(&mut self) {
        self.log.borrow_mut().push(SinkCommand::Pause);
    }

    fn set_position(&mut self, position: Duration) {
        self.log.borrow_mut().push(SinkCommand::SetPosition(position));
    }
}

fn track(id: &str) -> QueueTrack {
    QueueTrack {
        id: id.to_string(),
        title: format!("Track {id}"),
        artist: "Test Artist".to_string(),
        audio_url: format!("https://cdn.example/{id}.mp3"),
    }
}

fn session_with(ids: &[&str]) -> (PlaybackSession<FakeSink>, FakeSink) {
    let sink = FakeSink::default();
    let mut session = PlaybackSession::new(sink.clone());
    session.set_library(ids.iter().map(|id| track(id)).collect());
    (session, sink)
}

#[test]
fn empty_session_has_no_current_track() {
    let (session, _) = session_with(&[]);
    assert_eq!(session.state(), PlaybackState::Empty);
    assert!(session.current_track().is_none());
}

#[test]
fn select_track_swaps_source_before_playing() {
    let (mut session, sink) = session_with(&["a", "b"]);
    session.select_track("b", None).unwrap();

    let commands = sink.commands();
    let set_at = commands
        .iter()
        .position(|c| matches!(c, SinkCommand::SetSource(url) if url.ends_with("b.mp3")))
        .expect("source must be attached");
    let play_at = commands
        .iter()
        .position(|c| *c == SinkCommand::Play)
        .expect("play must be called");
    assert!(set_at < play_at, "source swap must precede play");
    assert_eq!(session.state(), PlaybackState::Playing);
}

#[test]
fn select_track_fires_track_started_exactly_once() {
    let (mut session, _) = session_with(&["a", "b"]);
    session.select_track("a", None).unwrap();

    let started: Vec<_> = session
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::TrackStarted { .. }))
        .collect();
    assert_eq!(
        started,
        vec![SessionEvent::TrackStarted {
            track_id: "a".into()
        }]
    );
}

#[test]
fn skips_and_shuffle_starts_do_not_count_as_track_starts() {
    let (mut session, _) = session_with(&["a", "b", "c"]);
    session.shuffle_play_all().unwrap();
    session.next().unwrap();
    session.previous().unwrap();

    assert!(!session
        .drain_events()
        .iter()
        .any(|e| matches!(e, SessionEvent::TrackStarted { .. })));
}

#[test]
fn reselecting_current_track_toggles_instead_of_restarting() {
    let (mut session, sink) = session_with(&["a", "b"]);
    session.select_track("a", None).unwrap();
    let sources_before = sink
        .commands()
        .iter()
        .filter(|c| matches!(c, SinkCommand::SetSource(_)))
        .count();
    session.drain_events();

    session.select_track("a", None).unwrap();
    assert_eq!(session.state(), PlaybackState::Paused);

    session.select_track("a", None).unwrap();
    assert_eq!(session.state(), PlaybackState::Playing);

    let sources_after = sink
        .commands()
        .iter()
        .filter(|c| matches!(c, SinkCommand::SetSource(_)))
        .count();
    assert_eq!(sources_before, sources_after, "no source swap on toggle");

    // No fresh start action, so no play-count increment either
    assert!(!session
        .drain_events()
        .iter()
        .any(|e| matches!(e, SessionEvent::TrackStarted { .. })));
}

#[test]
fn selecting_unknown_track_is_an_error() {
    let (mut session, _) = session_with(&["a"]);
    let err = session.select_track("zzz", None).unwrap_err();
    assert!(matches!(err, PlaybackError::TrackNotFound(id) if id == "zzz"));
    assert_eq!(session.state(), PlaybackState::Empty);
}

#[test]
fn select_track_uses_explicit_queue_source() {
    let (mut session, _) = session_with(&["a", "b", "c"]);
    let playlist = vec![track("c"), track("b")];
    session.select_track("b", Some(&playlist)).unwrap();

    assert_eq!(session.queue().len(), 2);
    assert_eq!(session.queue().current_index(), Some(1));
    assert_eq!(session.current_track().unwrap().id, "b");
}

#[test]
fn current_track_always_matches_queue_index() {
    let (mut session, _) = session_with(&["a", "b", "c"]);
    session.select_track("b", None).unwrap();

    for _ in 0..5 {
        let index = session.queue().current_index().unwrap();
        assert_eq!(
            session.current_track().unwrap(),
            &session.queue().tracks()[index]
        );
        session.next().unwrap();
    }
}

#[test]
fn next_then_previous_returns_to_original_index() {
    let (mut session, _) = session_with(&["a", "b", "c"]);
    session.select_track("b", None).unwrap();
    let original = session.queue().current_index();

    session.next().unwrap();
    // Elapsed time is zero, so previous moves back instead of restarting
    session.previous().unwrap();
    assert_eq!(session.queue().current_index(), original);
}

#[test]
fn next_wraps_around_the_queue() {
    let (mut session, _) = session_with(&["a", "b", "c"]);
    session.select_track("c", None).unwrap();
    session.next().unwrap();
    assert_eq!(session.current_track().unwrap().id, "a");
}

#[test]
fn previous_restarts_current_track_after_three_seconds() {
    let (mut session, sink) = session_with(&["a", "b", "c"]);
    session.select_track("b", None).unwrap();
    let epoch = session.source_epoch();

    session.handle_sink_event(
        epoch,
        SinkEvent::Position {
            position: Duration::from_secs(10),
            duration: Duration::from_secs(180),
        },
    );

    session.previous().unwrap();
    assert_eq!(session.current_track().unwrap().id, "b", "same track");
    assert!(sink
        .commands()
        .contains(&SinkCommand::SetPosition(Duration::ZERO)));
    assert_eq!(session.state(), PlaybackState::Playing);
}

#[test]
fn shuffle_play_all_visits_every_track_once_per_cycle() {
    let (mut session, _) = session_with(&["a", "b", "c"]);
    session.shuffle_play_all().unwrap();

    let mut visited = Vec::new();
    visited.push(session.current_track().unwrap().id.clone());
    session.next().unwrap();
    visited.push(session.current_track().unwrap().id.clone());
    session.next().unwrap();
    visited.push(session.current_track().unwrap().id.clone());

    let mut sorted = visited.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), 3, "all three tracks before any repeat");

    // Index 3 wraps to 0: the first track repeats
    session.next().unwrap();
    assert_eq!(session.current_track().unwrap().id, visited[0]);
}

#[test]
fn shuffle_play_all_with_empty_library_is_an_error() {
    let (mut session, _) = session_with(&[]);
    assert!(matches!(
        session.shuffle_play_all(),
        Err(PlaybackError::QueueEmpty)
    ));
}

#[test]
fn track_end_advances_and_keeps_playing() {
    let (mut session, _) = session_with(&["a", "b"]);
    session.select_track("a", None).unwrap();

    session.handle_sink_event(session.source_epoch(), SinkEvent::Ended);
    assert_eq!(session.current_track().unwrap().id, "b");
    assert_eq!(session.state(), PlaybackState::Playing);
}

#[test]
fn seek_keeps_play_state() {
    let (mut session, sink) = session_with(&["a"]);
    session.select_track("a", None).unwrap();
    session.toggle_play_pause();
    assert_eq!(session.state(), PlaybackState::Paused);

    session.seek(Duration::from_secs(42));
    assert_eq!(session.state(), PlaybackState::Paused);
    assert!(sink
        .commands()
        .contains(&SinkCommand::SetPosition(Duration::from_secs(42))));
    assert_eq!(session.progress().position, Duration::from_secs(42));
}

#[test]
fn pending_initial_seek_waits_for_metadata() {
    let (mut session, sink) = session_with(&["a"]);
    session.select_track("a", None).unwrap();

    // No seek yet: the sink has not loaded the new source
    assert!(!sink
        .commands()
        .contains(&SinkCommand::SetPosition(Duration::ZERO)));

    session.handle_sink_event(
        session.source_epoch(),
        SinkEvent::MetadataReady {
            duration: Duration::from_secs(180),
        },
    );
    assert!(sink
        .commands()
        .contains(&SinkCommand::SetPosition(Duration::ZERO)));
    assert_eq!(
        session.progress().duration,
        Some(Duration::from_secs(180))
    );

    // The pending seek is one-shot
    let seeks_before = sink.commands().len();
    session.handle_sink_event(
        session.source_epoch(),
        SinkEvent::MetadataReady {
            duration: Duration::from_secs(180),
        },
    );
    assert_eq!(sink.commands().len(), seeks_before);
}

#[test]
fn stale_sink_events_are_discarded() {
    let (mut session, _) = session_with(&["a", "b"]);
    session.select_track("a", None).unwrap();
    let old_epoch = session.source_epoch();

    session.select_track("b", None).unwrap();
    session.handle_sink_event(
        old_epoch,
        SinkEvent::Position {
            position: Duration::from_secs(99),
            duration: Duration::from_secs(100),
        },
    );

    // The abandoned track's progress must not leak onto the current one
    assert_eq!(session.progress().position, Duration::ZERO);
}

#[test]
fn sink_error_pauses_and_surfaces_a_notice() {
    let (mut session, _) = session_with(&["a"]);
    session.select_track("a", None).unwrap();
    session.drain_events();

    session.handle_sink_event(
        session.source_epoch(),
        SinkEvent::Error {
            message: "decode failed".into(),
        },
    );

    assert_eq!(session.state(), PlaybackState::Paused);
    let events = session.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::PlaybackNotice { message } if message == "decode failed")));
    // The session stays interactive: picking another track still works
    assert!(session.select_track("a", None).is_ok());
}

#[test]
fn rejected_play_call_leaves_session_paused_with_notice() {
    let (mut session, sink) = session_with(&["a"]);
    sink.fail_play.set(true);

    session.select_track("a", None).unwrap();
    assert_eq!(session.state(), PlaybackState::Paused);
    assert!(session
        .drain_events()
        .iter()
        .any(|e| matches!(e, SessionEvent::PlaybackNotice { .. })));
}

#[test]
fn stop_clears_queue_and_discards_inflight_events() {
    let (mut session, _) = session_with(&["a", "b"]);
    session.select_track("a", None).unwrap();
    let epoch = session.source_epoch();

    session.stop();
    assert_eq!(session.state(), PlaybackState::Empty);

    // A late end event for the stopped source must not restart playback
    session.handle_sink_event(epoch, SinkEvent::Ended);
    assert_eq!(session.state(), PlaybackState::Empty);
}
