mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use common::fixtures::{face_at, jpeg_frame, ScriptedDetector};
use squat_tracker::detect::DetectError;
use squat_tracker::squat::{DetectState, Detection, SquatEngine, WatchError, WatchOutput};
use squat_tracker::store::{JudgementStore, MemoryJudgementStore, SledJudgementStore};

fn memory_engine(detector: ScriptedDetector) -> (Arc<SquatEngine>, Arc<MemoryJudgementStore>) {
    let store = Arc::new(MemoryJudgementStore::new());
    let engine = SquatEngine::new(
        Uuid::new_v4(),
        Arc::new(detector),
        store.clone(),
        Duration::from_millis(200),
    )
    .expect("engine");
    (Arc::new(engine), store)
}

async fn step(engine: &SquatEngine) -> WatchOutput {
    engine
        .watch_squat(&jpeg_frame(), Utc::now())
        .await
        .expect("watch step")
}

#[tokio::test]
async fn it_full_squat_counts_one_rep() {
    let (engine, store) = memory_engine(ScriptedDetector::with_ratios(&[0.75, 0.85, 0.3, 0.2]));

    let mut seen = Vec::new();
    for _ in 0..4 {
        let out = step(&engine).await;
        let judgement = out.judgement().expect("judged").clone();
        seen.push((judgement.state, judgement.is_rep_completed));
    }

    assert_eq!(
        seen,
        vec![
            (DetectState::GoingDown, false),
            (DetectState::Bottom, false),
            (DetectState::GoingUp, false),
            (DetectState::Standing, true),
        ]
    );
    assert_eq!(engine.total_reps(), 1);
    assert_eq!(store.len().unwrap(), 4);
    assert_eq!(store.rep_count().unwrap(), 1);
}

#[tokio::test]
async fn it_partial_dip_is_not_a_rep() {
    let (engine, _store) = memory_engine(ScriptedDetector::with_ratios(&[0.75, 0.65, 0.5, 0.4]));
    for _ in 0..4 {
        let out = step(&engine).await;
        assert!(!out.judgement().unwrap().is_rep_completed);
    }
    assert_eq!(engine.total_reps(), 0);
    assert_eq!(engine.summary().unwrap().state, DetectState::Standing);
}

#[tokio::test]
async fn it_no_face_leaves_history_unchanged() {
    let detector = ScriptedDetector::new(vec![Ok(face_at(0.8)), Ok(Detection::NotFound)]);
    let (engine, store) = memory_engine(detector);

    step(&engine).await;
    let before = store.last().unwrap().expect("first judgement");

    let out = step(&engine).await;
    assert_eq!(out, WatchOutput::NoFace);
    assert!(out.face().is_none());
    assert_eq!(store.last().unwrap(), Some(before));
    assert_eq!(store.len().unwrap(), 1);
}

#[tokio::test]
async fn it_no_face_on_first_frame_keeps_history_empty() {
    let (engine, store) = memory_engine(ScriptedDetector::new(vec![Ok(Detection::NotFound)]));
    assert_eq!(step(&engine).await, WatchOutput::NoFace);
    assert!(store.last().unwrap().is_none());
}

#[tokio::test]
async fn it_detector_errors_surface_unchanged() {
    let detector = ScriptedDetector::new(vec![Err(DetectError::Protocol("bad json".into()))]);
    let (engine, store) = memory_engine(detector);

    let err = engine
        .watch_squat(&jpeg_frame(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, WatchError::Detect(DetectError::Protocol(ref m)) if m == "bad json"));
    assert!(store.last().unwrap().is_none());
}

#[tokio::test]
async fn it_failed_frame_does_not_block_the_next() {
    let detector = ScriptedDetector::new(vec![
        Ok(face_at(0.8)),
        Err(DetectError::Unavailable("connection reset".into())),
        Ok(face_at(0.9)),
    ]);
    let (engine, _store) = memory_engine(detector);

    step(&engine).await;
    assert!(engine.watch_squat(&jpeg_frame(), Utc::now()).await.is_err());
    let out = step(&engine).await;
    assert_eq!(out.judgement().unwrap().state, DetectState::Bottom);
}

#[tokio::test]
async fn it_slow_detector_times_out_without_append() {
    let detector = ScriptedDetector::with_ratios(&[0.8]).delayed(Duration::from_secs(2));
    let (engine, store) = memory_engine(detector);

    let err = engine
        .watch_squat(&jpeg_frame(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, WatchError::Timeout(_)));
    assert_eq!(store.len().unwrap(), 0);
}

#[tokio::test]
async fn it_dropped_step_leaves_history_untouched() {
    let detector = ScriptedDetector::with_ratios(&[0.8]).delayed(Duration::from_millis(100));
    let (engine, store) = memory_engine(detector);

    let frame = jpeg_frame();
    let cancelled =
        tokio::time::timeout(Duration::from_millis(10), engine.watch_squat(&frame, Utc::now())).await;
    assert!(cancelled.is_err());
    assert!(store.last().unwrap().is_none());
}

#[tokio::test]
async fn it_concurrent_frames_are_serialized() {
    let ratios = vec![0.5; 32];
    let (engine, store) = memory_engine(ScriptedDetector::with_ratios(&ratios));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let frame = jpeg_frame();
                engine.watch_squat(&frame, Utc::now()).await.map(|_| ())
            })
        })
        .collect();
    for handle in handles {
        handle.await.expect("join").expect("step");
    }

    assert_eq!(store.len().unwrap(), 32);
    assert_eq!(store.last().unwrap().unwrap().state, DetectState::Standing);
}

#[tokio::test]
async fn it_persistent_session_resumes_state_and_reps() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("squat.sled");
    let session_id = Uuid::new_v4();

    {
        let store = Arc::new(
            SledJudgementStore::open(path.to_str().unwrap(), &session_id.to_string()).unwrap(),
        );
        let engine = SquatEngine::new(
            session_id,
            Arc::new(ScriptedDetector::with_ratios(&[0.8, 0.8, 0.5, 0.5, 0.9])),
            store.clone(),
            Duration::from_millis(200),
        )
        .unwrap();
        for _ in 0..5 {
            step(&engine).await;
        }
        assert_eq!(engine.total_reps(), 1);
        store.flush().unwrap();
    }

    let store = Arc::new(
        SledJudgementStore::open(path.to_str().unwrap(), &session_id.to_string()).unwrap(),
    );
    let engine = SquatEngine::new(
        session_id,
        Arc::new(ScriptedDetector::with_ratios(&[0.9])),
        store,
        Duration::from_millis(200),
    )
    .unwrap();
    assert_eq!(engine.total_reps(), 1);

    // Previous session ended in GoingDown, so another deep frame reaches the bottom.
    let out = step(&engine).await;
    assert_eq!(out.judgement().unwrap().state, DetectState::Bottom);
    assert_eq!(engine.summary().unwrap().judgements, 6);
}
