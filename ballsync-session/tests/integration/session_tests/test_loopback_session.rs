use ballsync_core::{CoordinatePair, Role, SdpKind};
use ballsync_session::{
    CloseReason, ConsumerBehavior, ProducerBehavior, Session, SessionState,
};
use tokio::sync::oneshot;

use crate::integration::init_tracing;
use crate::utils::{
    MemorySignaling, REPORT_TIMEOUT_MS, STATE_TIMEOUT_MS, eventually, local_config, wait_for_state,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_loopback_session_streams_and_closes() {
    init_tracing();

    let (offer_signaling, answer_signaling, log) = MemorySignaling::pair();

    let producer = ProducerBehavior::new(local_config(Role::Offerer).media);
    let stats = producer.stats();
    let consumer = ConsumerBehavior::new(&local_config(Role::Answerer).media)
        .expect("Failed to start consumer");
    let coordinates = consumer.coordinates();

    let offerer = Session::with_behavior(
        local_config(Role::Offerer),
        offer_signaling,
        Box::new(producer),
    )
    .expect("Failed to build offerer");
    let answerer = Session::with_behavior(
        local_config(Role::Answerer),
        answer_signaling,
        Box::new(consumer),
    )
    .expect("Failed to build answerer");

    let mut offer_state = offerer.state();
    let mut answer_state = answerer.state();

    let (stop_offerer, offerer_stopped) = oneshot::channel::<()>();
    let (stop_answerer, answerer_stopped) = oneshot::channel::<()>();
    let offer_task = tokio::spawn(offerer.run(async move {
        let _ = offerer_stopped.await;
    }));
    let answer_task = tokio::spawn(answerer.run(async move {
        let _ = answerer_stopped.await;
    }));

    wait_for_state(&mut offer_state, SessionState::Streaming, STATE_TIMEOUT_MS)
        .await
        .expect("Offerer never streamed");
    wait_for_state(&mut answer_state, SessionState::Streaming, STATE_TIMEOUT_MS)
        .await
        .expect("Answerer never streamed");

    assert_eq!(log.sent().await, vec![SdpKind::Offer, SdpKind::Answer]);

    // Coordinates travel back to the producer.
    eventually(REPORT_TIMEOUT_MS, || stats.snapshot().reports > 0)
        .await
        .expect("No coordinate report reached the producer");

    // The estimator located the ball inside the 200x200 canvas.
    eventually(REPORT_TIMEOUT_MS, || {
        coordinates.load() != CoordinatePair::default()
    })
    .await
    .expect("Estimator never published a position");
    let seen = coordinates.load();
    assert!((0..200).contains(&seen.x) && (0..200).contains(&seen.y), "got {seen}");

    let _ = stop_offerer.send(());
    let _ = stop_answerer.send(());

    let offer_report = offer_task
        .await
        .expect("Offerer task panicked")
        .expect("Offerer session failed");
    let answer_report = answer_task
        .await
        .expect("Answerer task panicked")
        .expect("Answerer session failed");

    for report in [&offer_report, &answer_report] {
        assert!(report.streamed);
        assert!(matches!(
            report.reason,
            CloseReason::Interrupted | CloseReason::PeerClosed
        ));
    }
    assert_eq!(offer_report.role, Role::Offerer);
    assert_eq!(answer_report.role, Role::Answerer);

    assert_eq!(*offer_state.borrow(), SessionState::Closed);
    assert_eq!(*answer_state.borrow(), SessionState::Closed);
    assert!(stats.snapshot().frames_sent > 0);
}
