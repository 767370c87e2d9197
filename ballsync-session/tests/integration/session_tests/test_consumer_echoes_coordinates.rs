use ballsync_core::{CoordinatePair, Role};
use ballsync_session::{ConsumerBehavior, Session, SessionState};
use tokio::sync::oneshot;

use crate::integration::init_tracing;
use crate::utils::{
    MemorySignaling, PingBehavior, REPORT_TIMEOUT_MS, STATE_TIMEOUT_MS, eventually, local_config,
    wait_for_state,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_consumer_echoes_coordinates() {
    init_tracing();

    let (offer_signaling, answer_signaling, _log) = MemorySignaling::pair();

    let pinger = PingBehavior::new();
    let replies = pinger.replies();

    let consumer = ConsumerBehavior::new(&local_config(Role::Answerer).media)
        .expect("Failed to start consumer");
    consumer.coordinates().store(CoordinatePair::new(12, 34));

    let offerer =
        Session::with_behavior(local_config(Role::Offerer), offer_signaling, Box::new(pinger))
            .expect("Failed to build offerer");
    let answerer = Session::with_behavior(
        local_config(Role::Answerer),
        answer_signaling,
        Box::new(consumer),
    )
    .expect("Failed to build answerer");

    let mut answer_state = answerer.state();

    let (stop_offerer, offerer_stopped) = oneshot::channel::<()>();
    let (stop_answerer, answerer_stopped) = oneshot::channel::<()>();
    let offer_task = tokio::spawn(offerer.run(async move {
        let _ = offerer_stopped.await;
    }));
    let answer_task = tokio::spawn(answerer.run(async move {
        let _ = answerer_stopped.await;
    }));

    // A request alone moves the consumer into streaming.
    wait_for_state(&mut answer_state, SessionState::Streaming, STATE_TIMEOUT_MS)
        .await
        .expect("Consumer never saw a request");

    eventually(REPORT_TIMEOUT_MS, || {
        replies.try_lock().map(|r| !r.is_empty()).unwrap_or(false)
    })
    .await
    .expect("Consumer never answered");

    let _ = stop_offerer.send(());
    let _ = stop_answerer.send(());
    offer_task
        .await
        .expect("Offerer task panicked")
        .expect("Offerer session failed");
    answer_task
        .await
        .expect("Answerer task panicked")
        .expect("Answerer session failed");

    // No video flows, so every reply is the seeded position.
    let replies = replies.lock().await;
    assert!(!replies.is_empty());
    assert!(replies.iter().all(|r| r == "12,34"), "got {replies:?}");
}
