use ballsync_core::{Role, SdpKind};
use ballsync_session::{CloseReason, Session, SessionState};
use tokio::sync::oneshot;

use crate::integration::init_tracing;
use crate::utils::{STATE_TIMEOUT_MS, ScriptedSignaling, eventually, local_config, wait_for_state};

#[tokio::test]
async fn test_interrupt_cancels_pending_handshake() {
    init_tracing();

    // No answer ever arrives.
    let signaling = ScriptedSignaling::new([]);
    let sent = signaling.sent();
    let closes = signaling.closes();

    let session =
        Session::new(local_config(Role::Offerer), signaling).expect("Failed to build session");
    let mut state = session.state();

    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(session.run(async move {
        let _ = stopped.await;
    }));

    wait_for_state(&mut state, SessionState::SignalingConnected, STATE_TIMEOUT_MS)
        .await
        .expect("Signaling never connected");
    eventually(STATE_TIMEOUT_MS, || {
        sent.try_lock().map(|s| !s.is_empty()).unwrap_or(false)
    })
    .await
    .expect("Offer was never sent");

    let _ = stop.send(());
    let report = task
        .await
        .expect("Session task panicked")
        .expect("Interrupted session must close cleanly");

    assert_eq!(report.reason, CloseReason::Interrupted);
    assert!(!report.streamed);
    assert_eq!(*state.borrow(), SessionState::Closed);
    assert_eq!(*closes.lock().await, 1);

    let sent = sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, SdpKind::Offer);
}
