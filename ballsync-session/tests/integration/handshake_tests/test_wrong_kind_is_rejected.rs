use ballsync_core::{Role, SdpKind, SessionDescription};
use ballsync_session::{SessionError, negotiate};

use crate::integration::{create_local_transport, init_tracing};
use crate::utils::ScriptedSignaling;

#[tokio::test]
async fn test_offerer_rejects_offer_reply() {
    init_tracing();

    let (transport, _events) = create_local_transport().await;
    transport
        .create_data_channel("data")
        .await
        .expect("Failed to create data channel");

    let mut signaling = ScriptedSignaling::new([SessionDescription::offer("v=0")]);
    let sent = signaling.sent();

    let err = negotiate(Role::Offerer, &transport, &mut signaling)
        .await
        .expect_err("An offer must not be taken as the answer");
    assert!(matches!(err, SessionError::Protocol(_)), "got {err:?}");

    let sent = sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, SdpKind::Offer);

    transport.close().await.expect("Failed to close transport");
}

#[tokio::test]
async fn test_answerer_rejects_answer_instead_of_offer() {
    init_tracing();

    let (transport, _events) = create_local_transport().await;
    let mut signaling = ScriptedSignaling::new([SessionDescription::answer("v=0")]);
    let sent = signaling.sent();

    let err = negotiate(Role::Answerer, &transport, &mut signaling)
        .await
        .expect_err("An answer must not start the handshake");
    assert!(matches!(err, SessionError::Protocol(_)), "got {err:?}");
    assert!(sent.lock().await.is_empty(), "Nothing may be sent back");

    transport.close().await.expect("Failed to close transport");
}

#[tokio::test]
async fn test_garbage_sdp_is_a_protocol_error() {
    init_tracing();

    let (transport, _events) = create_local_transport().await;
    let mut signaling = ScriptedSignaling::new([SessionDescription::offer("not an sdp")]);

    let err = negotiate(Role::Answerer, &transport, &mut signaling)
        .await
        .expect_err("Malformed SDP must be rejected");
    assert!(matches!(err, SessionError::Protocol(_)), "got {err:?}");

    transport.close().await.expect("Failed to close transport");
}
