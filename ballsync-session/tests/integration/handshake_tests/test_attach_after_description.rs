use ballsync_session::{SessionError, VideoSender};

use crate::integration::{create_local_transport, init_tracing};

#[tokio::test]
async fn test_attach_after_offer_is_invalid() {
    init_tracing();

    let (transport, _events) = create_local_transport().await;
    transport
        .create_data_channel("data")
        .await
        .expect("Failed to create data channel");
    transport.create_offer().await.expect("Failed to create offer");

    let err = transport
        .create_data_channel("late")
        .await
        .err()
        .expect("Channel after the offer must be refused");
    assert!(matches!(err, SessionError::InvalidState(_)), "got {err:?}");

    let err = transport
        .add_video_track(&VideoSender::new("late"))
        .await
        .expect_err("Track after the offer must be refused");
    assert!(matches!(err, SessionError::InvalidState(_)), "got {err:?}");

    transport.close().await.expect("Failed to close transport");
}

#[tokio::test]
async fn test_answer_requires_remote_offer() {
    init_tracing();

    let (transport, _events) = create_local_transport().await;

    let err = transport
        .create_answer()
        .await
        .expect_err("Answer without an offer must be refused");
    assert!(matches!(err, SessionError::InvalidState(_)), "got {err:?}");

    transport.close().await.expect("Failed to close transport");
}
