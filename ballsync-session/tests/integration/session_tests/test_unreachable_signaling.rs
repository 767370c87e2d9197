use ballsync_core::Role;
use ballsync_session::{Session, SessionError, SessionState};

use crate::integration::init_tracing;
use crate::utils::{ScriptedSignaling, local_config};

#[tokio::test]
async fn test_unreachable_signaling_fails_and_cleans_up() {
    init_tracing();

    for role in [Role::Offerer, Role::Answerer] {
        let signaling = ScriptedSignaling::unreachable();
        let closes = signaling.closes();

        let session =
            Session::new(local_config(role), signaling).expect("Failed to build session");
        let state = session.state();

        let err = session
            .run(std::future::pending::<()>())
            .await
            .expect_err("Session must fail without signaling");

        assert!(err.is_connection(), "got {err:?}");
        assert_eq!(*state.borrow(), SessionState::Closed);
        assert_eq!(*closes.lock().await, 1, "Signaling must be closed once");
    }
}

#[tokio::test]
async fn test_invalid_config_is_rejected_up_front() {
    let mut config = local_config(Role::Answerer);
    config.media.queue_capacity = 0;

    let err = Session::new(config, ScriptedSignaling::new([]))
        .err()
        .expect("Zero-capacity queue must be rejected");
    assert!(matches!(err, SessionError::InvalidConfig(_)), "got {err:?}");
}
