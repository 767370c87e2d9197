use crate::error::{Result, SessionError};
use crate::signaling::signaling_channel::SignalingChannel;
use crate::transport::PeerTransport;
use ballsync_core::{Role, SdpKind, SessionDescription};
use tracing::info;

/// Runs the offer/answer exchange for `role`.
///
/// Exactly one description is sent and one received. A description of the
/// wrong kind aborts the exchange.
pub async fn negotiate(
    role: Role,
    transport: &PeerTransport,
    signaling: &mut dyn SignalingChannel,
) -> Result<()> {
    let remote_kind = role.expected_remote_kind();
    match role {
        Role::Offerer => {
            let offer = transport.create_offer().await?;
            signaling.send(&expect_kind(offer, role.local_kind())?).await?;
            info!("{} sent, waiting for {}", role.local_kind(), remote_kind);

            let answer = expect_kind(signaling.receive().await?, remote_kind)?;
            transport.apply_remote(&answer).await?;
        }
        Role::Answerer => {
            info!("Waiting for {}", remote_kind);
            let offer = expect_kind(signaling.receive().await?, remote_kind)?;
            transport.apply_remote(&offer).await?;

            let answer = transport.create_answer().await?;
            signaling.send(&expect_kind(answer, role.local_kind())?).await?;
            info!("{} sent", role.local_kind());
        }
    }
    Ok(())
}

fn expect_kind(desc: SessionDescription, expected: SdpKind) -> Result<SessionDescription> {
    if desc.kind != expected {
        return Err(SessionError::Protocol(format!(
            "expected {expected}, received {}",
            desc.kind
        )));
    }
    Ok(desc)
}
