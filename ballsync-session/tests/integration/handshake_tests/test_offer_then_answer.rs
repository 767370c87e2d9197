use std::time::Duration;

use ballsync_core::{Role, SdpKind};
use ballsync_session::{TransportEvent, negotiate};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

use crate::integration::{create_local_transport, init_tracing};
use crate::utils::MemorySignaling;

#[tokio::test]
async fn test_offer_then_answer() {
    init_tracing();

    let (offerer, mut offerer_events) = create_local_transport().await;
    let (answerer, _answerer_events) = create_local_transport().await;
    offerer
        .create_data_channel("data")
        .await
        .expect("Failed to create data channel");

    let (mut offer_side, mut answer_side, log) = MemorySignaling::pair();

    let (offered, answered) = tokio::join!(
        negotiate(Role::Offerer, &offerer, &mut offer_side),
        negotiate(Role::Answerer, &answerer, &mut answer_side),
    );
    offered.expect("Offerer handshake failed");
    answered.expect("Answerer handshake failed");

    // Exactly one offer, then one answer.
    assert_eq!(log.sent().await, vec![SdpKind::Offer, SdpKind::Answer]);

    // The negotiated connection carries the channel.
    let opened = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(event) = offerer_events.recv().await {
            if let TransportEvent::DataChannelOpened(channel) = event {
                return Some(channel.label().to_owned());
            }
        }
        None
    })
    .await
    .expect("Data channel did not open");
    assert_eq!(opened.as_deref(), Some("data"));
    assert_eq!(offerer.connection_state(), RTCPeerConnectionState::Connected);

    offerer.close().await.expect("Failed to close offerer");
    answerer.close().await.expect("Failed to close answerer");
}
