use huddle_core::{ClientMessage, ServerMessage};
use serde_json::json;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

#[tokio::test]
async fn test_offer_answer_candidate_relay() {
    init_tracing();

    let service = create_test_service();
    let mut a = TestClient::connect(&service);
    let mut b = TestClient::connect(&service);
    let mut c = TestClient::connect(&service);

    for client in [&a, &b, &c] {
        client.join("call").await.expect("Join");
    }
    a.drain();
    b.drain();
    c.drain();

    let offer = json!({"type": "offer", "sdp": "v=0 a"});
    a.offer(b.peer_id, offer.clone()).await.expect("Offer");
    assert_eq!(
        b.recv().await.expect("Offer arrives"),
        ServerMessage::OfferReceived {
            from_id: a.peer_id,
            payload: offer,
        }
    );

    let answer = json!({"type": "answer", "sdp": "v=0 b"});
    b.send(ClientMessage::Answer {
        target_id: a.peer_id,
        payload: answer.clone(),
    })
    .await
    .expect("Answer");
    assert_eq!(
        a.recv().await.expect("Answer arrives"),
        ServerMessage::AnswerReceived {
            from_id: b.peer_id,
            payload: answer,
        }
    );

    let candidate = json!({"candidate": "candidate:1 1 udp 2122260223 10.0.0.2 5000 typ host", "sdpMid": "0"});
    a.send(ClientMessage::Candidate {
        target_id: b.peer_id,
        payload: candidate.clone(),
    })
    .await
    .expect("Candidate");
    assert_eq!(
        b.recv().await.expect("Candidate arrives"),
        ServerMessage::CandidateReceived {
            from_id: a.peer_id,
            payload: candidate,
        }
    );

    // Handshakes are point to point.
    c.expect_silence().await;
}
