use super::*;
use tokio::io::duplex;

#[test]
fn submit_request_round_trips_through_json() {
    let req = Request::Submit {
        model: "Model1".to_string(),
        threads: 2,
        np: 1,
        is_not_on_root: false,
        env: HashMap::new(),
        options: RunOptions::default(),
        mem: 0,
        user: Some("alice".to_string()),
        run_stamp: None,
    };

    let bytes = encode(&req).unwrap();
    let decoded: Request = decode(&bytes).unwrap();

    assert_eq!(decoded, req);
}

#[test]
fn query_variants_round_trip() {
    let queries = vec![
        Query::Queue,
        Query::Active,
        Query::History,
        Query::Logs {
            model_name: "Model1".to_string(),
            run_stamp: "run-1".to_string(),
            start_line: 0,
            count: 100,
        },
        Query::AllModels,
        Query::RefreshModels,
    ];

    for query in queries {
        let bytes = encode(&Request::Query(query.clone())).unwrap();
        let decoded: Request = decode(&bytes).unwrap();
        assert_eq!(decoded, Request::Query(query));
    }
}

#[test]
fn error_response_carries_kind_and_message() {
    let err = oms_core::Error::new(oms_core::ErrorKind::ModelNotFound, "model not found");
    let response: Response = err.into();

    match response {
        Response::Error { kind, message } => {
            assert_eq!(kind, "ModelNotFound");
            assert_eq!(message, "model not found");
        }
        other => panic!("expected Error response, got {other:?}"),
    }
}

#[tokio::test]
async fn write_then_read_message_round_trips() {
    let (mut a, mut b) = duplex(1024);

    let payload = encode(&Response::Pong).unwrap();
    write_message(&mut a, &payload).await.unwrap();
    let received = read_message(&mut b).await.unwrap();

    assert_eq!(received, payload);
    let response: Response = decode(&received).unwrap();
    assert_eq!(response, Response::Pong);
}

#[tokio::test]
async fn read_message_reports_closed_connection() {
    let (a, mut b) = duplex(1024);
    drop(a);

    let err = read_message(&mut b).await.unwrap_err();

    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_frame_is_rejected_before_reading_body() {
    let (mut a, mut b) = duplex(1024 * 1024);

    let oversized_len = (MAX_MESSAGE_SIZE as u32 + 1).to_be_bytes();
    a.write_all(&oversized_len).await.unwrap();

    let err = read_message(&mut b).await.unwrap_err();

    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}
