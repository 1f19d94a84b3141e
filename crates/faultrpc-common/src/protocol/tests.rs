//! Tests for the protocol module
//!
//! These tests pin down the JSON shape of frames and the status table, since
//! both are visible to clients written in other languages.

#[cfg(test)]
mod tests {
    use super::super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_request_defaults_to_zero_delay() {
        let req = FaultRequest::new(vec![0]);
        assert_eq!(req.min_delay(), Duration::ZERO);
        assert_eq!(req.max_delay(), Duration::ZERO);
        assert_eq!(req.status_codes, vec![0]);
    }

    #[test]
    fn test_request_with_delay() {
        let req = FaultRequest::new(vec![0, 14]).with_delay_ms(5, 1500);
        assert_eq!(req.min_delay(), Duration::from_millis(5));
        assert_eq!(req.max_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_received_summary_text() {
        assert_eq!(
            FaultResponse::received(3).message,
            "Received 3 requests from client"
        );
    }

    #[test]
    fn test_status_codes_match_numbering() {
        for (index, code) in StatusCode::ALL.iter().enumerate() {
            assert_eq!(code.as_u32(), index as u32);
        }
        assert_eq!(StatusCode::NotFound.as_u32(), 5);
        assert_eq!(StatusCode::Aborted.as_u32(), 10);
        assert_eq!(StatusCode::Unauthenticated.as_u32(), 16);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::ok().to_string(), "OK");
        assert_eq!(
            Status::new(StatusCode::NotFound, "Generated by server").to_string(),
            "NOT_FOUND: Generated by server"
        );
    }

    #[test]
    fn test_status_serializes_code_by_name() {
        let status = Status::new(StatusCode::DeadlineExceeded, "slow");
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value, json!({"code": "deadline_exceeded", "message": "slow"}));
    }

    #[test]
    fn test_open_frame_shape() {
        let frame = ClientFrame::Open {
            service: ServiceKind::ResiliencyWithMetadata,
            shape: CallShape::BidiStream,
            metadata: Metadata::new(),
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "open",
                "service": "resiliency_with_metadata",
                "shape": "bidi_stream",
                "metadata": {}
            })
        );
    }

    #[test]
    fn test_open_frame_metadata_is_optional() {
        let raw = r#"{"type":"open","service":"resiliency","shape":"unary"}"#;
        let frame: ClientFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ClientFrame::Open { metadata, shape, .. } => {
                assert!(metadata.is_empty());
                assert_eq!(shape, CallShape::Unary);
            }
            other => panic!("Expected open frame, got {:?}", other),
        }
    }

    #[test]
    fn test_message_frame_carries_request() {
        let raw = r#"{"type":"message","request":{"min_delay_ms":1,"max_delay_ms":2,"status_codes":[0,10]}}"#;
        let frame: ClientFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(
            frame,
            ClientFrame::Message {
                request: FaultRequest::new(vec![0, 10]).with_delay_ms(1, 2)
            }
        );
    }

    #[test]
    fn test_unit_frames() {
        assert_eq!(
            serde_json::to_value(ClientFrame::HalfClose).unwrap(),
            json!({"type": "half_close"})
        );
        assert_eq!(
            serde_json::to_value(ClientFrame::Cancel).unwrap(),
            json!({"type": "cancel"})
        );
    }

    #[test]
    fn test_unknown_frame_type_rejected() {
        let raw = r#"{"type":"reset"}"#;
        assert!(serde_json::from_str::<ClientFrame>(raw).is_err());
    }

    #[test]
    fn test_error_exposes_status() {
        let err = FaultRpcError::Status(Status::new(StatusCode::Aborted, "Generated by server"));
        assert_eq!(err.status().map(|s| s.code), Some(StatusCode::Aborted));
        assert!(FaultRpcError::Transport("reset".into()).status().is_none());
    }
}
