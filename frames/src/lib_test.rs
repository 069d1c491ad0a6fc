use super::*;
use serde_json::json;

#[test]
fn frame_kind_wire_spelling_matches_protocol() {
    assert_eq!(FrameKind::Chunk.as_str(), "chunk");
    assert_eq!(FrameKind::Complete.as_str(), "complete");
    assert_eq!(FrameKind::Closing.as_str(), "closing");
    assert_eq!(FrameKind::Error.as_str(), "error");
}

#[test]
fn frame_kind_serializes_as_lowercase_json() {
    assert_eq!(serde_json::to_string(&FrameKind::Closing).expect("serialize"), "\"closing\"");
}

#[test]
fn only_chunk_is_non_terminal() {
    assert!(!FrameKind::Chunk.is_terminal());
    assert!(FrameKind::Complete.is_terminal());
    assert!(FrameKind::Closing.is_terminal());
    assert!(FrameKind::Error.is_terminal());
}

#[test]
fn decode_chunk_frame() {
    let frame = decode_frame(r#"{"type":"chunk","chunk":"{\"slides\":["}"#).expect("decode");
    assert_eq!(frame, StreamFrame::Chunk("{\"slides\":[".to_owned()));
}

#[test]
fn decode_chunk_without_text_is_empty_fragment() {
    let frame = decode_frame(r#"{"type":"chunk"}"#).expect("decode");
    assert_eq!(frame, StreamFrame::Chunk(String::new()));
}

#[test]
fn decode_complete_frame_keeps_presentation() {
    let frame = decode_frame(r#"{"type":"complete","presentation":{"id":"p1","slides":[{"id":1}]}}"#)
        .expect("decode");
    let StreamFrame::Complete { presentation } = frame else {
        panic!("expected complete frame");
    };
    assert_eq!(presentation, Some(json!({"id": "p1", "slides": [{"id": 1}]})));
}

#[test]
fn decode_closing_frame_with_null_presentation() {
    let frame = decode_frame(r#"{"type":"closing","presentation":null}"#).expect("decode");
    assert_eq!(frame, StreamFrame::Closing { presentation: None });
}

#[test]
fn decode_error_frame_with_detail() {
    let frame = decode_frame(r#"{"type":"error","detail":"rate limited"}"#).expect("decode");
    assert_eq!(frame, StreamFrame::Error { detail: Some("rate limited".to_owned()) });
}

#[test]
fn decode_error_frame_renders_structured_detail() {
    let frame = decode_frame(r#"{"type":"error","detail":{"code":429}}"#).expect("decode");
    assert_eq!(frame, StreamFrame::Error { detail: Some(r#"{"code":429}"#.to_owned()) });
}

#[test]
fn decode_error_frame_without_detail() {
    let frame = decode_frame(r#"{"type":"error"}"#).expect("decode");
    assert_eq!(frame, StreamFrame::Error { detail: None });
}

#[test]
fn decode_rejects_unknown_type() {
    let err = decode_frame(r#"{"type":"progress"}"#).expect_err("unknown type");
    assert!(matches!(err, CodecError::UnknownType(kind) if kind == "progress"));
}

#[test]
fn decode_rejects_non_json() {
    let err = decode_frame("not json").expect_err("malformed");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn decode_rejects_missing_type() {
    let err = decode_frame(r#"{"chunk":"x"}"#).expect_err("missing type");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn encode_omits_absent_fields() {
    let text = encode_frame(&StreamFrame::Error { detail: None });
    assert_eq!(text, r#"{"type":"error"}"#);
}

#[test]
fn encoded_terminal_frame_decodes_to_same_frame() {
    let frame = StreamFrame::Complete { presentation: Some(json!({"slides": [{"id": 1}, {"id": 2}]})) };
    let decoded = decode_frame(&encode_frame(&frame)).expect("decode");
    assert_eq!(decoded, frame);
}
