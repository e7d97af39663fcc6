use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AnimError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(AnimError::timeout("x").to_string().contains("timeout error:"));
    assert!(AnimError::decode("x").to_string().contains("decode error:"));
    assert!(AnimError::encode("x").to_string().contains("encode error:"));
    assert_eq!(AnimError::Cancelled.to_string(), "cancelled");
}

#[test]
fn kinds_match_variants() {
    assert_eq!(AnimError::validation("x").kind(), ErrorKind::Validation);
    assert_eq!(AnimError::timeout("x").kind(), ErrorKind::Timeout);
    assert_eq!(AnimError::decode("x").kind(), ErrorKind::Decode);
    assert_eq!(AnimError::encode("x").kind(), ErrorKind::Encode);
    assert_eq!(AnimError::Cancelled.kind(), ErrorKind::Cancelled);
    assert!(AnimError::timeout("x").is_timeout());
    assert!(!AnimError::decode("x").is_timeout());
}

#[test]
fn context_keeps_kind() {
    let err = AnimError::encode("palette overflow").with_context("job 3");
    assert_eq!(err.kind(), ErrorKind::Encode);
    assert_eq!(err.to_string(), "encode error: job 3: palette overflow");

    let err = AnimError::Cancelled.with_context("job 3");
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AnimError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
