/*!
 * Tests for error classification
 */

use subweave::errors::{AppError, CapabilityError, ErrorCategory, GlossaryError};

#[test]
fn test_capabilityError_userActionable_shouldNotReport() {
    for error in [
        CapabilityError::Authentication("bad key".into()),
        CapabilityError::RateLimited("quota".into()),
        CapabilityError::ResourceUnavailable("region".into()),
        CapabilityError::NotAvailable("whisper".into()),
    ] {
        assert_eq!(error.category(), ErrorCategory::UserActionable, "{}", error);
        assert!(!error.should_report());
        assert!(!error.is_retryable());
    }
}

#[test]
fn test_capabilityError_transient_shouldRetryExceptCancellation() {
    assert!(CapabilityError::Network("reset".into()).is_retryable());
    assert!(CapabilityError::Upstream { status: 503, message: "busy".into() }.is_retryable());
    assert!(
        CapabilityError::Upstream { status: 400, message: "<!DOCTYPE html><html>".into() }.is_retryable()
    );

    assert_eq!(CapabilityError::Cancelled.category(), ErrorCategory::Transient);
    assert!(!CapabilityError::Cancelled.is_retryable());
    assert!(!CapabilityError::Timeout(5).is_retryable());
    assert!(!CapabilityError::Cancelled.should_report());
}

#[test]
fn test_capabilityError_unexpected_shouldReport() {
    let error = CapabilityError::Upstream { status: 422, message: "bad request".into() };
    assert_eq!(error.category(), ErrorCategory::Unexpected);
    assert!(error.should_report());
    assert!(CapabilityError::Unknown("boom".into()).should_report());
}

#[test]
fn test_errorCodes_shouldBeStable() {
    assert_eq!(CapabilityError::Timeout(1).code(), "capability.timeout");
    assert_eq!(GlossaryError::MissingTerms.code(), "glossary.invalid_format");
    assert_eq!(GlossaryError::NoValidTerms.code(), "glossary.no_valid_terms");
}

#[test]
fn test_appError_shouldWrapSources() {
    let error: AppError = CapabilityError::Cancelled.into();
    assert!(matches!(error, AppError::Capability(CapabilityError::Cancelled)));

    let error: AppError = GlossaryError::EmptyFile.into();
    assert!(error.to_string().contains("empty"));

    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(AppError::from(io), AppError::File(_)));
}
