//! Classification of provider errors into the handful of categories the
//! scanner treats as non-fatal. Structured error codes are preferred;
//! substring matching on the rendered error is the fallback for errors
//! that carry no metadata (connector failures, timeouts).

use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    AccessDenied,
    OptInRequired,
    InvalidCredentials,
    EndpointUnreachable,
    Other,
}

/// Maps a structured error code (when present) or the rendered error text
/// to a category. Pure, so the policy is unit-testable without an SDK
/// error in hand.
pub fn classify(code: Option<&str>, text: &str) -> ProviderErrorKind {
    if let Some(code) = code {
        return match code {
            "AccessDenied" | "AccessDeniedException" | "UnauthorizedOperation"
            | "AuthorizationError" | "NotAuthorized" => ProviderErrorKind::AccessDenied,
            "OptInRequired" => ProviderErrorKind::OptInRequired,
            "InvalidClientTokenId" | "UnrecognizedClientException" | "ExpiredToken"
            | "AuthFailure" => ProviderErrorKind::InvalidCredentials,
            _ => classify_text(text),
        };
    }
    classify_text(text)
}

fn classify_text(text: &str) -> ProviderErrorKind {
    if text.contains("AccessDenied") || text.contains("UnauthorizedOperation") {
        ProviderErrorKind::AccessDenied
    } else if text.contains("OptInRequired") {
        ProviderErrorKind::OptInRequired
    } else if text.contains("InvalidClientTokenId") {
        ProviderErrorKind::InvalidCredentials
    } else if text.contains("dispatch failure")
        || text.contains("connection error")
        || text.contains("dns error")
        || text.contains("timeout")
    {
        ProviderErrorKind::EndpointUnreachable
    } else {
        ProviderErrorKind::Other
    }
}

/// Logs a failed API call at a severity matching its category and moves
/// on. One failing service/region pair degrades coverage; it never aborts
/// the scan.
pub fn report<E>(service: &str, region: &str, operation: &str, err: &E)
where
    E: ProvideErrorMetadata + std::error::Error,
{
    // Display chain, not Debug: connector failures carry no structured
    // code, and their recognizable markers only appear in the rendered
    // source chain.
    let text = format!("{}", DisplayErrorContext(err));
    match classify(err.code(), &text) {
        ProviderErrorKind::AccessDenied => {
            warn!(service, region, operation, "access denied");
        }
        ProviderErrorKind::OptInRequired => {
            debug!(service, region, operation, "region not opted in, skipping");
        }
        ProviderErrorKind::InvalidCredentials => {
            warn!(service, region, operation, "invalid credentials");
        }
        ProviderErrorKind::EndpointUnreachable => {
            warn!(service, region, operation, "endpoint unreachable");
        }
        ProviderErrorKind::Other => {
            error!(service, region, operation, error = %text, "API call failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_code_wins() {
        assert_eq!(
            classify(Some("AccessDeniedException"), "whatever"),
            ProviderErrorKind::AccessDenied
        );
        assert_eq!(classify(Some("OptInRequired"), ""), ProviderErrorKind::OptInRequired);
        assert_eq!(
            classify(Some("InvalidClientTokenId"), ""),
            ProviderErrorKind::InvalidCredentials
        );
    }

    #[test]
    fn unknown_code_falls_back_to_text() {
        assert_eq!(
            classify(Some("Throttling"), "OptInRequired: region disabled"),
            ProviderErrorKind::OptInRequired
        );
    }

    #[test]
    fn no_code_uses_text_markers() {
        assert_eq!(
            classify(None, "UnauthorizedOperation on DescribeInstances"),
            ProviderErrorKind::AccessDenied
        );
        assert_eq!(classify(None, "something novel"), ProviderErrorKind::Other);
    }

    #[test]
    fn connector_failures_classify_from_rendered_display_chain() {
        // Shapes as DisplayErrorContext renders them: the SdkError
        // variant's Display text followed by the source chain.
        assert_eq!(
            classify(
                None,
                "dispatch failure: io error: error trying to connect: \
                 tcp connect error: Connection refused (os error 111)"
            ),
            ProviderErrorKind::EndpointUnreachable
        );
        assert_eq!(
            classify(None, "dispatch failure: timeout: HTTP connect timeout occurred"),
            ProviderErrorKind::EndpointUnreachable
        );
        assert_eq!(
            classify(
                None,
                "dispatch failure: io error: error trying to connect: \
                 dns error: failed to lookup address information"
            ),
            ProviderErrorKind::EndpointUnreachable
        );
    }
}
