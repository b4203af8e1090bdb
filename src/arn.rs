//! ARN string parsing. Pure and infallible: malformed input maps to
//! sentinel strings, never to an error, so record ingestion is never
//! blocked by a bad identifier.

/// Returned when the identifier does not start with `arn:`.
pub const INVALID_FORMAT: &str = "Unknown_Invalid_ARN_Format";
/// Returned when the identifier has fewer than six colon-separated fields.
pub const SHORT_OR_MALFORMED: &str = "Unknown_Short_Or_Malformed_ARN";
/// Returned when the service field cannot be located.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Extracts the resource identifier from an ARN.
///
/// `arn:partition:service:region:account:resource` -> `resource`, where
/// `resource` may itself contain colons (only the first five delimiters
/// are significant).
pub fn resource_name(arn: &str) -> String {
    if !arn.starts_with("arn:") {
        return INVALID_FORMAT.to_string();
    }
    let mut parts = arn.splitn(6, ':');
    match parts.nth(5) {
        Some(resource) => resource.to_string(),
        None => SHORT_OR_MALFORMED.to_string(),
    }
}

/// Extracts the service code (third field) from an ARN.
pub fn service_code(arn: &str) -> String {
    match arn.splitn(4, ':').nth(2) {
        Some(service) => service.to_string(),
        None => UNKNOWN_SERVICE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_segment_returned_unchanged() {
        assert_eq!(
            resource_name("arn:aws:ec2:us-east-1:123456789012:instance/i-0abc"),
            "instance/i-0abc"
        );
    }

    #[test]
    fn resource_segment_keeps_embedded_colons() {
        assert_eq!(
            resource_name("arn:aws:elasticache:eu-west-1:123456789012:cluster:my-cluster"),
            "cluster:my-cluster"
        );
        assert_eq!(
            resource_name("arn:aws:cloudformation:us-east-1:123:stack/name/uuid:extra"),
            "stack/name/uuid:extra"
        );
    }

    #[test]
    fn s3_style_arn_with_empty_region_and_account() {
        assert_eq!(resource_name("arn:aws:s3:::my-bucket"), "my-bucket");
    }

    #[test]
    fn non_arn_input_yields_invalid_format_sentinel() {
        assert_eq!(resource_name("not-an-arn"), INVALID_FORMAT);
        assert_eq!(resource_name(""), INVALID_FORMAT);
        assert_eq!(resource_name("ARN:aws:s3:::x"), INVALID_FORMAT);
    }

    #[test]
    fn short_arn_yields_short_or_malformed_sentinel() {
        assert_eq!(resource_name("arn:aws:s3"), SHORT_OR_MALFORMED);
        assert_eq!(resource_name("arn:aws:iam::123456789012"), SHORT_OR_MALFORMED);
    }

    #[test]
    fn service_code_is_third_field() {
        assert_eq!(service_code("arn:aws:lambda:us-east-1:123:function:fn"), "lambda");
        assert_eq!(service_code("arn:aws:s3:::bucket"), "s3");
    }

    #[test]
    fn service_code_sentinel_on_short_input() {
        assert_eq!(service_code("arn:aws"), UNKNOWN_SERVICE);
        assert_eq!(service_code(""), UNKNOWN_SERVICE);
    }
}
