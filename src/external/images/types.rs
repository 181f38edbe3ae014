use serde::Deserialize;

/// Envelope returned by every Cloudflare v4 endpoint
#[derive(Debug, Deserialize)]
pub(super) struct CloudflareResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<CloudflareMessage>,
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CloudflareMessage {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct UploadedImage {
    pub id: String,
    #[serde(default)]
    pub variants: Vec<String>,
}

impl<T> CloudflareResponse<T> {
    /// Joins error messages as `code: message` pairs
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "unknown error".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_envelope_with_result() {
        let body = r#"{
            "success": true,
            "errors": [],
            "result": {"id": "abc", "variants": ["https://imagedelivery.net/h/abc/public"]}
        }"#;
        let resp: CloudflareResponse<UploadedImage> = serde_json::from_str(body).unwrap();

        assert!(resp.success);
        let image = resp.result.unwrap();
        assert_eq!(image.id, "abc");
        assert_eq!(image.variants, ["https://imagedelivery.net/h/abc/public"]);
    }

    #[test]
    fn test_failed_envelope_without_result() {
        let body = r#"{
            "success": false,
            "errors": [{"code": 10000, "message": "Authentication error"}]
        }"#;
        let resp: CloudflareResponse<UploadedImage> = serde_json::from_str(body).unwrap();

        assert!(!resp.success);
        assert!(resp.result.is_none());
        assert_eq!(resp.error_summary(), "10000: Authentication error");
    }
}
