use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::error::AppError;
use crate::result::Result;

/// An upload carried in a JSON body instead of a multipart form:
/// `{ filename, content: <base64>, content_type? }`.
pub struct JsonUpload {
    pub filename: String,
    pub content: Vec<u8>,
}

impl JsonUpload {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        if !payload.is_object() {
            return Err(AppError::bad_request("JSON body must be an object"));
        }

        let content = match payload.get("content") {
            Some(Value::String(content)) if !content.is_empty() => content,
            _ => {
                return Err(AppError::bad_request(
                    "Missing base64-encoded 'content' field",
                ))
            }
        };

        let filename = match payload.get("filename").or_else(|| payload.get("name")) {
            Some(Value::String(filename)) if !filename.is_empty() => filename.clone(),
            _ => return Err(AppError::bad_request("Missing 'filename' field")),
        };

        let content = STANDARD
            .decode(content)
            .map_err(|_| AppError::bad_request("Invalid base64 data in 'content'"))?;

        Ok(Self { filename, content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_upload_roundtrip() {
        let payload = json!({
            "filename": "pic.png",
            "content": STANDARD.encode(b"pixels"),
        });
        let upload = JsonUpload::from_payload(&payload).unwrap();
        assert_eq!(upload.filename, "pic.png");
        assert_eq!(upload.content, b"pixels");
    }

    #[test]
    fn test_json_upload_accepts_name_alias() {
        let payload = json!({
            "name": "pic.png",
            "content": STANDARD.encode(b"pixels"),
        });
        assert_eq!(JsonUpload::from_payload(&payload).unwrap().filename, "pic.png");
    }

    #[test]
    fn test_json_upload_rejects_bad_payloads() {
        for payload in [
            json!([1, 2, 3]),
            json!({"filename": "pic.png"}),
            json!({"content": STANDARD.encode(b"pixels")}),
            json!({"filename": "pic.png", "content": "not-base64!!"}),
        ] {
            assert!(matches!(
                JsonUpload::from_payload(&payload),
                Err(AppError::BadRequest(_))
            ));
        }
    }
}
