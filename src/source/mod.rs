//! Where uploaded PDFs come from, and the checks they pass on the way in

pub mod resolver;

pub use resolver::{
    check_pdf_header, resolve_base64, resolve_path, validate_output_path_access,
    validate_path_access, ResolvedPdf, PDF_MIME_TYPE,
};

use schemars::JsonSchema;
use serde::Serialize;

/// Where a PDF is loaded from
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum PdfSource {
    /// File path (absolute or relative)
    Path {
        /// Path to the PDF file
        path: String,
    },
    /// Base64 encoded PDF data
    Base64 {
        /// Base64 encoded PDF content
        base64: String,
        /// File name shown to the user and used to name outputs
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Declared MIME type; inferred from `name` when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
}

impl PdfSource {
    /// Short label for logs
    pub fn label(&self) -> &str {
        match self {
            PdfSource::Path { path } => path,
            PdfSource::Base64 { name, .. } => name.as_deref().unwrap_or("<base64>"),
        }
    }
}

fn optional_string<E: serde::de::Error>(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> std::result::Result<Option<String>, E> {
    match obj.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(E::custom(format!("\"{}\" must be a string", key))),
    }
}

impl<'de> serde::Deserialize<'de> for PdfSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let Some(obj) = value.as_object() else {
            return Err(serde::de::Error::custom(format!(
                "Invalid source: expected an object with \"path\" or \"base64\", but got {}",
                match &value {
                    serde_json::Value::Array(_) => "an array",
                    serde_json::Value::String(_) => "a string",
                    serde_json::Value::Number(_) => "a number",
                    serde_json::Value::Bool(_) => "a boolean",
                    serde_json::Value::Null => "null",
                    _ => "unknown type",
                }
            )));
        };

        if let Some(v) = obj.get("path") {
            return match v.as_str() {
                Some(s) => Ok(PdfSource::Path {
                    path: s.to_string(),
                }),
                None => Err(serde::de::Error::custom("\"path\" must be a string")),
            };
        }
        if let Some(v) = obj.get("base64") {
            let Some(s) = v.as_str() else {
                return Err(serde::de::Error::custom("\"base64\" must be a string"));
            };
            return Ok(PdfSource::Base64 {
                base64: s.to_string(),
                name: optional_string(obj, "name")?,
                mime_type: optional_string(obj, "mime_type")?,
            });
        }

        let keys: Vec<&String> = obj.keys().collect();
        Err(serde::de::Error::custom(format!(
            "Invalid source: expected an object with \"path\" or \"base64\", but got keys: {:?}",
            keys
        )))
    }
}
