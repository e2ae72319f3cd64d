use mime_guess::Mime;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use serde_json::Map;
use serde_json::Value;

use crate::attachments::Attachment;
use crate::attachments::AttachmentGroup;
use crate::error::ClientError;
use crate::error::Result;

/// Multipart field that carries the JSON-encoded parameters.
pub const RESERVED_JSON_FIELD: &str = "json";

const OCTET_STREAM: &str = "application/octet-stream";

/// One logical request: operation name, parameters and optional files.
#[derive(Clone, Debug)]
pub struct RequestEnvelope {
    operation: String,
    params: Map<String, Value>,
    attachments: Vec<AttachmentGroup>,
}

pub(crate) enum RequestBody {
    Json(Vec<u8>),
    Multipart(Form),
}

impl RequestEnvelope {
    pub fn new(
        operation: impl Into<String>,
        params: Option<Map<String, Value>>,
        attachments: Vec<AttachmentGroup>,
    ) -> Result<Self> {
        let operation = operation.into();
        if operation.trim().is_empty() {
            return Err(ClientError::EmptyOperationName);
        }
        Ok(Self {
            operation,
            params: params.unwrap_or_default(),
            attachments,
        })
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn is_multipart(&self) -> bool {
        self.attachments.iter().any(|group| !group.files.is_empty())
    }

    /// Form keys in the order they are appended to a multipart body. Empty
    /// for a plain JSON request.
    pub fn form_fields(&self) -> Vec<String> {
        if !self.is_multipart() {
            return Vec::new();
        }
        let mut fields: Vec<String> = self
            .attachments
            .iter()
            .flat_map(|group| group.keyed().map(|(key, _)| key))
            .collect();
        fields.push(RESERVED_JSON_FIELD.to_string());
        fields
    }

    pub fn json_body(&self) -> Vec<u8> {
        // A map of JSON values always serializes.
        serde_json::to_vec(&self.params).unwrap_or_default()
    }

    pub(crate) fn into_body(self) -> Result<RequestBody> {
        if !self.is_multipart() {
            return Ok(RequestBody::Json(self.json_body()));
        }

        let json = String::from_utf8_lossy(&self.json_body()).into_owned();
        let mut form = Form::new();
        for group in self.attachments {
            for (key, file) in group.into_keyed() {
                let Attachment {
                    file_name,
                    content_type,
                    bytes,
                } = file;
                let content_type = if content_type.parse::<Mime>().is_ok() {
                    content_type
                } else {
                    OCTET_STREAM.to_string()
                };
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&content_type)?;
                form = form.part(key, part);
            }
        }
        Ok(RequestBody::Multipart(form.text(RESERVED_JSON_FIELD, json)))
    }
}
