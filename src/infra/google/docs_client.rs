// Google Docs/Drive client implementing the core DocsProvider port.
// It deliberately exposes only the three calls the pipeline needs, and maps
// the core EditOperation batch onto the Docs batchUpdate wire format.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::credentials::Credential;
use crate::core::planning::{EditOperation, ParagraphStyle};
use crate::core::provisioning::{DocsProvider, ProviderError};

use super::auth::ServiceAccountAuth;

const DOCS_BASE_URL: &str = "https://docs.googleapis.com/v1";
const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

pub struct GoogleDocsApiClient {
    client: Client,
    auth: ServiceAccountAuth,
    docs_base_url: String,
    drive_base_url: String,
}

impl GoogleDocsApiClient {
    pub fn new(credential: Credential) -> Self {
        let client = Client::new();
        Self {
            auth: ServiceAccountAuth::new(credential, client.clone()),
            client,
            docs_base_url: DOCS_BASE_URL.to_string(),
            drive_base_url: DRIVE_BASE_URL.to_string(),
        }
    }

    async fn error_from_response(
        context: &str,
        response: reqwest::Response,
    ) -> ProviderError {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
        ProviderError::Api(format!("{context} failed ({status}): {text}"))
    }
}

#[async_trait]
impl DocsProvider for GoogleDocsApiClient {
    async fn create_document(&self, title: &str) -> Result<String, ProviderError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/documents", self.docs_base_url);

        tracing::debug!(%title, "creating Google Doc");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&CreateDocumentRequest { title })
            .send()
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("document creation", response).await);
        }

        let document: CreateDocumentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))?;
        Ok(document.document_id)
    }

    async fn apply_edits(
        &self,
        document_id: &str,
        operations: &[EditOperation],
    ) -> Result<(), ProviderError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/documents/{document_id}:batchUpdate", self.docs_base_url);

        // One request for the whole batch: Google applies it atomically, so
        // a failure never leaves a half-formatted document behind.
        let body = BatchUpdateRequest {
            requests: operations.iter().map(to_docs_request).collect(),
        };

        tracing::debug!(document_id, requests = body.requests.len(), "applying batch update");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("batch update", response).await);
        }
        Ok(())
    }

    async fn grant_editor(&self, document_id: &str, email: &str) -> Result<(), ProviderError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/files/{document_id}/permissions", self.drive_base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            // The application layer communicates the share link itself, so
            // Google's own notification email is suppressed.
            .query(&[("sendNotificationEmail", "false")])
            .json(&PermissionRequest {
                kind: "user",
                role: "writer",
                email_address: email,
            })
            .send()
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("permission grant", response).await);
        }

        tracing::info!(document_id, email, "granted editor access");
        Ok(())
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateDocumentRequest<'a> {
    title: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentResponse {
    document_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    role: &'static str,
    email_address: &'a str,
}

#[derive(Debug, Serialize)]
struct BatchUpdateRequest {
    requests: Vec<DocsRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    insert_text: Option<InsertTextRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    update_paragraph_style: Option<UpdateParagraphStyleRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    update_text_style: Option<UpdateTextStyleRequest>,
}

#[derive(Debug, Serialize)]
struct InsertTextRequest {
    location: Location,
    text: String,
}

#[derive(Debug, Serialize)]
struct Location {
    index: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Range {
    start_index: u32,
    end_index: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParagraphStyleRequest {
    range: Range,
    paragraph_style: WireParagraphStyle,
    fields: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireParagraphStyle {
    named_style_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTextStyleRequest {
    range: Range,
    text_style: WireTextStyle,
    fields: &'static str,
}

#[derive(Debug, Serialize)]
struct WireTextStyle {
    bold: bool,
}

fn named_style_type(style: ParagraphStyle) -> &'static str {
    match style {
        ParagraphStyle::Title => "TITLE",
        ParagraphStyle::Heading1 => "HEADING_1",
        ParagraphStyle::Heading2 => "HEADING_2",
        ParagraphStyle::NormalText => "NORMAL_TEXT",
    }
}

fn to_docs_request(op: &EditOperation) -> DocsRequest {
    let mut request = DocsRequest {
        insert_text: None,
        update_paragraph_style: None,
        update_text_style: None,
    };

    match op {
        EditOperation::InsertText { at, text } => {
            request.insert_text = Some(InsertTextRequest {
                location: Location { index: *at },
                text: text.clone(),
            });
        }
        EditOperation::SetParagraphStyle { start, end, style } => {
            request.update_paragraph_style = Some(UpdateParagraphStyleRequest {
                range: Range {
                    start_index: *start,
                    end_index: *end,
                },
                paragraph_style: WireParagraphStyle {
                    named_style_type: named_style_type(*style),
                },
                fields: "namedStyleType",
            });
        }
        EditOperation::SetTextStyle { start, end, bold } => {
            request.update_text_style = Some(UpdateTextStyleRequest {
                range: Range {
                    start_index: *start,
                    end_index: *end,
                },
                text_style: WireTextStyle { bold: *bold },
                fields: "bold",
            });
        }
    }

    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_text_maps_to_wire_format() {
        let op = EditOperation::InsertText {
            at: 1,
            text: "Topic: AI trends\n".to_string(),
        };
        let rendered = serde_json::to_value(to_docs_request(&op)).unwrap();
        assert_eq!(
            rendered,
            json!({
                "insertText": {
                    "location": { "index": 1 },
                    "text": "Topic: AI trends\n"
                }
            })
        );
    }

    #[test]
    fn paragraph_style_maps_to_named_style_with_field_mask() {
        let op = EditOperation::SetParagraphStyle {
            start: 1,
            end: 12,
            style: ParagraphStyle::Heading2,
        };
        let rendered = serde_json::to_value(to_docs_request(&op)).unwrap();
        assert_eq!(
            rendered,
            json!({
                "updateParagraphStyle": {
                    "range": { "startIndex": 1, "endIndex": 12 },
                    "paragraphStyle": { "namedStyleType": "HEADING_2" },
                    "fields": "namedStyleType"
                }
            })
        );
    }

    #[test]
    fn text_style_maps_to_bold_with_field_mask() {
        let op = EditOperation::SetTextStyle {
            start: 1,
            end: 7,
            bold: true,
        };
        let rendered = serde_json::to_value(to_docs_request(&op)).unwrap();
        assert_eq!(
            rendered,
            json!({
                "updateTextStyle": {
                    "range": { "startIndex": 1, "endIndex": 7 },
                    "textStyle": { "bold": true },
                    "fields": "bold"
                }
            })
        );
    }

    #[test]
    fn batch_request_preserves_operation_order() {
        let ops = vec![
            EditOperation::InsertText {
                at: 1,
                text: "Title\n".to_string(),
            },
            EditOperation::SetParagraphStyle {
                start: 1,
                end: 7,
                style: ParagraphStyle::Title,
            },
        ];
        let body = BatchUpdateRequest {
            requests: ops.iter().map(to_docs_request).collect(),
        };
        let rendered = serde_json::to_value(&body).unwrap();
        let requests = rendered["requests"].as_array().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].get("insertText").is_some());
        assert!(requests[1].get("updateParagraphStyle").is_some());
    }

    #[test]
    fn permission_body_targets_writer_role() {
        let body = PermissionRequest {
            kind: "user",
            role: "writer",
            email_address: "user@example.com",
        };
        let rendered = serde_json::to_value(&body).unwrap();
        assert_eq!(
            rendered,
            json!({
                "type": "user",
                "role": "writer",
                "emailAddress": "user@example.com"
            })
        );
    }
}
