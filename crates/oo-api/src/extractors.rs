//! Axum extractors for API handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts, Multipart, Request},
    http::{header, request::Parts},
    Json,
};
use chrono::NaiveDate;
use oo_auth::{Authenticator, CurrentUser};
use oo_core::OoError;
use oo_evidence::EvidenceUpload;
use oo_services::ServiceContext;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::representers::DisplayFormats;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceContext>,
    pub auth: Authenticator,
    pub display: Arc<DisplayFormats>,
}

impl AppState {
    pub fn new(services: ServiceContext, auth: Authenticator) -> Self {
        Self {
            services: Arc::new(services),
            auth,
            display: Arc::new(DisplayFormats::default()),
        }
    }

    pub fn with_display(mut self, display: DisplayFormats) -> Self {
        self.display = Arc::new(display);
        self
    }
}

/// Authenticated user extractor
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let user = app_state.auth.authenticate(authorization)?;
        Ok(AuthenticatedUser(user))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Text fields and files of a form submission.
///
/// Accepts `multipart/form-data` (the only way to send files) and, for
/// text-only edits, a flat JSON object. Repeated file fields may use the
/// `name[]` convention.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: Vec<(String, EvidenceUpload)>,
}

impl FormData {
    async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let name = field_name(field.name().unwrap_or_default());
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(e.body_text()))?;
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    let mut upload = EvidenceUpload::new(file_name, data);
                    if let Some(content_type) = content_type {
                        upload = upload.with_content_type(content_type);
                    }
                    form.files.push((name, upload));
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.body_text()))?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    fn from_json(object: serde_json::Map<String, Value>) -> Self {
        let fields = object
            .into_iter()
            .map(|(name, value)| match value {
                Value::Null => (name, String::new()),
                Value::String(text) => (name, text),
                other => (name, other.to_string()),
            })
            .collect();
        Self {
            fields,
            files: Vec::new(),
        }
    }

    /// Trimmed text of a field; blank counts as absent
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Trimmed text of a field that was sent, blank included. JSON `null`
    /// arrives as blank; `None` only when the field is missing.
    pub fn sent_text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|value| value.trim().to_string())
    }

    /// `YYYY-MM-DD` date field
    pub fn date(&self, name: &str) -> ApiResult<Option<NaiveDate>> {
        self.text(name)
            .map(|value| {
                NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .map_err(|_| ApiError::from(OoError::invalid(name, "is not a valid date")))
            })
            .transpose()
    }

    /// Removes and returns every file sent under `name`
    pub fn take_files(&mut self, name: &str) -> Vec<EvidenceUpload> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = rest;
        matching.into_iter().map(|(_, upload)| upload).collect()
    }

    /// First file sent under `name`
    pub fn take_file(&mut self, name: &str) -> Option<EvidenceUpload> {
        self.take_files(name).into_iter().next()
    }
}

fn field_name(raw: &str) -> String {
    raw.trim_end_matches("[]").to_string()
}

#[async_trait]
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return FormData::from_multipart(multipart).await;
        }

        if content_type.starts_with("application/json") {
            let Json(object) = Json::<serde_json::Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Ok(FormData::from_json(object));
        }

        Ok(FormData::default())
    }
}
