//! Portfolio route handlers.
//!
//! Extractor order matters: path validation rejects before the body is read.

use axum::{extract::State, http::StatusCode, response::Response};
use validator::{Validate, ValidationErrors};

use crate::http::extract::{JsonBody, ProfileId};
use crate::http::response::{json, ApiError, FieldError};
use crate::http::server::AppState;
use crate::security::ClientKey;

use super::models::{
    CertificatesResponse, ContactRequest, ContactResponse, ProjectsResponse, QuestionRequest,
    QuestionResponse, SkillsResponse,
};
use super::sanitize::{sanitize_email, sanitize_text};

pub async fn get_profile(
    State(state): State<AppState>,
    id: ProfileId,
) -> Result<Response, ApiError> {
    let profile = state.portfolio.profile(id.as_str()).await?;
    Ok(json(StatusCode::OK, profile))
}

pub async fn list_skills(
    State(state): State<AppState>,
    id: ProfileId,
) -> Result<Response, ApiError> {
    let skills = state.portfolio.skills(id.as_str()).await?;
    Ok(json(StatusCode::OK, SkillsResponse { skills }))
}

pub async fn list_projects(
    State(state): State<AppState>,
    id: ProfileId,
) -> Result<Response, ApiError> {
    let projects = state.portfolio.projects(id.as_str()).await?;
    Ok(json(StatusCode::OK, ProjectsResponse { projects }))
}

pub async fn list_certificates(
    State(state): State<AppState>,
    id: ProfileId,
) -> Result<Response, ApiError> {
    let certificates = state.portfolio.certificates(id.as_str()).await?;
    Ok(json(StatusCode::OK, CertificatesResponse { certificates }))
}

pub async fn create_contact(
    State(state): State<AppState>,
    id: ProfileId,
    JsonBody(request): JsonBody<ContactRequest>,
) -> Result<Response, ApiError> {
    let request = ContactRequest {
        name: sanitize_text(&request.name),
        email: sanitize_email(&request.email),
        message: sanitize_text(&request.message),
    };
    request.validate().map_err(validation_error)?;

    let contact = state.portfolio.create_contact(id.as_str(), request).await?;
    Ok(json(
        StatusCode::CREATED,
        ContactResponse {
            id: contact.id,
            message: "Contact message sent successfully",
            contacted_at: contact.contacted_at,
        },
    ))
}

pub async fn create_question(
    State(state): State<AppState>,
    id: ProfileId,
    client: ClientKey,
    JsonBody(request): JsonBody<QuestionRequest>,
) -> Result<Response, ApiError> {
    let request = QuestionRequest {
        message: sanitize_text(&request.message),
    };
    request.validate().map_err(validation_error)?;

    let question = state
        .portfolio
        .create_question(id.as_str(), request, &client)
        .await?;
    Ok(json(
        StatusCode::CREATED,
        QuestionResponse {
            id: question.id,
            message: "Question received successfully",
            created_at: question.created_at,
        },
    ))
}

/// Flatten validator output into field errors, ordered by field name.
fn validation_error(errors: ValidationErrors) -> ApiError {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid")),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    ApiError::validation(fields)
}
