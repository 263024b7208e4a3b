//! Contact intake handlers
//!
//! The intake flow: validate, persist, hand off to the notification
//! dispatcher, redirect. The response never waits on mail delivery.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;

use crate::AppState;
use minipress_common::{
    db::Repository,
    errors::Result,
    metrics::record_contact_intake,
    notify::ContactNotification,
    validation::{ContactSubmission, FieldErrors, NAME_MAX_LEN},
};

/// Field descriptor for the external renderer
#[derive(Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

#[derive(Serialize)]
pub struct ContactFormResponse {
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Serialize)]
pub struct ContactErrorsResponse {
    pub errors: FieldErrors,
}

#[derive(Serialize)]
pub struct ContactSuccessResponse {
    pub message: &'static str,
}

/// Describe the empty contact form
pub async fn contact_form() -> Json<ContactFormResponse> {
    Json(ContactFormResponse {
        fields: vec![
            FieldDescriptor {
                name: "email",
                label: "Your Email Address",
                kind: "email",
                required: true,
                max_length: None,
            },
            FieldDescriptor {
                name: "name",
                label: "Your Name",
                kind: "text",
                required: true,
                max_length: Some(NAME_MAX_LEN),
            },
            FieldDescriptor {
                name: "content",
                label: "Your Message",
                kind: "textarea",
                required: true,
                max_length: None,
            },
        ],
    })
}

/// Accept a contact submission
pub async fn submit_contact(
    State(state): State<AppState>,
    Form(submission): Form<ContactSubmission>,
) -> Result<Response> {
    let valid = match submission.into_valid() {
        Ok(valid) => valid,
        Err(errors) => {
            record_contact_intake(false);
            // Same-page response so the renderer can re-present the form
            // with field-level errors; nothing persisted, nothing sent.
            return Ok((StatusCode::OK, Json(ContactErrorsResponse { errors })).into_response());
        }
    };

    let repo = Repository::new(state.db.clone());
    let request = repo.create_contact_request(&valid).await?;
    record_contact_intake(true);

    tracing::info!(
        contact_request_id = request.id,
        email = %request.email,
        "Contact request received"
    );

    // Fire-and-forget: the redirect below does not wait on delivery.
    state.notifier.dispatch(ContactNotification {
        name: request.name,
        email: request.email,
        content: request.content,
    });

    Ok(Redirect::to("/contact/success").into_response())
}

/// Static confirmation page
pub async fn contact_success() -> Json<ContactSuccessResponse> {
    Json(ContactSuccessResponse {
        message: "Thank you for your message. We will get back to you shortly.",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    #[tokio::test]
    async fn test_submission_missing_a_field_reaches_validation() {
        // A body with no email key at all must not be rejected by the form
        // extractor; it deserializes with an empty email and fails field
        // validation like any other blank value.
        let request = Request::builder()
            .method("POST")
            .uri("/contact")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("name=Jo&content=hi"))
            .unwrap();

        let Form(submission) = Form::<ContactSubmission>::from_request(request, &())
            .await
            .expect("absent fields deserialize as empty strings");

        let errors = submission.into_valid().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("email"));
    }

    #[tokio::test]
    async fn test_submission_with_all_fields_absent_reports_every_field() {
        let request = Request::builder()
            .method("POST")
            .uri("/contact")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::empty())
            .unwrap();

        let Form(submission) = Form::<ContactSubmission>::from_request(request, &())
            .await
            .expect("an empty body deserializes as all-empty fields");

        let errors = submission.into_valid().unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
