use axum::extract::{multipart::MultipartError, Multipart};
use axum::http::StatusCode;
use bytes::Bytes;
use serde::Deserialize;

use crate::auth::services::{is_valid_email, secure_filename};
use crate::error::AppError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Uploaded file part as received.
#[derive(Debug, Default)]
pub struct ProfileUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Raw multipart body of `POST /signup`.
#[derive(Debug, Default)]
pub struct SignupForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile: Option<ProfileUpload>,
}

/// Profile image that passed validation.
#[derive(Debug)]
pub struct ProfileImage {
    pub filename: String, // sanitized
    pub content_type: String,
    pub body: Bytes,
}

/// Validated signup input.
#[derive(Debug)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub image: ProfileImage,
}

/// Form body of `POST /signin`.
#[derive(Debug, Default, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

fn invalid(msg: &str) -> AppError {
    AppError::Validation(msg.to_string())
}

// The body limit surfaces as a multipart read error carrying 413.
fn form_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    AppError::Validation(format!("Invalid form data: {}", e.body_text()))
}

impl SignupForm {
    pub async fn from_multipart(mut mp: Multipart) -> Result<Self, AppError> {
        let mut form = SignupForm::default();
        while let Some(field) = mp.next_field().await.map_err(form_error)? {
            let name = field.name().map(|s| s.to_string());
            match name.as_deref() {
                Some("profile") => {
                    let filename = field.file_name().map(|s| s.to_string());
                    let content_type = field.content_type().map(|s| s.to_string());
                    let body = field.bytes().await.map_err(form_error)?;
                    form.profile = Some(ProfileUpload {
                        filename,
                        content_type,
                        body,
                    });
                }
                Some(key @ ("name" | "email" | "password")) => {
                    let key = key.to_string();
                    let value = field.text().await.map_err(form_error)?;
                    match key.as_str() {
                        "name" => form.name = Some(value),
                        "email" => form.email = Some(value),
                        _ => form.password = Some(value),
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    pub fn validate(self) -> Result<SignupRequest, AppError> {
        let name = self.name.unwrap_or_default().trim().to_string();
        if name.is_empty() {
            return Err(invalid("Name is required"));
        }

        let email = self.email.unwrap_or_default().trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(invalid("Invalid email"));
        }

        let password = self.password.unwrap_or_default();
        if password.is_empty() {
            return Err(invalid("Password is required"));
        }

        let profile = self
            .profile
            .ok_or_else(|| invalid("Profile image is required"))?;
        if profile.body.is_empty() {
            return Err(invalid("Profile image is empty"));
        }
        let filename = profile
            .filename
            .as_deref()
            .and_then(secure_filename)
            .ok_or_else(|| invalid("Invalid profile image filename"))?;
        let content_type = profile
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Ok(SignupRequest {
            name,
            email,
            password,
            image: ProfileImage {
                filename,
                content_type,
                body: profile.body,
            },
        })
    }
}

impl SigninForm {
    pub fn validate(self) -> Result<SigninRequest, AppError> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() || self.password.is_empty() {
            return Err(invalid("Email and password are required"));
        }
        Ok(SigninRequest {
            email,
            password: self.password,
        })
    }
}
