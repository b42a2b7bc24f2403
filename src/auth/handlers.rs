use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{SigninForm, SignupForm},
        services,
    },
    error::AppError,
    pages,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/signup", get(signup_form).post(signup))
        .route("/signin", get(signin_form).post(signin))
}

pub async fn home() -> Redirect {
    Redirect::to("/signup")
}

pub async fn signup_form() -> Html<&'static str> {
    Html(pages::SIGNUP_FORM)
}

pub async fn signin_form() -> Html<&'static str> {
    Html(pages::SIGNIN_FORM)
}

#[instrument(skip(state, mp))]
pub async fn signup(
    State(state): State<AppState>,
    mp: Multipart,
) -> Result<Html<&'static str>, AppError> {
    let req = SignupForm::from_multipart(mp).await?.validate()?;
    services::signup(&state, req).await?;
    Ok(Html(pages::SIGNUP_SUCCESS))
}

#[instrument(skip(state, form))]
pub async fn signin(
    State(state): State<AppState>,
    Form(form): Form<SigninForm>,
) -> Result<impl IntoResponse, AppError> {
    let req = form.validate()?;
    services::signin(&state, req).await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, pages::IMAGE_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        pages::SIGNIN_SUCCESS_IMAGE,
    ))
}
