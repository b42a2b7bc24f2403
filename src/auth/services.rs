use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::dto::{SigninRequest, SignupRequest};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::NewUser;
use crate::error::AppError;
use crate::state::AppState;

const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Reduces a client-supplied filename to `[A-Za-z0-9_.-]`, with no path
/// components. Accented letters are folded to ASCII (NFKD) first. Returns
/// `None` when nothing usable is left.
pub(crate) fn secure_filename(filename: &str) -> Option<String> {
    lazy_static! {
        static ref UNSAFE_RE: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
    }
    let ascii = filename.nfkd().filter(char::is_ascii).collect::<String>();
    let spaced = ascii.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_RE.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c: char| c == '.' || c == '_');
    if trimmed.is_empty() {
        return None;
    }

    let stem = trimmed.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
        return Some(format!("_{}", trimmed));
    }
    Some(trimmed.to_string())
}

/// Blob key for a sanitized filename; the random prefix keeps uploads from
/// overwriting each other.
pub(crate) fn blob_key(sanitized: &str) -> String {
    format!("{}-{}", Uuid::new_v4().simple(), sanitized)
}

lazy_static! {
    // Verified against when the email is unknown so both rejection paths cost the same.
    static ref DUMMY_HASH: String = hash_password("profile-auth-dummy").unwrap_or_default();
}

/// Creates the user row and stores the profile image.
///
/// The row is inserted inside a transaction before the upload and committed
/// only once the blob exists. A failed upload rolls the row back; a failed
/// commit deletes the uploaded blob again.
pub async fn signup(state: &AppState, req: SignupRequest) -> Result<i64, AppError> {
    let SignupRequest {
        name,
        email,
        password,
        image,
    } = req;

    let password_hash = hash_password(&password).map_err(AppError::Internal)?;
    let key = blob_key(&image.filename);

    let pending = match state
        .users
        .begin_insert(NewUser {
            name,
            email: email.clone(),
            password_hash,
            image_filename: key.clone(),
        })
        .await
    {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, email = %email, "insert user failed");
            return Err(e.into());
        }
    };
    let user_id = pending.id();

    if let Err(e) = state
        .storage
        .put_object(&key, image.body, &image.content_type)
        .await
    {
        if let Err(rb) = pending.rollback().await {
            warn!(error = %rb, user_id, "rollback after failed upload failed");
        }
        return Err(AppError::Upload(e));
    }
    debug!(key = %key, "profile image uploaded");

    if let Err(e) = pending.commit().await {
        error!(error = %e, user_id, "commit user failed; removing uploaded blob");
        if let Err(del) = state.storage.delete_object(&key).await {
            error!(error = %del, key = %key, "failed to remove orphaned blob");
        }
        return Err(e.into());
    }

    info!(user_id, email = %email, key = %key, "user signed up");
    Ok(user_id)
}

/// Fails with [`AppError::AuthFailure`] for an unknown email and for a wrong
/// password alike. Store failures become [`AppError::SigninUnavailable`], which
/// is still answered with the failure image.
pub async fn signin(state: &AppState, req: SigninRequest) -> Result<(), AppError> {
    let stored = match state.users.find_password_hash_by_email(&req.email).await {
        Ok(stored) => stored,
        Err(e) => {
            error!(error = %e, email = %req.email, "signin lookup failed");
            return Err(AppError::SigninUnavailable(e.into()));
        }
    };

    match stored {
        Some(hash) => {
            if verify_password(&req.password, &hash) {
                info!(email = %req.email, "user signed in");
                Ok(())
            } else {
                warn!(email = %req.email, "signin invalid password");
                Err(AppError::AuthFailure)
            }
        }
        None => {
            let _ = verify_password(&req.password, &DUMMY_HASH);
            warn!(email = %req.email, "signin unknown email");
            Err(AppError::AuthFailure)
        }
    }
}
