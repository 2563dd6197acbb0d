use thiserror::Error;

use crate::error::{ApiError, ValidationError};
use crate::model::{BandApiClient, FormKind, FormState, Session};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What a successful registration leaves behind for the confirm step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub message: Option<String>,
}

/// Validates the login form and exchanges the credentials for a session
pub async fn login(api: &BandApiClient, form: &FormState) -> Result<Session, AuthError> {
    let (email, password) = form.login_credentials()?;

    tracing::info!(email = %email, "Logging in");
    let response = api.login(&email, &password).await?;
    let session = Session::from_login(response, &email);
    tracing::info!(email = %session.email, role = %session.role, "Session started");
    Ok(session)
}

pub async fn register(api: &BandApiClient, form: &FormState) -> Result<Registration, AuthError> {
    let (name, email, password) = form.registration()?;

    tracing::info!(email = %email, "Registering account");
    let message = api.register(&name, &email, &password).await?;
    Ok(Registration { email, message })
}

/// The email comes from the register step carried by the form
pub async fn confirm(api: &BandApiClient, form: &FormState) -> Result<Option<String>, AuthError> {
    let FormKind::ConfirmCode { email } = &form.kind else {
        return Err(ValidationError::Required("email").into());
    };
    if email.is_empty() {
        return Err(ValidationError::Required("email").into());
    }
    let code = form.confirmation_code()?;

    tracing::info!(email = %email, "Confirming account");
    Ok(api.confirm_code(email, &code).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn offline_api() -> BandApiClient {
        // Never contacted: every case below fails validation first
        BandApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn login_rejects_invalid_form_without_calling_api() {
        let mut form = FormState::login();
        form.set("email", "not-an-email");
        form.set("password", "123456");
        let err = login(&offline_api(), &form).await.unwrap_err();
        assert!(matches!(err, AuthError::Invalid(ValidationError::InvalidEmail)));
    }

    #[tokio::test]
    async fn register_requires_every_field() {
        let mut form = FormState::register();
        form.set("nombre", "Ana");
        form.set("email", "ana@example.com");
        let err = register(&offline_api(), &form).await.unwrap_err();
        assert!(matches!(err, AuthError::Invalid(ValidationError::Required("password"))));
    }

    #[tokio::test]
    async fn confirm_needs_an_email_from_registration() {
        let form = FormState::confirm_code("");
        let err = confirm(&offline_api(), &form).await.unwrap_err();
        assert!(matches!(err, AuthError::Invalid(ValidationError::Required("email"))));
    }
}
