//! Login, register, confirm code and logout

use crate::auth;
use crate::model::{FormKind, FormState, Page};
use super::AppController;

impl AppController {
    /// Submits whichever auth form is open
    pub async fn submit_auth_form(&self) {
        let form = self.model.lock().await.get_form().await;
        let Some(form) = form else {
            return;
        };
        if form.submitting {
            return;
        }
        match form.kind {
            FormKind::Login => self.submit_login(form).await,
            FormKind::Register => self.submit_register(form).await,
            FormKind::ConfirmCode { .. } => self.submit_confirm(form).await,
            _ => {}
        }
    }

    async fn begin_submit(&self) {
        self.model.lock().await.update_form(|f| f.submitting = true).await;
    }

    async fn end_submit(&self) {
        self.model.lock().await.update_form(|f| f.submitting = false).await;
    }

    async fn submit_login(&self, form: FormState) {
        self.begin_submit().await;
        let result = auth::login(&self.api, &form).await;
        self.end_submit().await;

        match result {
            Ok(session) => {
                let greeting = format!("¡Bienvenido, {}!", session.name);
                {
                    let model = self.model.lock().await;
                    model.set_session(Some(session)).await;
                    model.set_success(greeting).await;
                }
                self.go_to(Page::Home).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.model
                    .lock()
                    .await
                    .set_error(Self::format_auth_error(&e))
                    .await;
            }
        }
    }

    async fn submit_register(&self, form: FormState) {
        self.begin_submit().await;
        let result = auth::register(&self.api, &form).await;
        self.end_submit().await;

        let model = self.model.lock().await;
        match result {
            Ok(registration) => {
                tracing::info!(email = %registration.email, "Account registered");
                model.navigate(Page::ConfirmCode).await;
                let mut confirm = FormState::confirm_code(&registration.email);
                confirm.editing = true;
                model.set_form(Some(confirm)).await;
                model
                    .set_success(
                        registration
                            .message
                            .unwrap_or_else(|| "Te enviamos un código a tu correo.".to_string()),
                    )
                    .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Registration failed");
                model.set_error(Self::format_auth_error(&e)).await;
            }
        }
    }

    async fn submit_confirm(&self, form: FormState) {
        self.begin_submit().await;
        let result = auth::confirm(&self.api, &form).await;
        self.end_submit().await;

        match result {
            Ok(_) => {
                tracing::info!("Account confirmed");
                self.go_to(Page::Login).await;
                self.model
                    .lock()
                    .await
                    .set_success("Cuenta confirmada correctamente!".to_string())
                    .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation failed");
                self.model
                    .lock()
                    .await
                    .set_error(Self::format_auth_error(&e))
                    .await;
            }
        }
    }

    pub async fn logout(&self) {
        let page = {
            let model = self.model.lock().await;
            if model.get_session().await.is_none() {
                return;
            }
            model.set_session(None).await;
            model.set_success("Sesión cerrada".to_string()).await;
            model.current_page().await
        };
        tracing::info!("Session ended");
        if page.requires_admin() {
            self.go_to(Page::Home).await;
        }
    }
}
