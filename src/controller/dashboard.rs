//! Event create/update/delete from the admin dashboard

use crate::model::{FormKind, FormState, PendingConfirm};
use super::AppController;

impl AppController {
    pub async fn open_new_event_form(&self) {
        let model = self.model.lock().await;
        let mut form = FormState::new_event();
        form.editing = true;
        model.set_form(Some(form)).await;
    }

    pub async fn open_edit_event_form(&self) {
        let model = self.model.lock().await;
        let Some(event) = model.get_selected_event().await else {
            return;
        };
        if event.id.is_none() {
            model.set_error("Este evento no tiene identificador.".to_string()).await;
            return;
        }
        let mut form = FormState::edit_event(&event);
        form.editing = true;
        model.set_form(Some(form)).await;
    }

    /// Sends the open event form. On failure the list and the form stay as they were.
    pub async fn save_event_form(&self) {
        let model = self.model.lock().await;
        let Some(form) = model.get_form().await else {
            return;
        };
        let FormKind::Event { editing } = form.kind.clone() else {
            return;
        };
        if form.submitting {
            return;
        }

        let event = match form.to_event() {
            Ok(event) => event,
            Err(e) => {
                model.set_error(e.to_string()).await;
                return;
            }
        };
        let session = model.get_session().await;
        model.update_form(|f| f.submitting = true).await;
        drop(model);

        let result = match &editing {
            Some(id) => self.api.update_event(session.as_ref(), id, &event).await,
            None => self.api.create_event(session.as_ref(), &event).await,
        };

        let model = self.model.lock().await;
        model.update_form(|f| f.submitting = false).await;
        match (result, editing) {
            (Ok(mut updated), Some(id)) => {
                if updated.id.is_none() {
                    updated.id = Some(id.clone());
                }
                if !model.replace_event(&id, updated).await {
                    tracing::warn!(id = %id, "Updated event is no longer listed");
                }
                model.set_form(None).await;
                model.set_success("Evento actualizado".to_string()).await;
                tracing::info!(id = %id, "Event updated");
            }
            (Ok(created), None) => {
                tracing::info!(id = ?created.id, title = %created.title, "Event created");
                model.prepend_event(created).await;
                model.set_form(None).await;
                model.set_success("Evento creado".to_string()).await;
            }
            (Err(e), _) => {
                tracing::error!(error = %e, "Saving event failed");
                model
                    .set_error(format!("Error al guardar el evento: {}", Self::format_error(&e)))
                    .await;
            }
        }
    }

    pub async fn request_delete_event(&self) {
        let model = self.model.lock().await;
        let Some(event) = model.get_selected_event().await else {
            return;
        };
        let Some(id) = event.id else {
            return;
        };
        model
            .set_confirm(PendingConfirm::DeleteEvent {
                id,
                title: event.title,
            })
            .await;
    }

    pub async fn delete_event(&self, id: &crate::model::EventId) {
        let session = self.model.lock().await.get_session().await;
        let result = self.api.delete_event(session.as_ref(), id).await;

        let model = self.model.lock().await;
        match result {
            Ok(message) => {
                tracing::info!(id = %id, message = ?message, "Event deleted");
                model.remove_event(id).await;
                model
                    .set_success(message.unwrap_or_else(|| "Evento eliminado".to_string()))
                    .await;
            }
            Err(e) => {
                tracing::error!(id = %id, error = %e, "Deleting event failed");
                model
                    .set_error(format!("Error al eliminar el evento: {}", Self::format_error(&e)))
                    .await;
            }
        }
    }
}
