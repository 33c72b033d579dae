use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use cuidame_core::AppError;

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let name = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{name} no es válido"))
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&name, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_messages(&format!("{name}[{idx}]"), inner, out);
                }
            }
        }
    }
}

/// Joins every validation message into one human-readable line.
pub fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.sort();
    messages.join(", ")
}

fn rejection_message(rejection: &JsonRejection) -> String {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return "Falta la cabecera 'Content-Type: application/json'".to_string();
    }

    let text = rejection.body_text();
    if let Some(field) = text
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return format!("El campo {field} es obligatorio");
    }
    if text.contains("invalid type") || text.contains("invalid value") {
        return "Tipo de campo inválido en la solicitud".to_string();
    }

    "Cuerpo de la solicitud inválido".to_string()
}

/// JSON body extractor that runs `validator` rules.
///
/// Malformed JSON is `400 SOLICITUD_INVALIDA`; rule violations are `422 VALIDACION_FALLIDA`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection_message(&rejection)))?;

        value
            .validate()
            .map_err(|errors| AppError::unprocessable(format_errors(&errors)))?;

        Ok(ValidatedJson(value))
    }
}
