//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::domain::models::baby::BabyValidationError;
use crate::domain::models::care_log::CareLogValidationError;
use crate::domain::models::sleep_check::SleepCheckValidationError;
use crate::domain::models::NotFoundError;
use crate::domain::report_service::ReportError;
use crate::domain::sleep_monitor::MonitorError;

pub fn status_for(e: &anyhow::Error) -> StatusCode {
    if e.downcast_ref::<BabyValidationError>().is_some()
        || e.downcast_ref::<SleepCheckValidationError>().is_some()
        || e.downcast_ref::<CareLogValidationError>().is_some()
    {
        return StatusCode::BAD_REQUEST;
    }
    if e.downcast_ref::<NotFoundError>().is_some() {
        return StatusCode::NOT_FOUND;
    }
    if let Some(report_error) = e.downcast_ref::<ReportError>() {
        return match report_error {
            ReportError::BabyNotFound(_) | ReportError::MissingParentEmail(_) | ReportError::NoLogs { .. } => {
                StatusCode::NOT_FOUND
            }
            ReportError::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
        };
    }
    if let Some(monitor_error) = e.downcast_ref::<MonitorError>() {
        return match monitor_error {
            MonitorError::InvalidTransition(_) | MonitorError::ActionInFlight => StatusCode::CONFLICT,
            MonitorError::InvalidEvent(_) => StatusCode::BAD_REQUEST,
            MonitorError::AppendFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
    }
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Log the failure and turn it into a plain-text response with the matching
/// status. Internal errors get a generic body.
pub fn error_response(action: &str, e: anyhow::Error) -> Response {
    let status = status_for(&e);
    error!("Failed to {}: {:#}", action, e);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        (status, format!("Error trying to {}", action)).into_response()
    } else {
        (status, e.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_status_mapping() {
        let not_found: anyhow::Error = NotFoundError::Baby("baby-1".to_string()).into();
        assert_eq!(status_for(&not_found), StatusCode::NOT_FOUND);

        let invalid: anyhow::Error = SleepCheckValidationError::EmptyPosition.into();
        assert_eq!(status_for(&invalid), StatusCode::BAD_REQUEST);

        let busy: anyhow::Error = MonitorError::ActionInFlight.into();
        assert_eq!(status_for(&busy), StatusCode::CONFLICT);

        let delivery: anyhow::Error = ReportError::DeliveryFailed(anyhow::anyhow!("smtp down")).into();
        assert_eq!(status_for(&delivery), StatusCode::BAD_GATEWAY);

        let other = anyhow::anyhow!("disk full");
        assert_eq!(status_for(&other), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_survives_context() {
        let result: Result<(), CareLogValidationError> = Err(CareLogValidationError::EmptyFood);
        let e = result.context("Failed to create feeding").unwrap_err();
        assert_eq!(status_for(&e), StatusCode::BAD_REQUEST);
    }
}
