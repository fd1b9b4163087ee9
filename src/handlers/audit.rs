//! Audit trail endpoints

use crate::{
    auth::{middleware::AuthContext, permission},
    error::AppError,
    middleware::AppState,
    models::audit::{AuditTrail, AuditTrailFilters},
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct AuditListQuery {
    pub actor_id: Option<Uuid>,
    pub target_entity: Option<String>,
    pub target_entity_id: Option<Uuid>,
    pub action_type: Option<String>,
    pub action_status: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Serialize)]
pub struct AuditListResponse {
    pub entries: Vec<AuditTrail>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Offset for a page, rejecting requests whose page number does not fit
fn page_offset(page: i64, page_size: i64) -> Result<i64, AppError> {
    page.checked_mul(page_size)
        .ok_or_else(|| AppError::BadRequest("page is out of range".to_string()))
}

/// GET /api/v1/audit-trail
pub async fn list(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(query): Query<AuditListQuery>,
) -> Result<Json<AuditListResponse>, AppError> {
    permission::require_all(&ctx, &["AUDIT_READ"])?;

    let page = query.page.unwrap_or(0).max(0);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = page_offset(page, page_size)?;

    let filters = AuditTrailFilters {
        actor_id: query.actor_id,
        target_entity: query.target_entity,
        target_entity_id: query.target_entity_id,
        action_type: query.action_type,
        action_status: query.action_status,
        start_time: query.start_time,
        end_time: query.end_time,
    };

    let entries = state
        .audit_service
        .query(&filters, page_size, offset)
        .await?;
    let total = state.audit_service.count(&filters).await?;

    Ok(Json(AuditListResponse {
        entries,
        total,
        page,
        page_size,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(0, 50).unwrap(), 0);
        assert_eq!(page_offset(3, 50).unwrap(), 150);
    }

    #[test]
    fn test_huge_page_number_is_rejected() {
        // Must not overflow into a negative offset
        assert!(matches!(
            page_offset(i64::MAX, DEFAULT_PAGE_SIZE),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            page_offset(i64::MAX, MAX_PAGE_SIZE),
            Err(AppError::BadRequest(_))
        ));
    }
}
