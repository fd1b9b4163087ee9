//! Permission evaluation
//!
//! Authorization is pure set containment over permission names, with one
//! special case: a grant of `ALL` satisfies any requirement. Evaluation never
//! touches I/O, so guards stay cheap enough to run on every request.

use crate::{auth::middleware::AuthContext, error::AppError};
use std::collections::HashSet;

/// Grant that satisfies every requirement
pub const WILDCARD: &str = "ALL";

/// True when every required permission is granted. An empty requirement is
/// vacuously satisfied; comparison is exact and case-sensitive.
pub fn has_all_permissions(granted: &HashSet<String>, required: &[&str]) -> bool {
    if granted.contains(WILDCARD) {
        return true;
    }
    required.iter().all(|p| granted.contains(*p))
}

/// Guard a handler body: 403 unless the caller holds every listed permission.
/// The response carries no hint of which permission was missing.
pub fn require_all(ctx: &AuthContext, required: &[&str]) -> Result<(), AppError> {
    if has_all_permissions(&ctx.permissions, required) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %ctx.user_id,
            required = ?required,
            "Permission denied"
        );
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn granted(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn context_with(names: &[&str]) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            display_name: "Alice Example".to_string(),
            permissions: granted(names),
        }
    }

    #[test]
    fn test_exact_containment() {
        let g = granted(&["CONFIG_READ", "CONFIG_CREATE"]);
        assert!(has_all_permissions(&g, &["CONFIG_READ"]));
        assert!(has_all_permissions(&g, &["CONFIG_READ", "CONFIG_CREATE"]));
        assert!(!has_all_permissions(&g, &["CONFIG_READ", "CONFIG_DELETE"]));
    }

    #[test]
    fn test_wildcard_satisfies_everything() {
        let g = granted(&["ALL"]);
        assert!(has_all_permissions(&g, &["CONFIG_DELETE"]));
        assert!(has_all_permissions(&g, &["AUDIT_READ", "CONFIG_UPDATE"]));
    }

    #[test]
    fn test_empty_requirement_is_vacuous() {
        assert!(has_all_permissions(&granted(&[]), &[]));
        assert!(has_all_permissions(&granted(&["CONFIG_READ"]), &[]));
    }

    #[test]
    fn test_empty_grant_denies_nonempty_requirement() {
        assert!(!has_all_permissions(&granted(&[]), &["CONFIG_READ"]));
    }

    #[test]
    fn test_require_all_denies_partial_grant() {
        let ctx = context_with(&["CONFIG_READ"]);
        assert!(matches!(
            require_all(&ctx, &["CONFIG_READ", "CONFIG_UPDATE"]),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_require_all_passes_full_grant() {
        let ctx = context_with(&["CONFIG_READ", "CONFIG_UPDATE"]);
        assert!(require_all(&ctx, &["CONFIG_READ", "CONFIG_UPDATE"]).is_ok());

        let admin = context_with(&["ALL"]);
        assert!(require_all(&admin, &["CONFIG_DELETE"]).is_ok());
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let g = granted(&["config_read"]);
        assert!(!has_all_permissions(&g, &["CONFIG_READ"]));

        // Only the exact ALL spelling is a wildcard
        let g = granted(&["all"]);
        assert!(!has_all_permissions(&g, &["CONFIG_READ"]));
    }
}
