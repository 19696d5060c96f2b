use axum::http::Request;
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder,
    key_extractor::KeyExtractor,
    GovernorError, GovernorLayer,
};
use uuid::Uuid;

use crate::middleware::rate_limit::rate_limit_error_handler;
use crate::utils::jwt::Claims;

/// Custom key extractor that extracts user ID from JWT claims in request extensions
#[derive(Debug, Clone, Copy)]
pub struct UserIdExtractor;

impl KeyExtractor for UserIdExtractor {
    type Key = Uuid;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        // Get claims from request extensions (set by auth_middleware)
        let claims = req
            .extensions()
            .get::<Claims>()
            .ok_or(GovernorError::UnableToExtractKey)?;

        Ok(claims.sub)
    }
}

pub type RoleGovernorLayer = GovernorLayer<
    UserIdExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    axum::body::Body,
>;

/// Per-user limits for the role-gated route groups.
/// - Shop owner: 500 requests per minute (dashboards poll bookings and stats)
/// - Car owner: 100 requests per minute
pub enum RateLimitedRole {
    CarOwner,
    ShopOwner,
}

pub fn create_role_governor(role: RateLimitedRole) -> RoleGovernorLayer {
    let (per_ms, burst) = match role {
        RateLimitedRole::ShopOwner => (120, 500),
        RateLimitedRole::CarOwner => (600, 100),
    };

    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(burst)
            .key_extractor(UserIdExtractor)
            .finish()
            .expect("governor period and burst size are non-zero"),
    );

    GovernorLayer::new(config).error_handler(rate_limit_error_handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;

    #[test]
    fn test_extracts_user_id_from_claims() {
        let user_id = Uuid::new_v4();
        let mut request = Request::new(());
        request.extensions_mut().insert(Claims {
            sub: user_id,
            email: "a@b.c".to_string(),
            role: UserRole::CarOwner,
            exp: 0,
            iat: 0,
        });

        assert_eq!(UserIdExtractor.extract(&request).unwrap(), user_id);
    }

    #[test]
    fn test_missing_claims_cannot_be_keyed() {
        let request = Request::new(());
        assert!(matches!(
            UserIdExtractor.extract(&request),
            Err(GovernorError::UnableToExtractKey)
        ));
    }
}
