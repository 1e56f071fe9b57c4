use crate::config::Config;
use crate::error::ApiError;
use crate::{model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::decode;
use jsonwebtoken::{DecodingKey, Validation};

pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            role,
            employee_id: data.claims.employee_id,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("admin role required"))
        }
    }

    /// Payroll mutations are limited to clerks and admins.
    pub fn require_clerk(&self) -> Result<(), ApiError> {
        if matches!(self.role, Role::Admin | Role::Clerk) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("clerk or admin role required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "clerk".to_string(),
            role,
            employee_id: None,
        }
    }

    #[test]
    fn viewers_cannot_mutate() {
        let err = user(Role::Viewer).require_clerk().unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(user(Role::Clerk).require_clerk().is_ok());
        assert!(user(Role::Admin).require_clerk().is_ok());
    }

    #[test]
    fn only_admins_pass_the_admin_gate() {
        assert!(user(Role::Admin).require_admin().is_ok());
        assert!(user(Role::Clerk).require_admin().is_err());
        assert!(user(Role::Viewer).require_admin().is_err());
    }
}
