use crate::{
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    models::{LoginReqDto, UserSql},
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    debug!("Fetching user from database");

    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, username, password, role_id, employee_id
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(&user.username)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified, generating access token");

    let access_token = generate_access_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    // Non-fatal bookkeeping: the user cache warmup reads last_login_at
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse { access_token })
}
