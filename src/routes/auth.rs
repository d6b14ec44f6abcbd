/// Authentication Routes
///
/// Registration, credential update, login, token refresh, revocation and the
/// current user.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{extract_bearer_token, UserId};
use crate::error::AppError;
use crate::middleware::authorization_header;
use crate::session::SessionService;
use crate::store::UserCredential;

/// Body of `POST /api/users`, `PUT /api/users` and `POST /api/login`
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserCredential,
    pub token: String,
    pub refresh_token: String,
}

/// Refresh response
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Current user response
#[derive(Serialize)]
pub struct MeResponse {
    pub id: UserId,
}

/// POST /api/users
///
/// # Errors
/// - 400: password longer than bcrypt accepts
/// - 409: email already registered
pub async fn register(
    form: web::Json<CredentialsRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let user = sessions.register(&form.email, &form.password).await?;

    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/users
///
/// Behind `JwtMiddleware`; updates the caller's own email and password.
///
/// # Errors
/// - 400: password longer than bcrypt accepts
/// - 409: email belongs to another user
pub async fn update_user(
    user_id: web::ReqData<UserId>,
    form: web::Json<CredentialsRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let user = sessions
        .update_credentials(user_id.into_inner(), &form.email, &form.password)
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// POST /api/login
///
/// Unknown email and wrong password both answer 401 with no body.
pub async fn login(
    form: web::Json<CredentialsRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let outcome = sessions.login(&form.email, &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: outcome.user,
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`. The refresh token is not
/// rotated.
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let presented = extract_bearer_token(authorization_header(req.headers()))?;
    let token = sessions.refresh(presented).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// Answers 204 whether or not the token existed.
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let presented = extract_bearer_token(authorization_header(req.headers()))?;
    sessions.revoke(presented).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/me
///
/// Behind `JwtMiddleware`, which has already resolved the caller.
pub async fn current_user(user_id: web::ReqData<UserId>) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        id: user_id.into_inner(),
    })
}
