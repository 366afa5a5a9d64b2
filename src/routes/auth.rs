/// Authentication Routes
///
/// Login, HR-only registration, token validation and the caller's profile.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::{Authority, Principal, RegisterAccount, Role, TokenValidation};
use crate::error::AppError;
use crate::middleware::bearer_token;
use crate::validators::{
    is_present_password, is_valid_email, is_valid_employee_id, is_valid_new_password,
    normalize_department_id,
};

/// Login request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub employee_id: String,
    pub password: String,
}

/// Registration request
///
/// `departmentId` is an integer; string department ids are rejected by the
/// JSON extractor. Zero is read as "no department".
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub employee_id: String,
    pub role: Role,
    pub department_id: Option<i32>,
}

impl RegisterRequest {
    fn into_account(self) -> Result<RegisterAccount, AppError> {
        let email = is_valid_email(&self.email)?;
        is_valid_new_password(&self.password)?;
        let employee_id = is_valid_employee_id(&self.employee_id)?;
        let department_id = normalize_department_id(self.department_id);

        Ok(RegisterAccount {
            employee_id,
            email,
            password: self.password,
            role: self.role,
            department_id,
        })
    }
}

/// POST /auth/login
///
/// # Errors
/// - 400: Empty employee ID or password
/// - 401: Unknown employee ID or wrong password
/// - 403: Account is deactivated
pub async fn login(
    form: web::Json<LoginRequest>,
    authority: web::Data<Authority>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let employee_id = is_valid_employee_id(&form.employee_id)?;
    is_present_password(&form.password)?;

    let tokens = authority.login(&employee_id, &form.password).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// POST /auth/register
///
/// **Requires an HR access token.**
///
/// # Errors
/// - 400: Validation errors
/// - 401: Missing or invalid token (middleware)
/// - 403: Caller is not HR, or HOD/Employee without a department
/// - 409: Employee ID or email already exists
pub async fn register(
    form: web::Json<RegisterRequest>,
    principal: web::ReqData<Principal>,
    authority: web::Data<Authority>,
) -> Result<HttpResponse, AppError> {
    let account = form.into_inner().into_account()?;

    let tokens = authority.register(account, &principal).await?;

    Ok(HttpResponse::Created().json(tokens))
}

/// GET /auth/validate
///
/// Reads the bearer token itself rather than going through the middleware,
/// so an invalid token yields `{"valid": false, "reason": ...}` instead of a
/// generic error body.
pub async fn validate(
    req: HttpRequest,
    authority: web::Data<Authority>,
) -> Result<HttpResponse, AppError> {
    let result = match bearer_token(req.headers()) {
        Some(token) => authority.validate_token(&token).await?,
        None => TokenValidation::invalid("Missing authentication token"),
    };

    if result.valid {
        Ok(HttpResponse::Ok().json(result))
    } else {
        Ok(HttpResponse::Unauthorized().json(result))
    }
}

/// GET /auth/profile
///
/// The authenticated caller as resolved from the current account state.
pub async fn profile(principal: web::ReqData<Principal>) -> HttpResponse {
    HttpResponse::Ok().json(principal.into_inner())
}
