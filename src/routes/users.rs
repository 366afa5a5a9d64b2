/// Account lookup routes (authenticated)

use actix_web::{web, HttpResponse};

use crate::auth::{Authority, Principal};
use crate::error::AppError;
use crate::validators::is_valid_employee_id;

/// GET /auth/users/department/{department_id}
///
/// HR and HOD only.
pub async fn users_by_department(
    path: web::Path<i32>,
    principal: web::ReqData<Principal>,
    authority: web::Data<Authority>,
) -> Result<HttpResponse, AppError> {
    let department_id = path.into_inner();

    let accounts = authority
        .accounts_in_department(&principal, department_id)
        .await?;

    Ok(HttpResponse::Ok().json(accounts))
}

/// GET /auth/users/employee/{employee_id}
pub async fn user_by_employee_id(
    path: web::Path<String>,
    authority: web::Data<Authority>,
) -> Result<HttpResponse, AppError> {
    let employee_id = is_valid_employee_id(&path.into_inner())?;

    let account = authority.account_by_employee_id(&employee_id).await?;

    Ok(HttpResponse::Ok().json(account))
}
