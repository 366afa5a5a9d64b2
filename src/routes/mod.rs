mod auth;
mod health_check;
mod users;

pub use auth::{login, profile, register, validate};
pub use health_check::health_check;
pub use users::{user_by_employee_id, users_by_department};
