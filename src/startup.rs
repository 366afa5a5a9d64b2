use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::Authority;
use crate::middleware::{JwtMiddleware, RequestLogger};
use crate::routes::{
    health_check, login, profile, register, user_by_employee_id, users_by_department, validate,
};

pub fn run(listener: TcpListener, authority: Authority) -> Result<Server, std::io::Error> {
    let authority = web::Data::new(authority);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(authority.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    // Public routes
                    .route("/login", web::post().to(login))
                    .route("/validate", web::get().to(validate))
                    // Routes requiring a bearer token
                    .service(
                        web::resource("/register")
                            .wrap(JwtMiddleware::new(authority.clone()))
                            .route(web::post().to(register)),
                    )
                    .service(
                        web::resource("/profile")
                            .wrap(JwtMiddleware::new(authority.clone()))
                            .route(web::get().to(profile)),
                    )
                    .service(
                        web::scope("/users")
                            .wrap(JwtMiddleware::new(authority.clone()))
                            .route(
                                "/department/{department_id}",
                                web::get().to(users_by_department),
                            )
                            .route(
                                "/employee/{employee_id}",
                                web::get().to(user_by_employee_id),
                            ),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
