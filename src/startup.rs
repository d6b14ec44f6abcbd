use actix_web::dev::Server;
use actix_web::{guard, web, App, HttpServer};
use std::net::TcpListener;

use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{current_user, health_check, login, refresh, register, revoke, update_user};
use crate::session::SessionService;

pub fn run(listener: TcpListener, sessions: SessionService) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(sessions);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            .app_data(sessions.clone())
            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(register))
                    // Guarded so POST /users stays outside the JWT gate.
                    .service(
                        web::resource("/users")
                            .guard(guard::Put())
                            .wrap(JwtMiddleware::new(sessions.clone()))
                            .route(web::put().to(update_user)),
                    )
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .service(
                        web::resource("/me")
                            .wrap(JwtMiddleware::new(sessions.clone()))
                            .route(web::get().to(current_user)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
