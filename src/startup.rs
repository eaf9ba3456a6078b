use crate::routes::{
    add, add_client, approve, boq_daily, boq_monthly, export_shifts_csv, get_approvals,
    get_clients, get_shift, health_check, query_shifts, reject, submit, update,
};
use actix_web::dev::Server;
use actix_web::{App, HttpResponse, HttpServer, web};
use sqlx::PgPool;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

/// Configures and starts the HttpServer
pub fn run(listener: TcpListener, db_pool: PgPool) -> Result<Server, std::io::Error> {
    let db_pool = web::Data::new(db_pool);
    let server = HttpServer::new(move || {
        App::new()
            // Logging middleware
            .wrap(TracingLogger::default())
            // Routes
            .route("/health_check", web::get().to(health_check))
            .route("/shift", web::post().to(add))
            .service(
                web::resource("/shift/{shift_id}")
                    .route(web::get().to(get_shift))
                    .route(web::put().to(update)),
            )
            .route("/shift/{shift_id}/submit", web::post().to(submit))
            .route("/shift/{shift_id}/approve", web::post().to(approve))
            .route("/shift/{shift_id}/reject", web::post().to(reject))
            .route("/shift/{shift_id}/approvals", web::get().to(get_approvals))
            .route("/shifts", web::get().to(query_shifts))
            .route("/client", web::post().to(add_client))
            .route("/clients", web::get().to(get_clients))
            .route("/report/boq/daily", web::get().to(boq_daily))
            .route("/report/boq/monthly", web::get().to(boq_monthly))
            .route("/report/shifts.csv", web::get().to(export_shifts_csv))
            // DB connection pool
            .app_data(db_pool.clone())
            .default_service(web::route().to(|| async {
                HttpResponse::NotFound().body("The requested resource was not found. 404 Not Found")
            }))
    })
    .listen(listener)?
    .run();
    Ok(server)
}
