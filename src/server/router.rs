//! HTTP and WebSocket routing configuration.

use actix_web::{HttpResponse, error, web};
use crate::server::game_server::GetStats;
use crate::server::socket::ws_connect;
use crate::server::state::AppState;

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Queue, room and connection counts as JSON.
async fn stats(data: web::Data<AppState>) -> actix_web::Result<HttpResponse> {
    let stats = data
        .game_server
        .send(GetStats)
        .await
        .map_err(error::ErrorServiceUnavailable)?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").to(ws_connect))
        .service(web::resource("/health").to(health))
        .service(web::resource("/stats").to(stats));
}
