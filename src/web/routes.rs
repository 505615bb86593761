use actix_web::web;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .content_type_required(false)
            .error_handler(handlers::json_error),
    )
    .service(
        web::scope("/api")
            .route("/chat", web::post().to(handlers::chat))
            .route("/models", web::get().to(handlers::list_models))
    )
    .route("/health", web::get().to(handlers::health_check));
}
