use actix_cors::Cors;

use crate::config::CorsConfig;

/// allowed_origins 为空时放行任意来源（本地开发）
pub fn create_cors(config: &CorsConfig) -> Cors {
    let cors = if config.allowed_origins.is_empty() {
        Cors::default().allowed_origin_fn(|_, _req_head| true)
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        // 前端自定义 Header（X-User-Id / X-Admin-Passphrase）需通过预检
        .allow_any_header()
        .max_age(3600)
}
