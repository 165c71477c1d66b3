use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use scratch_promo_backend::{
    config::{Config, StoreBackend},
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    models::CampaignCatalog,
    services::*,
    store::{DbStore, MemoryStore, PromotionStore},
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    // 活动目录在启动时校验，不合法则拒绝启动
    let catalog = CampaignCatalog::standard();
    catalog.validate().context("Invalid campaign catalog")?;
    let catalog = Arc::new(catalog);

    let store: Arc<dyn PromotionStore> = match config.store.backend {
        StoreBackend::Postgres => {
            // 创建数据库连接池
            let pool = create_pool(&config.database)
                .await
                .context("Failed to create database connection pool")?;

            // 运行数据库迁移
            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            Arc::new(DbStore::new(pool))
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory store, orders are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // 创建服务
    let timeout = config.store.timeout();
    let order_service = OrderService::new(store.clone(), catalog.clone(), timeout);
    let admin_service = AdminService::new(store, catalog, order_service.clone(), timeout);

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let bind = (config.server.host.clone(), config.server.port);
    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(&config.admin.passphrase))
            .wrap(create_cors(&config.cors))
            .wrap(Logger::default())
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .app_data(web::Data::new(config.scratch.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::promotion_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
