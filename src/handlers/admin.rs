use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::AdminService;

#[utoipa::path(
    get,
    path = "/admin/orders/grand",
    tag = "admin",
    security(
        ("admin_passphrase" = [])
    ),
    responses(
        (status = 200, description = "大奖资格名单（新到旧）", body = [Order]),
        (status = 403, description = "口令错误", body = ApiError),
        (status = 503, description = "存储暂不可用", body = ApiError)
    )
)]
pub async fn list_grand(admin_service: web::Data<AdminService>) -> Result<HttpResponse> {
    match admin_service.list_grand().await {
        Ok(orders) => Ok(HttpResponse::Ok().json(ApiResponse::success(orders))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/orders/instant-wins",
    tag = "admin",
    security(
        ("admin_passphrase" = [])
    ),
    responses(
        (status = 200, description = "即时中奖名单（新到旧）", body = [Order]),
        (status = 403, description = "口令错误", body = ApiError),
        (status = 503, description = "存储暂不可用", body = ApiError)
    )
)]
pub async fn list_instant_wins(admin_service: web::Data<AdminService>) -> Result<HttpResponse> {
    match admin_service.list_instant_wins().await {
        Ok(orders) => Ok(HttpResponse::Ok().json(ApiResponse::success(orders))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/orders/{id}/redeemed",
    tag = "admin",
    request_body = UpdateRedeemedRequest,
    params(
        ("id" = String, Path, description = "订单ID")
    ),
    security(
        ("admin_passphrase" = [])
    ),
    responses(
        (status = 200, description = "更新兑换状态成功", body = Order),
        (status = 404, description = "订单不存在", body = ApiError)
    )
)]
pub async fn set_redeemed(
    admin_service: web::Data<AdminService>,
    path: web::Path<String>,
    request: web::Json<UpdateRedeemedRequest>,
) -> Result<HttpResponse> {
    match admin_service.set_redeemed(&path, request.redeemed).await {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/orders/{id}/note",
    tag = "admin",
    request_body = UpdateNoteRequest,
    params(
        ("id" = String, Path, description = "订单ID")
    ),
    security(
        ("admin_passphrase" = [])
    ),
    responses(
        (status = 200, description = "更新备注成功", body = Order),
        (status = 400, description = "备注过长", body = ApiError),
        (status = 404, description = "订单不存在", body = ApiError)
    )
)]
pub async fn set_note(
    admin_service: web::Data<AdminService>,
    path: web::Path<String>,
    request: web::Json<UpdateNoteRequest>,
) -> Result<HttpResponse> {
    match admin_service.set_note(&path, &request.note).await {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/prize-counts",
    tag = "admin",
    security(
        ("admin_passphrase" = [])
    ),
    responses(
        (status = 200, description = "限量奖品发放统计", body = [PrizeCountResponse])
    )
)]
pub async fn prize_counts(admin_service: web::Data<AdminService>) -> Result<HttpResponse> {
    match admin_service.prize_counts().await {
        Ok(counts) => Ok(HttpResponse::Ok().json(ApiResponse::success(counts))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/orders",
    tag = "admin",
    request_body = ClearAllRequest,
    security(
        ("admin_passphrase" = [])
    ),
    responses(
        (status = 200, description = "已清空所有订单与奖品计数", body = ClearAllResponse),
        (status = 400, description = "确认短语不符", body = ApiError)
    )
)]
pub async fn clear_all(
    admin_service: web::Data<AdminService>,
    request: web::Json<ClearAllRequest>,
) -> Result<HttpResponse> {
    match admin_service.clear_all(&request.confirmation).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ClearAllResponse { deleted_orders: deleted },
            "message": "所有订单已清空"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/orders/grand", web::get().to(list_grand))
            .route("/orders/instant-wins", web::get().to(list_instant_wins))
            .route("/orders/{id}/redeemed", web::put().to(set_redeemed))
            .route("/orders/{id}/note", web::put().to(set_note))
            .route("/orders", web::delete().to(clear_all))
            .route("/prize-counts", web::get().to(prize_counts)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::{ADMIN_PASSPHRASE_HEADER, AuthMiddleware};
    use crate::services::OrderService;
    use crate::store::testing::new_order;
    use crate::store::{MemoryStore, PromotionStore};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;

    const PASS: &str = "staff only";

    macro_rules! app {
        ($store:expr) => {{
            let store: Arc<dyn PromotionStore> = $store;
            let catalog = Arc::new(CampaignCatalog::standard());
            let timeout = Duration::from_secs(1);
            let orders = OrderService::new(store.clone(), catalog.clone(), timeout);
            let admin = AdminService::new(store, catalog, orders, timeout);
            test::init_service(
                App::new()
                    .wrap(AuthMiddleware::new(PASS))
                    .app_data(web::Data::new(admin))
                    .service(web::scope("/api/v1").configure(admin_config)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn note_and_redeem_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let order = store
            .insert_order(NewOrder {
                is_grand_eligible: true,
                grand_draw_serial: Some("111111".into()),
                ..new_order("0912345678", "2025-02-01")
            })
            .await
            .unwrap();
        let app = app!(store.clone());

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/admin/orders/{}/note", order.id))
            .insert_header((ADMIN_PASSPHRASE_HEADER, PASS))
            .set_json(json!({ "note": "VIP" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/admin/orders/{}/redeemed", order.id))
            .insert_header((ADMIN_PASSPHRASE_HEADER, PASS))
            .set_json(json!({ "redeemed": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/orders/grand")
            .insert_header((ADMIN_PASSPHRASE_HEADER, PASS))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["data"][0]["note"], "VIP");
        assert_eq!(resp["data"][0]["redeemed"], true);
        assert_eq!(resp["data"][0]["grandDrawSerial"], "111111");
    }

    #[actix_web::test]
    async fn unknown_order_is_not_found() {
        let app = app!(Arc::new(MemoryStore::new()));

        let req = test::TestRequest::put()
            .uri("/api/v1/admin/orders/missing/redeemed")
            .insert_header((ADMIN_PASSPHRASE_HEADER, PASS))
            .set_json(json!({ "redeemed": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn clear_all_needs_confirmation_phrase() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_order(new_order("0912345678", "2025-02-01"))
            .await
            .unwrap();
        let app = app!(store.clone());

        let req = test::TestRequest::delete()
            .uri("/api/v1/admin/orders")
            .insert_header((ADMIN_PASSPHRASE_HEADER, PASS))
            .set_json(json!({ "confirmation": "clear" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::delete()
            .uri("/api/v1/admin/orders")
            .insert_header((ADMIN_PASSPHRASE_HEADER, PASS))
            .set_json(json!({ "confirmation": "CLEAR ALL ORDERS" }))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["data"]["deletedOrders"], 1);
        assert!(store.list_orders().await.unwrap().is_empty());
    }
}
