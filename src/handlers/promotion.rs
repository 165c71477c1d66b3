use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use crate::config::ScratchConfig;
use crate::error::AppError;
use crate::middlewares::get_current_user_id;
use crate::models::*;
use crate::services::OrderService;

#[utoipa::path(
    get,
    path = "/promotion/catalog",
    tag = "promotion",
    responses(
        (status = 200, description = "活动奖品、分店包厢与可选时长", body = CatalogResponse)
    )
)]
pub async fn get_catalog(
    order_service: web::Data<OrderService>,
    scratch: web::Data<ScratchConfig>,
) -> Result<HttpResponse> {
    let catalog = CatalogResponse::new(order_service.catalog(), &scratch);
    Ok(HttpResponse::Ok().json(ApiResponse::success(catalog)))
}

#[utoipa::path(
    post,
    path = "/promotion/register",
    tag = "promotion",
    request_body = RegisterOrderRequest,
    params(
        ("X-User-Id" = String, Header, description = "宿主平台的用户标识")
    ),
    responses(
        (status = 200, description = "登记成功，奖品已确定", body = RegisterOrderResponse),
        (status = 400, description = "请求参数错误", body = ApiError),
        (status = 409, description = "同一手机号当日已登记", body = ApiError),
        (status = 503, description = "存储暂不可用，可重试", body = ApiError)
    )
)]
pub async fn register(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<RegisterOrderRequest>,
) -> Result<HttpResponse> {
    let Some(user_id) = get_current_user_id(&req) else {
        return Ok(AppError::InvalidInput("Missing X-User-Id header".to_string()).error_response());
    };

    match order_service.register(&user_id, request.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RegisterOrderResponse::from(order),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn promotion_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/promotion")
            .route("/catalog", web::get().to(get_catalog))
            .route("/register", web::post().to(register)),
    );
}
