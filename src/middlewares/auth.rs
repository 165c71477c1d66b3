use crate::error::AppError;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::sync::Arc;

pub const ADMIN_PASSPHRASE_HEADER: &str = "X-Admin-Passphrase";
pub const USER_ID_HEADER: &str = "X-User-Id";

// 需要口令的路径前缀
const ADMIN_PREFIX: &str = "/api/v1/admin";

/// 请求方身份（来自宿主平台的 X-User-Id）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

pub struct AuthMiddleware {
    passphrase: Arc<str>,
}

impl AuthMiddleware {
    pub fn new(passphrase: &str) -> Self {
        Self {
            passphrase: Arc::from(passphrase),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            passphrase: self.passphrase.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    passphrase: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let user_id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        if let Some(user_id) = user_id {
            req.extensions_mut().insert(UserId(user_id));
        }

        if !req.path().starts_with(ADMIN_PREFIX) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let provided = req
            .headers()
            .get(ADMIN_PASSPHRASE_HEADER)
            .and_then(|v| v.to_str().ok());

        match provided {
            Some(p) if passphrase_matches(p, &self.passphrase) => {
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            _ => {
                log::warn!("Rejected admin request to {}", req.path());
                Box::pin(async move { Err(AppError::Forbidden.into()) })
            }
        }
    }
}

/// 比较耗时只与长度有关，不随首个不同字节位置变化
fn passphrase_matches(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// 用于获取当前用户ID的辅助函数
pub fn get_current_user_id(req: &impl HttpMessage) -> Option<String> {
    req.extensions().get::<UserId>().map(|u| u.0.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpRequest, HttpResponse, test, web};

    async fn echo_user(req: HttpRequest) -> HttpResponse {
        HttpResponse::Ok().body(get_current_user_id(&req).unwrap_or_default())
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .wrap(AuthMiddleware::new("open sesame"))
                    .route("/api/v1/admin/ping", web::get().to(echo_user))
                    .route("/api/v1/promotion/ping", web::get().to(echo_user)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn admin_requires_passphrase() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/v1/admin/ping").to_request();
        let err = test::try_call_service(&app, req).await.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/ping")
            .insert_header((ADMIN_PASSPHRASE_HEADER, "open sesamE"))
            .to_request();
        assert!(test::try_call_service(&app, req).await.is_err());

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/ping")
            .insert_header((ADMIN_PASSPHRASE_HEADER, "open sesame"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn public_routes_carry_user_id() {
        let app = app!();

        let req = test::TestRequest::get()
            .uri("/api/v1/promotion/ping")
            .insert_header((USER_ID_HEADER, " line-u123 "))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "line-u123");
    }

    #[actix_web::test]
    async fn passphrase_compare() {
        assert!(passphrase_matches("abc", "abc"));
        assert!(!passphrase_matches("abd", "abc"));
        assert!(!passphrase_matches("ab", "abc"));
        assert!(!passphrase_matches("", "abc"));
    }
}
