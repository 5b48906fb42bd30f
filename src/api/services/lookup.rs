use actix_web::http::header::ACCEPT_LANGUAGE;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, trace, warn};

use super::params::{bind_params, read_body};
use super::types::{IpOnlyBody, IpOnlyQuery, IpQuery, error_response, success_response};
use crate::errors::IpGeoError;
use crate::services::IpLookupService;
use crate::utils::ClientIpPolicy;

pub struct LookupService;

impl LookupService {
    /// `/`：查询 `ip` 参数，缺省时查询调用方自己的 IP
    pub async fn lookup_client(
        req: HttpRequest,
        body: Result<web::Bytes, actix_web::Error>,
        service: web::Data<IpLookupService>,
        ip_policy: web::Data<ClientIpPolicy>,
    ) -> impl Responder {
        let params: IpQuery = match read_body(body).and_then(|body| bind_params(&req, &body)) {
            Ok(params) => params,
            Err(e) => {
                debug!("Rejecting request parameters: {}", e);
                return error_response(&e);
            }
        };

        let candidate = match params.ip {
            Some(ip) if !ip.is_empty() => ip,
            _ => ip_policy.client_ip(&req),
        };

        Self::handle_ip(&req, &candidate, &service).await
    }

    /// `/{ip}`：查询路径中的 IP
    pub async fn lookup_path(
        req: HttpRequest,
        path: web::Path<String>,
        service: web::Data<IpLookupService>,
    ) -> impl Responder {
        let candidate = path.into_inner();
        Self::handle_ip(&req, &candidate, &service).await
    }

    /// `/ip`：只返回调用方 IP，`json=true` 时返回 JSON
    pub async fn client_ip_only(
        req: HttpRequest,
        body: Result<web::Bytes, actix_web::Error>,
        ip_policy: web::Data<ClientIpPolicy>,
    ) -> impl Responder {
        let params: IpOnlyQuery = match read_body(body).and_then(|body| bind_params(&req, &body))
        {
            Ok(params) => params,
            Err(e) => {
                debug!("Rejecting request parameters: {}", e);
                return error_response(&e);
            }
        };

        let ip = ip_policy.client_ip(&req);
        trace!("Client IP only: {}", ip);

        if params.json.unwrap_or(false) {
            success_response(&IpOnlyBody::new(ip))
        } else {
            HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .body(ip)
        }
    }

    async fn handle_ip(req: &HttpRequest, candidate: &str, service: &IpLookupService) -> HttpResponse {
        let accept_language = req
            .headers()
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());

        match service.resolve(candidate, accept_language).await {
            Ok(info) => {
                trace!("Resolved {} -> {:?}", candidate, info);
                success_response(&info)
            }
            Err(e) => {
                match &e {
                    IpGeoError::InvalidIp(_) | IpGeoError::NotFound(_) => {
                        debug!("Lookup for '{}' rejected: {}", candidate, e)
                    }
                    _ => warn!("Lookup for '{}' failed: {}", candidate, e),
                }
                error_response(&e)
            }
        }
    }
}

/// 注册查询相关路由
///
/// `/ip` 必须在 `/{ip}` 之前注册。
pub fn lookup_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ip", web::get().to(LookupService::client_ip_only))
        .route("/ip", web::post().to(LookupService::client_ip_only))
        .route("/", web::get().to(LookupService::lookup_client))
        .route("/", web::post().to(LookupService::lookup_client))
        .route("/{ip}", web::get().to(LookupService::lookup_path))
        .route("/{ip}", web::post().to(LookupService::lookup_path));
}
