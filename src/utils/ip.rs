//! 客户端 IP 提取
//!
//! 支持：
//! - X-Forwarded-For（取第一个地址）/ X-Real-IP
//! - 可信代理配置（trusted_proxies，单 IP 或 CIDR）
//! - 回退到连接对端地址
//!
//! 转发头中的值必须是合法的 IP 字面量，否则忽略并继续回退。

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use tracing::debug;

use crate::config::NetworkConfig;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &IpAddr, trusted_proxies: &[String]) -> bool {
    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(ip, proxy)
        } else {
            proxy.trim().parse::<IpAddr>().is_ok_and(|addr| addr == *ip)
        }
    })
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.trim().split_once('/') else {
        return false;
    };

    let Ok(prefix_len): Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false,
    }
}

/// X-Forwarded-For 链中的第一个地址（最初的客户端）
///
/// 第一项不是合法 IP 时返回 None，不再看后面的项。
pub fn first_forwarded_for(header: &str) -> Option<IpAddr> {
    header.split(',').next().and_then(parse_header_ip)
}

fn parse_header_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}

/// 客户端 IP 提取策略
#[derive(Debug, Clone, Default)]
pub struct ClientIpPolicy {
    trust_forwarded_headers: bool,
    trusted_proxies: Vec<String>,
}

impl ClientIpPolicy {
    pub fn new(trust_forwarded_headers: bool, trusted_proxies: Vec<String>) -> Self {
        Self {
            trust_forwarded_headers,
            trusted_proxies,
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(
            config.trust_forwarded_headers,
            config.trusted_proxies.clone(),
        )
    }

    /// 是否信任来自该对端的转发头
    ///
    /// 未配置 trusted_proxies 时信任任何对端。
    pub fn trusts(&self, peer: Option<&SocketAddr>) -> bool {
        if !self.trust_forwarded_headers {
            return false;
        }
        if self.trusted_proxies.is_empty() {
            return true;
        }
        peer.is_some_and(|addr| is_trusted_proxy(&addr.ip(), &self.trusted_proxies))
    }

    /// 提取客户端 IP
    ///
    /// 策略（按优先级）：
    /// 1. 信任转发头时：X-Forwarded-For 第一个地址
    /// 2. 信任转发头时：X-Real-IP
    /// 3. 连接对端地址（去掉端口）
    /// 4. 都没有时返回空字符串
    ///
    /// 1、2 中无法解析为 IP 的值被跳过。
    pub fn client_ip(&self, req: &HttpRequest) -> String {
        let peer = req.peer_addr();

        if self.trusts(peer.as_ref()) {
            let headers = req.headers();
            let forwarded = headers
                .get(X_FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
                .and_then(first_forwarded_for)
                .or_else(|| {
                    headers
                        .get(X_REAL_IP)
                        .and_then(|v| v.to_str().ok())
                        .and_then(parse_header_ip)
                });

            if let Some(ip) = forwarded {
                debug!("Client IP from forwarded header: {:?} -> {}", peer, ip);
                return ip.to_string();
            }
        }

        peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
    }
}
