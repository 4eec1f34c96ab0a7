//! HTTP 客户端工厂
//!
//! 根据同一套传输参数创建两种客户端：
//! - 带超时的客户端，用于注册表元数据请求
//! - 不带总超时的客户端，用于下载插件包（大文件在慢速网络下不能被固定超时打断）

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// 客户端构建错误
#[derive(Debug, Error)]
#[error("客户端构建错误: {0}")]
pub struct ClientBuildError(String);

/// HTTP 客户端工厂
#[derive(Debug, Clone)]
pub struct ClientFactory {
    /// 跳过 TLS 证书校验
    skip_tls_verify: bool,
    /// 请求超时时间（仅用于元数据客户端）
    request_timeout: Duration,
    /// 连接超时时间，包含 TLS 握手
    connect_timeout: Duration,
    /// TCP keep-alive 间隔
    tcp_keepalive: Duration,
    /// 连接池空闲超时
    pool_idle_timeout: Duration,
    /// 每个 host 的最大空闲连接数
    pool_max_idle_per_host: usize,
}

impl Default for ClientFactory {
    fn default() -> Self {
        Self {
            skip_tls_verify: false,
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(30),
            tcp_keepalive: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 100,
        }
    }
}

impl ClientFactory {
    /// 创建新的客户端工厂
    pub fn new(skip_tls_verify: bool, request_timeout: Duration) -> Self {
        Self {
            skip_tls_verify,
            request_timeout,
            ..Default::default()
        }
    }

    /// 设置连接超时时间
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn skip_tls_verify(&self) -> bool {
        self.skip_tls_verify
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// 创建带超时的客户端
    pub fn timeout_client(&self) -> Result<Client, ClientBuildError> {
        self.builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| ClientBuildError(e.to_string()))
    }

    /// 创建不带总超时的下载客户端
    pub fn download_client(&self) -> Result<Client, ClientBuildError> {
        self.builder()
            .build()
            .map_err(|e| ClientBuildError(e.to_string()))
    }

    fn builder(&self) -> reqwest::ClientBuilder {
        // 代理默认从环境变量读取
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .tcp_keepalive(self.tcp_keepalive)
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .danger_accept_invalid_certs(self.skip_tls_verify)
    }
}
