//! 插件注册表客户端
//!
//! 负责向注册表发送请求并对响应分类：
//! - 404 → 找不到
//! - 其他 4xx → BadRequest（优先使用 JSON 中的 message 字段）
//! - 2xx → 返回响应
//! - 其他状态 → UnexpectedStatus

use reqwest::{Client, Response, StatusCode};
use tracing::{info, warn};
use url::Url;

use super::types::{InstallError, PluginMetadata};
use super::version::Platform;
use crate::config::InstallerConfig;
use crate::http::ClientFactory;

pub const HEADER_CLIENT_VERSION: &str = "X-Client-Version";
pub const HEADER_CLIENT_OS: &str = "X-Client-Os";
pub const HEADER_CLIENT_ARCH: &str = "X-Client-Arch";

/// 注册表客户端
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: String,
    client_version: String,
    user_agent: String,
    platform: Platform,
    /// 元数据请求使用，带超时
    client: Client,
    /// 下载使用，不带总超时
    download_client: Client,
}

impl RegistryClient {
    /// 根据配置创建注册表客户端
    pub fn new(config: &InstallerConfig) -> Result<Self, InstallError> {
        let factory = ClientFactory::new(config.skip_tls_verify, config.request_timeout());
        let client = factory
            .timeout_client()
            .map_err(|e| InstallError::ClientBuild(e.to_string()))?;
        let download_client = factory
            .download_client()
            .map_err(|e| InstallError::ClientBuild(e.to_string()))?;

        Ok(Self {
            base_url: config.registry_url.clone(),
            client_version: config.client_version.clone(),
            user_agent: config.user_agent(),
            platform: Platform::current(),
            client,
            download_client,
        })
    }

    /// 覆盖请求头中上报的平台
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// 获取插件元数据: GET <base>/repo/<plugin_id>
    pub async fn fetch_metadata(&self, plugin_id: &str) -> Result<PluginMetadata, InstallError> {
        info!("从注册表获取 {} 的元数据", plugin_id);

        let url = join_url(&self.base_url, &["repo", plugin_id])?;
        let response = match self.send(&self.client, url).await {
            Err(InstallError::NotFound(_)) => {
                return Err(InstallError::PluginNotFound {
                    plugin_id: plugin_id.to_string(),
                })
            }
            other => other?,
        };

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!("注册表响应解析失败: {}", e);
            InstallError::MetadataParse(e)
        })
    }

    /// 插件包的标准下载地址: <base>/<plugin_id>/versions/<version>/download
    pub fn download_url(&self, plugin_id: &str, version: &str) -> Result<String, InstallError> {
        join_url(&self.base_url, &[plugin_id, "versions", version, "download"])
            .map(|u| u.to_string())
    }

    /// 发起下载请求，返回待读取的响应
    pub async fn open_download(&self, url: &str) -> Result<Response, InstallError> {
        let url = Url::parse(url).map_err(|e| InstallError::InvalidUrl(format!("{}: {}", url, e)))?;
        self.send(&self.download_client, url).await
    }

    async fn send(&self, client: &Client, url: Url) -> Result<Response, InstallError> {
        let response = client
            .get(url)
            .header(HEADER_CLIENT_VERSION, &self.client_version)
            .header(HEADER_CLIENT_OS, &self.platform.os)
            .header(HEADER_CLIENT_ARCH, &self.platform.arch)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        classify_response(response).await
    }
}

/// 按状态码对响应分类
async fn classify_response(response: Response) -> Result<Response, InstallError> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(InstallError::NotFound(response.url().to_string()));
    }

    if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(InstallError::BadRequest {
            status: status.to_string(),
            message: error_message(&body),
        });
    }

    if !status.is_success() {
        return Err(InstallError::UnexpectedStatus(status.to_string()));
    }

    Ok(response)
}

/// 从错误响应体中提取消息：JSON 的 message 字段，否则原始文本
fn error_message(body: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .filter(|m| !m.is_empty());

    Some(from_json.unwrap_or_else(|| body.to_string()))
}

/// 在基础地址后追加路径段（自动编码）
fn join_url(base: &str, segments: &[&str]) -> Result<Url, InstallError> {
    let mut url = Url::parse(base).map_err(|e| InstallError::InvalidUrl(format!("{}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| InstallError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
