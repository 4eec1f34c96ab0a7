//! 安装器配置
//!
//! 配置可以直接构造，也可以从宿主应用的 YAML 配置中读取

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 默认注册表地址
pub const DEFAULT_REGISTRY_URL: &str = "https://plugins.example.com/api/plugins";

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败: {0}")]
    Io(#[from] std::io::Error),

    /// YAML 解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// 插件安装器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// 注册表基础地址
    pub registry_url: String,
    /// 插件安装目录
    pub plugins_dir: PathBuf,
    /// 客户端名称，用于 User-Agent
    pub client_name: String,
    /// 客户端版本，随请求头发送给注册表
    pub client_version: String,
    /// 跳过 TLS 证书校验
    pub skip_tls_verify: bool,
    /// 元数据请求超时（秒）
    pub request_timeout_secs: u64,
    /// 校验和不匹配时提示用户联系的地址
    pub security_contact: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        let client_name = env!("CARGO_PKG_NAME").to_string();
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            plugins_dir: default_plugins_dir(&client_name),
            client_name,
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            skip_tls_verify: false,
            request_timeout_secs: 10,
            security_contact: "security@example.com".to_string(),
        }
    }
}

impl InstallerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 YAML 字符串解析，缺失字段使用默认值
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// 从 YAML 文件加载
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = url.into();
        self
    }

    pub fn with_plugins_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugins_dir = dir.into();
        self
    }

    pub fn with_client(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.client_name = name.into();
        self.client_version = version.into();
        self
    }

    pub fn with_skip_tls_verify(mut self, skip: bool) -> Self {
        self.skip_tls_verify = skip;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_security_contact(mut self, contact: impl Into<String>) -> Self {
        self.security_contact = contact.into();
        self
    }

    /// 元数据请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// User-Agent 头
    pub fn user_agent(&self) -> String {
        format!("{} {}", self.client_name, self.client_version)
    }
}

/// 默认插件目录: <config_dir>/<client_name>/plugins
fn default_plugins_dir(client_name: &str) -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(client_name)
        .join("plugins")
}
