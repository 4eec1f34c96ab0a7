//! 插件安装器类型定义
//!
//! 定义安装相关的错误类型、进度类型和注册表数据结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// 安装错误类型
///
/// 包装类变体（`DownloadFailed`、`ExtractFailed`、`DependencyFailed`）携带上下文，
/// 通过 [`InstallError::root_cause`] 可以拿到最内层的具体错误
#[derive(Error, Debug)]
pub enum InstallError {
    /// 注册表中不存在该插件
    #[error("找不到插件，请检查插件 ID ({plugin_id}) 是否正确")]
    PluginNotFound { plugin_id: String },

    /// 资源不存在 (HTTP 404)
    #[error("资源不存在 (404): {0}")]
    NotFound(String),

    /// 注册表拒绝请求 (4xx)
    #[error("{status}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    BadRequest {
        status: String,
        message: Option<String>,
    },

    /// 注册表返回了预期之外的状态码
    #[error("API 返回了无效状态: {0}")]
    UnexpectedStatus(String),

    /// 响应体被截断或格式错误（可重试）
    #[error("响应体异常: {0}")]
    MalformedResponse(String),

    /// 重试耗尽后响应体仍然异常
    #[error("来源返回的 HTTP 响应已损坏 (尝试 {attempts} 次)，请稍后重试")]
    CorruptResponse { attempts: u32 },

    /// 校验和不匹配
    #[error("SHA256 校验和与下载的插件包不匹配: 期望 {expected}, 实际 {actual}，请联系 {contact}")]
    ChecksumMismatch {
        expected: String,
        actual: String,
        contact: String,
    },

    /// 当前平台没有任何可用版本
    #[error("插件不支持当前的操作系统和架构: {platform}")]
    UnsupportedPlatform { platform: String },

    /// 找不到请求的版本
    #[error("找不到请求的版本: {version}")]
    VersionNotFound { version: String },

    /// 请求的版本不支持当前平台
    #[error("版本 {version} 不支持当前的操作系统和架构 ({platform})，最新可用版本为 {latest}")]
    VersionUnsupported {
        version: String,
        platform: String,
        latest: String,
    },

    /// 没有写入权限
    #[error("无法创建 {}，权限不足，请确认插件目录可写", .path.display())]
    PermissionDenied { path: PathBuf },

    /// 目标文件正在被使用
    #[error("文件 {} 正在使用中，请先停止正在运行的应用，安装插件后再重启", .path.display())]
    FileBusy { path: PathBuf },

    /// 压缩包条目试图写到插件目录之外
    #[error("压缩包条目 {entry:?} 试图写到插件目录之外: {}，存在安全风险", .destination.display())]
    PathEscape { entry: String, destination: PathBuf },

    /// 插件 ID 不能作为目录名使用
    #[error("无效的插件 ID: {plugin_id:?}")]
    InvalidPluginId { plugin_id: String },

    /// 依赖图中出现环
    #[error("检测到循环依赖: {}", .chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },

    /// 下载失败
    #[error("下载插件包失败: {url}")]
    DownloadFailed {
        url: String,
        #[source]
        source: Box<InstallError>,
    },

    /// 解压失败
    #[error("解压插件包失败")]
    ExtractFailed {
        #[source]
        source: Box<InstallError>,
    },

    /// 依赖插件安装失败
    #[error("安装依赖插件 '{plugin_id}' 失败")]
    DependencyFailed {
        plugin_id: String,
        #[source]
        source: Box<InstallError>,
    },

    /// 注册表元数据解析失败
    #[error("插件元数据解析失败: {0}")]
    MetadataParse(#[source] serde_json::Error),

    /// 清单无效
    #[error("清单无效: {0}")]
    InvalidManifest(String),

    /// URL 解析错误
    #[error("URL 解析错误: {0}")]
    InvalidUrl(String),

    /// HTTP 客户端构建失败
    #[error("HTTP 客户端构建失败: {0}")]
    ClientBuild(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// ZIP 读取错误
    #[error("无法读取 ZIP 文件: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),
}

impl InstallError {
    /// 剥离上下文包装，返回最内层的错误
    pub fn root_cause(&self) -> &InstallError {
        match self {
            InstallError::DownloadFailed { source, .. }
            | InstallError::ExtractFailed { source }
            | InstallError::DependencyFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// 是否为可重试的响应体错误
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, InstallError::MalformedResponse(_))
    }
}

impl From<reqwest::Error> for InstallError {
    fn from(e: reqwest::Error) -> Self {
        InstallError::NetworkError(e.to_string())
    }
}

/// 注册表中的插件元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub id: String,
    /// 按从新到旧排列，不重新排序
    #[serde(default)]
    pub versions: Vec<VersionInfo>,
}

/// 单个版本的信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    /// key 为 "os-arch" 或 "any"；缺失或为空表示所有平台都支持
    #[serde(rename = "arch", default, skip_serializing_if = "Option::is_none")]
    pub arch_support: Option<HashMap<String, ArchMeta>>,
}

/// 某个平台的制品信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchMeta {
    /// 源码包没有发布校验和时为空
    #[serde(rename = "sha256", default)]
    pub sha256_checksum: String,
}

/// 依赖插件声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub id: String,
    #[serde(default)]
    pub version: String,
}

/// 从已安装插件的 plugin.json 读取的清单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledManifest {
    pub id: String,
    pub version: String,
    pub dependencies: Vec<DependencySpec>,
}

/// 单次安装请求
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    /// 插件 ID，同时也是安装目录名
    pub plugin_id: String,
    /// 指定版本，为空时安装当前平台的最新版本
    pub version: Option<String>,
    /// 直接指定的插件包地址（URL 或本地路径），跳过注册表
    pub archive_url: Option<String>,
    /// 调用方是否信任该来源（仅信任来源允许解压符号链接）
    pub trusted: bool,
}

impl InstallRequest {
    /// 通过注册表安装最新版本
    pub fn new(plugin_id: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            ..Default::default()
        }
    }

    /// 设置版本
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// 设置直接下载地址
    pub fn with_archive_url(mut self, url: impl Into<String>) -> Self {
        self.archive_url = Some(url.into());
        self
    }

    /// 标记为信任来源
    pub fn trusted(mut self, trusted: bool) -> Self {
        self.trusted = trusted;
        self
    }
}

/// 安装阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallStage {
    /// 查询注册表
    Resolving,
    /// 下载中
    Downloading,
    /// 解压中
    Extracting,
    /// 安装依赖
    Dependencies,
    /// 完成
    Complete,
    /// 失败
    Failed,
}

impl std::fmt::Display for InstallStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallStage::Resolving => write!(f, "resolving"),
            InstallStage::Downloading => write!(f, "downloading"),
            InstallStage::Extracting => write!(f, "extracting"),
            InstallStage::Dependencies => write!(f, "dependencies"),
            InstallStage::Complete => write!(f, "complete"),
            InstallStage::Failed => write!(f, "failed"),
        }
    }
}

/// 安装进度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallProgress {
    /// 当前插件
    pub plugin_id: String,
    /// 当前阶段
    pub stage: InstallStage,
    /// 进度百分比 (0-100)
    pub percent: u8,
    /// 状态消息
    pub message: String,
}

impl InstallProgress {
    /// 创建新的进度实例
    pub fn new(
        plugin_id: impl Into<String>,
        stage: InstallStage,
        percent: u8,
        message: impl Into<String>,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            stage,
            percent: percent.min(100),
            message: message.into(),
        }
    }
}

/// 进度回调 trait
pub trait ProgressCallback: Send + Sync {
    /// 进度更新回调
    fn on_progress(&self, progress: InstallProgress);
}

/// 空进度回调实现
pub struct NoopProgressCallback;

impl ProgressCallback for NoopProgressCallback {
    fn on_progress(&self, _progress: InstallProgress) {}
}

/// 将闭包包装为 ProgressCallback
pub struct FnProgressCallback<F>
where
    F: Fn(InstallProgress) + Send + Sync,
{
    callback: F,
}

impl<F> FnProgressCallback<F>
where
    F: Fn(InstallProgress) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressCallback for FnProgressCallback<F>
where
    F: Fn(InstallProgress) + Send + Sync,
{
    fn on_progress(&self, progress: InstallProgress) {
        (self.callback)(progress);
    }
}

/// 安装来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InstallSource {
    /// 通过注册表解析
    Registry {
        /// 实际下载地址
        url: String,
    },
    /// 直接指定的 URL
    Url { url: String },
    /// 本地插件包
    Local { path: String },
}

/// 安装结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledPlugin {
    pub id: String,
    /// 清单中的版本，清单缺失时为解析出的版本
    pub version: String,
    pub install_path: PathBuf,
    pub source: InstallSource,
    pub installed_at: DateTime<Utc>,
    /// 本次一并安装的依赖插件
    pub dependencies: Vec<InstalledPlugin>,
}
