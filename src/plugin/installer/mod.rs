//! 插件安装器模块
//!
//! 从插件注册表（或直接地址、本地文件）安装插件：
//! - 按平台选择版本
//! - 下载并校验 SHA256，响应被截断时重试
//! - 安全解压到 `<plugins_dir>/<plugin_id>`
//! - 递归安装清单中声明的依赖
//! - 安装进度回调

mod downloader;
mod extractor;
mod installer;
mod manifest;
mod registry;
mod types;
mod version;

pub use downloader::{PluginDownloader, MAX_DOWNLOAD_ATTEMPTS};
pub use extractor::extract_plugin;
pub use installer::PluginInstaller;
pub use manifest::{parse_manifest, read_installed_manifest, DEFAULT_MANIFEST_VERSION};
pub use registry::{
    RegistryClient, HEADER_CLIENT_ARCH, HEADER_CLIENT_OS, HEADER_CLIENT_VERSION,
};
pub use types::{
    ArchMeta, DependencySpec, FnProgressCallback, InstallError, InstallProgress, InstallRequest,
    InstallSource, InstallStage, InstalledManifest, InstalledPlugin, NoopProgressCallback,
    PluginMetadata, ProgressCallback, VersionInfo,
};
pub use version::{
    checksum_for, latest_supported_version, normalize_version, select_version, supports_platform,
    Platform, ANY_ARCH,
};
