//! 插件安装器核心实现
//!
//! 安装流程（线性，不回退）:
//! 解析来源 → 下载 → 校验 → 解压 → 读取清单 → 递归安装依赖
//!
//! 所有步骤按顺序 await，依赖插件也是逐个安装。

use futures::future::{BoxFuture, FutureExt};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::downloader::PluginDownloader;
use super::extractor::{extract_plugin, validate_plugin_id};
use super::manifest::read_installed_manifest;
use super::registry::RegistryClient;
use super::types::{
    InstallError, InstallProgress, InstallRequest, InstallSource, InstallStage, InstalledPlugin,
    ProgressCallback,
};
use super::version::{checksum_for, normalize_version, select_version, Platform};
use crate::config::InstallerConfig;

/// 解析后的下载来源
struct ResolvedSource {
    url: String,
    version: String,
    checksum: String,
    source: InstallSource,
    /// 是否经由注册表解析
    via_registry: bool,
}

/// 插件安装器
///
/// 不持有可变状态，可以在多个任务间共享
#[derive(Debug, Clone)]
pub struct PluginInstaller {
    plugins_dir: PathBuf,
    security_contact: String,
    registry: RegistryClient,
    downloader: PluginDownloader,
}

impl PluginInstaller {
    /// 根据配置创建安装器
    pub fn new(config: &InstallerConfig) -> Result<Self, InstallError> {
        let registry = RegistryClient::new(config)?;
        Ok(Self::from_parts(
            config.plugins_dir.clone(),
            config.security_contact.clone(),
            registry,
        ))
    }

    fn from_parts(plugins_dir: PathBuf, security_contact: String, registry: RegistryClient) -> Self {
        Self {
            downloader: PluginDownloader::new(registry.clone(), security_contact.clone()),
            plugins_dir,
            security_contact,
            registry,
        }
    }

    /// 覆盖用于版本选择和请求头的平台
    pub fn with_platform(self, platform: Platform) -> Self {
        let registry = self.registry.with_platform(platform);
        Self::from_parts(self.plugins_dir, self.security_contact, registry)
    }

    /// 插件安装目录
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    /// 安装插件及其依赖
    pub async fn install(
        &self,
        request: InstallRequest,
        progress: &dyn ProgressCallback,
    ) -> Result<InstalledPlugin, InstallError> {
        let plugin_id = request.plugin_id.clone();
        let mut chain = Vec::new();
        let result = self.install_recursive(request, &mut chain, progress).await;

        if let Err(e) = &result {
            progress.on_progress(InstallProgress::new(
                &plugin_id,
                InstallStage::Failed,
                0,
                e.to_string(),
            ));
        }
        result
    }

    /// `chain` 记录当前调用链上正在安装的插件，用于检测循环依赖
    fn install_recursive<'a>(
        &'a self,
        request: InstallRequest,
        chain: &'a mut Vec<String>,
        progress: &'a dyn ProgressCallback,
    ) -> BoxFuture<'a, Result<InstalledPlugin, InstallError>> {
        async move {
            validate_plugin_id(&request.plugin_id)?;

            if chain.contains(&request.plugin_id) {
                let mut cycle = chain.clone();
                cycle.push(request.plugin_id);
                return Err(InstallError::DependencyCycle { chain: cycle });
            }

            chain.push(request.plugin_id.clone());
            let result = self.install_one(request, chain, progress).await;
            chain.pop();
            result
        }
        .boxed()
    }

    async fn install_one(
        &self,
        request: InstallRequest,
        chain: &mut Vec<String>,
        progress: &dyn ProgressCallback,
    ) -> Result<InstalledPlugin, InstallError> {
        let plugin_id = request.plugin_id.as_str();
        let resolved = self.resolve(&request, progress).await?;

        info!("安装 {} @ {}", plugin_id, display_version(&resolved.version));
        info!("来源: {}", resolved.url);
        info!("目标: {}", self.plugins_dir.display());

        // 临时文件在 drop 时删除，失败路径同样会清理
        let mut tmp = tempfile::Builder::new()
            .prefix("plugin-")
            .suffix(".zip")
            .tempfile()?;

        progress.on_progress(InstallProgress::new(
            plugin_id,
            InstallStage::Downloading,
            0,
            format!("下载 {}", resolved.url),
        ));
        self.downloader
            .fetch(
                plugin_id,
                &resolved.url,
                tmp.as_file_mut(),
                &resolved.checksum,
                progress,
            )
            .await
            .map_err(|e| InstallError::DownloadFailed {
                url: resolved.url.clone(),
                source: Box::new(e),
            })?;

        progress.on_progress(InstallProgress::new(
            plugin_id,
            InstallStage::Extracting,
            0,
            "解压插件包...",
        ));
        let allow_symlinks = request.trusted && resolved.via_registry;
        let extracted = extract_plugin(
            tmp.path(),
            plugin_id,
            &self.plugins_dir,
            allow_symlinks,
            progress,
        );
        if let Err(e) = tmp.close() {
            warn!("删除临时文件失败: {}", e);
        }
        let install_path = extracted.map_err(|e| InstallError::ExtractFailed {
            source: Box::new(e),
        })?;

        info!("✔ {} 安装成功", plugin_id);

        // 依赖安装是附加功能，清单读取失败视为没有依赖
        let manifest = match read_installed_manifest(&self.plugins_dir, plugin_id) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                debug!("读取 {} 的清单失败，跳过依赖安装: {}", plugin_id, e);
                None
            }
        };

        let mut dependencies = Vec::new();
        let dependency_specs = manifest
            .as_ref()
            .map(|m| m.dependencies.clone())
            .unwrap_or_default();
        for dep in dependency_specs {
            progress.on_progress(InstallProgress::new(
                plugin_id,
                InstallStage::Dependencies,
                0,
                format!("安装依赖 {}", dep.id),
            ));

            let version = normalize_version(&dep.version);
            let dep_request = InstallRequest {
                plugin_id: dep.id.clone(),
                version: (!version.is_empty()).then_some(version),
                archive_url: None,
                trusted: false,
            };
            let installed = self
                .install_recursive(dep_request, chain, progress)
                .await
                .map_err(|e| InstallError::DependencyFailed {
                    plugin_id: dep.id.clone(),
                    source: Box::new(e),
                })?;

            info!("已安装依赖: {} ✔", dep.id);
            dependencies.push(installed);
        }

        let version = manifest
            .map(|m| m.version)
            .unwrap_or_else(|| resolved.version.clone());

        progress.on_progress(InstallProgress::new(
            plugin_id,
            InstallStage::Complete,
            100,
            format!("插件 {} v{} 安装成功", plugin_id, version),
        ));

        Ok(InstalledPlugin {
            id: plugin_id.to_string(),
            version,
            install_path,
            source: resolved.source,
            installed_at: chrono::Utc::now(),
            dependencies,
        })
    }

    /// 确定下载地址、版本和校验和
    async fn resolve(
        &self,
        request: &InstallRequest,
        progress: &dyn ProgressCallback,
    ) -> Result<ResolvedSource, InstallError> {
        if let Some(url) = request.archive_url.as_deref().filter(|u| !u.is_empty()) {
            // 直接指定地址时不知道校验和，也不做平台过滤
            let source = if Path::new(url).is_file() {
                InstallSource::Local {
                    path: url.to_string(),
                }
            } else {
                InstallSource::Url {
                    url: url.to_string(),
                }
            };
            return Ok(ResolvedSource {
                url: url.to_string(),
                version: request.version.clone().unwrap_or_default(),
                checksum: String::new(),
                source,
                via_registry: false,
            });
        }

        progress.on_progress(InstallProgress::new(
            &request.plugin_id,
            InstallStage::Resolving,
            0,
            format!("获取 {} 的元数据", request.plugin_id),
        ));

        let metadata = self.registry.fetch_metadata(&request.plugin_id).await?;
        let platform = self.registry.platform();
        let selected = select_version(&metadata, request.version.as_deref(), platform)?;

        let url = self
            .registry
            .download_url(&request.plugin_id, &selected.version)?;
        let checksum = checksum_for(selected, platform);

        Ok(ResolvedSource {
            source: InstallSource::Registry { url: url.clone() },
            url,
            version: selected.version.clone(),
            checksum,
            via_registry: true,
        })
    }
}

fn display_version(version: &str) -> &str {
    if version.is_empty() {
        "unknown"
    } else {
        version
    }
}
