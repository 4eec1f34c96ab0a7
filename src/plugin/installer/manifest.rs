//! 已安装插件的清单读取
//!
//! 优先读取 `dist/plugin.json`（构建产物），其次是源码目录下的 `plugin.json`。

use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{DependencySpec, InstallError, InstalledManifest};

/// 清单缺少版本号时使用的版本
pub const DEFAULT_MANIFEST_VERSION: &str = "0.0.0";

/// plugin.json 在磁盘上的结构（只取安装器关心的字段）
///
/// 字段缺失或为 null 时都按默认值处理
#[derive(Debug, Default, Deserialize)]
struct ManifestFile {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    info: ManifestInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    dependencies: ManifestDependencies,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    version: String,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestDependencies {
    #[serde(default, deserialize_with = "null_as_default")]
    plugins: Vec<ManifestDependency>,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestDependency {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    version: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 清单文件候选路径，按优先级排列
pub fn manifest_paths(plugins_dir: &Path, plugin_id: &str) -> [PathBuf; 2] {
    let root = plugins_dir.join(plugin_id);
    [root.join("dist").join("plugin.json"), root.join("plugin.json")]
}

/// 读取已安装插件的清单
pub fn read_installed_manifest(
    plugins_dir: &Path,
    plugin_id: &str,
) -> Result<InstalledManifest, InstallError> {
    let data = manifest_paths(plugins_dir, plugin_id)
        .iter()
        .find_map(|path| fs::read(path).ok())
        .ok_or_else(|| {
            InstallError::InvalidManifest(format!(
                "在 {} 中找不到 {} 的 dist/plugin.json 或 plugin.json",
                plugins_dir.display(),
                plugin_id
            ))
        })?;

    parse_manifest(&data)
}

/// 解析 plugin.json 内容
pub fn parse_manifest(data: &[u8]) -> Result<InstalledManifest, InstallError> {
    let file: ManifestFile = serde_json::from_slice(data)
        .map_err(|e| InstallError::InvalidManifest(e.to_string()))?;

    if file.id.is_empty() {
        return Err(InstallError::InvalidManifest("缺少插件 id".to_string()));
    }

    let version = if file.info.version.is_empty() {
        DEFAULT_MANIFEST_VERSION.to_string()
    } else {
        file.info.version
    };

    Ok(InstalledManifest {
        id: file.id,
        version,
        dependencies: file
            .dependencies
            .plugins
            .into_iter()
            .map(|dep| DependencySpec {
                id: dep.id,
                version: dep.version,
            })
            .collect(),
    })
}
