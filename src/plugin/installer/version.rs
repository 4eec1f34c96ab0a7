//! 版本选择
//!
//! 根据注册表元数据和当前平台选择要安装的版本

use super::types::{InstallError, PluginMetadata, VersionInfo};

/// 表示"所有平台"的架构 key
pub const ANY_ARCH: &str = "any";

/// 操作系统和 CPU 架构（使用注册表的命名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into().to_lowercase(),
            arch: arch.into(),
        }
    }

    /// 当前运行平台
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        };
        Self::new(os, arch)
    }

    /// "os-arch" 形式的 key
    pub fn key(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// 版本是否支持给定平台
pub fn supports_platform(version: &VersionInfo, platform: &Platform) -> bool {
    match &version.arch_support {
        None => true,
        Some(arch) if arch.is_empty() => true,
        Some(arch) => arch.contains_key(&platform.key()) || arch.contains_key(ANY_ARCH),
    }
}

/// 按注册表给出的顺序找到第一个支持当前平台的版本
pub fn latest_supported_version<'a>(
    metadata: &'a PluginMetadata,
    platform: &Platform,
) -> Option<&'a VersionInfo> {
    metadata
        .versions
        .iter()
        .find(|v| supports_platform(v, platform))
}

/// 选择要安装的版本
///
/// 未指定版本时返回当前平台的最新版本；指定版本时只做字符串精确匹配。
pub fn select_version<'a>(
    metadata: &'a PluginMetadata,
    requested: Option<&str>,
    platform: &Platform,
) -> Result<&'a VersionInfo, InstallError> {
    let latest =
        latest_supported_version(metadata, platform).ok_or_else(|| InstallError::UnsupportedPlatform {
            platform: platform.key(),
        })?;

    let requested = match requested {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(latest),
    };

    let matched = metadata
        .versions
        .iter()
        .find(|v| v.version == requested)
        .ok_or_else(|| InstallError::VersionNotFound {
            version: requested.to_string(),
        })?;

    if !supports_platform(matched, platform) {
        return Err(InstallError::VersionUnsupported {
            version: requested.to_string(),
            platform: platform.key(),
            latest: latest.version.clone(),
        });
    }

    Ok(matched)
}

/// 取当前平台的校验和，找不到时回退到 "any"，都没有则为空
pub fn checksum_for(version: &VersionInfo, platform: &Platform) -> String {
    version
        .arch_support
        .as_ref()
        .and_then(|arch| arch.get(&platform.key()).or_else(|| arch.get(ANY_ARCH)))
        .map(|meta| meta.sha256_checksum.clone())
        .unwrap_or_default()
}

/// 规范化依赖声明中的版本号: 去掉空白以及开头的 `^` 或 `v`
pub fn normalize_version(version: &str) -> String {
    let normalized: String = version.chars().filter(|c| !c.is_whitespace()).collect();
    match normalized.strip_prefix('^').or_else(|| normalized.strip_prefix('v')) {
        Some(rest) => rest.to_string(),
        None => normalized,
    }
}
