//! 插件包下载器
//!
//! - 本地路径直接复制，不做校验
//! - 远程地址流式写入文件，同时计算 SHA256
//! - 响应体被截断时清空文件并重试，校验和不匹配不重试

use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{info, warn};

use super::registry::RegistryClient;
use super::types::{InstallError, InstallProgress, InstallStage, ProgressCallback};

/// 下载总尝试次数（首次 + 2 次重试）
pub const MAX_DOWNLOAD_ATTEMPTS: u32 = 3;

/// 插件包下载器
#[derive(Debug, Clone)]
pub struct PluginDownloader {
    registry: RegistryClient,
    security_contact: String,
}

impl PluginDownloader {
    pub fn new(registry: RegistryClient, security_contact: impl Into<String>) -> Self {
        Self {
            registry,
            security_contact: security_contact.into(),
        }
    }

    /// 下载插件包到 `dest`
    ///
    /// `source` 是已存在的本地文件时直接复制；否则按 URL 下载并在
    /// `expected_checksum` 非空时校验。
    pub async fn fetch(
        &self,
        plugin_id: &str,
        source: &str,
        dest: &mut File,
        expected_checksum: &str,
        progress: &dyn ProgressCallback,
    ) -> Result<(), InstallError> {
        let local = Path::new(source);
        if local.is_file() {
            info!("使用本地插件包: {}", local.display());
            let mut src = File::open(local)?;
            std::io::copy(&mut src, dest)?;
            dest.flush()?;
            return Ok(());
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .download_once(plugin_id, source, dest, expected_checksum, progress)
                .await
            {
                Err(InstallError::MalformedResponse(reason)) if attempt < MAX_DOWNLOAD_ATTEMPTS => {
                    warn!("下载失败 ({}), 第 {} 次重试", reason, attempt);
                    dest.set_len(0)?;
                    dest.seek(SeekFrom::Start(0))?;
                }
                Err(InstallError::MalformedResponse(reason)) => {
                    warn!("下载失败 ({}), 已放弃", reason);
                    return Err(InstallError::CorruptResponse { attempts: attempt });
                }
                other => return other,
            }
        }
    }

    /// 单次下载：边写文件边计算哈希
    async fn download_once(
        &self,
        plugin_id: &str,
        url: &str,
        dest: &mut File,
        expected_checksum: &str,
        progress: &dyn ProgressCallback,
    ) -> Result<(), InstallError> {
        info!("开始下载插件包: {}", url);

        let response = self.registry.open_download(url).await?;
        let total_size = response.content_length();

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| InstallError::MalformedResponse(e.to_string()))?;
            hasher.update(&chunk);
            dest.write_all(&chunk)?;
            downloaded += chunk.len() as u64;

            if let Some(total) = total_size.filter(|t| *t > 0) {
                let percent = (downloaded.min(total) * 100 / total) as u8;
                progress.on_progress(InstallProgress::new(
                    plugin_id,
                    InstallStage::Downloading,
                    percent,
                    format!("已下载 {}/{} 字节", downloaded, total),
                ));
            }
        }
        dest.flush()?;

        if let Some(total) = total_size {
            if downloaded < total {
                return Err(InstallError::MalformedResponse(format!(
                    "响应体不完整: 期望 {} 字节, 实际 {} 字节",
                    total, downloaded
                )));
            }
        }

        let actual = format!("{:x}", hasher.finalize());
        if !expected_checksum.is_empty() && !expected_checksum.eq_ignore_ascii_case(&actual) {
            return Err(InstallError::ChecksumMismatch {
                expected: expected_checksum.to_string(),
                actual,
                contact: self.security_contact.clone(),
            });
        }

        info!("下载完成: {} 字节", downloaded);
        Ok(())
    }
}
