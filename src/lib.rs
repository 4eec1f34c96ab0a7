//! 插件安装器
//!
//! 从插件注册表解析、下载、校验并解压插件，然后递归安装其依赖。
//!
//! ```no_run
//! use plugin_installer::{InstallRequest, InstallerConfig, NoopProgressCallback, PluginInstaller};
//!
//! # async fn run() -> Result<(), plugin_installer::InstallError> {
//! let config = InstallerConfig::default().with_plugins_dir("/var/lib/host/plugins");
//! let installer = PluginInstaller::new(&config)?;
//! let installed = installer
//!     .install(InstallRequest::new("acme-panel"), &NoopProgressCallback)
//!     .await?;
//! println!("{} {}", installed.id, installed.version);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;
pub mod plugin;

pub use config::{ConfigError, InstallerConfig};
pub use plugin::installer::{
    FnProgressCallback, InstallError, InstallProgress, InstallRequest, InstallSource,
    InstallStage, InstalledPlugin, NoopProgressCallback, Platform, PluginInstaller,
    ProgressCallback,
};
