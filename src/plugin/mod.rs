//! 插件系统模块
//!
//! 目前只包含插件安装，加载和运行由宿主负责。

pub mod installer;

pub use installer::{
    InstallError, InstallProgress, InstallRequest, InstallStage, InstalledPlugin, PluginInstaller,
    ProgressCallback,
};
