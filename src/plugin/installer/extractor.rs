//! 插件包解压
//!
//! 将 ZIP 插件包解压到 `<plugins_dir>/<plugin_id>`：
//! - 拒绝绝对路径和 `..` 开头的条目，任何条目都不能写到插件目录之外
//! - 压缩包的顶层目录（如 `org-repo-hash/`）统一改写为 `<plugin_id>/`
//! - 只有信任来源才解压符号链接
//! - 后端可执行文件强制设置为可执行权限

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::{InstallError, InstallProgress, InstallStage, ProgressCallback};

/// 压缩包顶层的构建目录，如 `grafana-clock-panel-a1b2c3d/`
static BUILD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.-]*/").expect("invalid build prefix pattern"));

/// 需要强制可执行的后端二进制后缀
const EXECUTABLE_SUFFIXES: &[&str] = &[
    "_linux_amd64",
    "_linux_arm64",
    "_darwin_amd64",
    "_darwin_arm64",
];

const DIR_MODE: u32 = 0o755;
const DEFAULT_FILE_MODE: u32 = 0o644;
const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// 解压插件包
///
/// 已存在的 `<dest_dir>/<plugin_id>` 会先被整个删除。路径越界立即中止，
/// 符号链接失败跳过，其余文件错误遇到第一个即返回。
pub fn extract_plugin(
    archive_path: &Path,
    plugin_id: &str,
    dest_dir: &Path,
    allow_symlinks: bool,
    progress: &dyn ProgressCallback,
) -> Result<PathBuf, InstallError> {
    validate_plugin_id(plugin_id)?;

    let dest_dir = normalize(&std::path::absolute(dest_dir)?);
    let install_dir = normalize(&dest_dir.join(plugin_id));
    debug!(
        "解压 {} 到 {}",
        archive_path.display(),
        dest_dir.display()
    );

    // 只允许删除插件目录下的直接子目录
    if install_dir.parent() != Some(dest_dir.as_path()) {
        return Err(InstallError::InvalidPluginId {
            plugin_id: plugin_id.to_string(),
        });
    }

    if fs::symlink_metadata(&install_dir).is_ok() {
        fs::remove_dir_all(&install_dir)?;
        info!("已删除 {} 的旧安装", plugin_id);
    }

    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let total = archive.len();
    for i in 0..total {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        if is_escaping_name(&name) {
            return Err(InstallError::PathEscape {
                entry: name,
                destination: dest_dir,
            });
        }

        // macOS 元数据
        if name.starts_with("__MACOSX/") {
            continue;
        }

        let dst_path = resolve_entry_path(&dest_dir, plugin_id, &name).ok_or_else(|| {
            InstallError::PathEscape {
                entry: name.clone(),
                destination: install_dir.clone(),
            }
        })?;

        ensure_on_disk_containment(&install_dir, &dst_path, &name)?;

        if entry.is_dir() {
            create_dir(&dst_path)?;
            continue;
        }

        if let Some(parent) = dst_path.parent() {
            create_dir(parent)?;
        }

        let mode = entry.unix_mode();
        if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
            if !allow_symlinks {
                warn!("{}: 插件包包含符号链接，当前来源不允许，已跳过", name);
                continue;
            }
            if let Err(e) = extract_symlink(&mut entry, &dst_path, &install_dir) {
                warn!("符号链接解压失败，已跳过: {}", e);
            }
            continue;
        }

        extract_file(&mut entry, &dst_path, mode)?;

        progress.on_progress(InstallProgress::new(
            plugin_id,
            InstallStage::Extracting,
            ((i + 1) * 100 / total) as u8,
            format!("解压中 ({}/{})", i + 1, total),
        ));
    }

    Ok(install_dir)
}

/// 插件 ID 会直接作为目录名，只能是单个普通路径段
pub(super) fn validate_plugin_id(plugin_id: &str) -> Result<(), InstallError> {
    let valid = !plugin_id.is_empty()
        && plugin_id != "."
        && plugin_id != ".."
        && !plugin_id.contains(['/', '\\', '\0'])
        && !Path::new(plugin_id).is_absolute();

    if valid {
        Ok(())
    } else {
        Err(InstallError::InvalidPluginId {
            plugin_id: plugin_id.to_string(),
        })
    }
}

/// 绝对路径或以 `..` 开头的条目名
fn is_escaping_name(name: &str) -> bool {
    let path = Path::new(name);
    path.is_absolute()
        || name.starts_with('/')
        || name.starts_with('\\')
        || matches!(path.components().next(), Some(Component::ParentDir))
}

/// 改写顶层目录；没有顶层目录的条目直接放在插件目录下
fn rewrite_entry_name(plugin_id: &str, name: &str) -> String {
    if BUILD_PREFIX.is_match(name) {
        BUILD_PREFIX
            .replace(name, regex::NoExpand(&format!("{}/", plugin_id)))
            .into_owned()
    } else {
        format!("{}/{}", plugin_id, name)
    }
}

/// 计算条目的目标路径，结果不在 `<dest_dir>/<plugin_id>` 内时返回 None
fn resolve_entry_path(dest_dir: &Path, plugin_id: &str, name: &str) -> Option<PathBuf> {
    let install_dir = normalize(&dest_dir.join(plugin_id));
    let target = normalize(&dest_dir.join(rewrite_entry_name(plugin_id, name)));
    target.starts_with(&install_dir).then_some(target)
}

/// 词法上规范化路径（处理 `.` 和 `..`，不访问文件系统）
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// 目标路径已存在的最深祖先（可能是目标本身）经符号链接解析后必须仍在插件目录内
fn ensure_on_disk_containment(
    install_dir: &Path,
    target: &Path,
    entry_name: &str,
) -> Result<(), InstallError> {
    let root = match fs::canonicalize(install_dir) {
        Ok(root) => root,
        // 插件目录还没创建，其中不可能有符号链接
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let mut existing = target;
    while fs::symlink_metadata(existing).is_err() {
        match existing.parent() {
            Some(parent) if parent.starts_with(install_dir) => existing = parent,
            _ => return Ok(()),
        }
    }

    let escaped = match fs::canonicalize(existing) {
        Ok(resolved) => !resolved.starts_with(&root),
        // 悬空的符号链接
        Err(_) => true,
    };
    if escaped {
        return Err(InstallError::PathEscape {
            entry: entry_name.to_string(),
            destination: install_dir.to_path_buf(),
        });
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), InstallError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path).map_err(|e| map_open_error(e, path))
}

/// 符号链接的目标是条目内容，只允许指向插件目录内的相对路径
fn extract_symlink(
    entry: &mut zip::read::ZipFile<'_>,
    dst_path: &Path,
    install_dir: &Path,
) -> Result<(), InstallError> {
    let mut target = String::new();
    entry.read_to_string(&mut target)?;
    let target = target.trim();

    if !symlink_target_inside(dst_path, target, install_dir) {
        return Err(InstallError::PathEscape {
            entry: format!("{} -> {}", entry.name(), target),
            destination: install_dir.to_path_buf(),
        });
    }

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, dst_path)?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        let _ = (target, dst_path);
        Err(InstallError::IoError(io::Error::new(
            io::ErrorKind::Unsupported,
            "当前平台不支持解压符号链接",
        )))
    }
}

fn symlink_target_inside(link_path: &Path, target: &str, install_dir: &Path) -> bool {
    let target_path = Path::new(target);
    if target.is_empty() || target_path.has_root() || target_path.is_absolute() {
        return false;
    }
    let base = link_path.parent().unwrap_or(install_dir);
    normalize(&base.join(target_path)).starts_with(install_dir)
}

fn extract_file(
    entry: &mut zip::read::ZipFile<'_>,
    dst_path: &Path,
    unix_mode: Option<u32>,
) -> Result<(), InstallError> {
    let mode = file_mode(dst_path, unix_mode);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let mut dst = options
        .open(dst_path)
        .map_err(|e| map_open_error(e, dst_path))?;
    io::copy(entry, &mut dst)?;

    // 不受 umask 影响
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dst_path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

/// 目标文件权限：后端二进制强制 0755，否则沿用压缩包中的权限
fn file_mode(dst_path: &Path, unix_mode: Option<u32>) -> u32 {
    let name = dst_path.to_string_lossy();
    if EXECUTABLE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        return 0o755;
    }
    match unix_mode.map(|m| m & 0o777) {
        Some(m) if m != 0 => m,
        _ => DEFAULT_FILE_MODE,
    }
}

fn map_open_error(err: io::Error, path: &Path) -> InstallError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => InstallError::PermissionDenied {
            path: path.to_path_buf(),
        },
        io::ErrorKind::ExecutableFileBusy | io::ErrorKind::ResourceBusy => InstallError::FileBusy {
            path: path.to_path_buf(),
        },
        _ => InstallError::IoError(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::installer::types::NoopProgressCallback;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    enum Entry<'a> {
        Dir(&'a str),
        File(&'a str, &'a [u8]),
        FileWithMode(&'a str, &'a [u8], u32),
        Symlink(&'a str, &'a str),
    }

    fn build_zip(dir: &Path, entries: &[Entry<'_>]) -> PathBuf {
        let path = dir.join("plugin.zip");
        let file = File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);

        for entry in entries {
            match entry {
                Entry::Dir(name) => zip.add_directory(*name, options).unwrap(),
                Entry::File(name, data) => {
                    zip.start_file(*name, options).unwrap();
                    zip.write_all(data).unwrap();
                }
                Entry::FileWithMode(name, data, mode) => {
                    zip.start_file(*name, options.unix_permissions(*mode)).unwrap();
                    zip.write_all(data).unwrap();
                }
                Entry::Symlink(name, target) => zip.add_symlink(*name, *target, options).unwrap(),
            }
        }

        zip.finish().unwrap();
        path
    }

    fn extract(archive: &Path, dest: &Path, allow_symlinks: bool) -> Result<PathBuf, InstallError> {
        extract_plugin(archive, "acme-panel", dest, allow_symlinks, &NoopProgressCallback)
    }

    #[test]
    fn test_rewrites_build_prefix() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let archive = build_zip(
            work.path(),
            &[
                Entry::Dir("acme-panel-1a2b3c/"),
                Entry::File("acme-panel-1a2b3c/plugin.json", br#"{"id":"acme-panel"}"#),
                Entry::File("acme-panel-1a2b3c/dist/module.js", b"console.log(1)"),
            ],
        );

        let install_dir = extract(&archive, plugins.path(), false).unwrap();

        assert!(install_dir.ends_with("acme-panel"));
        assert!(install_dir.join("plugin.json").is_file());
        assert_eq!(
            fs::read(install_dir.join("dist/module.js")).unwrap(),
            b"console.log(1)"
        );
        assert!(!plugins.path().join("acme-panel-1a2b3c").exists());
    }

    #[test]
    fn test_top_level_files_land_in_plugin_dir() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let archive = build_zip(work.path(), &[Entry::File("README.md", b"hi")]);

        let install_dir = extract(&archive, plugins.path(), false).unwrap();
        assert!(install_dir.join("README.md").is_file());
        assert!(!plugins.path().join("README.md").exists());
    }

    #[test]
    fn test_rejects_parent_traversal_without_writing() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let archive = build_zip(work.path(), &[Entry::File("../evil.sh", b"rm -rf /")]);

        let err = extract(&archive, plugins.path(), false).unwrap_err();
        assert!(matches!(err, InstallError::PathEscape { entry, .. } if entry == "../evil.sh"));
        assert!(!plugins.path().join("evil.sh").exists());
        assert!(!work.path().join("evil.sh").exists());
        assert!(!plugins.path().parent().unwrap().join("evil.sh").exists());
    }

    #[test]
    fn test_rejects_nested_traversal() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let archive = build_zip(
            work.path(),
            &[Entry::File("build-1/../../outside.txt", b"x")],
        );

        let err = extract(&archive, plugins.path(), false).unwrap_err();
        assert!(matches!(err, InstallError::PathEscape { .. }));
        assert!(!plugins.path().join("outside.txt").exists());
    }

    #[test]
    fn test_rejects_absolute_entry_without_writing() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("evil.txt");
        let archive = build_zip(
            work.path(),
            &[Entry::File(target.to_str().unwrap(), b"owned")],
        );

        let err = extract(&archive, plugins.path(), false).unwrap_err();
        assert!(matches!(err, InstallError::PathEscape { .. }));
        assert!(!target.exists());
        assert!(!plugins.path().join("acme-panel").exists());
    }

    /// 插件目录旁边的其他插件和文件
    fn plugins_with_neighbours() -> (TempDir, PathBuf) {
        let base = TempDir::new().unwrap();
        let plugins = base.path().join("plugins");
        fs::create_dir_all(plugins.join("other-plugin")).unwrap();
        fs::write(plugins.join("other-plugin/module.js"), b"keep").unwrap();
        fs::write(base.path().join("precious.txt"), b"keep").unwrap();
        (base, plugins)
    }

    #[test]
    fn test_rejects_invalid_plugin_ids_before_touching_disk() {
        let work = TempDir::new().unwrap();
        let archive = build_zip(work.path(), &[Entry::File("root/module.js", b"x")]);

        for plugin_id in ["", ".", "..", "a/b", "..\\x", "/abs"] {
            let (base, plugins) = plugins_with_neighbours();
            let err = extract_plugin(&archive, plugin_id, &plugins, false, &NoopProgressCallback)
                .unwrap_err();

            assert!(
                matches!(&err, InstallError::InvalidPluginId { plugin_id: id } if id == plugin_id),
                "{:?}: {:?}",
                plugin_id,
                err
            );
            assert!(plugins.join("other-plugin/module.js").is_file());
            assert!(base.path().join("precious.txt").is_file());
            assert!(!base.path().join("module.js").exists());
        }
    }

    #[test]
    fn test_validate_plugin_id() {
        assert!(validate_plugin_id("acme-panel").is_ok());
        assert!(validate_plugin_id("grafana-clock-panel").is_ok());
        assert!(validate_plugin_id("..hidden").is_ok());
        assert!(validate_plugin_id("").is_err());
        assert!(validate_plugin_id("..").is_err());
        assert!(validate_plugin_id("a\\b").is_err());
    }

    #[test]
    fn test_symlink_target_inside() {
        let install_dir = Path::new("/srv/plugins/acme-panel");
        let link = install_dir.join("img/logo.svg");
        assert!(symlink_target_inside(&link, "../module.js", install_dir));
        assert!(symlink_target_inside(&link, "icons/a.svg", install_dir));
        assert!(!symlink_target_inside(&link, "../../other/module.js", install_dir));
        assert!(!symlink_target_inside(&link, "/etc/passwd", install_dir));
        assert!(!symlink_target_inside(&link, "", install_dir));
    }

    #[test]
    fn test_resolve_entry_path() {
        let dest = Path::new("/srv/plugins");
        assert_eq!(
            resolve_entry_path(dest, "acme-panel", "org-repo-abc123/"),
            Some(PathBuf::from("/srv/plugins/acme-panel"))
        );
        assert_eq!(
            resolve_entry_path(dest, "acme-panel", "org-repo-abc123/dist/module.js"),
            Some(PathBuf::from("/srv/plugins/acme-panel/dist/module.js"))
        );
        assert_eq!(resolve_entry_path(dest, "acme-panel", "x/../../etc/passwd"), None);
    }

    #[test]
    fn test_escaping_names() {
        assert!(is_escaping_name("/etc/passwd"));
        assert!(is_escaping_name("../x"));
        assert!(is_escaping_name(".."));
        assert!(!is_escaping_name("plugin-abc/../x"));
        assert!(!is_escaping_name("plugin-abc/module.js"));
        assert!(!is_escaping_name("..hidden/file"));
    }

    #[test]
    fn test_replaces_existing_installation() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let stale = plugins.path().join("acme-panel").join("stale.js");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, b"old").unwrap();

        let archive = build_zip(work.path(), &[Entry::File("root/new.js", b"new")]);
        let install_dir = extract(&archive, plugins.path(), false).unwrap();

        assert!(!stale.exists());
        assert!(install_dir.join("new.js").is_file());
    }

    #[test]
    fn test_extract_twice_is_idempotent() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let archive = build_zip(
            work.path(),
            &[
                Entry::File("root/plugin.json", b"{}"),
                Entry::File("root/img/logo.svg", b"<svg/>"),
            ],
        );

        let list = |dir: &Path| {
            let mut files: Vec<PathBuf> = walk(dir);
            files.sort();
            files
        };

        let install_dir = extract(&archive, plugins.path(), false).unwrap();
        let first = list(&install_dir);
        extract(&archive, plugins.path(), false).unwrap();
        let second = list(&install_dir);

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    fn walk(dir: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                out.extend(walk(&path));
            } else {
                out.push(path);
            }
        }
        out
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_skipped_when_untrusted() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let archive = build_zip(
            work.path(),
            &[
                Entry::File("root/module.js", b"x"),
                Entry::Symlink("root/link.js", "module.js"),
            ],
        );

        let install_dir = extract(&archive, plugins.path(), false).unwrap();
        assert!(fs::symlink_metadata(install_dir.join("link.js")).is_err());
        assert!(install_dir.join("module.js").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_extracted_when_trusted() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let archive = build_zip(
            work.path(),
            &[
                Entry::File("root/module.js", b"x"),
                Entry::Symlink("root/link.js", "module.js"),
            ],
        );

        let install_dir = extract(&archive, plugins.path(), true).unwrap();
        let link = install_dir.join("link.js");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("module.js"));
    }

    #[cfg(unix)]
    #[test]
    fn test_trusted_symlink_cannot_redirect_writes() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let archive = build_zip(
            work.path(),
            &[
                Entry::Dir("root/"),
                Entry::Symlink("root/out", outside.path().to_str().unwrap()),
                Entry::File("root/out/pwned.txt", b"x"),
                Entry::Symlink("root/up", "../../"),
            ],
        );

        let install_dir = extract(&archive, plugins.path(), true).unwrap();

        assert!(!outside.path().join("pwned.txt").exists());
        let out = fs::symlink_metadata(install_dir.join("out")).unwrap();
        assert!(!out.file_type().is_symlink());
        assert!(install_dir.join("out/pwned.txt").is_file());
        assert!(fs::symlink_metadata(install_dir.join("up")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_writes_through_existing_symlink() {
        let plugins = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let install_dir = plugins.path().join("acme-panel");
        fs::create_dir_all(&install_dir).unwrap();
        std::os::unix::fs::symlink(outside.path(), install_dir.join("out")).unwrap();
        std::os::unix::fs::symlink("module.js", install_dir.join("alias.js")).unwrap();
        fs::write(install_dir.join("module.js"), b"x").unwrap();

        let err = ensure_on_disk_containment(
            &install_dir,
            &install_dir.join("out/nested/pwned.txt"),
            "root/out/nested/pwned.txt",
        )
        .unwrap_err();
        assert!(matches!(err, InstallError::PathEscape { .. }));

        assert!(ensure_on_disk_containment(
            &install_dir,
            &install_dir.join("alias.js"),
            "root/alias.js"
        )
        .is_ok());
        assert!(ensure_on_disk_containment(
            &install_dir,
            &install_dir.join("new/file.js"),
            "root/new/file.js"
        )
        .is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_modes() {
        use std::os::unix::fs::PermissionsExt;

        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let archive = build_zip(
            work.path(),
            &[
                Entry::FileWithMode("root/gpx_backend_linux_amd64", b"\x7fELF", 0o644),
                Entry::FileWithMode("root/script.sh", b"#!/bin/sh", 0o700),
                Entry::FileWithMode("root/readme.txt", b"hi", 0o600),
            ],
        );

        let install_dir = extract(&archive, plugins.path(), false).unwrap();
        let mode = |name: &str| {
            fs::metadata(install_dir.join(name))
                .unwrap()
                .permissions()
                .mode()
                & 0o777
        };

        assert_eq!(mode("gpx_backend_linux_amd64"), 0o755);
        assert_eq!(mode("script.sh"), 0o700);
        assert_eq!(mode("readme.txt"), 0o600);
    }

    #[test]
    fn test_file_mode_helper() {
        assert_eq!(file_mode(Path::new("/p/x_darwin_arm64"), Some(0o100600)), 0o755);
        assert_eq!(file_mode(Path::new("/p/x.js"), Some(0o100640)), 0o640);
        assert_eq!(file_mode(Path::new("/p/x.js"), None), DEFAULT_FILE_MODE);
    }

    #[test]
    fn test_invalid_archive() {
        let work = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let bogus = work.path().join("bogus.zip");
        fs::write(&bogus, b"not a zip file").unwrap();

        let err = extract(&bogus, plugins.path(), false).unwrap_err();
        assert!(matches!(err, InstallError::Archive(_)));
    }

    #[test]
    fn test_map_open_error() {
        let path = Path::new("/plugins/acme-panel/module.js");
        let err = map_open_error(io::Error::from(io::ErrorKind::PermissionDenied), path);
        assert!(matches!(err, InstallError::PermissionDenied { path: p } if p == path));

        let err = map_open_error(io::Error::from(io::ErrorKind::ExecutableFileBusy), path);
        assert!(matches!(err, InstallError::FileBusy { .. }));

        let err = map_open_error(io::Error::from(io::ErrorKind::NotFound), path);
        assert!(matches!(err, InstallError::IoError(_)));
    }
}
