//! Handler registry
//!
//! Built once at worker startup from the built-in table and the handler
//! directory, then read-only for the life of the process. A handler that
//! fails to load is logged and skipped.

use crate::commands::{builtin, Handler, ScriptHandler, BUILTIN_NAMES};
use crate::config::GatewayConfig;
use crate::gateway::LoadError;
use crate::logger;
use std::collections::BTreeMap;
use std::fs::DirEntry;
use std::path::Path;
use std::sync::Arc;

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Register the configured built-ins, then every executable in the handler directory
    pub fn load(config: &GatewayConfig) -> Self {
        let mut registry = Self::default();

        for name in &config.builtins {
            match builtin(name) {
                Some(handler) => {
                    logger::log_handler_loaded(name, "builtin");
                    registry.handlers.insert(name.clone(), handler);
                }
                None => logger::log_handler_load_failure(
                    name,
                    &LoadError::UnknownBuiltin {
                        name: name.clone(),
                        available: BUILTIN_NAMES.join(", "),
                    },
                ),
            }
        }

        registry.scan_dir(&config.handlers_dir);
        registry
    }

    pub fn from_handlers<I, S>(handlers: I) -> Self
    where
        I: IntoIterator<Item = (S, Arc<dyn Handler>)>,
        S: Into<String>,
    {
        Self {
            handlers: handlers
                .into_iter()
                .map(|(name, handler)| (name.into(), handler))
                .collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn scan_dir(&mut self, dir: &Path) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                logger::log_warning(&format!(
                    "Handler directory {} unavailable: {e}",
                    dir.display()
                ));
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    logger::log_handler_load_failure(&dir.display().to_string(), &LoadError::Io(e));
                    continue;
                }
            };
            let file = entry.file_name().to_string_lossy().into_owned();

            match load_script(&entry) {
                Ok((name, handler)) => {
                    if self.handlers.contains_key(&name) {
                        logger::log_warning(&format!("'{file}' replaces command '{name}'"));
                    }
                    logger::log_handler_loaded(&name, &file);
                    self.handlers.insert(name, Arc::new(handler));
                }
                Err(e) => logger::log_handler_load_failure(&file, &e),
            }
        }
    }
}

/// Validate one directory entry and build its handler
fn load_script(entry: &DirEntry) -> Result<(String, ScriptHandler), LoadError> {
    let path = entry.path();
    let metadata = std::fs::metadata(&path)?;
    if !metadata.is_file() {
        return Err(LoadError::NotAFile);
    }
    if !is_executable(&metadata) {
        return Err(LoadError::NotExecutable);
    }

    let name = command_name(&path).ok_or(LoadError::InvalidName)?;
    Ok((name.clone(), ScriptHandler::new(name, path)))
}

/// File name with its extension stripped
fn command_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || stem.contains('/') {
        return None;
    }
    Some(stem.to_string())
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
const fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn gateway_config(dir: PathBuf, builtins: &[&str]) -> GatewayConfig {
        GatewayConfig {
            keys_file: PathBuf::from("keys.json"),
            handlers_dir: dir,
            builtins: builtins.iter().map(ToString::to_string).collect(),
            expose_error_detail: true,
        }
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("apigate-registry-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_command_name_strips_extension() {
        assert_eq!(command_name(Path::new("assets/weather.sh")).as_deref(), Some("weather"));
        assert_eq!(command_name(Path::new("assets/plain")).as_deref(), Some("plain"));
        assert_eq!(command_name(Path::new("assets/archive.tar.gz")).as_deref(), Some("archive.tar"));
    }

    #[test]
    fn test_unknown_builtin_is_skipped() {
        let cfg = gateway_config(PathBuf::from("/nonexistent/apigate"), &["echo", "bogus", "upper"]);
        let registry = HandlerRegistry::load(&cfg);

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["echo", "upper"]);
        assert!(registry.lookup("bogus").is_none());
    }

    #[test]
    fn test_missing_dir_keeps_builtins() {
        let cfg = gateway_config(PathBuf::from("/nonexistent/apigate"), &["echo"]);
        let registry = HandlerRegistry::load(&cfg);
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("echo").is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_entries_do_not_abort_loading() {
        let dir = scratch_dir("mixed");
        std::os::unix::fs::symlink("/bin/cat", dir.join("cat.sh")).unwrap();
        std::os::unix::fs::symlink("/bin/sh", dir.join("echo.sh")).unwrap();
        std::fs::write(dir.join("notes.txt"), "not executable").unwrap();
        std::fs::create_dir(dir.join("nested")).unwrap();

        let registry = HandlerRegistry::load(&gateway_config(dir.clone(), &["echo", "reverse"]));

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["cat", "echo", "reverse"]);
        assert!(registry.lookup("notes").is_none());
        assert!(registry.lookup("nested").is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_handler_replaces_builtin() {
        let dir = scratch_dir("override");
        std::os::unix::fs::symlink("/bin/cat", dir.join("upper")).unwrap();

        let registry = HandlerRegistry::load(&gateway_config(dir.clone(), &["upper"]));
        let handler = registry.lookup("upper").unwrap();
        let out = tokio_test::block_on(handler.run(Some("kept".into()))).unwrap();
        assert_eq!(out, "kept");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
