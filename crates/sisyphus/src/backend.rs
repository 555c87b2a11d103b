//! Execution Backend (§4.A): an object-safe, async capability for
//! running short-lived resource-bounded commands against an isolated
//! root filesystem, with two conforming strategies.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::Config;
use crate::error::BackendError;

/// Result of `exec_command`.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// The capability surface every execution strategy must provide
/// (§4.A). Object-safe so the Case Runner and Session hold it behind a
/// single `Arc<dyn Backend>` regardless of which strategy backs it.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), BackendError>;

    async fn read_file(&self, path: &str) -> Result<Vec<u8>, BackendError>;

    /// Batched read; default implementation is sequential per §4.A.
    async fn read_files(&self, paths: &[&str]) -> Result<Vec<Vec<u8>>, BackendError> {
        let mut out = Vec::with_capacity(paths.len());
        for p in paths {
            out.push(self.read_file(p).await?);
        }
        Ok(out)
    }

    /// Batched write; default implementation is sequential per §4.A.
    async fn write_files(&self, files: &[(&str, &[u8])]) -> Result<(), BackendError> {
        for (path, content) in files {
            self.write_file(path, content).await?;
        }
        Ok(())
    }

    /// Sorted lexicographically per §4.A.
    async fn list_files(&self, dir: &str, glob: &str) -> Result<Vec<String>, BackendError>;

    async fn file_size(&self, path: &str) -> Result<u64, BackendError>;

    /// Recursive, idempotent.
    async fn mkdir(&self, path: &str) -> Result<(), BackendError>;

    async fn exec_command(
        &self,
        cmd: &str,
        workdir: Option<&str>,
        timeout_secs: u64,
    ) -> Result<ExecOutput, BackendError>;

    /// Make generator/judge/visualiser binaries discoverable at the
    /// canonical path `judge_dir/target/release/{gen,tester,vis}`,
    /// falling back to `tool_dir/release` if the nested `target/`
    /// layout isn't present.
    async fn setup_tool_links(&self, tool_dir: &str) -> Result<(), BackendError>;

    /// Release all backend resources. Idempotent.
    async fn close(&self) -> Result<(), BackendError>;

    fn judge_dir(&self) -> &str;
    fn work_dir(&self) -> &str;
}

// ── Local strategy ──────────────────────────────────────────────────

/// Real filesystem paths, `exec_command` spawns a subprocess with its
/// own working directory (§4.A.1 "Local strategy").
pub struct LocalBackend {
    config: Config,
}

impl LocalBackend {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            PathBuf::from(&self.config.work_dir).join(path)
        }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), BackendError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, content).await?;
        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>, BackendError> {
        Ok(tokio::fs::read(self.resolve(path)).await?)
    }

    async fn list_files(&self, dir: &str, glob: &str) -> Result<Vec<String>, BackendError> {
        let full = self.resolve(dir);
        let mut entries = tokio::fs::read_dir(&full).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if glob_matches(glob, &name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn file_size(&self, path: &str) -> Result<u64, BackendError> {
        let meta = tokio::fs::metadata(self.resolve(path)).await?;
        Ok(meta.len())
    }

    async fn mkdir(&self, path: &str) -> Result<(), BackendError> {
        tokio::fs::create_dir_all(self.resolve(path)).await?;
        Ok(())
    }

    async fn exec_command(
        &self,
        cmd: &str,
        workdir: Option<&str>,
        timeout_secs: u64,
    ) -> Result<ExecOutput, BackendError> {
        let mut command = Command::new("/bin/sh");
        command
            .arg("-c")
            .arg(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(wd) = workdir {
            command.current_dir(self.resolve(wd));
        } else {
            command.current_dir(&self.config.work_dir);
        }

        let child = command
            .spawn()
            .map_err(|e| BackendError::Transport(format!("failed to spawn: {e}")))?;

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(timeout_secs),
            child.wait_with_output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(ExecOutput {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }),
            Ok(Err(e)) => Err(BackendError::Transport(e.to_string())),
            Err(_) => Err(BackendError::Timeout(timeout_secs)),
        }
    }

    async fn setup_tool_links(&self, tool_dir: &str) -> Result<(), BackendError> {
        let nested = Path::new(tool_dir).join("target").join("release");
        let source = if tokio::fs::metadata(&nested).await.is_ok() {
            nested
        } else {
            Path::new(tool_dir).join("release")
        };
        let dest = Path::new(&self.config.judge_dir).join("target").join("release");
        tokio::fs::create_dir_all(&dest).await?;
        for name in ["gen", "tester", "vis"] {
            let link_target = source.join(name);
            let link_path = dest.join(name);
            if tokio::fs::metadata(&link_target).await.is_ok() {
                let _ = tokio::fs::remove_file(&link_path).await;
                #[cfg(unix)]
                tokio::fs::symlink(&link_target, &link_path).await?;
                #[cfg(not(unix))]
                tokio::fs::copy(&link_target, &link_path).await?;
            }
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn judge_dir(&self) -> &str {
        &self.config.judge_dir
    }

    fn work_dir(&self) -> &str {
        &self.config.work_dir
    }
}

fn glob_matches(glob: &str, name: &str) -> bool {
    if glob == "*" {
        return true;
    }
    if let Some(suffix) = glob.strip_prefix('*') {
        return name.ends_with(suffix);
    }
    if let Some(prefix) = glob.strip_suffix('*') {
        return name.starts_with(prefix);
    }
    glob == name
}

// ── Sandbox strategy ────────────────────────────────────────────────

/// Routes every primitive through `exec_command` on a remote isolated
/// root and a chunked base64 file-transfer protocol (§4.A.1 "Sandbox
/// strategy"). Exists to prove the trait is transport-agnostic; here
/// it talks to the same Docker exec API as [`LocalBackend`]'s
/// container-launch path but never touches the container filesystem
/// through a bind mount.
pub struct SandboxBackend {
    container_id: String,
    judge_dir: String,
    work_dir: String,
    chunk_size: usize,
}

impl SandboxBackend {
    pub fn new(container_id: impl Into<String>, judge_dir: String, work_dir: String) -> Self {
        Self {
            container_id: container_id.into(),
            judge_dir,
            work_dir,
            chunk_size: 50 * 1024,
        }
    }

    async fn docker_exec(&self, cmd: &str, timeout_secs: u64) -> Result<ExecOutput, BackendError> {
        let mut command = Command::new("docker");
        command
            .args(["exec", &self.container_id, "/bin/sh", "-c", cmd])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = command
            .spawn()
            .map_err(|e| BackendError::Transport(format!("failed to spawn docker exec: {e}")))?;

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(timeout_secs),
            child.wait_with_output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(ExecOutput {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }),
            Ok(Err(e)) => Err(BackendError::Transport(e.to_string())),
            Err(_) => Err(BackendError::Timeout(timeout_secs)),
        }
    }
}

#[async_trait]
impl Backend for SandboxBackend {
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), BackendError> {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        let tmp = format!("{path}.b64");
        self.docker_exec(&format!("rm -f {tmp}"), 10).await?;
        for chunk in encoded.as_bytes().chunks(self.chunk_size) {
            let chunk_str = std::str::from_utf8(chunk)
                .map_err(|_| BackendError::Transport("non-utf8 base64 chunk".into()))?;
            let cmd = format!("echo -n '{chunk_str}' >> {tmp}");
            let out = self.docker_exec(&cmd, 30).await?;
            if out.exit_code != 0 {
                return Err(BackendError::Transport(format!(
                    "chunk append failed: {}",
                    out.stderr
                )));
            }
        }
        let decode = format!("base64 -d {tmp} > {path} && rm -f {tmp}");
        let out = self.docker_exec(&decode, 30).await?;
        if out.exit_code != 0 {
            return Err(BackendError::Transport(format!(
                "base64 decode failed: {}",
                out.stderr
            )));
        }
        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>, BackendError> {
        use base64::Engine;
        let cmd = format!("base64 -w0 {path}");
        let out = self.docker_exec(&cmd, 30).await?;
        if out.exit_code != 0 {
            return Err(BackendError::Transport(format!(
                "read_file failed: {}",
                out.stderr
            )));
        }
        base64::engine::general_purpose::STANDARD
            .decode(out.stdout.trim())
            .map_err(|e| BackendError::Transport(format!("invalid base64 from sandbox: {e}")))
    }

    async fn list_files(&self, dir: &str, glob: &str) -> Result<Vec<String>, BackendError> {
        let cmd = format!("ls -1 {dir}/{glob} 2>/dev/null | sort");
        let out = self.docker_exec(&cmd, 10).await?;
        Ok(out
            .stdout
            .lines()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }

    async fn file_size(&self, path: &str) -> Result<u64, BackendError> {
        let cmd = format!("stat -c%s {path}");
        let out = self.docker_exec(&cmd, 10).await?;
        out.stdout
            .trim()
            .parse()
            .map_err(|_| BackendError::Transport(format!("non-numeric file_size output for {path}")))
    }

    async fn mkdir(&self, path: &str) -> Result<(), BackendError> {
        let out = self.docker_exec(&format!("mkdir -p {path}"), 10).await?;
        if out.exit_code != 0 {
            return Err(BackendError::Transport(out.stderr));
        }
        Ok(())
    }

    async fn exec_command(
        &self,
        cmd: &str,
        workdir: Option<&str>,
        timeout_secs: u64,
    ) -> Result<ExecOutput, BackendError> {
        let full_cmd = match workdir {
            Some(wd) => format!("cd {wd} && {cmd}"),
            None => format!("cd {} && {cmd}", self.work_dir),
        };
        self.docker_exec(&full_cmd, timeout_secs).await
    }

    async fn setup_tool_links(&self, tool_dir: &str) -> Result<(), BackendError> {
        let cmd = format!(
            "src={tool_dir}/target/release; [ -d \"$src\" ] || src={tool_dir}/release; \
             mkdir -p {}/target/release && \
             for n in gen tester vis; do ln -sf \"$src/$n\" {}/target/release/$n 2>/dev/null || true; done",
            self.judge_dir, self.judge_dir
        );
        let out = self.docker_exec(&cmd, 15).await?;
        if out.exit_code != 0 {
            return Err(BackendError::Transport(out.stderr));
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn judge_dir(&self) -> &str {
        &self.judge_dir
    }

    fn work_dir(&self) -> &str {
        &self.work_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_prefix_suffix_and_wildcard() {
        assert!(glob_matches("*", "anything"));
        assert!(glob_matches("*.txt", "in0000.txt"));
        assert!(!glob_matches("*.txt", "in0000.json"));
        assert!(glob_matches("in*", "in0000.txt"));
        assert!(glob_matches("exact.txt", "exact.txt"));
    }

    #[tokio::test]
    async fn local_backend_write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            judge_dir: dir.path().join("judge").to_string_lossy().to_string(),
            work_dir: dir.path().join("work").to_string_lossy().to_string(),
            compile_timeout_secs: 5,
            generation_timeout_secs: 5,
            container_images: Default::default(),
            max_memory_bytes: 1 << 30,
            docker_api_version: None,
            docker_host: None,
        };
        let backend = LocalBackend::new(config);
        backend.write_file("hello.txt", b"hi there").await.unwrap();
        let back = backend.read_file("hello.txt").await.unwrap();
        assert_eq!(back, b"hi there");
        assert_eq!(backend.file_size("hello.txt").await.unwrap(), 8);
    }

    #[tokio::test]
    async fn local_backend_exec_command_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            judge_dir: dir.path().join("judge").to_string_lossy().to_string(),
            work_dir: dir.path().to_string_lossy().to_string(),
            compile_timeout_secs: 5,
            generation_timeout_secs: 5,
            container_images: Default::default(),
            max_memory_bytes: 1 << 30,
            docker_api_version: None,
            docker_host: None,
        };
        let backend = LocalBackend::new(config);
        let out = backend.exec_command("echo hi", None, 5).await.unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout.trim(), "hi");
    }
}
