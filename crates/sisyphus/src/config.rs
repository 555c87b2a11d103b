//! Configuration for the execution backend (§6.1 supplemented env vars).

use std::env;

/// Backend configuration, loaded once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory where judge binaries (gen/tester/vis) live.
    /// `ENGINE_JUDGE_DIR`, default `/tmp/olympus-judge`.
    pub judge_dir: String,
    /// Directory for submission code and per-case working files.
    /// `ENGINE_WORK_DIR`, default `/tmp/olympus-workdir`.
    pub work_dir: String,
    /// Fixed wall-clock cap on the compilation phase (§4.C step 2).
    /// `ENGINE_COMPILE_TIMEOUT_SECS`, default 60.
    pub compile_timeout_secs: u64,
    /// Fixed wall-clock cap on input generation (§4.D step 4).
    /// `ENGINE_GENERATION_TIMEOUT_SECS`, default 30.
    pub generation_timeout_secs: u64,
    /// Per-language Docker image overrides, reused from the container
    /// image-resolution table.
    pub container_images: ContainerImages,
    /// Memory cap applied to sandboxed runs (§5 resource constraints).
    /// `ENGINE_MAX_MEMORY_LIMIT_BYTES`, default 2GiB.
    pub max_memory_bytes: u64,
    /// Docker API version to negotiate with the daemon, if set.
    pub docker_api_version: Option<String>,
    /// `DOCKER_HOST` passthrough for the Docker CLI/daemon client.
    pub docker_host: Option<String>,
}

/// Per-language Docker image overrides.
#[derive(Debug, Clone, Default)]
pub struct ContainerImages {
    pub cpp: Option<String>,
    pub c: Option<String>,
    pub rust: Option<String>,
    pub go: Option<String>,
    pub python: Option<String>,
    pub zig: Option<String>,
    pub generic: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            judge_dir: env::var("ENGINE_JUDGE_DIR").unwrap_or_else(|_| "/tmp/olympus-judge".into()),
            work_dir: env::var("ENGINE_WORK_DIR").unwrap_or_else(|_| "/tmp/olympus-workdir".into()),
            compile_timeout_secs: env::var("ENGINE_COMPILE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            generation_timeout_secs: env::var("ENGINE_GENERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            container_images: ContainerImages {
                cpp: env::var("CONTAINER_IMAGE_CPP").ok(),
                c: env::var("CONTAINER_IMAGE_C").ok(),
                rust: env::var("CONTAINER_IMAGE_RUST").ok(),
                go: env::var("CONTAINER_IMAGE_GO").ok(),
                python: env::var("CONTAINER_IMAGE_PYTHON").ok(),
                zig: env::var("CONTAINER_IMAGE_ZIG").ok(),
                generic: env::var("CONTAINER_IMAGE_GENERIC").ok(),
            },
            max_memory_bytes: env::var("ENGINE_MAX_MEMORY_LIMIT_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2 * 1024 * 1024 * 1024),
            docker_api_version: env::var("DOCKER_API_VERSION").ok(),
            docker_host: env::var("DOCKER_HOST").ok(),
        }
    }

    /// Resolve the container image for a language string (§4.A.1's
    /// local strategy resource-isolation layering).
    pub fn resolve_image(&self, language: Option<&str>) -> String {
        let lang = language.unwrap_or("generic");
        match lang {
            "cpp" | "c++" => self.container_images.cpp.clone(),
            "c" => self.container_images.c.clone(),
            "rust" => self.container_images.rust.clone(),
            "go" => self.container_images.go.clone(),
            "python" => self.container_images.python.clone(),
            "zig" => self.container_images.zig.clone(),
            _ => self.container_images.generic.clone(),
        }
        .unwrap_or_else(|| match lang {
            "cpp" | "c++" | "c" => "gcc:14".to_string(),
            "rust" => "rust:1.85-bookworm".to_string(),
            "go" => "golang:1.23-bookworm".to_string(),
            "python" => "python:3.12-bookworm".to_string(),
            "zig" => "euantorano/zig:0.13.0".to_string(),
            _ => "ubuntu:24.04".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_image_falls_back_to_builtin_defaults() {
        let config = Config {
            judge_dir: "/tmp/j".into(),
            work_dir: "/tmp/w".into(),
            compile_timeout_secs: 60,
            generation_timeout_secs: 30,
            container_images: ContainerImages::default(),
            max_memory_bytes: 1 << 31,
            docker_api_version: None,
            docker_host: None,
        };
        assert_eq!(config.resolve_image(Some("rust")), "rust:1.85-bookworm");
        assert_eq!(config.resolve_image(None), "ubuntu:24.04");
    }
}
