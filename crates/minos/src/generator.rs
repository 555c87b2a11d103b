//! Input Generator Wrapper (§4.D): `gen [--key=value]... seeds.txt` → a
//! list of input strings in seed order.

use std::collections::BTreeMap;
use std::sync::Arc;

use sisyphus::Backend;

use crate::error::GenerationError;

/// Write the seed list, run `gen`, and collect the produced inputs in
/// seed order (§4.D steps 1-6).
pub async fn generate_inputs(
    seeds: &[u64],
    gen_kwargs: &BTreeMap<String, String>,
    tool_dir: &str,
    backend: &Arc<dyn Backend>,
    timeout_secs: u64,
) -> Result<Vec<String>, GenerationError> {
    if gen_kwargs.contains_key("dir") {
        tracing::warn!("ignoring reserved gen_kwargs key \"dir\"");
    }

    let seeds_txt = seeds
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        + if seeds.is_empty() { "" } else { "\n" };
    backend
        .write_file(&format!("{tool_dir}/seeds.txt"), seeds_txt.as_bytes())
        .await?;

    let in_dir = format!("{tool_dir}/in");
    backend
        .exec_command(&format!("rm -rf {in_dir} && mkdir -p {in_dir}"), None, 30)
        .await?;

    let mut cmd = String::from("./target/release/gen");
    for (key, value) in gen_kwargs {
        if key == "dir" {
            continue;
        }
        cmd.push_str(&format!(" --{key}={value}"));
    }
    cmd.push_str(" seeds.txt");

    let output = backend
        .exec_command(&cmd, Some(tool_dir), timeout_secs)
        .await?;
    if output.exit_code != 0 {
        return Err(GenerationError::NonZeroExit(output.stderr));
    }

    let names = backend.list_files(&in_dir, "*.txt").await?;
    if names.is_empty() {
        return Err(GenerationError::MissingOutputDir);
    }

    let expected: Vec<String> = (0..names.len())
        .map(|i| format!("{i:04}.txt"))
        .collect();
    if names != expected {
        return Err(GenerationError::NamingMismatch(format!(
            "expected {:?}, got {:?}",
            expected, names
        )));
    }

    let mut inputs = Vec::with_capacity(names.len());
    for name in &names {
        let bytes = backend.read_file(&format!("{in_dir}/{name}")).await?;
        inputs.push(String::from_utf8_lossy(&bytes).to_string());
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sisyphus::{Config, LocalBackend};

    fn make_backend(dir: &std::path::Path) -> Arc<dyn Backend> {
        let config = Config {
            judge_dir: dir.join("judge").to_string_lossy().to_string(),
            work_dir: dir.to_string_lossy().to_string(),
            compile_timeout_secs: 5,
            generation_timeout_secs: 5,
            container_images: Default::default(),
            max_memory_bytes: 1 << 30,
            docker_api_version: None,
            docker_host: None,
        };
        Arc::new(LocalBackend::new(config))
    }

    #[tokio::test]
    async fn rejects_naming_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let backend = make_backend(dir.path());
        // stub "gen" as a script writing one wrongly-named file
        let tool_dir = dir.path().to_string_lossy().to_string();
        tokio::fs::create_dir_all(dir.path().join("target/release"))
            .await
            .unwrap();
        tokio::fs::write(
            dir.path().join("target/release/gen"),
            "#!/bin/sh\nmkdir -p in && echo hi > in/case1.txt\n",
        )
        .await
        .unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(
                dir.path().join("target/release/gen"),
                std::fs::Permissions::from_mode(0o755),
            )
            .await
            .unwrap();
        }

        let result = generate_inputs(&[1, 2], &BTreeMap::new(), &tool_dir, &backend, 5).await;
        assert!(matches!(result, Err(GenerationError::NamingMismatch(_))));
    }

    #[tokio::test]
    async fn non_zero_exit_surfaces_as_generation_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = make_backend(dir.path());
        let tool_dir = dir.path().to_string_lossy().to_string();
        tokio::fs::create_dir_all(dir.path().join("target/release"))
            .await
            .unwrap();
        tokio::fs::write(
            dir.path().join("target/release/gen"),
            "#!/bin/sh\necho boom 1>&2\nexit 1\n",
        )
        .await
        .unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(
                dir.path().join("target/release/gen"),
                std::fs::Permissions::from_mode(0o755),
            )
            .await
            .unwrap();
        }

        let result = generate_inputs(&[1], &BTreeMap::new(), &tool_dir, &backend, 5).await;
        assert!(matches!(result, Err(GenerationError::NonZeroExit(_))));
    }
}
