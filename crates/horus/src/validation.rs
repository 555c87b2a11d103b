//! Argument validation for Session actions (§4.F "Argument validation"),
//! expressed as composable `olympus_rules::Specification` impls the way
//! Vanguard composes its authorization rules in `auth_rules.rs`.

use async_trait::async_trait;
use olympus_common::{Language, ToolchainVersion};
use olympus_rules::specification::Specification;

/// 512 KiB, the submission code size ceiling.
pub const MAX_CODE_BYTES: usize = 524_288;

/// 6 MiB, the floor every memory limit must clear once clamped to the
/// session's maximum.
pub const MIN_MEMORY_LIMIT_BYTES: u64 = 6 * 1024 * 1024;

/// Candidate values for one action's arguments, already parsed as far
/// as they can be without a database or clock. Each [`Specification`]
/// below inspects exactly one field.
pub struct ValidationContext {
    pub code_bytes: usize,
    pub language_known: bool,
    pub version_rejected: bool,
    pub time_limit: f64,
    pub memory_limit_bytes: u64,
}

pub struct CodeSizeValid;

#[async_trait]
impl Specification<ValidationContext> for CodeSizeValid {
    async fn is_satisfied_by(&self, ctx: &ValidationContext) -> bool {
        ctx.code_bytes > 0 && ctx.code_bytes <= MAX_CODE_BYTES
    }
}

pub struct LanguageVersionValid;

#[async_trait]
impl Specification<ValidationContext> for LanguageVersionValid {
    async fn is_satisfied_by(&self, ctx: &ValidationContext) -> bool {
        ctx.language_known && !ctx.version_rejected
    }
}

pub struct TimeLimitPositive;

#[async_trait]
impl Specification<ValidationContext> for TimeLimitPositive {
    async fn is_satisfied_by(&self, ctx: &ValidationContext) -> bool {
        ctx.time_limit > 0.0
    }
}

pub struct MemoryLimitValid;

#[async_trait]
impl Specification<ValidationContext> for MemoryLimitValid {
    async fn is_satisfied_by(&self, ctx: &ValidationContext) -> bool {
        ctx.memory_limit_bytes >= MIN_MEMORY_LIMIT_BYTES
    }
}

/// Parse a `code_language` argument, splitting off the cpp20/cpp23
/// standard hint the 201907 judge version rejects (§4.F "Argument
/// validation", `ToolchainVersion::rejects_cpp_standard`).
pub fn resolve_language(raw: &str) -> Result<(Language, String), String> {
    let lower = raw.to_ascii_lowercase();
    if lower == "cpp20" || lower == "cpp23" {
        return Ok((Language::Cpp, lower));
    }
    let language: Language = raw.parse()?;
    Ok((language, lower))
}

/// Parse a `memory_limit` argument (plain integer or `b`/`k`/`m`/`g`
/// suffixed string, case-insensitive), then clamp to the session's
/// global maximum. Whether the clamped result still clears the 6 MiB
/// floor is checked separately by [`MemoryLimitValid`].
pub fn parse_memory_limit(raw: &str, max_memory_limit_bytes: u64) -> Result<u64, String> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let (digits, multiplier): (&str, u64) = if let Some(d) = lower.strip_suffix('b') {
        (d, 1)
    } else if let Some(d) = lower.strip_suffix('k') {
        (d, 1024)
    } else if let Some(d) = lower.strip_suffix('m') {
        (d, 1024 * 1024)
    } else if let Some(d) = lower.strip_suffix('g') {
        (d, 1024 * 1024 * 1024)
    } else {
        (lower.as_str(), 1)
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| "invalid `memory_limit` format. Use 'b', 'k', 'm', or 'g' suffixes".to_string())?;
    Ok((value * multiplier).min(max_memory_limit_bytes))
}

/// Compose the four run-cases-shaped rules into one gate and report
/// which failed first, in the order §4.F lists them.
pub async fn validate_run_cases_arguments(ctx: &ValidationContext) -> Result<(), String> {
    if !CodeSizeValid.is_satisfied_by(ctx).await {
        return Err("`code` must be non-empty and at most 524288 bytes".to_string());
    }
    if !LanguageVersionValid.is_satisfied_by(ctx).await {
        return Err("unknown language, or judge version 201907 does not support C++20/C++23".to_string());
    }
    if !TimeLimitPositive.is_satisfied_by(ctx).await {
        return Err("`time_limit` must be positive".to_string());
    }
    if !MemoryLimitValid.is_satisfied_by(ctx).await {
        return Err("`memory_limit` must be greater than or equal to 6MB".to_string());
    }
    Ok(())
}

/// §4.F: `seed` must fit in an unsigned 64-bit integer (always true for
/// the Rust `u64` type) and `gen_kwargs` drops the reserved `dir` key.
pub fn sanitise_gen_kwargs(gen_kwargs: std::collections::BTreeMap<String, String>) -> std::collections::BTreeMap<String, String> {
    let mut gen_kwargs = gen_kwargs;
    if gen_kwargs.remove("dir").is_some() {
        tracing::warn!("`dir` is a reserved gen_kwargs key and was ignored");
    }
    gen_kwargs
}

pub fn default_version() -> String {
    ToolchainVersion::DEFAULT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn code_size_rejects_empty_and_oversize() {
        assert!(!CodeSizeValid.is_satisfied_by(&ctx_with_code(0)).await);
        assert!(!CodeSizeValid.is_satisfied_by(&ctx_with_code(MAX_CODE_BYTES + 1)).await);
        assert!(CodeSizeValid.is_satisfied_by(&ctx_with_code(10)).await);
    }

    fn ctx_with_code(code_bytes: usize) -> ValidationContext {
        ValidationContext {
            code_bytes,
            language_known: true,
            version_rejected: false,
            time_limit: 2.0,
            memory_limit_bytes: MIN_MEMORY_LIMIT_BYTES,
        }
    }

    #[test]
    fn resolve_language_splits_off_cpp_standard_hint() {
        assert_eq!(resolve_language("cpp20").unwrap(), (Language::Cpp, "cpp20".to_string()));
        assert_eq!(resolve_language("rust").unwrap(), (Language::Rust, "rust".to_string()));
        assert!(resolve_language("brainfuck").is_err());
    }

    #[test]
    fn parse_memory_limit_applies_suffix_and_clamp() {
        assert_eq!(parse_memory_limit("512m", 1 << 30), 512 * 1024 * 1024);
        assert_eq!(parse_memory_limit("4g", 1 << 30), 1 << 30);
        assert_eq!(parse_memory_limit("1024", 1 << 30), 1024);
        assert!(parse_memory_limit("nonsense", 1 << 30).is_err());
    }

    #[test]
    fn sanitise_gen_kwargs_drops_reserved_dir_key() {
        let mut kwargs = std::collections::BTreeMap::new();
        kwargs.insert("dir".to_string(), "/tmp/x".to_string());
        kwargs.insert("n".to_string(), "10".to_string());
        let cleaned = sanitise_gen_kwargs(kwargs);
        assert!(!cleaned.contains_key("dir"));
        assert_eq!(cleaned.get("n"), Some(&"10".to_string()));
    }
}
