//! The immutable problem bundle a [`crate::Session`] is built around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether the solution reads stdin once and writes stdout once (the
/// tester scores the file afterwards), or is driven interactively by the
/// tester acting as middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProblemType {
    Batch,
    Reactive,
}

/// Whether a higher or a lower raw score is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScoreType {
    Maximize,
    Minimize,
}

/// A supported submission language. `Python` is the one dynamic
/// interpreter the compilation phase treats specially (§4.C rule 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Rust,
    Go,
    Zig,
    Python,
}

impl Language {
    pub fn is_interpreted(self) -> bool {
        matches!(self, Language::Python)
    }

    pub fn source_extension(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Rust => "rs",
            Language::Go => "go",
            Language::Zig => "zig",
            Language::Python => "py",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Zig => "zig",
            Language::Python => "python",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(Language::C),
            "cpp" | "c++" => Ok(Language::Cpp),
            "rust" | "rs" => Ok(Language::Rust),
            "go" | "golang" => Ok(Language::Go),
            "zig" => Ok(Language::Zig),
            "python" | "py" => Ok(Language::Python),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// A toolchain version tag, e.g. `"202301"`. Kept as an opaque newtype
/// rather than an enum because new toolchain releases are added by
/// problem-loader data, not by recompiling the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolchainVersion(pub String);

impl ToolchainVersion {
    pub const DEFAULT: &'static str = "202301";

    pub fn default_version() -> Self {
        ToolchainVersion(Self::DEFAULT.to_string())
    }

    /// The one rejected (version, language) combination named in §4.F:
    /// judge version 201907 never supported C++20/23.
    pub fn rejects_cpp_standard(&self, language: Language, standard_hint: &str) -> bool {
        self.0 == "201907"
            && language == Language::Cpp
            && (standard_hint.eq_ignore_ascii_case("cpp20")
                || standard_hint.eq_ignore_ascii_case("cpp23"))
    }
}

impl Default for ToolchainVersion {
    fn default() -> Self {
        Self::default_version()
    }
}

/// Immutable bundle loaded once per session (§3 "Problem").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub problem_id: String,
    pub problem_type: ProblemType,
    pub score_type: ScoreType,
    pub time_limit_seconds: f64,
    pub memory_limit_bytes: u64,
    pub tool_dir: PathBuf,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Whether `allow_score_non_ac` should be set for `public_eval`
    /// (the per-problem "lenient scoring" set referenced in §4.F).
    pub lenient_public_scoring: bool,
    /// Whether this problem is known to produce empty visualiser output
    /// (§9 Open Question 3: treated as INTERNAL_ERROR, never silently
    /// skipped).
    pub visualisation_known_empty: bool,
}

impl Problem {
    /// The problem-derived submission interval referenced in §4.F
    /// "Submission interval": 300s for contests under 24h, 1800s for
    /// longer ones.
    pub fn submission_interval_seconds(&self) -> i64 {
        let duration = self.end_at - self.start_at;
        if duration <= chrono::Duration::hours(24) {
            300
        } else {
            1800
        }
    }
}

/// Two disjoint seed lists consumed at session init (§3 "Seeds").
/// `private` is never exposed through any public accessor once wrapped
/// into a [`crate::Session`] — see the session crate's deliberately
/// NoReturn-style `private_seeds` accessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seeds {
    pub public_seeds: Vec<u64>,
    pub private_seeds: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_round_trips_through_display_and_fromstr() {
        for lang in [
            Language::C,
            Language::Cpp,
            Language::Rust,
            Language::Go,
            Language::Zig,
            Language::Python,
        ] {
            let s = lang.to_string();
            let parsed: Language = s.parse().unwrap();
            assert_eq!(parsed, lang);
        }
    }

    #[test]
    fn rejects_the_one_named_version_language_combination() {
        let v = ToolchainVersion("201907".to_string());
        assert!(v.rejects_cpp_standard(Language::Cpp, "cpp20"));
        assert!(v.rejects_cpp_standard(Language::Cpp, "CPP23"));
        assert!(!v.rejects_cpp_standard(Language::Cpp, "cpp17"));
        assert!(!v.rejects_cpp_standard(Language::Rust, "cpp20"));
    }

    #[test]
    fn submission_interval_depends_on_contest_length() {
        let short = Problem {
            problem_id: "a".into(),
            problem_type: ProblemType::Batch,
            score_type: ScoreType::Maximize,
            time_limit_seconds: 2.0,
            memory_limit_bytes: 1 << 30,
            tool_dir: PathBuf::from("/tmp"),
            start_at: DateTime::UNIX_EPOCH,
            end_at: DateTime::UNIX_EPOCH + chrono::Duration::hours(4),
            lenient_public_scoring: false,
            visualisation_known_empty: false,
        };
        assert_eq!(short.submission_interval_seconds(), 300);

        let mut long = short.clone();
        long.end_at = short.start_at + chrono::Duration::days(7);
        assert_eq!(long.submission_interval_seconds(), 1800);
    }
}
