//! `(language, toolchain_version)` → compile/run command lookup
//! (§4.C "Compilation phase" step 2).

use olympus_common::Language;

/// Commands needed to build and then invoke a submission.
pub struct Toolchain {
    /// Source file name written under the working directory.
    pub source_file: &'static str,
    /// Shell command that compiles `source_file` into the canonical
    /// object artefact at `/tmp/object.<ext2>`, or (for the dynamic
    /// interpreter) performs a syntax check instead.
    pub compile_command: String,
    /// Shell command that runs the compiled/interpreted solution,
    /// reading stdin and writing stdout (the BATCH/REACTIVE pipelines
    /// redirect these themselves).
    pub run_command: String,
}

/// Look up the toolchain for a language. `toolchain_version` currently
/// only gates the one rejected combination named in §4.F
/// (`ToolchainVersion::rejects_cpp_standard`); callers must check that
/// separately before calling this.
pub fn resolve(language: Language, object_ext: &str) -> Toolchain {
    match language {
        Language::C => Toolchain {
            source_file: "submission.c",
            compile_command: format!(
                "gcc -O2 -std=c11 -o /tmp/object.{object_ext} submission.c"
            ),
            run_command: format!("/tmp/object.{object_ext}"),
        },
        Language::Cpp => Toolchain {
            source_file: "submission.cpp",
            compile_command: format!(
                "g++ -O2 -std=c++17 -o /tmp/object.{object_ext} submission.cpp"
            ),
            run_command: format!("/tmp/object.{object_ext}"),
        },
        Language::Rust => Toolchain {
            source_file: "submission.rs",
            compile_command: format!("rustc -O -o /tmp/object.{object_ext} submission.rs"),
            run_command: format!("/tmp/object.{object_ext}"),
        },
        Language::Go => Toolchain {
            source_file: "submission.go",
            compile_command: format!("go build -o /tmp/object.{object_ext} submission.go"),
            run_command: format!("/tmp/object.{object_ext}"),
        },
        Language::Zig => Toolchain {
            source_file: "submission.zig",
            compile_command: format!(
                "zig build-exe -O ReleaseFast -femit-bin=/tmp/object.{object_ext} submission.zig"
            ),
            run_command: format!("/tmp/object.{object_ext}"),
        },
        Language::Python => Toolchain {
            source_file: "submission.py",
            compile_command: "python3 -m py_compile submission.py".to_string(),
            run_command: "python3 submission.py".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_resolves_to_a_non_empty_toolchain() {
        for lang in [
            Language::C,
            Language::Cpp,
            Language::Rust,
            Language::Go,
            Language::Zig,
            Language::Python,
        ] {
            let tc = resolve(lang, "bin");
            assert!(!tc.source_file.is_empty());
            assert!(!tc.compile_command.is_empty());
            assert!(!tc.run_command.is_empty());
        }
    }

    #[test]
    fn python_run_command_invokes_the_interpreter_directly() {
        let tc = resolve(Language::Python, "bin");
        assert_eq!(tc.run_command, "python3 submission.py");
    }
}
