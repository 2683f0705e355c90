use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn get_counsel_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_counsel"))
}

fn run_counsel(args: &[&str]) -> Output {
    Command::new(get_counsel_binary())
        .args(args)
        .output()
        .expect("Failed to execute counsel command")
}

/// Runs with a throwaway home so no saved handoff or config file leaks in.
fn run_counsel_isolated(args: &[&str], home: &Path) -> Output {
    Command::new(get_counsel_binary())
        .args(args)
        .current_dir(home)
        .env("HOME", home)
        .env("XDG_CACHE_HOME", home.join(".cache"))
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("COUNSEL_API_URL", "http://127.0.0.1:9")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute counsel command")
}

fn output_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod version_command_tests {
    use super::*;

    #[test]
    fn test_version_command_basic() {
        let output = run_counsel(&["version"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version command should succeed");
        assert!(stdout.contains("counsel"), "output should contain 'counsel'");
        assert!(
            stdout.contains(env!("CARGO_PKG_VERSION")),
            "output should contain version number"
        );
    }

    #[test]
    fn test_version_command_detailed() {
        let output = run_counsel(&["version", "--detailed"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version --detailed should succeed");
        assert!(stdout.contains("Version"), "output should contain 'Version'");
        assert!(
            stdout.contains("Council Agents"),
            "output should list the council"
        );
        for agent in ["Harvey", "Louis", "Tanner", "Jessica"] {
            assert!(stdout.contains(agent), "output should mention {}", agent);
        }
    }
}

mod help_command_tests {
    use super::*;

    #[test]
    fn test_help_command() {
        let output = run_counsel(&["--help"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "--help should succeed");
        assert!(stdout.contains("Counsel"), "help should mention Counsel");
        for command in ["submit", "watch", "results", "render", "version"] {
            assert!(stdout.contains(command), "help should mention {}", command);
        }
    }

    #[test]
    fn test_submit_help_lists_form_flags() {
        let output = run_counsel(&["submit", "--help"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "submit --help should succeed");
        for flag in ["--file", "--plaintiff", "--jurisdiction", "--range", "--confirm"] {
            assert!(stdout.contains(flag), "submit help should mention {}", flag);
        }
    }

    #[test]
    fn test_unknown_command_fails() {
        let output = run_counsel(&["deliberate"]);
        assert!(!output.status.success(), "unknown command should fail");
    }
}

mod render_command_tests {
    use super::*;

    #[test]
    fn test_render_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("strategy.md");
        std::fs::write(&file, "**Strategy**\n\n- File a motion\n- Seek settlement").unwrap();

        let output = run_counsel(&["render", file.to_str().unwrap()]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "render should succeed");
        assert!(stdout.contains("Strategy"));
        assert!(!stdout.contains("**"), "bold markers should be stripped");
        assert!(stdout.contains("• File a motion"));
        assert!(stdout.contains("• Seek settlement"));
    }

    #[test]
    fn test_render_rationale_json() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("rationale.json");
        std::fs::write(
            &file,
            r#"{"risk_assessment": "Moderate", "key_precedents": ["Smith v. Jones"]}"#,
        )
        .unwrap();

        let output = run_counsel(&["render", "--rationale", file.to_str().unwrap()]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "render --rationale should succeed");
        assert!(stdout.contains("Risk Assessment"));
        assert!(stdout.contains("Key Precedents"));
        assert!(stdout.contains("Smith v. Jones"));
    }

    #[test]
    fn test_render_missing_file_fails() {
        let output = run_counsel(&["render", "/nonexistent/counsel/strategy.md"]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("Failed to read"));
    }
}

mod case_command_tests {
    use super::*;

    #[test]
    fn test_results_without_case_id_fails() {
        let home = tempfile::tempdir().unwrap();
        let output = run_counsel_isolated(&["results"], home.path());
        let stderr = stderr_to_string(&output);

        assert!(!output.status.success(), "results without a case should fail");
        assert!(stderr.contains("E5002"), "stderr should carry the error code: {}", stderr);
    }

    #[test]
    fn test_submit_incomplete_form_fails() {
        let home = tempfile::tempdir().unwrap();
        let output = run_counsel_isolated(
            &["submit", "--title", "Acme v. Widgets", "--plaintiff", "Acme Corp"],
            home.path(),
        );
        let stdout = output_to_string(&output);
        let stderr = stderr_to_string(&output);

        assert!(!output.status.success());
        assert!(stdout.contains("Case Summary"));
        assert!(stdout.contains("missing defendant"));
        assert!(stderr.contains("E4001"), "stderr: {}", stderr);
    }

    #[test]
    fn test_submit_without_confirm_does_not_send() {
        let home = tempfile::tempdir().unwrap();
        let output = run_counsel_isolated(
            &[
                "submit",
                "--title",
                "Acme v. Widgets",
                "--case-type",
                "Contract Dispute",
                "--plaintiff",
                "Acme Corp",
                "--defendant",
                "Widgets LLC",
                "--jurisdiction",
                "Delaware",
                "--amount",
                "2500000",
            ],
            home.path(),
        );
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "stderr: {}", stderr_to_string(&output));
        assert!(stdout.contains("--confirm"));
        assert!(stdout.contains("$1M - $5M"));
    }
}
