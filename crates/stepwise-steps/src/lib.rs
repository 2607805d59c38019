//! # stepwise-steps
//!
//! Configured provisioning steps for the stepwise runner.
//!
//! Each `[[steps]]` entry becomes a [`ProvisionStep`] whose `ActionKind`
//! selects a dedicated precondition and executor function:
//!
//! 1. **package-install**: package manager query, then install.
//! 2. **feature-toggle**: feature query, then enable.
//! 3. **file-write**: SHA-256 comparison of current and desired contents,
//!    then write.
//! 4. **registry-edit**: settings store read, then write.
//! 5. **command**: optional check argv, then run argv.
//!
//! Any step may also name an `unless_command`; when that program is on
//! `PATH` the step is already satisfied.

pub mod actions;
pub mod backend;
pub mod step;

pub use actions::Collaborators;
pub use backend::CommandBackend;
pub use step::{build_registry, ProvisionStep};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::fs;
    use std::sync::{Arc, Mutex};

    use stepwise_config::RunConfig;
    use stepwise_contracts::{
        error::{StepwiseError, StepwiseResult},
        run::{OverallStatus, RunId},
        step::StepStatus,
    };
    use stepwise_core::{
        registry::Selection,
        traits::{FeatureToggler, PackageManager, SettingsStore, StepContext},
        Executor,
    };
    use stepwise_log::MemoryLogSink;

    use super::{actions::digest, build_registry, Collaborators};

    // ── Fake machine ──────────────────────────────────────────────────────────

    /// An in-memory machine state standing in for choco / dism / reg.
    #[derive(Default)]
    struct FakeMachine {
        packages: Mutex<HashSet<String>>,
        features: Mutex<HashSet<String>>,
        settings: Mutex<HashMap<(String, String), String>>,
        /// Packages whose install always fails.
        broken: HashSet<String>,
        installs: Mutex<Vec<String>>,
    }

    impl PackageManager for FakeMachine {
        fn is_installed(&self, package: &str) -> StepwiseResult<bool> {
            Ok(self.packages.lock().unwrap().contains(package))
        }

        fn install(&self, package: &str) -> StepwiseResult<()> {
            self.installs.lock().unwrap().push(package.to_string());
            if self.broken.contains(package) {
                return Err(StepwiseError::CollaboratorFailed {
                    operation: "package install".to_string(),
                    reason: format!("{} is not available", package),
                });
            }
            self.packages.lock().unwrap().insert(package.to_string());
            Ok(())
        }
    }

    impl FeatureToggler for FakeMachine {
        fn is_enabled(&self, feature: &str) -> StepwiseResult<bool> {
            Ok(self.features.lock().unwrap().contains(feature))
        }

        fn enable(&self, feature: &str) -> StepwiseResult<()> {
            self.features.lock().unwrap().insert(feature.to_string());
            Ok(())
        }
    }

    impl SettingsStore for FakeMachine {
        fn read(&self, key: &str, name: &str) -> StepwiseResult<Option<String>> {
            Ok(self
                .settings
                .lock()
                .unwrap()
                .get(&(key.to_string(), name.to_string()))
                .cloned())
        }

        fn write(&self, key: &str, name: &str, value: &str) -> StepwiseResult<()> {
            self.settings
                .lock()
                .unwrap()
                .insert((key.to_string(), name.to_string()), value.to_string());
            Ok(())
        }
    }

    fn collaborators(machine: &Arc<FakeMachine>) -> Collaborators {
        Collaborators {
            packages: machine.clone(),
            features: machine.clone(),
            settings: machine.clone(),
        }
    }

    const BACKEND: &str = r#"
        [backend]
        package_query = ["unused"]
        package_install = ["unused"]
        feature_query = ["unused"]
        feature_enable = ["unused"]
        setting_query = ["unused"]
        setting_set = ["unused"]
    "#;

    fn config(steps: &str) -> RunConfig {
        RunConfig::from_toml_str(&format!("{}\n{}", BACKEND, steps)).unwrap()
    }

    fn run(config: &RunConfig, machine: &Arc<FakeMachine>) -> stepwise_contracts::run::RunReport {
        let registry = build_registry(config, &collaborators(machine)).unwrap();
        let steps = config.selection().select(&registry);
        Executor::new(config.policy()).run(&steps, &MemoryLogSink::new())
    }

    fn statuses(report: &stepwise_contracts::run::RunReport) -> Vec<StepStatus> {
        report.outcomes.iter().map(|o| o.status).collect()
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    #[test]
    fn workstation_run_then_rerun_is_all_skipped() {
        let machine = Arc::new(FakeMachine::default());
        let config = config(
            r#"
            [[steps]]
            name = "enable-wsl"
            kind = "feature-toggle"
            feature = "Microsoft-Windows-Subsystem-Linux"

            [[steps]]
            name = "install-git"
            kind = "package-install"
            package = "git"

            [[steps]]
            name = "dark-mode"
            kind = "registry-edit"
            key = 'HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize'
            value_name = "AppsUseLightTheme"
            value = "0"
            "#,
        );

        let first = run(&config, &machine);
        assert_eq!(statuses(&first), vec![StepStatus::Succeeded; 3]);

        let second = run(&config, &machine);
        assert_eq!(statuses(&second), vec![StepStatus::Skipped; 3]);
        assert_eq!(machine.installs.lock().unwrap().len(), 1, "git installed exactly once");
    }

    #[test]
    fn optional_package_failure_is_a_warning() {
        let machine = Arc::new(FakeMachine {
            broken: ["docker-desktop".to_string()].into_iter().collect(),
            ..FakeMachine::default()
        });
        machine.packages.lock().unwrap().insert("vscode".to_string());

        let config = config(
            r#"
            [[steps]]
            name = "install-git"
            kind = "package-install"
            package = "git"

            [[steps]]
            name = "install-vscode"
            kind = "package-install"
            package = "vscode"

            [[steps]]
            name = "install-docker"
            required = false
            kind = "package-install"
            package = "docker-desktop"
            "#,
        );

        let report = run(&config, &machine);
        assert_eq!(
            statuses(&report),
            vec![StepStatus::Succeeded, StepStatus::Skipped, StepStatus::Warned]
        );
        assert_eq!(report.overall_status, OverallStatus::SuccessWithWarnings);
        assert!(report.outcomes[2].message.contains("docker-desktop is not available"));
    }

    #[test]
    fn apply_failure_names_the_step() {
        let machine = Arc::new(FakeMachine {
            broken: ["docker-desktop".to_string()].into_iter().collect(),
            ..FakeMachine::default()
        });
        let config = config(
            r#"
            [[steps]]
            name = "install-docker"
            kind = "package-install"
            package = "docker-desktop"
            "#,
        );
        let registry = build_registry(&config, &collaborators(&machine)).unwrap();
        let step = registry.get("install-docker").unwrap();
        let run_id = RunId::new();
        let sink = MemoryLogSink::new();
        let ctx = StepContext { run_id: &run_id, sink: &sink };

        match step.apply(&ctx) {
            Err(StepwiseError::StepActionFailed { step, reason }) => {
                assert_eq!(step, "install-docker");
                assert!(reason.contains("package install failed"), "{}", reason);
            }
            other => panic!("expected StepActionFailed, got {:?}", other),
        }
    }

    #[test]
    fn required_package_failure_aborts_before_later_steps() {
        let machine = Arc::new(FakeMachine {
            broken: ["chocolatey".to_string()].into_iter().collect(),
            ..FakeMachine::default()
        });
        let config = config(
            r#"
            [[steps]]
            name = "install-choco"
            kind = "package-install"
            package = "chocolatey"

            [[steps]]
            name = "install-git"
            kind = "package-install"
            package = "git"
            "#,
        );

        let report = run(&config, &machine);
        assert_eq!(statuses(&report), vec![StepStatus::Failed]);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(*machine.installs.lock().unwrap(), vec!["chocolatey"]);
    }

    #[test]
    fn skip_tag_from_config_leaves_steps_out() {
        let machine = Arc::new(FakeMachine::default());
        let config = config(
            r#"
            [run]
            skip = ["wsl"]

            [[steps]]
            name = "enable-wsl"
            tags = ["wsl"]
            kind = "feature-toggle"
            feature = "VirtualMachinePlatform"

            [[steps]]
            name = "install-git"
            kind = "package-install"
            package = "git"
            "#,
        );

        let report = run(&config, &machine);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].step_name, "install-git");
        assert!(machine.features.lock().unwrap().is_empty());
    }

    #[test]
    fn duplicate_configured_names_are_rejected() {
        let machine = Arc::new(FakeMachine::default());
        let config = config(
            r#"
            [[steps]]
            name = "install-git"
            kind = "package-install"
            package = "git"

            [[steps]]
            name = "install-git"
            kind = "package-install"
            package = "git-lfs"
            "#,
        );

        match build_registry(&config, &collaborators(&machine)) {
            Err(StepwiseError::DuplicateStepName { name }) => assert_eq!(name, "install-git"),
            Err(other) => panic!("expected DuplicateStepName, got {:?}", other),
            Ok(_) => panic!("expected DuplicateStepName, got a registry"),
        }
    }

    // ── File writes ───────────────────────────────────────────────────────────

    #[test]
    fn file_write_is_idempotent_by_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home").join(".gitconfig");
        let machine = Arc::new(FakeMachine::default());
        let config = config(&format!(
            r#"
            [[steps]]
            name = "gitconfig"
            kind = "file-write"
            path = '{}'
            contents = "[core]\n\tautocrlf = input\n"
            "#,
            path.display()
        ));

        assert_eq!(statuses(&run(&config, &machine)), vec![StepStatus::Succeeded]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[core]\n\tautocrlf = input\n");
        assert_eq!(statuses(&run(&config, &machine)), vec![StepStatus::Skipped]);

        // Drift is repaired on the next run.
        fs::write(&path, "[core]\n").unwrap();
        assert_eq!(statuses(&run(&config, &machine)), vec![StepStatus::Succeeded]);
    }

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    // ── Commands and PATH checks ──────────────────────────────────────────────

    #[cfg(unix)]
    #[test]
    fn command_step_honours_check_and_exit_status() {
        let machine = Arc::new(FakeMachine::default());
        let config = config(
            r#"
            [run]
            stop_on_required_failure = false

            [[steps]]
            name = "already-done"
            kind = "command"
            check = ["sh", "-c", "exit 0"]
            run = ["sh", "-c", "exit 1"]

            [[steps]]
            name = "runs"
            kind = "command"
            run = ["sh", "-c", "exit 0"]

            [[steps]]
            name = "fails"
            kind = "command"
            run = ["sh", "-c", "echo broken >&2; exit 2"]
            "#,
        );

        let report = run(&config, &machine);
        assert_eq!(
            statuses(&report),
            vec![StepStatus::Skipped, StepStatus::Succeeded, StepStatus::Failed]
        );
        assert!(report.outcomes[2].message.contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn unless_command_on_path_skips_the_step() {
        let machine = Arc::new(FakeMachine::default());
        let config = config(
            r#"
            [[steps]]
            name = "install-shell"
            kind = "package-install"
            package = "sh"
            unless_command = "sh"

            [[steps]]
            name = "install-missing-tool"
            kind = "package-install"
            package = "missing-tool"
            unless_command = "stepwise-definitely-not-installed-xyz"
            "#,
        );

        let report = run(&config, &machine);
        assert_eq!(statuses(&report), vec![StepStatus::Skipped, StepStatus::Succeeded]);
        assert_eq!(*machine.installs.lock().unwrap(), vec!["missing-tool"]);
    }

    #[test]
    fn selection_validation_uses_configured_tags() {
        let machine = Arc::new(FakeMachine::default());
        let config = config(
            r#"
            [[steps]]
            name = "install-git"
            tags = ["git"]
            kind = "package-install"
            package = "git"
            "#,
        );
        let registry = build_registry(&config, &collaborators(&machine)).unwrap();

        let ok = Selection { only: vec!["git".to_string()], skip: vec![] };
        assert!(ok.validate(&registry).is_ok());
        let typo = Selection { only: vec![], skip: vec!["gti".to_string()] };
        assert!(typo.validate(&registry).is_err());
    }
}
