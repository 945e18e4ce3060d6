//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for driving `oms`/`omsd` as black boxes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Aggressive timeouts for fast tests.
const OMS_TIMEOUT_CONNECT_MS: &str = "2000";
const OMS_TIMEOUT_EXIT_MS: &str = "500";
const OMS_TIMEOUT_IPC_MS: &str = "500";
const OMS_CONNECT_POLL_MS: &str = "5";

pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// Returns the path to a binary, checking llvm-cov target directory first.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn oms_binary() -> PathBuf {
    binary_path("oms")
}

pub fn omsd_binary() -> PathBuf {
    binary_path("omsd")
}

fn oms_cmd() -> Command {
    Command::new(oms_binary())
}

pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions.
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                ("OMS_DAEMON_BINARY".into(), omsd_binary().to_string_lossy().into()),
                ("OMS_TIMEOUT_CONNECT_MS".into(), OMS_TIMEOUT_CONNECT_MS.into()),
                ("OMS_TIMEOUT_EXIT_MS".into(), OMS_TIMEOUT_EXIT_MS.into()),
                ("OMS_TIMEOUT_IPC_MS".into(), OMS_TIMEOUT_IPC_MS.into()),
                ("OMS_CONNECT_POLL_MS".into(), OMS_CONNECT_POLL_MS.into()),
            ],
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string()));
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = oms_cmd();
        cmd.args(&self.args);

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{expected}'\nstdout: {stdout}");
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(!stdout.contains(unexpected), "stdout should not contain '{unexpected}'\nstdout: {stdout}");
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain '{expected}'\nstderr: {stderr}");
        self
    }
}

/// Poll a condition until it returns true or the timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}

/// A temporary `oms` instance: an isolated home directory plus a models
/// directory populated with fixture models. Every `oms()` command runs
/// against this instance; `Drop` stops the daemon so state never leaks
/// between tests.
pub struct Instance {
    home: tempfile::TempDir,
    models_dir: PathBuf,
}

impl Instance {
    pub fn new() -> Self {
        let home = tempfile::tempdir().unwrap();
        let models_dir = home.path().join("models");
        std::fs::create_dir_all(&models_dir).unwrap();
        Self { home, models_dir }
    }

    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    /// Registers a fixture model backed by a script that always exits 0.
    /// `script` is the shell body run in place of the real model binary;
    /// it receives no special argv handling beyond whatever the run
    /// options attach.
    pub fn add_model(&self, name: &str, digest: &str, script: &str) {
        let dic = serde_json::json!({
            "digest": digest,
            "name": name,
            "version": "1.0",
            "default_lang": "EN",
        });
        std::fs::write(self.models_dir.join(format!("{name}.db")), dic.to_string()).unwrap();

        let exe_path = self.models_dir.join(name);
        std::fs::write(&exe_path, format!("#!/bin/sh\n{script}\n")).unwrap();
        make_executable(&exe_path);
    }

    /// Writes a fake `mpiexec` that execs the first argument naming an
    /// executable file it's given — good enough to prove the MPI launch
    /// path is actually exercised without a real MPI runtime in CI.
    pub fn fake_mpiexec(&self) -> PathBuf {
        let path = self.home.path().join("fake-mpiexec");
        std::fs::write(
            &path,
            "#!/bin/sh\nfor a in \"$@\"; do\n  if [ -x \"$a\" ]; then exec \"$a\"; fi\ndone\nexit 1\n",
        )
        .unwrap();
        make_executable(&path);
        path
    }

    pub fn oms(&self) -> CliBuilder {
        cli().env("OMS_HOME_DIR", self.home.path().to_string_lossy())
    }

    fn stop_daemon_quiet(&self) {
        let mut cmd = self.oms().args(&["stop-daemon"]).command();
        cmd.stdout(std::process::Stdio::null());
        cmd.stderr(std::process::Stdio::null());
        let _ = cmd.status();
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        self.stop_daemon_quiet();
    }
}
