// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Run Artifacts
// Description: Per-test output directory for reports, events, and verdicts.
// Purpose: Leave a readable record of every acceptance run, even on panic.
// Dependencies: system-tests, serde, serde_json
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// Verdict file written once per test.
const VERDICT_FILE: &str = "summary.json";

#[derive(Serialize)]
struct Verdict<'a> {
    test: &'a str,
    status: &'a str,
    duration_ms: u128,
    notes: &'a [String],
}

/// Resolves and creates the output directory for `test_name`.
///
/// Without an override each process gets a fresh timestamped directory. An
/// override is shared across tests, so existing output there is only reused
/// when overwrite is allowed.
fn prepare_root(test_name: &str, config: &SystemTestConfig) -> io::Result<PathBuf> {
    let root = if let Some(base) = &config.run_root {
        base.join(test_name)
    } else {
        let stamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        PathBuf::from("target/system-tests").join(format!("run_{stamp}")).join(test_name)
    };
    if root.exists() && !config.allow_overwrite {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("run root {} already exists", root.display()),
        ));
    }
    fs::create_dir_all(&root)?;
    Ok(root)
}

/// Output directory for one test plus its pending verdict.
pub struct TestReporter {
    test_name: String,
    root: PathBuf,
    started: Instant,
    finalized: bool,
}

impl TestReporter {
    /// Creates the output directory for the named test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        Ok(Self {
            root: prepare_root(test_name, &config)?,
            test_name: test_name.to_string(),
            started: Instant::now(),
            finalized: false,
        })
    }

    /// Returns the output directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `value` as pretty-printed JSON under the output directory.
    pub fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> io::Result<()> {
        let bytes = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
        fs::write(self.root.join(name), bytes)
    }

    /// Records the verdict. Later calls overwrite earlier ones.
    pub fn finish(&mut self, status: &str, notes: &[String]) -> io::Result<()> {
        let verdict = Verdict {
            test: &self.test_name,
            status,
            duration_ms: self.started.elapsed().as_millis(),
            notes,
        };
        self.write_json(VERDICT_FILE, &verdict)?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let _ = self.finish(status, &["test ended before recording a verdict".to_string()]);
    }
}
