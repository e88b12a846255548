use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::plugin::Plugin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOutput {
    /// `None` when the plugin was killed by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a generator plugin with a request on stdin.
pub trait PluginRunner {
    fn run(&self, plugin: &Plugin, input: &[u8], workdir: &Path) -> crate::Result<PluginOutput>;
}

/// Spawns the plugin executable directly.
pub struct NativeRunner;

impl PluginRunner for NativeRunner {
    fn run(&self, plugin: &Plugin, input: &[u8], workdir: &Path) -> crate::Result<PluginOutput> {
        let failed = |e: std::io::Error| {
            crate::Error::Plugin(format!("failed to run {}: {}", plugin.path.display(), e))
        };

        let mut cmd = Command::new(&plugin.path);
        cmd.current_dir(workdir);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        log::info!(
            "running plugin {} in {}",
            plugin.path.display(),
            workdir.display()
        );
        let mut child = cmd.spawn().map_err(failed)?;
        let mut stdin = child.stdin.take().ok_or_else(|| {
            crate::Error::Plugin(format!("no stdin for {}", plugin.path.display()))
        })?;

        // stdout and stderr are drained by `wait_with_output` while the
        // request is still being written.
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || write_request(&mut stdin, input));
            (child.wait_with_output(), writer.join())
        });
        let output = output.map_err(failed)?;
        match written {
            Ok(result) => result.map_err(failed)?,
            Err(_) => {
                return Err(crate::Error::Plugin(format!(
                    "writing the request to {} panicked",
                    plugin.path.display()
                )));
            }
        }

        log::debug!("status: {}", output.status);
        Ok(PluginOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A plugin may exit without reading its request; its exit status is
/// reported instead of the broken pipe.
fn write_request(stdin: &mut impl Write, input: &[u8]) -> std::io::Result<()> {
    match stdin.write_all(input) {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            log::debug!("plugin closed stdin before reading the whole request");
            Ok(())
        }
        result => result,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn plugin(path: &str) -> Plugin {
        Plugin {
            name: "sh".to_string(),
            kind: "test".to_string(),
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn test_native_runner_pipes_input() {
        let dir = TempDir::new().unwrap();
        let output = NativeRunner
            .run(&plugin("/bin/cat"), b"{\"kind\":\"cli\"}", dir.path())
            .unwrap();

        assert!(output.success);
        assert_eq!(output.code, Some(0));
        assert_eq!(output.stdout, "{\"kind\":\"cli\"}");
    }

    #[test]
    fn test_native_runner_reports_failure() {
        let dir = TempDir::new().unwrap();
        let output = NativeRunner
            .run(&plugin("/bin/false"), b"", dir.path())
            .unwrap();
        assert!(!output.success);
        assert_ne!(output.code, Some(0));
    }

    #[test]
    fn test_native_runner_large_request_does_not_block() {
        let dir = TempDir::new().unwrap();
        let input = vec![b'a'; 1 << 20];
        let output = NativeRunner
            .run(&plugin("/bin/cat"), &input, dir.path())
            .unwrap();

        assert!(output.success);
        assert_eq!(output.stdout.len(), input.len());
    }

    #[test]
    fn test_native_runner_plugin_ignoring_request_keeps_status() {
        let dir = TempDir::new().unwrap();
        let input = vec![b'{'; 1 << 20];
        let output = NativeRunner
            .run(&plugin("/bin/false"), &input, dir.path())
            .unwrap();

        assert!(!output.success);
        assert_eq!(output.code, Some(1));
    }

    #[test]
    fn test_native_runner_missing_binary() {
        let dir = TempDir::new().unwrap();
        let result = NativeRunner.run(&plugin("/no/such/plugin"), b"", dir.path());
        assert!(matches!(result, Err(crate::Error::Plugin(_))));
    }
}
