//! Build runner: run make for a subproject and capture the combined
//! output for the build view. Synchronous and bounded; a build is a
//! foreground action here, not a background service.

use crate::project::Subproject;
use std::path::Path;
use std::process::Command;
use tracing::info;

#[derive(Debug, Default)]
pub struct BuildOutput {
    lines: Vec<String>,
    last_target: String,
}

impl BuildOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn last_target(&self) -> &str {
        &self.last_target
    }

    /// Run `make` for a subproject, capturing stdout and stderr.
    /// Returns whether the build succeeded.
    pub fn run(&mut self, sub: &Subproject, target: &str) -> bool {
        self.last_target = if target.is_empty() {
            sub.name.clone()
        } else {
            format!("{} {}", sub.name, target)
        };
        self.lines.clear();
        self.lines
            .push(format!("== make {} ({})", target, sub.directory.display()));

        let mut cmd = Command::new("make");
        cmd.arg("-C").arg(&sub.directory);
        if !sub.makefile.is_empty() {
            cmd.arg("-f").arg(&sub.makefile);
        }
        if !target.is_empty() {
            cmd.arg(target);
        }

        match cmd.output() {
            Ok(output) => {
                self.push_stream(&output.stdout);
                self.push_stream(&output.stderr);
                let ok = output.status.success();
                self.lines.push(String::new());
                self.lines.push(if ok {
                    "== build succeeded".to_string()
                } else {
                    format!("== build failed ({})", output.status)
                });
                info!(target: "build", subproject = %sub.name, ok, "build finished");
                ok
            }
            Err(err) => {
                self.lines.push(format!("== cannot run make: {err}"));
                false
            }
        }
    }

    fn push_stream(&mut self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        for line in text.lines() {
            self.lines.push(line.to_string());
        }
    }

    /// First `file:line:` diagnostic in the captured output, for the
    /// jump-to-error flow.
    pub fn first_error(&self) -> Option<(String, usize)> {
        for line in &self.lines {
            let mut parts = line.splitn(3, ':');
            let file = parts.next()?.trim();
            if let Some(number) = parts.next()
                && let Ok(number) = number.trim().parse::<usize>()
                && number > 0
                && file.contains('.')
                && Path::new(file).exists()
            {
                return Some((file.to_string(), number));
            }
        }
        None
    }
}
