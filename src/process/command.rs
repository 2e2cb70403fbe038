//! Command building logic for the spawned interpreter

use std::os::fd::RawFd;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use crate::types::options::ProcessOptions;

use super::config::SHELL;
use super::pipe::set_cloexec;

/// Command builder for the interpreter process
pub struct CommandBuilder<'a> {
    options: &'a ProcessOptions,
    inherited: &'a [RawFd],
}

impl<'a> CommandBuilder<'a> {
    /// Create a new command builder
    ///
    /// `inherited` lists the descriptors that must survive `exec` in the child.
    pub fn new(options: &'a ProcessOptions, inherited: &'a [RawFd]) -> Self {
        Self { options, inherited }
    }

    /// Build `/bin/sh -c <command>` with stdin piped and the channel ends inherited
    pub fn build(&self) -> Command {
        let mut cmd = Command::new(SHELL);
        cmd.arg("-c").arg(self.options.interpreter.command());

        cmd.stdin(Stdio::piped())
            .stdout(self.options.stdout.to_stdio())
            .stderr(self.options.stderr.to_stdio());

        if let Some(ref cwd) = self.options.cwd {
            cmd.current_dir(cwd);
        }
        cmd.envs(&self.options.env);

        self.add_inheritance(&mut cmd);
        cmd
    }

    /// Clear close-on-exec on the inherited descriptors, in the child only
    fn add_inheritance(&self, cmd: &mut Command) {
        if self.inherited.is_empty() {
            return;
        }

        let inherited = self.inherited.to_vec();
        // SAFETY: the hook runs between fork and exec; it only calls fcntl
        // through set_cloexec and neither allocates nor takes locks.
        unsafe {
            cmd.pre_exec(move || {
                for &fd in &inherited {
                    set_cloexec(fd, false)?;
                }
                Ok(())
            });
        }
    }
}
