use std::io::ErrorKind;
use std::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{program} isn't installed or isn't on the PATH")]
    NotInstalled { program: String },
    #[error("couldn't run {cmd}: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{cmd} failed with {status}")]
    Failed { cmd: String, status: String },
}

/// Runs a command and waits for it to exit. The exit status is the only success signal. STDOUT
/// and STDERR aren't touched.
pub fn must_run_cmd(cmd: &mut Command) -> Result<(), CommandError> {
    let description = describe_cmd(cmd);
    info!("- Running {}", description);
    match cmd.status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CommandError::Failed {
                    cmd: description,
                    status: status.to_string(),
                })
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Err(CommandError::NotInstalled {
            program: cmd.get_program().to_string_lossy().to_string(),
        }),
        Err(source) => Err(CommandError::Spawn {
            cmd: description,
            source,
        }),
    }
}

/// Renders a command the way it'd be typed in a shell, without quoting.
pub fn describe_cmd(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    for arg in cmd.get_args() {
        parts.push(arg.to_string_lossy().to_string());
    }
    parts.join(" ")
}
