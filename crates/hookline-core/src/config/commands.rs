//! Command hook configuration.

use serde::{Deserialize, Serialize};

/// Settings for hooks that spawn external commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Interpreter invoked as `<shell> -c <command>`.
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Whether child stderr is forwarded to the terminal instead of captured.
    #[serde(default = "default_true")]
    pub inherit_stderr: bool,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            inherit_stderr: default_true(),
        }
    }
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_true() -> bool {
    true
}
