//! Shared test infrastructure for integration tests.

use std::path::Path;
use std::process::Command;

/// Command for the compiled plint binary, isolated from ambient LM and
/// user-config state so runs see only what the test sets up.
pub fn plint() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_plint"));
    cmd.env_remove("PLINT_LM_COMMAND");
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("XDG_CONFIG_HOME");
    cmd.env_remove("HOME");
    cmd
}

/// Write one document under the library root, creating parent directories.
pub fn write_doc(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create doc dir");
    }
    std::fs::write(path, content).expect("write doc");
}

/// A fully populated document that passes every default rule.
pub fn passing_doc() -> &'static str {
    r#"---
title: Troubleshooting Kafka Consumer Lag
type: troubleshooting
shortTitle: Kafka Consumer Lag
intro: Diagnose and fix consumer lag.
difficulty: intermediate
audience: data engineers
platforms:
  - kafka
topics:
  - streaming
---

# Troubleshooting Kafka Consumer Lag

You are a Kafka SRE helping diagnose consumer lag.

## Output Format

Summarize the root cause in one paragraph.
"#
}
