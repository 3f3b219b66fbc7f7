//! External graph renderer.
//!
//! Pipes the DOT text through Graphviz (`dot -Tsvg`). A failing renderer
//! is not fatal: the failure is logged and the DOT text is dumped with line
//! numbers for inspection.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use tracing::error;

use crate::error::{GodepError, Result};

/// Render DOT text to SVG with `renderer`.
pub fn render_svg(renderer: &str, dot: &str) -> Result<Vec<u8>> {
    let failed = |reason: String| GodepError::Render {
        command: format!("{renderer} -Tsvg"),
        reason,
    };

    let mut child = Command::new(renderer)
        .arg("-Tsvg")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| failed(e.to_string()))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| failed("stdin unavailable".to_string()))?;
    let input = dot.to_string();
    let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

    let output = child.wait_with_output().map_err(|e| failed(e.to_string()))?;
    match writer.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(failed(e.to_string())),
        Err(_) => return Err(failed("stdin writer panicked".to_string())),
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failed(format!("{}: {}", output.status, stderr.trim())));
    }
    Ok(output.stdout)
}

/// DOT text with each line prefixed by its 1-based number.
pub fn numbered(dot: &str) -> String {
    dot.lines()
        .enumerate()
        .map(|(i, line)| format!("{:4} {}\n", i + 1, line))
        .collect()
}

/// Render to SVG, or log the failure and dump the numbered DOT text to
/// `dump`. Returns `None` on failure.
pub fn render_or_dump<W: Write>(renderer: &str, dot: &str, dump: &mut W) -> Option<Vec<u8>> {
    match render_svg(renderer, dot) {
        Ok(svg) => Some(svg),
        Err(e) => {
            error!(error = %e, "graph rendering failed");
            if let Err(e) = dump.write_all(numbered(dot).as_bytes()) {
                error!(error = %e, "could not dump graph text");
            }
            None
        }
    }
}
