//! Batch script proxies
//!
//! Scripts need no compiler: the proxy is a fixed template that `call`s the
//! source with all arguments.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Render the forwarding script for `source`
pub fn render_script(source: &Path) -> String {
    format!(
        "@echo off\r\npushd .\r\ncall \"{}\" %*\r\npopd\r\n",
        source.display()
    )
}

/// Write the script for `source` to `output`.
///
/// The script is staged next to `output` and moved into place without
/// replacing anything that already exists there.
pub fn write_script(output: &Path, source: &Path) -> io::Result<()> {
    let dir = output.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(render_script(source).as_bytes())?;
    staged.flush()?;
    staged.persist_noclobber(output).map_err(|e| e.error)?;
    Ok(())
}
