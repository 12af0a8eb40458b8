//! Native stub compilation units
//!
//! A unit is a self-contained Rust crate root: a prelude declaring the
//! forwarding target as string constants, a `main` handing over to the
//! trampoline, and the trampoline template itself as an inline module.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use crate::config::BuildMode;
use crate::error::{ProxyError, Result};
use crate::inspect::Subsystem;

/// Trampoline shipped with pathproxy
pub const BUILTIN_TEMPLATE: &str = include_str!("../trampoline/mod.rs");

/// Crate name every unit is compiled under
const UNIT_CRATE_NAME: &str = "proxy";

/// A string emitted as a Rust raw string literal.
///
/// The `#` fence grows until the closing sequence cannot occur inside the
/// text, so paths are embedded verbatim, backslashes and all.
#[derive(Debug, Clone, Copy)]
pub struct RawLiteral<'a>(pub &'a str);

impl RawLiteral<'_> {
    fn fence_len(&self) -> usize {
        let mut hashes = 1;
        while self.0.contains(&format!("\"{}", "#".repeat(hashes))) {
            hashes += 1;
        }
        hashes
    }
}

impl fmt::Display for RawLiteral<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fence = "#".repeat(self.fence_len());
        write!(f, "r{fence}\"{}\"{fence}", self.0)
    }
}

/// Trampoline source: the file at `path`, or the built-in one
pub fn load_template(path: Option<&Path>) -> Result<String> {
    let Some(path) = path else {
        return Ok(BUILTIN_TEMPLATE.to_string());
    };
    if !path.is_file() {
        return Err(ProxyError::TemplateNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// `--cfg` value selecting the stub subsystem; only a GUI source gets a GUI stub
pub fn console_cfg(subsystem: Subsystem) -> &'static str {
    if subsystem.is_gui() {
        r#"console="0""#
    } else {
        r#"console="1""#
    }
}

/// Render the crate root for a stub forwarding to `target`
pub fn render_unit(target: &str, program_name: &str, template: &str) -> String {
    format!(
        "// Generated by pathproxy. Do not edit.\n\
         #![cfg_attr(console = \"0\", windows_subsystem = \"windows\")]\n\
         #![allow(dead_code)]\n\
         \n\
         const PROG: &str = {prog};\n\
         const PROG_NAME: &str = {prog_name};\n\
         \n\
         fn main() {{\n    \
             std::process::exit(trampoline::run(PROG, PROG_NAME, cfg!(console = \"0\")) as i32);\n\
         }}\n\
         \n\
         mod trampoline {{\n\
         {template}\n\
         }}\n",
        prog = RawLiteral(target),
        prog_name = RawLiteral(program_name),
    )
}

/// Compiler argument vector for one unit
pub fn compile_arguments(
    unit: &Path,
    output: &Path,
    subsystem: Subsystem,
    mode: BuildMode,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        unit.into(),
        "--crate-name".into(),
        UNIT_CRATE_NAME.into(),
        "--crate-type".into(),
        "bin".into(),
        "--edition".into(),
        "2024".into(),
        "-o".into(),
        output.into(),
    ];
    for option in mode.codegen_options() {
        args.push("-C".into());
        args.push(option.into());
    }
    args.extend(["-C", "panic=abort", "-C", "target-feature=+crt-static"].map(OsString::from));
    args.push("--cfg".into());
    args.push(console_cfg(subsystem).into());
    args.push("-l".into());
    args.push("user32".into());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_literal_plain_path() {
        assert_eq!(
            RawLiteral(r"C:\Program Files\Tool\tool.exe").to_string(),
            r###"r#"C:\Program Files\Tool\tool.exe"#"###
        );
    }

    #[test]
    fn test_raw_literal_grows_fence() {
        assert_eq!(RawLiteral(r##"a"#b"##).to_string(), r####"r##"a"#b"##"####);
        assert_eq!(RawLiteral("#x\"").to_string(), "r#\"#x\"\"#");
    }

    #[test]
    fn test_console_cfg() {
        assert_eq!(console_cfg(Subsystem::Gui), r#"console="0""#);
        assert_eq!(console_cfg(Subsystem::Console), r#"console="1""#);
        assert_eq!(console_cfg(Subsystem::Unknown), r#"console="1""#);
    }

    #[test]
    fn test_render_unit_embeds_target_and_template() {
        let unit = render_unit(r"C:\odd #dir\tool.exe", "tool.exe", "pub fn marker() {}");

        assert!(unit.contains(r###"const PROG: &str = r#"C:\odd #dir\tool.exe"#;"###));
        assert!(unit.contains(r###"const PROG_NAME: &str = r#"tool.exe"#;"###));
        assert!(unit.contains("mod trampoline {\npub fn marker() {}\n}"));
        assert!(unit.contains("windows_subsystem = \"windows\""));
    }

    #[test]
    fn test_builtin_template_has_entry_point() {
        assert!(BUILTIN_TEMPLATE.contains("pub fn run(target: &str, program_name: &str, gui: bool)"));
        assert!(!BUILTIN_TEMPLATE.contains("crate::"));
    }

    #[test]
    fn test_load_template() {
        assert_eq!(load_template(None).unwrap(), BUILTIN_TEMPLATE);

        let temp = tempfile::TempDir::new().unwrap();
        let custom = temp.path().join("trampoline.rs");
        std::fs::write(&custom, "pub fn run() {}").unwrap();
        assert_eq!(load_template(Some(&custom)).unwrap(), "pub fn run() {}");

        let err = load_template(Some(&temp.path().join("missing.rs"))).unwrap_err();
        assert!(matches!(err, ProxyError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_compile_arguments() {
        let args = compile_arguments(
            Path::new("obj/tool.exe.rs"),
            Path::new("obj/tool.exe.out/tool.exe"),
            Subsystem::Gui,
            BuildMode::Release,
        );
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args[0], "obj/tool.exe.rs");
        let output = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[output + 1], "obj/tool.exe.out/tool.exe");
        assert!(args.contains(&"opt-level=3".to_string()));
        let cfg = args.iter().position(|a| a == "--cfg").unwrap();
        assert_eq!(args[cfg + 1], r#"console="0""#);
    }
}
