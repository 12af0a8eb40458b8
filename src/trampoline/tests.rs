//! Forwarding pipeline tests with a scripted launcher

use super::*;

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

fn narrow(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

#[derive(Default)]
struct FakeLauncher {
    existing: Vec<String>,
    spawn_error: Option<io::ErrorKind>,
    wait_result: Option<u32>,
    spawned: Vec<(String, String)>,
}

impl ProcessLauncher for FakeLauncher {
    type Child = usize;

    fn target_exists(&self, target: &str) -> bool {
        self.existing.iter().any(|e| e == target)
    }

    fn spawn(&mut self, target: &str, command_line: Vec<u16>) -> io::Result<usize> {
        if let Some(kind) = self.spawn_error {
            return Err(io::Error::from(kind));
        }
        self.spawned.push((target.to_string(), narrow(&command_line)));
        Ok(self.spawned.len() - 1)
    }

    fn wait(&mut self, _child: usize) -> io::Result<u32> {
        self.wait_result
            .ok_or_else(|| io::Error::other("process handle is gone"))
    }
}

const TARGET: &str = r"C:\Program Files\Tool\tool.exe";

#[test]
fn test_rewrite_quoted_program() {
    let rewritten = rewrite_command_line(
        &wide(r#""C:\links\tool.exe" -a "b c" d\"e"#),
        TARGET,
    );
    assert_eq!(
        narrow(&rewritten),
        r#""C:\Program Files\Tool\tool.exe" -a "b c" d\"e"#
    );
}

#[test]
fn test_rewrite_unquoted_program() {
    let rewritten = rewrite_command_line(&wide("tool  --flag=1\tx"), TARGET);
    assert_eq!(
        narrow(&rewritten),
        "\"C:\\Program Files\\Tool\\tool.exe\"  --flag=1\tx"
    );
}

#[test]
fn test_rewrite_without_arguments() {
    assert_eq!(
        narrow(&rewrite_command_line(&wide("tool"), TARGET)),
        format!("\"{TARGET}\"")
    );
    assert_eq!(
        narrow(&rewrite_command_line(&wide("\"C:\\links\\tool\""), TARGET)),
        format!("\"{TARGET}\"")
    );
    assert_eq!(
        narrow(&rewrite_command_line(&[], TARGET)),
        format!("\"{TARGET}\"")
    );
}

#[test]
fn test_rewrite_unterminated_quote_consumes_everything() {
    let rewritten = rewrite_command_line(&wide("\"C:\\links\\tool.exe arg"), TARGET);
    assert_eq!(narrow(&rewritten), format!("\"{TARGET}\""));
}

#[test]
fn test_rewrite_keeps_unpaired_surrogates() {
    let mut command_line = wide("tool ");
    command_line.push(0xD800);
    command_line.extend(wide(" end"));

    let mut expected = wide(&format!("\"{TARGET}\" "));
    expected.push(0xD800);
    expected.extend(wide(" end"));

    assert_eq!(rewrite_command_line(&command_line, TARGET), expected);
}

#[test]
fn test_program_token_len() {
    assert_eq!(program_token_len(&wide("a b")), 1);
    assert_eq!(program_token_len(&wide("\"a b\" c")), 5);
    assert_eq!(program_token_len(&wide("abc")), 3);
    assert_eq!(program_token_len(&[]), 0);
}

#[test]
fn test_forward_relays_exit_status() {
    let mut launcher = FakeLauncher {
        existing: vec![TARGET.to_string()],
        wait_result: Some(42),
        ..Default::default()
    };

    let status = forward(&mut launcher, TARGET, &wide("tool x")).unwrap();

    assert_eq!(status, 42);
    assert_eq!(
        launcher.spawned,
        vec![(TARGET.to_string(), format!("\"{TARGET}\" x"))]
    );
}

#[test]
fn test_forward_missing_target_never_spawns() {
    let mut launcher = FakeLauncher {
        wait_result: Some(0),
        ..Default::default()
    };

    let err = forward(&mut launcher, TARGET, &wide("tool")).unwrap_err();

    assert!(matches!(err, ForwardError::TargetMissing { .. }));
    assert_eq!(err.to_string(), format!("File '{TARGET}' not found!"));
    assert!(launcher.spawned.is_empty());
}

#[test]
fn test_forward_launch_failure() {
    let mut launcher = FakeLauncher {
        existing: vec![TARGET.to_string()],
        spawn_error: Some(io::ErrorKind::PermissionDenied),
        ..Default::default()
    };

    let err = forward(&mut launcher, TARGET, &wide("tool")).unwrap_err();

    assert!(matches!(err, ForwardError::Launch(_)));
    assert!(err.to_string().starts_with("CreateProcess() failed: "));
}

#[test]
fn test_forward_exit_code_unavailable() {
    let mut launcher = FakeLauncher {
        existing: vec![TARGET.to_string()],
        ..Default::default()
    };

    let err = forward(&mut launcher, TARGET, &wide("tool")).unwrap_err();

    assert!(matches!(err, ForwardError::ExitCode(_)));
    assert!(err.to_string().contains("Cannot get exit code!"));
    assert_eq!(launcher.spawned.len(), 1);
}
