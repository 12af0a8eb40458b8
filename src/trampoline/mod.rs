//! Runtime of a compiled proxy
//!
//! This file is compiled twice: as a module of pathproxy, where it is unit
//! tested, and as the body of every generated stub, where the unit prelude
//! supplies `PROG` and `PROG_NAME` and calls [`run`]. It must therefore only
//! depend on `std` and must not refer to `crate::` or `super::` paths.
//!
//! A stub runs one linear pipeline: check that the target exists, swap the
//! first token of its own command line for the quoted target path, launch the
//! target with the inherited standard handles, wait for it and exit with its
//! status. Every failure shows a message and exits with status 1.

#![allow(dead_code)]

use std::fmt;
use std::io;

const QUOTE: u16 = b'"' as u16;
const SPACE: u16 = b' ' as u16;
const TAB: u16 = b'\t' as u16;

/// Status a stub exits with when it cannot forward
pub const FAILURE_STATUS: u32 = 1;

/// Process creation capability used by [`forward`]
pub trait ProcessLauncher {
    type Child;

    fn target_exists(&self, target: &str) -> bool;

    /// Start `target` with a complete, already rewritten command line
    fn spawn(&mut self, target: &str, command_line: Vec<u16>) -> io::Result<Self::Child>;

    /// Block until `child` exits and return its exit status
    fn wait(&mut self, child: Self::Child) -> io::Result<u32>;
}

/// Terminal failures of a forwarding attempt
#[derive(Debug)]
pub enum ForwardError {
    TargetMissing { target: String },
    Launch(io::Error),
    ExitCode(io::Error),
}

impl fmt::Display for ForwardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardError::TargetMissing { target } => write!(f, "File '{target}' not found!"),
            ForwardError::Launch(err) => write!(f, "CreateProcess() failed: {err}"),
            ForwardError::ExitCode(err) => write!(f, "Cannot get exit code! {err}"),
        }
    }
}

/// Length in code units of the program token at the start of a command line.
///
/// The token is either a quoted string (up to and including the closing
/// quote) or everything up to the first space or tab.
pub fn program_token_len(command_line: &[u16]) -> usize {
    match command_line.first() {
        Some(&QUOTE) => command_line[1..]
            .iter()
            .position(|&c| c == QUOTE)
            .map_or(command_line.len(), |end| end + 2),
        _ => command_line
            .iter()
            .position(|&c| c == SPACE || c == TAB)
            .unwrap_or(command_line.len()),
    }
}

/// Replace the program token with the quoted `target`, keeping the rest verbatim
pub fn rewrite_command_line(command_line: &[u16], target: &str) -> Vec<u16> {
    let tail = &command_line[program_token_len(command_line)..];
    let mut rewritten = Vec::with_capacity(target.len() + tail.len() + 2);
    rewritten.push(QUOTE);
    rewritten.extend(target.encode_utf16());
    rewritten.push(QUOTE);
    rewritten.extend_from_slice(tail);
    rewritten
}

/// Locate the target, launch it and relay its exit status
pub fn forward<L: ProcessLauncher>(
    launcher: &mut L,
    target: &str,
    command_line: &[u16],
) -> Result<u32, ForwardError> {
    if !launcher.target_exists(target) {
        return Err(ForwardError::TargetMissing {
            target: target.to_string(),
        });
    }
    let child = launcher
        .spawn(target, rewrite_command_line(command_line, target))
        .map_err(ForwardError::Launch)?;
    launcher.wait(child).map_err(ForwardError::ExitCode)
}

/// Entry point of a generated stub
#[cfg(windows)]
pub fn run(target: &str, program_name: &str, gui: bool) -> u32 {
    let command_line = win32::command_line();
    let mut launcher = win32::Win32Launcher { gui };
    match forward(&mut launcher, target, &command_line) {
        Ok(status) => status,
        Err(err) => {
            win32::message_box(
                &format!("Exe trampoline: {program_name}"),
                &err.to_string(),
            );
            FAILURE_STATUS
        }
    }
}

#[cfg(windows)]
#[allow(non_snake_case, clippy::upper_case_acronyms)]
mod win32 {
    use std::ffi::c_void;
    use std::io;
    use std::mem;
    use std::path::Path;
    use std::ptr;

    use super::ProcessLauncher;

    type HANDLE = *mut c_void;
    type BOOL = i32;

    const TRUE: BOOL = 1;
    const INFINITE: u32 = 0xFFFF_FFFF;
    const WAIT_FAILED: u32 = 0xFFFF_FFFF;
    const STD_INPUT_HANDLE: u32 = -10i32 as u32;
    const STD_OUTPUT_HANDLE: u32 = -11i32 as u32;
    const STD_ERROR_HANDLE: u32 = -12i32 as u32;
    const STARTF_USESHOWWINDOW: u32 = 0x0000_0001;
    const STARTF_USESTDHANDLES: u32 = 0x0000_0100;
    const MB_OK: u32 = 0;

    #[repr(C)]
    struct STARTUPINFOW {
        cb: u32,
        lpReserved: *mut u16,
        lpDesktop: *mut u16,
        lpTitle: *mut u16,
        dwX: u32,
        dwY: u32,
        dwXSize: u32,
        dwYSize: u32,
        dwXCountChars: u32,
        dwYCountChars: u32,
        dwFillAttribute: u32,
        dwFlags: u32,
        wShowWindow: u16,
        cbReserved2: u16,
        lpReserved2: *mut u8,
        hStdInput: HANDLE,
        hStdOutput: HANDLE,
        hStdError: HANDLE,
    }

    #[repr(C)]
    struct PROCESS_INFORMATION {
        hProcess: HANDLE,
        hThread: HANDLE,
        dwProcessId: u32,
        dwThreadId: u32,
    }

    #[link(name = "kernel32")]
    unsafe extern "system" {
        fn GetCommandLineW() -> *const u16;
        fn GetStartupInfoW(info: *mut STARTUPINFOW);
        fn GetStdHandle(which: u32) -> HANDLE;
        fn CreateProcessW(
            application: *const u16,
            command_line: *mut u16,
            process_attributes: *const c_void,
            thread_attributes: *const c_void,
            inherit_handles: BOOL,
            creation_flags: u32,
            environment: *const c_void,
            current_directory: *const u16,
            startup_info: *const STARTUPINFOW,
            process_information: *mut PROCESS_INFORMATION,
        ) -> BOOL;
        fn WaitForSingleObject(handle: HANDLE, milliseconds: u32) -> u32;
        fn GetExitCodeProcess(process: HANDLE, exit_code: *mut u32) -> BOOL;
        fn CloseHandle(handle: HANDLE) -> BOOL;
    }

    #[link(name = "user32")]
    unsafe extern "system" {
        fn MessageBoxW(owner: HANDLE, text: *const u16, caption: *const u16, kind: u32) -> i32;
    }

    fn wide(text: &str) -> Vec<u16> {
        text.encode_utf16().chain(Some(0)).collect()
    }

    /// The raw command line this process was started with
    pub fn command_line() -> Vec<u16> {
        // SAFETY: GetCommandLineW returns a NUL-terminated string that lives
        // as long as the process.
        unsafe {
            let start = GetCommandLineW();
            let mut len = 0;
            while *start.add(len) != 0 {
                len += 1;
            }
            std::slice::from_raw_parts(start, len).to_vec()
        }
    }

    pub fn message_box(caption: &str, text: &str) {
        let caption = wide(caption);
        let text = wide(text);
        // SAFETY: both buffers are NUL-terminated and outlive the call.
        unsafe {
            MessageBoxW(ptr::null_mut(), text.as_ptr(), caption.as_ptr(), MB_OK);
        }
    }

    /// Process handle closed on drop
    pub struct OwnedProcess(HANDLE);

    impl Drop for OwnedProcess {
        fn drop(&mut self) {
            // SAFETY: the handle came from CreateProcessW and is closed once.
            unsafe {
                CloseHandle(self.0);
            }
        }
    }

    pub struct Win32Launcher {
        /// Forward our own show-window hint, as a GUI program would expect
        pub gui: bool,
    }

    impl ProcessLauncher for Win32Launcher {
        type Child = OwnedProcess;

        fn target_exists(&self, target: &str) -> bool {
            Path::new(target).exists()
        }

        fn spawn(&mut self, target: &str, mut command_line: Vec<u16>) -> io::Result<OwnedProcess> {
            let application = wide(target);
            command_line.push(0);

            // SAFETY: all-zero is a valid STARTUPINFOW / PROCESS_INFORMATION.
            let mut startup: STARTUPINFOW = unsafe { mem::zeroed() };
            let mut info: PROCESS_INFORMATION = unsafe { mem::zeroed() };

            if self.gui {
                // SAFETY: `own` is a properly sized out parameter.
                let mut own: STARTUPINFOW = unsafe { mem::zeroed() };
                own.cb = mem::size_of::<STARTUPINFOW>() as u32;
                unsafe { GetStartupInfoW(&mut own) };
                if own.dwFlags & STARTF_USESHOWWINDOW != 0 {
                    startup.dwFlags |= STARTF_USESHOWWINDOW;
                    startup.wShowWindow = own.wShowWindow;
                }
            }

            startup.cb = mem::size_of::<STARTUPINFOW>() as u32;
            startup.dwFlags |= STARTF_USESTDHANDLES;
            // SAFETY: plain handle queries, and CreateProcessW receives
            // NUL-terminated buffers that outlive the call.
            let created = unsafe {
                startup.hStdInput = GetStdHandle(STD_INPUT_HANDLE);
                startup.hStdOutput = GetStdHandle(STD_OUTPUT_HANDLE);
                startup.hStdError = GetStdHandle(STD_ERROR_HANDLE);
                CreateProcessW(
                    application.as_ptr(),
                    command_line.as_mut_ptr(),
                    ptr::null(),
                    ptr::null(),
                    TRUE,
                    0,
                    ptr::null(),
                    ptr::null(),
                    &startup,
                    &mut info,
                )
            };
            if created == 0 {
                return Err(io::Error::last_os_error());
            }
            // SAFETY: the thread handle is ours and unused.
            unsafe {
                CloseHandle(info.hThread);
            }
            Ok(OwnedProcess(info.hProcess))
        }

        fn wait(&mut self, child: OwnedProcess) -> io::Result<u32> {
            let mut status = 0u32;
            // SAFETY: `child` holds a live process handle.
            unsafe {
                if WaitForSingleObject(child.0, INFINITE) == WAIT_FAILED {
                    return Err(io::Error::last_os_error());
                }
                if GetExitCodeProcess(child.0, &mut status) == 0 {
                    return Err(io::Error::last_os_error());
                }
            }
            Ok(status)
        }
    }
}

#[cfg(test)]
mod tests;
