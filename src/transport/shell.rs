//! # Shell Print Transport
//!
//! Used when no spooler binding is compiled in. The payload is written to
//! a temporary file and handed to the OS print command:
//!
//! | Platform | Command |
//! |----------|---------|
//! | Windows | `powershell Start-Process -Verb Print/PrintTo -PassThru`, then `WaitForExit()` |
//! | Unix | `lp [-d printer] -o raw <file>` |
//!
//! The call blocks until the command exits. The temporary file is removed
//! when [`print_job`] returns, whatever the outcome.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tracing::{debug, instrument};

use crate::error::EtiquetaError;
use crate::job::PrintJob;

/// An OS level "print this file" command.
pub trait ShellPrint: Send + Sync {
    /// Name of the system default device.
    fn default_printer(&self) -> Result<String, EtiquetaError>;

    /// Print `path` on `printer`, or on the default device when `None`.
    /// Returns once the OS reports the operation finished.
    fn print_file(&self, path: &Path, printer: Option<&str>) -> Result<(), EtiquetaError>;
}

/// The shell command for the current platform.
pub fn platform_shell() -> Box<dyn ShellPrint> {
    if cfg!(windows) {
        Box::new(PowerShellPrint)
    } else {
        Box::new(LpPrint)
    }
}

/// Print `job` through `shell` and return the device used.
#[instrument(skip_all, fields(job = %job.id()))]
pub fn print_job(shell: &dyn ShellPrint, job: &PrintJob) -> Result<String, EtiquetaError> {
    let target = match job.printer() {
        Some(name) => name.to_string(),
        None => shell.default_printer()?,
    };

    let mut file = tempfile::Builder::new()
        .prefix("etiqueta-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(job.payload())?;
    file.flush()?;

    // Close our handle so the print verb can open the file; the path is
    // still deleted on drop.
    let path = file.into_temp_path();
    debug!(path = %path.display(), bytes = job.payload().len(), "payload staged");

    shell.print_file(&path, job.printer())?;
    Ok(target)
}

fn run(mut command: Command, what: &str) -> Result<Output, EtiquetaError> {
    let output = command
        .output()
        .map_err(|e| EtiquetaError::ShellPrint(format!("cannot run {}: {}", what, e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EtiquetaError::ShellPrint(format!(
            "{} exited with {}: {}",
            what,
            output.status,
            stderr.trim()
        )));
    }
    Ok(output)
}

/// Single-quoted PowerShell string literal.
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Windows: PowerShell print verbs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PowerShellPrint;

impl PowerShellPrint {
    const DEFAULT_PRINTER_QUERY: &'static str = "Get-CimInstance -ClassName Win32_Printer | \
         Where-Object { $_.Default -eq $true } | \
         Select-Object -First 1 -ExpandProperty Name";

    /// Script that prints `path` and waits for the handler process.
    pub fn script(path: &Path, printer: Option<&str>) -> String {
        let mut parts = vec![format!("$tmp = {}", ps_quote(&path.to_string_lossy()))];
        let mut start = String::from("$process = Start-Process -FilePath $tmp -Verb $verb -PassThru");
        match printer {
            Some(name) => {
                parts.push("$verb = 'PrintTo'".into());
                start.push_str(&format!(" -ArgumentList @({})", ps_quote(name)));
            }
            None => parts.push("$verb = 'Print'".into()),
        }
        parts.push(start);
        parts.push("if ($process) { $process.WaitForExit() }".into());
        parts.join("; ")
    }

    fn powershell(script: &str) -> Command {
        let mut command = Command::new("powershell");
        command.args(["-NoProfile", "-Command", script]);
        command
    }
}

impl ShellPrint for PowerShellPrint {
    fn default_printer(&self) -> Result<String, EtiquetaError> {
        let output = run(Self::powershell(Self::DEFAULT_PRINTER_QUERY), "powershell")?;
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if name.is_empty() {
            return Err(EtiquetaError::DeviceUnavailable(
                "no default printer reported by PowerShell".into(),
            ));
        }
        Ok(name)
    }

    fn print_file(&self, path: &Path, printer: Option<&str>) -> Result<(), EtiquetaError> {
        run(Self::powershell(&Self::script(path, printer)), "powershell").map(|_| ())
    }
}

/// Unix: CUPS `lp` in raw mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct LpPrint;

impl LpPrint {
    /// Device name from `lpstat -d` output.
    pub fn parse_default(stdout: &str) -> Option<String> {
        let line = stdout.lines().find(|l| l.contains("default destination"))?;
        if line.starts_with("no ") {
            return None;
        }
        line.rsplit_once(':')
            .map(|(_, name)| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }
}

impl ShellPrint for LpPrint {
    fn default_printer(&self) -> Result<String, EtiquetaError> {
        let mut command = Command::new("lpstat");
        command.arg("-d");
        let output = run(command, "lpstat")?;
        Self::parse_default(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            EtiquetaError::DeviceUnavailable("no system default destination".into())
        })
    }

    fn print_file(&self, path: &Path, printer: Option<&str>) -> Result<(), EtiquetaError> {
        let mut command = Command::new("lp");
        if let Some(name) = printer {
            command.args(["-d", name]);
        }
        command.args(["-o", "raw"]).arg(path);
        run(command, "lp").map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::PayloadEncoding;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records what it was asked to print and whether the file existed.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(PathBuf, Vec<u8>, Option<String>)>>,
        fail: bool,
    }

    impl ShellPrint for Recorder {
        fn default_printer(&self) -> Result<String, EtiquetaError> {
            Ok("Default Zebra".into())
        }

        fn print_file(&self, path: &Path, printer: Option<&str>) -> Result<(), EtiquetaError> {
            let bytes = std::fs::read(path)?;
            self.seen
                .lock()
                .unwrap()
                .push((path.to_path_buf(), bytes, printer.map(str::to_string)));
            if self.fail {
                return Err(EtiquetaError::ShellPrint("printer jammed".into()));
            }
            Ok(())
        }
    }

    fn job(printer: Option<&str>) -> PrintJob {
        PrintJob::new("^XA^FDx^FS^XZ", printer.map(str::to_string), PayloadEncoding::default()).unwrap()
    }

    #[test]
    fn test_payload_staged_and_removed() {
        let recorder = Recorder::default();
        let used = print_job(&recorder, &job(None)).unwrap();
        assert_eq!(used, "Default Zebra");

        let seen = recorder.seen.lock().unwrap();
        let (path, bytes, printer) = &seen[0];
        assert_eq!(bytes, b"^XA^FDx^FS^XZ");
        assert_eq!(printer, &None);
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_file_removed_on_failure() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        assert!(print_job(&recorder, &job(Some("ZT230"))).is_err());

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].2.as_deref(), Some("ZT230"));
        assert!(!seen[0].0.exists());
    }

    #[test]
    fn test_powershell_script_print_to() {
        let script = PowerShellPrint::script(Path::new(r"C:\Temp\a.txt"), Some("Zebra's"));
        assert!(script.contains("$verb = 'PrintTo'"));
        assert!(script.contains("-ArgumentList @('Zebra''s')"));
        assert!(script.ends_with("if ($process) { $process.WaitForExit() }"));
    }

    #[test]
    fn test_powershell_script_default_verb() {
        let script = PowerShellPrint::script(Path::new("a.txt"), None);
        assert!(script.contains("$verb = 'Print'"));
        assert!(!script.contains("ArgumentList"));
    }

    #[test]
    fn test_lpstat_parsing() {
        assert_eq!(
            LpPrint::parse_default("system default destination: Zebra_GK420t\n"),
            Some("Zebra_GK420t".into())
        );
        assert_eq!(LpPrint::parse_default("no system default destination\n"), None);
    }
}
