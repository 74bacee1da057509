//! # Dispatcher
//!
//! Sends a [`PrintJob`] down the one strategy this process can use:
//!
//! 1. **Native**: raw document through a [`Spooler`], byte count verified
//! 2. **Shell**: temporary file printed with the OS print command
//! 3. **Relay**: HTTP to a peer, see [`RelayClient`]
//!
//! The strategy follows from the [`Capability`] decided at startup.
//!
//! ## Device Lock
//!
//! Native and shell jobs run on the blocking pool while holding a
//! [`DeviceLock`], so two jobs never write to local hardware at the same
//! time. The lock is a handle owned by the dispatcher; clones share it.
//! Relayed jobs skip it; the peer serializes its own device.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, instrument};

use crate::encoding::PayloadEncoding;
use crate::error::EtiquetaError;
use crate::job::PrintJob;
use crate::protocol::label::LabelRenderer;
use crate::transport::shell::{self, ShellPrint};
use crate::transport::{Capability, RelayClient, Spooler};

/// Mutual exclusion for physical device access.
#[derive(Debug, Clone, Default)]
pub struct DeviceLock(Arc<Mutex<()>>);

impl DeviceLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock.
    ///
    /// A panic in an earlier holder does not leave the device unusable.
    pub fn hold<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

#[derive(Clone)]
enum Strategy {
    Native(Arc<dyn Spooler>),
    Shell(Arc<dyn ShellPrint>),
    Relay(RelayClient),
}

/// Routes jobs to the printing strategy of this process.
#[derive(Clone)]
pub struct Dispatcher {
    strategy: Strategy,
    lock: DeviceLock,
}

impl Dispatcher {
    /// Print through a native spooler.
    pub fn native(spooler: Arc<dyn Spooler>) -> Self {
        Self {
            strategy: Strategy::Native(spooler),
            lock: DeviceLock::new(),
        }
    }

    /// Print through the OS print command.
    pub fn shell(shell: Arc<dyn ShellPrint>) -> Self {
        Self {
            strategy: Strategy::Shell(shell),
            lock: DeviceLock::new(),
        }
    }

    /// Forward every job to a peer.
    pub fn relay(client: RelayClient) -> Self {
        Self {
            strategy: Strategy::Relay(client),
            lock: DeviceLock::new(),
        }
    }

    /// Build the dispatcher for a detected capability.
    pub fn for_capability(capability: Capability, relay: RelayClient) -> Result<Self, EtiquetaError> {
        match capability {
            Capability::Native => native_spooler().map(Self::native),
            Capability::ShellOnly => Ok(Self::shell(Arc::from(shell::platform_shell()))),
            Capability::None => Ok(Self::relay(relay)),
        }
    }

    /// Share `lock` with other dispatchers for the same device.
    pub fn with_lock(mut self, lock: DeviceLock) -> Self {
        self.lock = lock;
        self
    }

    pub fn lock(&self) -> &DeviceLock {
        &self.lock
    }

    pub fn capability(&self) -> Capability {
        match self.strategy {
            Strategy::Native(_) => Capability::Native,
            Strategy::Shell(_) => Capability::ShellOnly,
            Strategy::Relay(_) => Capability::None,
        }
    }

    /// Print `job` and return the device that accepted it.
    #[instrument(skip_all, fields(job = %job.id(), via = %self.capability()))]
    pub async fn dispatch(&self, job: PrintJob) -> Result<String, EtiquetaError> {
        let printer = match &self.strategy {
            Strategy::Native(spooler) => {
                let spooler = Arc::clone(spooler);
                let lock = self.lock.clone();
                run_blocking(move || lock.hold(|| print_native(spooler.as_ref(), &job))).await?
            }
            Strategy::Shell(command) => {
                let command = Arc::clone(command);
                let lock = self.lock.clone();
                run_blocking(move || lock.hold(|| shell::print_job(command.as_ref(), &job))).await?
            }
            Strategy::Relay(client) => client.relay(&job).await?,
        };

        info!(printer = %printer, "job accepted");
        Ok(printer)
    }

    /// Render and print a serial label.
    pub async fn print_serial(
        &self,
        renderer: &LabelRenderer,
        serial: &str,
        printer: Option<String>,
        encoding: PayloadEncoding,
    ) -> Result<String, EtiquetaError> {
        let label = renderer.render(serial);
        self.dispatch(PrintJob::serial(serial, label, printer, encoding)?).await
    }
}

#[cfg(all(windows, feature = "spooler"))]
fn native_spooler() -> Result<Arc<dyn Spooler>, EtiquetaError> {
    Ok(Arc::new(crate::transport::spooler::WindowsSpooler))
}

#[cfg(not(all(windows, feature = "spooler")))]
fn native_spooler() -> Result<Arc<dyn Spooler>, EtiquetaError> {
    Err(EtiquetaError::DeviceUnavailable(
        "this build has no native spooler binding".into(),
    ))
}

async fn run_blocking<T, F>(f: F) -> Result<T, EtiquetaError>
where
    F: FnOnce() -> Result<T, EtiquetaError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| EtiquetaError::Spooler(format!("print task failed: {}", e)))?
}

/// Write `job` to the spooler. Callers hold the device lock.
fn print_native(spooler: &dyn Spooler, job: &PrintJob) -> Result<String, EtiquetaError> {
    let printer = match job.printer() {
        Some(name) => name.to_string(),
        None => spooler
            .default_printer()?
            .ok_or_else(|| EtiquetaError::DeviceUnavailable("no default printer configured".into()))?,
    };

    let expected = job.payload().len();
    let written = spooler.write_raw(&printer, &job.document_name(), job.payload())?;
    if written != expected {
        return Err(EtiquetaError::ShortWrite { written, expected });
    }
    Ok(printer)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDefault;

    impl Spooler for NoDefault {
        fn default_printer(&self) -> Result<Option<String>, EtiquetaError> {
            Ok(None)
        }

        fn write_raw(&self, _: &str, _: &str, data: &[u8]) -> Result<usize, EtiquetaError> {
            Ok(data.len())
        }
    }

    fn job(printer: Option<&str>) -> PrintJob {
        PrintJob::new("^XA^XZ", printer.map(str::to_string), PayloadEncoding::default()).unwrap()
    }

    #[tokio::test]
    async fn test_named_printer_skips_default_lookup() {
        let dispatcher = Dispatcher::native(Arc::new(NoDefault));
        assert_eq!(dispatcher.dispatch(job(Some("ZT410"))).await.unwrap(), "ZT410");
    }

    #[tokio::test]
    async fn test_no_default_printer_is_device_unavailable() {
        let dispatcher = Dispatcher::native(Arc::new(NoDefault));
        assert!(matches!(
            dispatcher.dispatch(job(None)).await,
            Err(EtiquetaError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn test_lock_survives_poisoning() {
        let lock = DeviceLock::new();
        let cloned = lock.clone();
        let _ = std::thread::spawn(move || cloned.hold(|| -> u32 { panic!("device fault") })).join();
        assert_eq!(lock.hold(|| 7), 7);
    }

    #[test]
    fn test_capability_reported() {
        let relay = Dispatcher::relay(RelayClient::new("http://127.0.0.1:9"));
        assert_eq!(relay.capability(), Capability::None);
    }
}
