//! # Dispatch Tests
//!
//! Local print paths against a fake spooler that writes into a shared
//! byte stream one chunk at a time, the way a real device would see it.
//!
//! ## Test Coverage
//!
//! - Concurrent jobs never interleave in the device stream
//! - Dispatchers sharing one device lock serialize with each other
//! - Short writes are surfaced, not retried
//! - Serial labels reach the device as a graphics field

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use etiqueta::dispatch::{DeviceLock, Dispatcher};
use etiqueta::encoding::PayloadEncoding;
use etiqueta::printer::LabelConfig;
use etiqueta::protocol::label::{LabelRenderer, TextStyle};
use etiqueta::render::GlyphSource;
use etiqueta::transport::Spooler;
use etiqueta::{EtiquetaError, PrintJob};

// ============================================================================
// FAKE DEVICE
// ============================================================================

/// Writers currently inside `write_raw`, shared between fake spoolers that
/// stand for the same physical device.
#[derive(Default)]
struct Device {
    stream: Mutex<Vec<u8>>,
    writes: Mutex<Vec<String>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

struct FakeSpooler {
    device: Arc<Device>,
    /// Bytes to drop from every write
    short_by: usize,
}

impl FakeSpooler {
    fn new(device: Arc<Device>) -> Self {
        Self { device, short_by: 0 }
    }
}

impl Spooler for FakeSpooler {
    fn default_printer(&self) -> Result<Option<String>, EtiquetaError> {
        Ok(Some("Fake Zebra".into()))
    }

    fn write_raw(&self, printer: &str, doc_name: &str, data: &[u8]) -> Result<usize, EtiquetaError> {
        let now = self.device.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.device.max_active.fetch_max(now, Ordering::SeqCst);
        self.device
            .writes
            .lock()
            .unwrap()
            .push(format!("{} <- {}", printer, doc_name));

        let accepted = data.len() - self.short_by;
        for chunk in data[..accepted].chunks(16) {
            self.device.stream.lock().unwrap().extend_from_slice(chunk);
            std::thread::sleep(Duration::from_micros(200));
        }

        self.device.active.fetch_sub(1, Ordering::SeqCst);
        Ok(accepted)
    }
}

fn payload(i: usize) -> String {
    format!("^XA^FD{}^FS^XZ", char::from(b'A' + i as u8).to_string().repeat(96))
}

fn job(i: usize) -> PrintJob {
    PrintJob::new(payload(i), None, PayloadEncoding::default()).unwrap()
}

fn assert_whole_jobs(stream: &[u8], count: usize) {
    let expected: usize = (0..count).map(|i| payload(i).len()).sum();
    assert_eq!(stream.len(), expected);
    for i in 0..count {
        let bytes = payload(i).into_bytes();
        assert!(
            stream.windows(bytes.len()).any(|w| w == bytes.as_slice()),
            "job {} was interleaved with another job",
            i
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_jobs_never_interleave() {
    let device = Arc::new(Device::default());
    let dispatcher = Dispatcher::native(Arc::new(FakeSpooler::new(device.clone())));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.dispatch(job(i)).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "Fake Zebra");
    }

    assert_eq!(device.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(device.writes.lock().unwrap().len(), 8);
    assert_whole_jobs(&device.stream.lock().unwrap(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_lock_serializes_dispatchers() {
    let device = Arc::new(Device::default());
    let lock = DeviceLock::new();
    let first = Dispatcher::native(Arc::new(FakeSpooler::new(device.clone()))).with_lock(lock.clone());
    let second = Dispatcher::native(Arc::new(FakeSpooler::new(device.clone()))).with_lock(lock);

    let (a, b, c, d) = tokio::join!(
        first.dispatch(job(0)),
        second.dispatch(job(1)),
        first.dispatch(job(2)),
        second.dispatch(job(3)),
    );
    for result in [a, b, c, d] {
        result.unwrap();
    }

    assert_eq!(device.max_active.load(Ordering::SeqCst), 1);
    assert_whole_jobs(&device.stream.lock().unwrap(), 4);
}

#[tokio::test]
async fn test_short_write_reported() {
    let device = Arc::new(Device::default());
    let spooler = FakeSpooler {
        device,
        short_by: 3,
    };
    let dispatcher = Dispatcher::native(Arc::new(spooler));

    let job = job(0);
    let expected = job.payload().len();
    match dispatcher.dispatch(job).await {
        Err(EtiquetaError::ShortWrite { written, expected: e }) => {
            assert_eq!(e, expected);
            assert_eq!(written, expected - 3);
        }
        other => panic!("expected ShortWrite, got {:?}", other),
    }
}

#[tokio::test]
async fn test_document_named_after_job() {
    let device = Arc::new(Device::default());
    let dispatcher = Dispatcher::native(Arc::new(FakeSpooler::new(device.clone())));

    let job = PrintJob::new("^XA^XZ", Some("ZT230".into()), PayloadEncoding::default()).unwrap();
    let id = job.id();
    assert_eq!(dispatcher.dispatch(job).await.unwrap(), "ZT230");

    let writes = device.writes.lock().unwrap();
    assert_eq!(writes.as_slice(), [format!("ZT230 <- etiqueta {}", id)]);
}

#[tokio::test]
async fn test_print_serial_sends_graphics_field() {
    let font = GlyphSource::from_bytes(
        "DejaVu Sans Bold",
        include_bytes!("fonts/DejaVuSans-Bold.ttf").to_vec(),
    )
    .unwrap();
    let renderer = LabelRenderer::new(Some(font), TextStyle::default(), LabelConfig::ZEBRA_45MM);
    let device = Arc::new(Device::default());
    let dispatcher = Dispatcher::native(Arc::new(FakeSpooler::new(device.clone())));

    let printer = dispatcher
        .print_serial(&renderer, "PBS12345", None, PayloadEncoding::default())
        .await
        .unwrap();
    assert_eq!(printer, "Fake Zebra");

    let stream = device.stream.lock().unwrap();
    let zpl = std::str::from_utf8(&stream).unwrap();
    assert!(zpl.starts_with("^XA^FO"), "{}", zpl);
    assert!(zpl.contains(",15^GFA,"));
    assert!(zpl.ends_with("^FS^XZ"));
    assert!(!zpl.contains("^FDPBS12345"));
}
