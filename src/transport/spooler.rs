//! # Native Spooler Transport
//!
//! Submits the job bytes as a `RAW` document, so the printer receives the
//! ZPL untouched by any driver rendering.
//!
//! The [`Spooler`] trait is the seam the dispatcher talks to; the real
//! Win32 implementation is only compiled on Windows with the `spooler`
//! feature.

use crate::error::EtiquetaError;

/// A print subsystem that accepts raw documents.
pub trait Spooler: Send + Sync {
    /// Name of the system default device, if one is configured.
    fn default_printer(&self) -> Result<Option<String>, EtiquetaError>;

    /// Write `data` as one raw document and report how many bytes the
    /// spooler accepted.
    fn write_raw(&self, printer: &str, doc_name: &str, data: &[u8]) -> Result<usize, EtiquetaError>;
}

#[cfg(all(windows, feature = "spooler"))]
pub use win32::WindowsSpooler;

#[cfg(all(windows, feature = "spooler"))]
mod win32 {
    use core::ffi::c_void;
    use tracing::{debug, instrument};
    use windows::Win32::Graphics::Printing::{
        ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, GetDefaultPrinterW,
        OpenPrinterW, PRINTER_HANDLE, StartDocPrinterW, StartPagePrinter, WritePrinter,
    };
    use windows::core::{PCWSTR, PWSTR};

    use super::Spooler;
    use crate::error::EtiquetaError;

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    /// Closes the printer handle on every exit path.
    struct Handle(PRINTER_HANDLE);

    impl Drop for Handle {
        fn drop(&mut self) {
            unsafe {
                let _ = ClosePrinter(self.0);
            }
        }
    }

    /// The Windows print spooler (winspool).
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WindowsSpooler;

    impl Spooler for WindowsSpooler {
        fn default_printer(&self) -> Result<Option<String>, EtiquetaError> {
            unsafe {
                let mut needed: u32 = 0;
                let _ = GetDefaultPrinterW(None, &mut needed);
                if needed == 0 {
                    return Ok(None);
                }

                let mut buf: Vec<u16> = vec![0; needed as usize];
                if !GetDefaultPrinterW(Some(PWSTR(buf.as_mut_ptr())), &mut needed).as_bool() {
                    return Ok(None);
                }

                let name = PWSTR(buf.as_mut_ptr())
                    .to_string()
                    .map_err(|e| EtiquetaError::Spooler(format!("UTF-16 decode failed: {}", e)))?;
                Ok(Some(name).filter(|n| !n.is_empty()))
            }
        }

        #[instrument(skip(self, data), fields(bytes = data.len()))]
        fn write_raw(&self, printer: &str, doc_name: &str, data: &[u8]) -> Result<usize, EtiquetaError> {
            let len = u32::try_from(data.len()).map_err(|_| {
                EtiquetaError::InvalidJob(format!("{} bytes is too large for one document", data.len()))
            })?;

            unsafe {
                let mut raw = PRINTER_HANDLE::default();
                let name_w = to_wide(printer);
                OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut raw, None).map_err(|e| {
                    EtiquetaError::DeviceUnavailable(format!("cannot open printer '{}': {}", printer, e))
                })?;
                let handle = Handle(raw);

                let doc_name_w = to_wide(doc_name);
                let datatype_w = to_wide("RAW");
                let doc_info = DOC_INFO_1W {
                    pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
                    pOutputFile: PWSTR::null(),
                    pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
                };

                if StartDocPrinterW(handle.0, 1, &doc_info as *const DOC_INFO_1W) == 0 {
                    return Err(EtiquetaError::Spooler("StartDocPrinter failed".into()));
                }

                if !StartPagePrinter(handle.0).as_bool() {
                    let _ = EndDocPrinter(handle.0);
                    return Err(EtiquetaError::Spooler("StartPagePrinter failed".into()));
                }

                let mut written: u32 = 0;
                let ok = WritePrinter(handle.0, data.as_ptr() as *const c_void, len, &mut written);

                let _ = EndPagePrinter(handle.0);
                let _ = EndDocPrinter(handle.0);

                if !ok.as_bool() {
                    return Err(EtiquetaError::Spooler("WritePrinter failed".into()));
                }

                debug!(written, "raw document submitted");
                Ok(written as usize)
            }
        }
    }
}
