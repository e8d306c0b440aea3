//! Off-thread decoding

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};
use fortisku_core::Workbook;
use fortisku_xlsx::{ReadOptions, XlsxReader, XlsxResult};

/// A decode running on its own thread.
///
/// Dropping the handle abandons the result; the decode itself runs to
/// completion and its output is discarded.
pub struct DecodeHandle {
    result_rx: mpsc::Receiver<XlsxResult<Workbook>>,
    handle: thread::JoinHandle<()>,
}

impl DecodeHandle {
    /// Block until the decode finishes
    pub fn join(self) -> Result<Workbook> {
        let received = self.result_rx.recv();
        let _ = self.handle.join();
        match received {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::WorkerLost),
        }
    }

    /// Wait up to `timeout`; `None` if the decode is still running
    pub fn join_timeout(&self, timeout: Duration) -> Option<Result<Workbook>> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Some(result.map_err(Error::from)),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(Error::WorkerLost)),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Decode `bytes` on a new thread
pub fn spawn_decode(bytes: Vec<u8>) -> Result<DecodeHandle> {
    spawn_decode_with_options(bytes, ReadOptions::default())
}

pub fn spawn_decode_with_options(bytes: Vec<u8>, options: ReadOptions) -> Result<DecodeHandle> {
    let (result_tx, result_rx) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("fortisku-decode".to_string())
        .spawn(move || {
            debug!("decoding {} bytes off-thread", bytes.len());
            let result = XlsxReader::read_with_options(&bytes, &options);
            // The receiver is gone when the caller abandoned the decode
            let _ = result_tx.send(result);
        })?;
    Ok(DecodeHandle { result_rx, handle })
}
