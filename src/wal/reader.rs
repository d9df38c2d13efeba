//! WAL Reader
//!
//! Sequential reading of WAL frames with corruption detection.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Result, VaultError};

use super::entry::{WalEntry, HEADER_SIZE, MAX_ENTRY_SIZE};

/// Reads entries from the WAL file front to back
pub struct WalReader {
    reader: BufReader<File>,

    /// File offset just past the last successfully decoded frame
    ///
    /// Recovery truncates the file back to this offset when it hits a
    /// partial or corrupt frame.
    valid_end: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            valid_end: 0,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns:
    /// - `Ok(Some(entry))` — a valid frame was decoded
    /// - `Ok(None)` — clean end of file (no bytes past the last frame)
    /// - `Err(WalCorruption)` — partial frame, bad CRC, or undecodable data
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        // Read the frame header, tolerating a clean EOF at a frame boundary
        let mut header = [0u8; HEADER_SIZE];
        let read = read_up_to(&mut self.reader, &mut header)?;
        if read == 0 {
            return Ok(None);
        }
        if read < HEADER_SIZE {
            return Err(VaultError::WalCorruption(format!(
                "Partial frame header: {} of {} bytes",
                read, HEADER_SIZE
            )));
        }

        let lsn = u64::from_le_bytes(header[0..8].try_into().unwrap());
        let crc = u32::from_le_bytes(header[8..12].try_into().unwrap());
        let len = u32::from_le_bytes(header[12..16].try_into().unwrap());

        if len > MAX_ENTRY_SIZE {
            return Err(VaultError::WalCorruption(format!(
                "Frame length {} exceeds max {} (LSN {})",
                len, MAX_ENTRY_SIZE, lsn
            )));
        }

        let mut payload = vec![0u8; len as usize];
        let read = read_up_to(&mut self.reader, &mut payload)?;
        if read < payload.len() {
            return Err(VaultError::WalCorruption(format!(
                "Partial frame payload: {} of {} bytes (LSN {})",
                read, len, lsn
            )));
        }

        let entry = WalEntry::decode(lsn, crc, &payload)?;
        self.valid_end += (HEADER_SIZE + payload.len()) as u64;

        Ok(Some(entry))
    }

    /// File offset just past the last valid frame read so far
    pub fn valid_end(&self) -> u64 {
        self.valid_end
    }

    /// Iterate over all entries
    ///
    /// The iterator ends at clean EOF; a corrupt frame surfaces as a final
    /// `Err` item.
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over WAL entries
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read until the buffer is full or EOF; returns the number of bytes read
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
