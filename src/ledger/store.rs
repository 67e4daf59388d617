use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::models::Booking;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed booking data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whole-collection persistence. Every save replaces the previous contents.
pub trait BookingStore: Send + Sync {
    fn load(&self) -> Result<Vec<Booking>, StoreError>;
    fn save(&self, bookings: &[Booking]) -> Result<(), StoreError>;
}

/// JSON array on disk, rewritten in full on every save.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "bookings.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl BookingStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Booking>, StoreError> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, bookings: &[Booking]) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(bookings)?;
        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(data.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    bookings: Mutex<Vec<Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: Mutex::new(bookings),
        }
    }
}

impl BookingStore for MemoryStore {
    fn load(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .bookings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn save(&self, bookings: &[Booking]) -> Result<(), StoreError> {
        *self.bookings.lock().unwrap_or_else(|e| e.into_inner()) = bookings.to_vec();
        Ok(())
    }
}
