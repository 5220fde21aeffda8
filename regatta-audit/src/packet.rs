//! Capture packet files
//!
//! A race folder holds one JSON file per polled telemetry frame, named by its
//! capture time in epoch milliseconds (`1708743900000.json`). The first and last
//! files by name are the opening and closing packets of the capture.

use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Capture packet read errors
#[derive(Debug, Error)]
pub enum PacketError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One capture file of a race folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePacket {
    pub file_name: String,
    pub path: PathBuf,
    /// Capture time from the file stem; `None` when the stem is not an integer
    pub timestamp: Option<i64>,
}

impl CapturePacket {
    fn from_path(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let timestamp = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<i64>().ok());
        Some(Self {
            file_name,
            path,
            timestamp,
        })
    }

    /// Closing status reported by this packet
    pub fn status(&self) -> PacketStatus {
        read_packet_status(&self.path)
    }
}

/// Capture files in `dir` with the given extension, sorted by file name.
pub fn list_capture_files(dir: &Path, extension: &str) -> Result<Vec<CapturePacket>, PacketError> {
    let mut packets = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if let Some(packet) = CapturePacket::from_path(path) {
            packets.push(packet);
        }
    }
    packets.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(packets)
}

/// Status a capture packet reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketStatus {
    /// Status text found in the packet
    Reported(String),
    /// Frame present but carries no status field
    Unknown,
    /// Payload holds no frame
    NoData,
    /// File could not be read or decoded
    Unreadable(String),
}

impl PacketStatus {
    pub fn is(&self, expected: &str) -> bool {
        matches!(self, PacketStatus::Reported(status) if status == expected)
    }
}

impl fmt::Display for PacketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketStatus::Reported(status) => write!(f, "{}", status),
            PacketStatus::Unknown => write!(f, "Unknown"),
            PacketStatus::NoData => write!(f, "No data"),
            PacketStatus::Unreadable(reason) => write!(f, "Error: {}", reason),
        }
    }
}

/// Read a capture file and extract its status
pub fn read_packet_status(path: &Path) -> PacketStatus {
    match load_packet(path) {
        Ok(payload) => status_of(&payload),
        Err(e) => PacketStatus::Unreadable(e.to_string()),
    }
}

fn load_packet(path: &Path) -> Result<Value, PacketError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Status of a decoded payload.
///
/// A list payload uses its first element as the frame; a bare object is the
/// frame itself. The first boat entry's `boatStatus` wins; with no boat entries
/// the race-level `raceStatus.status` is used.
pub fn status_of(payload: &Value) -> PacketStatus {
    let frame = match payload {
        Value::Array(frames) => match frames.first() {
            Some(frame) => frame,
            None => return PacketStatus::NoData,
        },
        Value::Object(_) => payload,
        _ => return PacketStatus::NoData,
    };
    let Some(frame) = frame.as_object() else {
        return PacketStatus::Unreadable("first frame is not an object".to_string());
    };

    let first_boat = frame
        .get("boatStatuses")
        .and_then(Value::as_array)
        .and_then(|boats| boats.first());
    let status = match first_boat {
        Some(boat) => boat.get("boatStatus"),
        None => frame.get("raceStatus").and_then(|race| race.get("status")),
    };

    match status.and_then(Value::as_str) {
        Some(text) => PacketStatus::Reported(text.to_string()),
        None => PacketStatus::Unknown,
    }
}
