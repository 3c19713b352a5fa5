//! DICOM file signature check.
//!
//! A DICOM Part 10 file starts with a 128-byte preamble followed by the
//! ASCII marker `DICM`.

/// Length of the preamble preceding the marker.
pub const PREAMBLE_LEN: usize = 128;

/// The marker expected right after the preamble.
pub const DICOM_MAGIC: &[u8; 4] = b"DICM";

/// Number of leading bytes needed to decide whether a file is DICOM.
pub const SIGNATURE_LEN: usize = PREAMBLE_LEN + DICOM_MAGIC.len();

/// Returns `true` iff `bytes[128..132]` equals `DICM`.
///
/// Buffers shorter than [`SIGNATURE_LEN`] are never DICOM.
pub fn is_dicom(bytes: &[u8]) -> bool {
    bytes.len() >= SIGNATURE_LEN && &bytes[PREAMBLE_LEN..SIGNATURE_LEN] == DICOM_MAGIC
}

/// Whether a file with this name must carry the DICOM marker.
///
/// Extensionless names (the usual DICOM media layout) and `DICOMDIR` are
/// exempt. A trailing dot counts as an extension; a leading one does not.
pub fn requires_signature(file_name: &str) -> bool {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    if base == "DICOMDIR" {
        return false;
    }
    matches!(base.rfind('.'), Some(idx) if idx > 0)
}
