use crate::core::error::ProcessingError;
use flate2::read::MultiGzDecoder;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
// xlsx workbooks are zip containers
const ZIP_MAGIC: [u8; 4] = [b'P', b'K', 0x03, 0x04];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
    Xlsx,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Delimiter {
    #[default]
    Auto,
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    /// Resolves to a concrete byte, sniffing the header line when `Auto`.
    pub fn resolve(self, data: &[u8]) -> u8 {
        match self {
            Delimiter::Auto => sniff_delimiter(header_line(data)),
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
        }
    }
}

const CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

/// A loaded sheet: delimited text (already gunzipped) or raw workbook bytes.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub kind: InputKind,
    pub data: Vec<u8>,
}

impl Sheet {
    /// Classifies in-memory bytes by their leading magic and decodes gzip.
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self, ProcessingError> {
        Self::decode(kind_from_magic(&raw), raw)
    }

    fn decode(kind: InputKind, raw: Vec<u8>) -> Result<Self, ProcessingError> {
        let data = match kind {
            InputKind::Gzip => {
                let mut text = Vec::with_capacity(raw.len() * 4);
                MultiGzDecoder::new(raw.as_slice()).read_to_end(&mut text)?;
                text
            }
            InputKind::Plain | InputKind::Xlsx => raw,
        };
        Ok(Self { kind, data })
    }

    pub fn is_workbook(&self) -> bool {
        self.kind == InputKind::Xlsx
    }
}

/// Extension wins (`.gz`, `.xlsx`); otherwise the leading bytes decide.
pub fn detect_input_kind(path: &Path, head: &[u8]) -> InputKind {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("gz") => InputKind::Gzip,
        Some("xlsx") => InputKind::Xlsx,
        _ => kind_from_magic(head),
    }
}

fn kind_from_magic(head: &[u8]) -> InputKind {
    if head.starts_with(&GZIP_MAGIC) {
        InputKind::Gzip
    } else if head.starts_with(&ZIP_MAGIC) {
        InputKind::Xlsx
    } else {
        InputKind::Plain
    }
}

/// Reads the whole sheet into memory, decompressing gzip input.
pub fn read_input(path: &Path) -> Result<Sheet, ProcessingError> {
    let raw = fs::read(path)?;
    let kind = detect_input_kind(path, &raw);
    let sheet = Sheet::decode(kind, raw)?;
    debug!(path = %path.display(), ?kind, bytes = sheet.data.len(), "input loaded");
    Ok(sheet)
}

fn header_line(data: &[u8]) -> &[u8] {
    match memchr::memchr(b'\n', data) {
        Some(end) => &data[..end],
        None => data,
    }
}

/// Picks the most frequent candidate delimiter in the header line.
/// Falls back to a comma when none occur or on ties with a comma.
pub fn sniff_delimiter(line: &[u8]) -> u8 {
    let mut best = b',';
    let mut best_count = memchr::memchr_iter(b',', line).count();
    for &c in &CANDIDATES[1..] {
        let count = memchr::memchr_iter(c, line).count();
        if count > best_count {
            best = c;
            best_count = count;
        }
    }
    best
}

/// Strips `.gz` and the table extension, e.g. `7B.csv.gz` becomes `7B`.
pub fn section_name_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let name = strip_suffix_ci(name, ".gz").unwrap_or(name);
    let stem = match name.rfind('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    };
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

fn strip_suffix_ci<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = s.len().checked_sub(suffix.len())?;
    if s.is_char_boundary(cut) && s[cut..].eq_ignore_ascii_case(suffix) {
        Some(&s[..cut])
    } else {
        None
    }
}
