//! PDF uploads and the two-file comparison form
//!
//! Every analysis takes a pair of PDFs (paper + syllabus, or old + new
//! syllabus). Missing or unusable files are reported per slot before any
//! request is made, the same way the upload dropzones flag a field.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{ClientError, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// One file input of an analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadSlot {
    Paper,
    Syllabus,
    OldSyllabus,
    NewSyllabus,
}

impl UploadSlot {
    /// Multipart field name the service expects
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Syllabus => "syllabus",
            Self::OldSyllabus => "old_syllabus",
            Self::NewSyllabus => "new_syllabus",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Syllabus => "syllabus",
            Self::OldSyllabus => "old syllabus",
            Self::NewSyllabus => "new syllabus",
        }
    }
}

impl fmt::Display for UploadSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a slot cannot be submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldError {
    /// Nothing selected
    Missing,
    /// Selected file is not a PDF
    NotPdf(String),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("required"),
            Self::NotPdf(reason) => write!(f, "{}", reason),
        }
    }
}

/// Per-slot validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<UploadSlot, FieldError>);

impl FieldErrors {
    pub fn get(&self, slot: UploadSlot) -> Option<&FieldError> {
        self.0.get(&slot)
    }

    pub fn set(&mut self, slot: UploadSlot, error: FieldError) {
        self.0.insert(slot, error);
    }

    pub fn clear(&mut self, slot: UploadSlot) {
        self.0.remove(&slot);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UploadSlot, &FieldError)> {
        self.0.iter().map(|(slot, error)| (*slot, error))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (slot, error)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", slot, error)?;
        }
        Ok(())
    }
}

/// A PDF ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadFile {
    /// Read and check a PDF from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_bytes(name, bytes)
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        if let Err(reason) = check_pdf(&name, &bytes) {
            return Err(ClientError::InvalidFile { name, reason });
        }
        debug!(name = %name, size = bytes.len(), "Accepted PDF upload");
        Ok(Self { name, bytes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The service rejects anything whose name does not end in `.pdf`
fn check_pdf(name: &str, bytes: &[u8]) -> std::result::Result<(), String> {
    let has_extension = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !has_extension {
        return Err("only PDF files are allowed".to_string());
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err("not a valid PDF file (missing %PDF- header)".to_string());
    }
    Ok(())
}

/// Two upload slots submitted together
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonForm {
    slots: [UploadSlot; 2],
    files: [Option<UploadFile>; 2],
    errors: FieldErrors,
}

impl ComparisonForm {
    /// Exam paper checked against a syllabus
    pub fn paper_alignment() -> Self {
        Self::new(UploadSlot::Paper, UploadSlot::Syllabus)
    }

    /// Old syllabus compared with its replacement
    pub fn syllabus_pair() -> Self {
        Self::new(UploadSlot::OldSyllabus, UploadSlot::NewSyllabus)
    }

    fn new(first: UploadSlot, second: UploadSlot) -> Self {
        Self {
            slots: [first, second],
            files: [None, None],
            errors: FieldErrors::default(),
        }
    }

    pub fn slots(&self) -> [UploadSlot; 2] {
        self.slots
    }

    fn position(&self, slot: UploadSlot) -> Option<usize> {
        self.slots.iter().position(|s| *s == slot)
    }

    /// Put a file in a slot, clearing that slot's error.
    ///
    /// Slots that are not part of this form are ignored.
    pub fn select(&mut self, slot: UploadSlot, file: UploadFile) {
        let Some(index) = self.position(slot) else {
            debug!(slot = %slot, "Ignoring file for slot not on this form");
            return;
        };
        self.files[index] = Some(file);
        self.errors.clear(slot);
    }

    /// Read a PDF from disk into a slot.
    ///
    /// A non-PDF empties the slot and records the reason against it.
    pub fn select_path<P: AsRef<Path>>(&mut self, slot: UploadSlot, path: P) -> Result<()> {
        match UploadFile::from_path(path) {
            Ok(file) => {
                self.select(slot, file);
                Ok(())
            }
            Err(ClientError::InvalidFile { name, reason }) => {
                if let Some(index) = self.position(slot) {
                    self.files[index] = None;
                    self.errors.set(slot, FieldError::NotPdf(reason.clone()));
                }
                Err(ClientError::InvalidFile { name, reason })
            }
            Err(e) => Err(e),
        }
    }

    /// Empty a slot along with its error
    pub fn clear(&mut self, slot: UploadSlot) {
        if let Some(index) = self.position(slot) {
            self.files[index] = None;
        }
        self.errors.clear(slot);
    }

    pub fn file(&self, slot: UploadSlot) -> Option<&UploadFile> {
        self.position(slot).and_then(|index| self.files[index].as_ref())
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Flag every empty slot and hand back both files when the form is complete
    pub fn validate(&mut self) -> std::result::Result<(&UploadFile, &UploadFile), FieldErrors> {
        for (slot, file) in self.slots.iter().zip(&self.files) {
            if file.is_none() && self.errors.get(*slot).is_none() {
                self.errors.set(*slot, FieldError::Missing);
            }
        }

        match (&self.files[0], &self.files[1]) {
            (Some(first), Some(second)) if self.errors.is_empty() => Ok((first, second)),
            _ => Err(self.errors.clone()),
        }
    }

    /// [`validate`](Self::validate) with the errors folded into [`ClientError`]
    pub fn submission(&mut self) -> Result<(&UploadFile, &UploadFile)> {
        self.validate().map_err(ClientError::MissingInput)
    }
}
