//! Line ending and encoding helpers for reference content.
//!
//! Reference snapshots store text internally using LF (`'\n'`) newlines.
//! When reference content arrives with CRLF (`"\r\n"`), it is normalized on
//! load and the original line ending is recorded. Normalization keeps
//! line-level comparisons between live and reference content from reporting
//! phantom hunks that differ only in the newline sequence.

/// The newline sequence a piece of reference content originally used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// Detect the dominant line ending from a source text.
    ///
    /// Policy: if the input contains any CRLF (`"\r\n"`), returns
    /// [`LineEnding::Crlf`], otherwise [`LineEnding::Lf`].
    pub fn detect_in_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else {
            Self::Lf
        }
    }

    /// Normalize a text to LF newlines.
    pub fn normalize_to_lf(text: &str) -> String {
        text.replace("\r\n", "\n")
    }
}

/// An opaque label naming the character encoding of a live document.
///
/// The engine does not transcode content itself; the label exists so the
/// encoding a live document was opened with can be propagated onto its
/// reference snapshots, keeping byte-for-byte identity checks between live
/// and reference content consistent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodingLabel(String);

impl EncodingLabel {
    /// Create an encoding label (e.g. `"utf8"`, `"utf8bom"`, `"cp1252"`).
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The textual form of this label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
