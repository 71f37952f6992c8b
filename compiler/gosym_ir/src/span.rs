//! Source positions, spans, and the file set that resolves them.
//!
//! These mirror what a real scanner/parser frontend would hand the
//! evaluator (`Fset() -> FileSet`); this crate only defines the shapes,
//! since producing them is the scanner's job and out of scope here.

use std::fmt;

/// Identifies one source file within a `FileSet`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        FileId(raw)
    }
}

/// A byte-offset span within a single file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }
}

/// A resolved, human-facing source location: file name, line and column.
///
/// `Error.Pos` is reported in this form so REPL/batch hosts can
/// print `file:line:col` without needing the `FileSet` again.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Position {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

struct FileRecord {
    name: String,
    /// Byte offset of the start of each line, in ascending order.
    line_starts: Vec<u32>,
}

impl FileRecord {
    fn resolve(&self, offset: u32) -> Position {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line_idx).copied().unwrap_or(0);
        Position {
            file: self.name.clone(),
            line: line_idx as u32 + 1,
            column: offset.saturating_sub(line_start) + 1,
        }
    }
}

/// Registry of source files, used to turn a `(FileId, Span)` pair into a
/// human-readable `Position` for diagnostics.
#[derive(Default)]
pub struct FileSet {
    files: Vec<FileRecord>,
}

impl FileSet {
    pub fn new() -> Self {
        FileSet { files: Vec::new() }
    }

    /// Register a file's contents and return its `FileId`.
    pub fn add_file(&mut self, name: impl Into<String>, contents: &str) -> FileId {
        let mut line_starts = vec![0u32];
        for (i, b) in contents.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        self.files.push(FileRecord {
            name: name.into(),
            line_starts,
        });
        FileId((self.files.len() - 1) as u32)
    }

    /// Resolve a byte offset within `file` into a line/column `Position`.
    pub fn position(&self, file: FileId, offset: u32) -> Position {
        match self.files.get(file.0 as usize) {
            Some(record) => record.resolve(offset),
            None => Position {
                file: "<unknown>".to_string(),
                line: 0,
                column: 0,
            },
        }
    }
}
