//! File set: byte positions and their line/column mapping.
//!
//! Every syntax node carries a [`Pos`], a byte offset into a global
//! position space shared by all files of an invocation (each file owns a
//! disjoint `[base, base+len]` slice of it, like `go/token` file sets).
//! The file set is the single source of truth for converting a `Pos` to a
//! 0-based line/column [`Position`]; nothing else in the indexer computes
//! positions.

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers and positions
// ============================================================================

/// Unique identifier for a file within an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file_{}", self.0)
    }
}

/// A byte offset into the file set's position space.
///
/// `Pos::NONE` marks synthesized nodes with no source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos(pub u32);

impl Pos {
    pub const NONE: Pos = Pos(0);

    pub fn is_none(self) -> bool {
        self == Pos::NONE
    }

    /// Offset this position forward by `n` bytes.
    pub fn add(self, n: u32) -> Pos {
        Pos(self.0 + n)
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pos_{}", self.0)
    }
}

/// A resolved source position: file, 0-based line and column, byte offset
/// within the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub file: FileId,
    pub line: u32,
    pub col: u32,
    pub offset: u32,
}

// ============================================================================
// Source files
// ============================================================================

/// One file's slice of the position space plus its line table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    id: FileId,
    path: String,
    base: u32,
    len: u32,
    /// Byte offset (file-relative) of the start of each line.
    line_starts: Vec<u32>,
}

impl SourceFile {
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Repository-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First position inside this file.
    pub fn base(&self) -> Pos {
        Pos(self.base)
    }

    /// Whether `pos` falls inside this file's slice.
    pub fn contains(&self, pos: Pos) -> bool {
        !pos.is_none() && pos.0 >= self.base && pos.0 <= self.base + self.len
    }

    /// Convert an absolute position inside this file to line/column form.
    pub fn position(&self, pos: Pos) -> Position {
        debug_assert!(self.contains(pos), "{pos} outside {}", self.path);
        let offset = pos.0 - self.base;
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        Position {
            file: self.id,
            line: line as u32,
            col: offset - self.line_starts[line],
            offset,
        }
    }
}

// ============================================================================
// File set
// ============================================================================

/// The set of all files of an invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSet {
    files: Vec<SourceFile>,
    next_base: u32,
}

impl Default for FileSet {
    fn default() -> Self {
        FileSet::new()
    }
}

impl FileSet {
    pub fn new() -> Self {
        FileSet {
            files: Vec::new(),
            // Base 1 keeps Pos(0) free as the NONE sentinel.
            next_base: 1,
        }
    }

    /// Register a file, computing its line table from `content`.
    pub fn add_file(&mut self, path: impl Into<String>, content: &str) -> FileId {
        let id = FileId(self.files.len() as u32);
        let mut line_starts = vec![0u32];
        for (offset, byte) in content.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset as u32 + 1);
            }
        }
        let len = content.len() as u32;
        self.files.push(SourceFile {
            id,
            path: path.into(),
            base: self.next_base,
            len,
            line_starts,
        });
        self.next_base += len + 1;
        id
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    /// The file whose slice of the position space contains `pos`.
    pub fn file_containing(&self, pos: Pos) -> Option<&SourceFile> {
        if pos.is_none() {
            return None;
        }
        let idx = self
            .files
            .partition_point(|f| f.base <= pos.0)
            .checked_sub(1)?;
        let file = &self.files[idx];
        file.contains(pos).then_some(file)
    }

    /// Resolve `pos` to file/line/column form.
    pub fn position(&self, pos: Pos) -> Option<Position> {
        self.file_containing(pos).map(|f| f.position(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }
}
