//! Source tracking for hierarchy inputs
//!
//! Every input the checker reads (a declaration header, a TOML or JSON
//! description) is registered here under a [`FileId`]. Spans produced by the
//! parser are plain byte ranges; this crate turns them into line/column
//! positions for diagnostics.

use std::collections::HashMap;

/// A 1-based line/column position plus the byte offset it was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize, byte_offset: usize) -> Self {
        Self {
            line,
            column,
            byte_offset,
        }
    }
}

/// A range of source text inside one file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub start: SourcePosition,
    pub end: SourcePosition,
    pub file_id: FileId,
}

impl SourceSpan {
    pub fn new(start: SourcePosition, end: SourcePosition, file_id: FileId) -> Self {
        Self {
            start,
            end,
            file_id,
        }
    }

    pub fn len(&self) -> usize {
        self.end.byte_offset.saturating_sub(self.start.byte_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Identifier of a file registered in a [`SourceMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

/// A registered file and its precomputed line table
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: String, content: String) -> Self {
        let line_starts = line_starts(&content);
        Self {
            name,
            content,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a 1-based line without its terminator
    pub fn get_line(&self, line_number: usize) -> Option<&str> {
        if line_number == 0 || line_number > self.line_starts.len() {
            return None;
        }

        let start = self.line_starts[line_number - 1];
        let end = self
            .line_starts
            .get(line_number)
            .copied()
            .unwrap_or(self.content.len());

        Some(self.content[start..end].trim_end_matches(['\n', '\r']))
    }

    /// 1-based (line, column) of a byte offset; offsets past the end clamp to it
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.content.len());
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line_index];

        (line_index + 1, offset - line_start + 1)
    }

    pub fn offset_to_position(&self, offset: usize) -> SourcePosition {
        let (line, column) = self.offset_to_line_col(offset);
        SourcePosition::new(line, column, offset.min(self.content.len()))
    }
}

/// Registry of every input file seen during a check
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: HashMap<FileId, SourceFile>,
    next_id: usize,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<String>) -> FileId {
        let file_id = FileId(self.next_id);
        self.next_id += 1;
        self.files
            .insert(file_id, SourceFile::new(name.into(), content.into()));
        file_id
    }

    pub fn get_file(&self, file_id: FileId) -> Option<&SourceFile> {
        self.files.get(&file_id)
    }

    pub fn get_line(&self, file_id: FileId, line_number: usize) -> Option<&str> {
        self.get_file(file_id)?.get_line(line_number)
    }

    pub fn offset_to_line_col(&self, file_id: FileId, offset: usize) -> Option<(usize, usize)> {
        self.get_file(file_id)
            .map(|file| file.offset_to_line_col(offset))
    }

    /// Build a span from a byte range of a registered file
    pub fn span_from_offsets(&self, file_id: FileId, start: usize, end: usize) -> Option<SourceSpan> {
        let file = self.get_file(file_id)?;
        Some(SourceSpan::new(
            file.offset_to_position(start),
            file.offset_to_position(end.max(start)),
            file_id,
        ))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}
