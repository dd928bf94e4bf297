//! Tuning knobs for reading and writing.

/// Options controlling how input is read and lexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Size of the read-ahead buffer that is refilled from the input stream.
    pub buffer_size: usize,
    /// Maximum number of bytes kept for a single string or symbol.
    /// Anything beyond it is dropped without an error, along with a
    /// character the cut would split. `#t`/`#f` are not limited.
    pub max_string_length: usize,
}

impl ReadOptions {
    pub const DEFAULT_BUFFER_SIZE: usize = 1024;
    pub const DEFAULT_MAX_STRING_LENGTH: usize = 16384;

    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    #[must_use]
    pub fn with_max_string_length(mut self, max_string_length: usize) -> Self {
        self.max_string_length = max_string_length;
        self
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            max_string_length: Self::DEFAULT_MAX_STRING_LENGTH,
        }
    }
}

/// Options controlling the layout produced by a [`Writer`].
///
/// [`Writer`]: crate::writer::Writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Number of spaces added per nesting level.
    pub indent_width: usize,
    /// Longest string or form name, in bytes, that will be written.
    /// Matches the reader's limit so that nothing written is truncated on read.
    pub max_string_length: usize,
}

impl WriteOptions {
    #[must_use]
    pub fn with_max_string_length(mut self, max_string_length: usize) -> Self {
        self.max_string_length = max_string_length;
        self
    }

    #[must_use]
    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            max_string_length: ReadOptions::DEFAULT_MAX_STRING_LENGTH,
        }
    }
}
