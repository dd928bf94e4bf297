//! Incremental, indented output of headed forms.
//!
//! A [`Writer`] is driven by a sequence of calls rather than by a tree:
//!
//! ```
//! use lispdata::writer::Writer;
//!
//! let mut writer = Writer::new(Vec::new());
//! writer.begin_list("highscores").unwrap();
//! writer.write("file-version", 3).unwrap();
//! writer.end_list("highscores").unwrap();
//! let text = String::from_utf8(writer.finish().unwrap()).unwrap();
//!
//! assert_eq!("(highscores\n  (file-version 3)\n)\n", text);
//! ```
//!
//! Nesting is checked as calls come in. Closing a list other than the
//! innermost open one, or using a name that would not read back as a
//! symbol, is a bug in the caller and panics before anything is written.
use crate::escape::{escape_string, format_bool, format_real, is_bare_symbol};
use crate::options::WriteOptions;
use smol_str::SmolStr;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An earlier call hit an I/O error. Nothing more is written.
    #[error("output is incomplete after an earlier write failure")]
    Failed,
    #[error("real {0} cannot be written")]
    NonFiniteReal(f64),
    /// Reading it back would truncate it.
    #[error("text of {length} bytes exceeds the limit of {max}")]
    StringTooLong { length: usize, max: usize },
}

/// Values that can be written as the value of a form.
pub trait WriteValue {
    /// The literal spelling of the value.
    fn literal(&self) -> Result<String, WriteError>;

    /// Length in bytes of the text a reader keeps for this value, for
    /// values whose length is limited on read.
    fn text_len(&self) -> Option<usize> {
        None
    }
}

impl<T: WriteValue + ?Sized> WriteValue for &T {
    fn literal(&self) -> Result<String, WriteError> {
        (*self).literal()
    }

    fn text_len(&self) -> Option<usize> {
        (*self).text_len()
    }
}

macro_rules! impl_write_value_by_to_string {
    ($($ty:ty),*) => {
        $(impl WriteValue for $ty {
            fn literal(&self) -> Result<String, WriteError> {
                Ok(self.to_string())
            }
        })*
    };
}

impl_write_value_by_to_string!(i64, i32, u32);

impl WriteValue for f64 {
    fn literal(&self) -> Result<String, WriteError> {
        if !self.is_finite() {
            return Err(WriteError::NonFiniteReal(*self));
        }
        Ok(format_real(*self))
    }
}

impl WriteValue for f32 {
    fn literal(&self) -> Result<String, WriteError> {
        f64::from(*self).literal()
    }
}

impl WriteValue for bool {
    fn literal(&self) -> Result<String, WriteError> {
        Ok(format_bool(*self).to_string())
    }
}

impl WriteValue for str {
    fn literal(&self) -> Result<String, WriteError> {
        Ok(escape_string(self))
    }

    fn text_len(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl WriteValue for String {
    fn literal(&self) -> Result<String, WriteError> {
        self.as_str().literal()
    }

    fn text_len(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl WriteValue for SmolStr {
    fn literal(&self) -> Result<String, WriteError> {
        self.as_str().literal()
    }

    fn text_len(&self) -> Option<usize> {
        Some(self.len())
    }
}

/// Writes headed forms to a destination it owns until dropped or finished.
///
/// After the first I/O error every further call returns
/// [`WriteError::Failed`] without touching the destination.
pub struct Writer<W: Write> {
    out: Option<W>,
    stack: Vec<SmolStr>,
    options: WriteOptions,
    failed: bool,
}

impl Writer<BufWriter<File>> {
    /// Creates (or truncates) the file at `path` and writes to it through a buffer.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!(path = %path.display(), "writing file");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Writer<W> {
    pub fn new(out: W) -> Self {
        Self::with_options(out, WriteOptions::default())
    }

    pub fn with_options(out: W, options: WriteOptions) -> Self {
        Self {
            out: Some(out),
            stack: Vec::new(),
            options,
            failed: false,
        }
    }

    /// Number of lists currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether an I/O error has occurred.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Opens a list headed by `name`.
    pub fn begin_list(&mut self, name: &str) -> Result<(), WriteError> {
        self.check_name(name)?;
        let depth = self.stack.len();
        self.stack.push(name.into());
        self.emit(depth, format_args!("({name}"))
    }

    /// Closes the innermost open list, which must be headed by `name`.
    ///
    /// # Panics
    ///
    /// If `name` is not the name of the innermost open list.
    pub fn end_list(&mut self, name: &str) -> Result<(), WriteError> {
        match self.stack.last() {
            Some(open) if open.as_str() == name => {}
            Some(open) => panic!("cannot close list {name:?} while {open:?} is open"),
            None => panic!("cannot close list {name:?}, no list is open"),
        }
        self.stack.pop();
        self.emit(self.stack.len(), format_args!(")"))
    }

    /// Writes the form `(key value)` on its own line.
    pub fn write<V: WriteValue>(&mut self, key: &str, value: V) -> Result<(), WriteError> {
        self.check_name(key)?;
        self.check_value(&value)?;
        let literal = value.literal()?;
        self.emit(self.stack.len(), format_args!("({key} {literal})"))
    }

    /// Writes the form `(key value...)`.
    pub fn write_values<V: WriteValue>(&mut self, key: &str, values: &[V]) -> Result<(), WriteError> {
        self.check_name(key)?;
        let mut form = String::new();
        for value in values {
            self.check_value(value)?;
            form.push(' ');
            form.push_str(&value.literal()?);
        }
        self.emit(self.stack.len(), format_args!("({key}{form})"))
    }

    /// Writes the form `(key _("text"))`, marking `text` for translation.
    pub fn write_translatable(&mut self, key: &str, text: &str) -> Result<(), WriteError> {
        self.check_name(key)?;
        self.check_length(text.len())?;
        let literal = escape_string(text);
        self.emit(self.stack.len(), format_args!("({key} _({literal}))"))
    }

    /// Writes `text` as comment lines.
    pub fn write_comment(&mut self, text: &str) -> Result<(), WriteError> {
        for line in text.split('\n') {
            self.emit(self.stack.len(), format_args!("; {line}"))?;
        }
        Ok(())
    }

    /// Flushes and returns the destination.
    ///
    /// # Panics
    ///
    /// If a list is still open.
    pub fn finish(mut self) -> Result<W, WriteError> {
        if let Some(open) = self.stack.last() {
            panic!("cannot finish while list {open:?} is open");
        }
        if self.failed {
            return Err(WriteError::Failed);
        }

        let mut out = self.out.take().ok_or(WriteError::Failed)?;
        out.flush()?;
        Ok(out)
    }

    /// # Panics
    ///
    /// If `name` would not read back as a symbol.
    fn check_name(&self, name: &str) -> Result<(), WriteError> {
        assert!(
            is_bare_symbol(name),
            "{name:?} cannot be written as a form name"
        );
        self.check_length(name.len())
    }

    fn check_value<V: WriteValue + ?Sized>(&self, value: &V) -> Result<(), WriteError> {
        match value.text_len() {
            Some(length) => self.check_length(length),
            None => Ok(()),
        }
    }

    fn check_length(&self, length: usize) -> Result<(), WriteError> {
        let max = self.options.max_string_length;
        if length > max {
            return Err(WriteError::StringTooLong { length, max });
        }
        Ok(())
    }

    fn emit(&mut self, depth: usize, line: fmt::Arguments<'_>) -> Result<(), WriteError> {
        if self.failed {
            return Err(WriteError::Failed);
        }
        let Some(out) = self.out.as_mut() else {
            return Err(WriteError::Failed);
        };

        let indent = depth * self.options.indent_width;
        if let Err(err) = writeln!(out, "{:indent$}{line}", "") {
            warn!(%err, "write failed, discarding further output");
            self.failed = true;
            return Err(err.into());
        }

        Ok(())
    }
}

impl<W: Write> Drop for Writer<W> {
    fn drop(&mut self) {
        let Some(out) = self.out.as_mut() else {
            return;
        };

        if !self.stack.is_empty() && !std::thread::panicking() {
            warn!(open = ?self.stack, "writer dropped with lists still open");
        }

        if !self.failed {
            if let Err(err) = out.flush() {
                warn!(%err, "failed to flush output");
            }
        }
    }
}
