//! Traits for format-specific parsing and serialization in langtool.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{error::Error, formats::LocalizationFormat};

/// Origin name used in decode errors when the bytes did not come from a file.
pub const IN_MEMORY_ORIGIN: &str = "<memory>";

/// A trait for parsing and writing one localization file in its native shape.
///
/// # Example
///
/// ```rust,no_run
/// use langtool::traits::Parser;
/// let format = langtool::formats::strings::Format::read_from("en.strings")?;
/// format.write_to("en_copy.strings")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// The format this parser reads and writes.
    const FORMAT: LocalizationFormat;

    /// Parse raw file bytes. `origin` names the file in error messages.
    fn parse(bytes: &[u8], origin: &str) -> Result<Self, Error>
    where
        Self: Sized;

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::decode(Self::FORMAT, path.display().to_string(), e))?;
        Self::parse(&bytes, &path.display().to_string())
    }

    /// Write to file path.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::parse(bytes, IN_MEMORY_ORIGIN)
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_bytes(s.as_bytes())
    }

    /// Serialize into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buffer = Vec::new();
        self.to_writer(&mut buffer)?;
        Ok(buffer)
    }
}
