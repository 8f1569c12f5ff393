use crate::errors::{CsvExportError, Result};

/// Field delimiter and quote byte used when encoding.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DialectOptions {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for DialectOptions {
    fn default() -> Self {
        Self::RFC4180
    }
}

impl std::fmt::Debug for DialectOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DialectOptions(delimiter={:?}, quote={:?})",
            self.delimiter as char, self.quote as char
        )
    }
}

impl DialectOptions {
    /// Comma separated, double quoted.
    pub const RFC4180: DialectOptions = DialectOptions {
        delimiter: b',',
        quote: b'"',
    };

    /// Builder for a writer using this dialect. Headers are written by the
    /// caller, so the builder never writes one itself.
    pub(crate) fn writer_builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(false);
        builder
    }

    /// Build options from characters, which must be single-byte ASCII.
    pub fn try_from_chars(delimiter: char, quote: char) -> Result<Self> {
        let delimiter = ascii_byte(delimiter, "delimiter")?;
        let quote = ascii_byte(quote, "quote")?;
        if delimiter == quote {
            return Err(CsvExportError::InvalidDialect(format!(
                "delimiter and quote are both '{}'",
                delimiter as char
            )));
        }
        Ok(DialectOptions { delimiter, quote })
    }
}

fn ascii_byte(c: char, what: &str) -> Result<u8> {
    if !c.is_ascii() || c == '\n' || c == '\r' {
        return Err(CsvExportError::InvalidDialect(format!(
            "{what} must be a single ASCII character, got {c:?}"
        )));
    }
    Ok(c as u8)
}
