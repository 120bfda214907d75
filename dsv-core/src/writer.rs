use std::borrow::Cow;

use memchr::memmem;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The quoting style to use when writing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum QuoteStyle {
    /// This puts quotes around every field. Always.
    Always,
    /// This puts quotes around fields only when necessary.
    ///
    /// They are necessary when fields contain a quote, delimiter, `\r`, `\n`
    /// or any character of the record terminator.
    ///
    /// This is the default.
    Necessary,
}

impl Default for QuoteStyle {
    fn default() -> QuoteStyle {
        QuoteStyle::Necessary
    }
}

/// A builder for configuring a writer.
///
/// This builder permits specifying the delimiter, terminator, quote
/// character and quoting style.
#[derive(Debug, Default)]
pub struct WriterBuilder {
    wtr: Writer,
}

impl WriterBuilder {
    /// Create a new builder for configuring a writer.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a writer from this configuration.
    pub fn build(&self) -> Writer {
        self.wtr.clone()
    }

    /// The field delimiter to use when writing.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut WriterBuilder {
        self.wtr.delimiter = delimiter;
        self
    }

    /// The record terminator to use when writing.
    ///
    /// Any text may be used. It is written verbatim after every record.
    ///
    /// The default is `"\r\n"`.
    pub fn terminator<S: Into<String>>(
        &mut self,
        term: S,
    ) -> &mut WriterBuilder {
        self.wtr.term = term.into();
        self
    }

    /// The quoting style to use when writing.
    ///
    /// By default, this is set to `QuoteStyle::Necessary`, which will only
    /// use quotes when they are necessary to preserve the integrity of data.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.wtr.style = style;
        self
    }

    /// The quote character to use when writing.
    ///
    /// The default value is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut WriterBuilder {
        self.wtr.quote = quote;
        self
    }
}

/// An encoder for delimiter-separated records.
///
/// Quotes inside quoted fields are always escaped by doubling them. The
/// encoder keeps no state between records.
#[derive(Clone, Debug)]
pub struct Writer {
    delimiter: char,
    term: String,
    style: QuoteStyle,
    quote: char,
}

impl Default for Writer {
    fn default() -> Writer {
        Writer {
            delimiter: ',',
            term: String::from("\r\n"),
            style: QuoteStyle::default(),
            quote: '"',
        }
    }
}

impl Writer {
    /// Creates a new writer with the default configuration.
    pub fn new() -> Writer {
        Writer::default()
    }

    /// The field delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The record terminator text.
    pub fn terminator(&self) -> &str {
        &self.term
    }

    /// The quote character.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// The quoting style.
    pub fn quote_style(&self) -> QuoteStyle {
        self.style
    }

    /// Returns true if `field` must be quoted when written.
    ///
    /// `\r` and `\n` always force quotes, even under a custom terminator, so
    /// that the output stays readable with the newline family terminator.
    pub fn should_quote(&self, field: &str) -> bool {
        match self.style {
            QuoteStyle::Always => true,
            QuoteStyle::Necessary => {
                field.chars().any(|c| self.char_needs_quotes(c))
            }
        }
    }

    /// Encode a single field.
    ///
    /// The field is borrowed unchanged when it needs no quotes.
    pub fn encode_field<'f>(&self, field: &'f str) -> Cow<'f, str> {
        if !self.should_quote(field) {
            return Cow::Borrowed(field);
        }
        let mut out = String::with_capacity(field.len() + 2);
        self.quote_field(field, &mut out);
        Cow::Owned(out)
    }

    /// Encode a complete record, including its terminator, onto `out`.
    pub fn encode_record<I, T>(&self, record: I, out: &mut String)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for (i, field) in record.into_iter().enumerate() {
            if i > 0 {
                out.push(self.delimiter);
            }
            let field = field.as_ref();
            if self.should_quote(field) {
                self.quote_field(field, out);
            } else {
                out.push_str(field);
            }
        }
        out.push_str(&self.term);
    }

    fn char_needs_quotes(&self, c: char) -> bool {
        c == self.delimiter
            || c == self.quote
            || c == '\r'
            || c == '\n'
            || self.term.contains(c)
    }

    fn quote_field(&self, field: &str, out: &mut String) {
        let mut buf = [0; 4];
        let quote: &str = self.quote.encode_utf8(&mut buf);
        out.push(self.quote);
        let mut last = 0;
        for i in memmem::find_iter(field.as_bytes(), quote.as_bytes()) {
            out.push_str(&field[last..i]);
            out.push(self.quote);
            out.push(self.quote);
            last = i + quote.len();
        }
        out.push_str(&field[last..]);
        out.push(self.quote);
    }
}
