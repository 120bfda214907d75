use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::result;

use dsv_core::{
    QuoteStyle, Writer as CoreWriter, WriterBuilder as CoreWriterBuilder,
};
use log::trace;

use crate::error::{IntoInnerError, Result};
use crate::DEFAULT_BUFFER_CAPACITY;

/// Builds a writer with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, record terminator
/// and more. Once a `Writer` is built, its configuration cannot be changed.
#[derive(Debug)]
pub struct WriterBuilder {
    builder: CoreWriterBuilder,
    capacity: usize,
}

impl Default for WriterBuilder {
    fn default() -> WriterBuilder {
        WriterBuilder {
            builder: CoreWriterBuilder::default(),
            capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl WriterBuilder {
    /// Create a new builder for configuring writers.
    ///
    /// To convert a builder into a writer, call one of the methods starting
    /// with `from_`.
    ///
    /// # Example
    ///
    /// ```
    /// use dsv::WriterBuilder;
    ///
    /// let mut wtr = WriterBuilder::new()
    ///     .delimiter('\t')
    ///     .terminator("\n")
    ///     .from_writer(vec![]);
    /// wtr.write_record(&["a", "b c"]).unwrap();
    /// wtr.write_record(&["x\ty", "z"]).unwrap();
    ///
    /// let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    /// assert_eq!(data, "a\tb c\n\"x\ty\"\tz\n");
    /// ```
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a writer from this configuration that writes data to the file
    /// at `path`.
    ///
    /// If the file exists, it is truncated. Otherwise it is created.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Writer<File>> {
        Ok(Writer::new(self, File::create(path)?))
    }

    /// Build a writer from this configuration that writes data to `wtr`.
    ///
    /// Note that the writer is buffered automatically, so you should not
    /// wrap `wtr` in a buffered writer like `io::BufWriter`.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Writer<W> {
        Writer::new(self, wtr)
    }

    /// The field delimiter to use when writing.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut WriterBuilder {
        self.builder.delimiter(delimiter);
        self
    }

    /// The record terminator to use when writing.
    ///
    /// The terminator is written verbatim after every record, and fields
    /// containing any of its characters are quoted. The default is
    /// `"\r\n"`.
    pub fn terminator<S: Into<String>>(
        &mut self,
        term: S,
    ) -> &mut WriterBuilder {
        self.builder.terminator(term);
        self
    }

    /// The quoting style to use when writing.
    ///
    /// By default, this is set to `QuoteStyle::Necessary`, which will only
    /// use quotes when they are necessary to preserve the integrity of data.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.builder.quote_style(style);
        self
    }

    /// The quote character to use when writing.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut WriterBuilder {
        self.builder.quote(quote);
        self
    }

    /// Set the capacity (in bytes) of the internal buffer used in the
    /// writer.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut WriterBuilder {
        self.capacity = capacity;
        self
    }
}

/// A writer of delimiter-separated records.
///
/// Output is buffered. Call `flush` (or `write_all`, or `into_inner`) to
/// make sure everything reaches the underlying writer. Dropping a writer
/// flushes on a best effort basis and ignores errors.
///
/// # Example
///
/// ```
/// use dsv::Writer;
///
/// let mut wtr = Writer::from_writer(vec![]);
/// wtr.write_all(vec![vec!["a", "b"], vec!["say \"hi\"", "c,d"]]).unwrap();
///
/// let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "a,b\r\n\"say \"\"hi\"\"\",\"c,d\"\r\n");
/// ```
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    core: CoreWriter,
    wtr: io::BufWriter<W>,
    /// Scratch space for the record being encoded.
    buf: String,
}

impl Writer<File> {
    /// Build a writer with a default configuration that writes data to the
    /// file at `path`.
    ///
    /// If the file exists, it is truncated. Otherwise it is created.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Writer<File>> {
        WriterBuilder::new().from_path(path)
    }
}

impl<W: io::Write> Writer<W> {
    fn new(builder: &WriterBuilder, wtr: W) -> Writer<W> {
        Writer {
            core: builder.builder.build(),
            wtr: io::BufWriter::with_capacity(builder.capacity, wtr),
            buf: String::new(),
        }
    }

    /// Build a writer with a default configuration that writes data to
    /// `wtr`.
    ///
    /// To customize the writer, use a `WriterBuilder`.
    pub fn from_writer(wtr: W) -> Writer<W> {
        WriterBuilder::new().from_writer(wtr)
    }

    /// Write a single record, including its terminator.
    ///
    /// An empty iterator writes an empty record, which is just the
    /// terminator.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.buf.clear();
        self.core.encode_record(record, &mut self.buf);
        self.wtr.write_all(self.buf.as_bytes())?;
        Ok(())
    }

    /// Write every record, then flush.
    pub fn write_all<I, R, T>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for record in records {
            self.write_record(record)?;
        }
        self.flush()?;
        Ok(())
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        trace!("flushing {} buffered bytes", self.wtr.buffer().len());
        self.wtr.flush()
    }

    /// Flush the contents of the internal buffer and return the underlying
    /// writer.
    ///
    /// If flushing fails, the error is returned along with this writer.
    pub fn into_inner(self) -> result::Result<W, IntoInnerError<Writer<W>>> {
        let Writer { core, wtr, buf } = self;
        wtr.into_inner().map_err(|err| {
            let (err, wtr) = err.into_parts();
            IntoInnerError::new(Writer { core, wtr, buf }, err)
        })
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.wtr.get_ref()
    }
}
