use std::fs::File;
use std::io;
use std::path::Path;

use dsv_core::{
    Action, ErrorKind, FieldCounter, FieldState, FieldsPerRecord, Match,
    Reader as CoreReader, ReaderBuilder as CoreReaderBuilder, Terminator,
};
use log::{debug, trace};

use crate::error::{Error, ParseError, Result};
use crate::lookahead::Lookahead;
use crate::string_record::StringRecord;
use crate::DEFAULT_BUFFER_CAPACITY;

/// Builds a reader with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, quote character,
/// record terminator and field count validation. Once a `Reader` is built,
/// its configuration cannot be changed.
#[derive(Debug)]
pub struct ReaderBuilder {
    capacity: usize,
    flexible: bool,
    fields: FieldsPerRecord,
    builder: Box<CoreReaderBuilder>,
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder {
            capacity: DEFAULT_BUFFER_CAPACITY,
            flexible: false,
            fields: FieldsPerRecord::default(),
            builder: Box::new(CoreReaderBuilder::default()),
        }
    }
}

impl ReaderBuilder {
    /// Create a new builder for configuring a reader.
    ///
    /// To convert a builder into a reader, call one of the methods starting
    /// with `from_`.
    ///
    /// # Example
    ///
    /// ```
    /// use dsv::{ReaderBuilder, StringRecord};
    ///
    /// let data = "city;country\nBoston;United States\n";
    /// let mut rdr = ReaderBuilder::new()
    ///     .delimiter(';')
    ///     .from_reader(data.as_bytes());
    ///
    /// let mut record = StringRecord::new();
    /// assert!(rdr.read_record(&mut record).unwrap());
    /// assert_eq!(record, vec!["city", "country"]);
    /// ```
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a reader from this configuration that reads data from the
    /// file at `path`.
    ///
    /// If there was a problem opening the file, then this returns the
    /// corresponding error.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Reader<File>> {
        Ok(Reader::new(self, File::open(path)?))
    }

    /// Build a reader from this configuration that reads data from `rdr`.
    ///
    /// Note that the reader is buffered automatically, so you should not
    /// wrap `rdr` in a buffered reader like `io::BufReader`.
    ///
    /// Nothing is read from `rdr` until the first record is requested. A
    /// leading byte order mark is skipped at that point, so the stream seen
    /// through `get_ref`, `get_mut` or `into_inner` before then still
    /// starts with it.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Reader<R> {
        Reader::new(self, rdr)
    }

    /// The field delimiter to use when parsing.
    ///
    /// Any character may be used. The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ReaderBuilder {
        self.builder.delimiter(delimiter);
        self
    }

    /// The quote character to use when parsing.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut ReaderBuilder {
        self.builder.quote(quote);
        self
    }

    /// The record terminator to use when parsing.
    ///
    /// The default is `Terminator::CRLF`, which treats `\r`, `\n` or `\r\n`
    /// as a single record terminator. `Terminator::Any` accepts arbitrary
    /// text, including multi-character separators like `"[RS]"`. An empty
    /// `Terminator::Any` is the same as `Terminator::CRLF`.
    ///
    /// # Example
    ///
    /// ```
    /// use dsv::{ReaderBuilder, Terminator};
    ///
    /// let mut rdr = ReaderBuilder::new()
    ///     .terminator(Terminator::any("[RS]"))
    ///     .from_reader("a,b[RS]c,d".as_bytes());
    ///
    /// let records = rdr.read_all().unwrap();
    /// assert_eq!(records, vec![vec!["a", "b"], vec!["c", "d"]]);
    /// ```
    pub fn terminator(&mut self, term: Terminator) -> &mut ReaderBuilder {
        self.builder.terminator(term);
        self
    }

    /// Whether the number of fields in records is allowed to change or not.
    ///
    /// When disabled (which is the default), every record must have the
    /// number of fields set with `fields_per_record`. When enabled, records
    /// may have any number of fields and `fields_per_record` is ignored.
    pub fn flexible(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.flexible = yes;
        self
    }

    /// How to validate the number of fields in each record.
    ///
    /// By default, every record must have as many fields as the first.
    /// `FieldsPerRecord::from_count` converts the signed integer form,
    /// where a negative count disables validation.
    ///
    /// # Example
    ///
    /// ```
    /// use dsv::{FieldsPerRecord, ReaderBuilder};
    ///
    /// let mut rdr = ReaderBuilder::new()
    ///     .fields_per_record(FieldsPerRecord::Exact(2))
    ///     .from_reader("a\n".as_bytes());
    ///
    /// let err = rdr.read().unwrap_err();
    /// assert_eq!(err.parse_error().unwrap().column(), 0);
    /// ```
    pub fn fields_per_record(
        &mut self,
        mode: FieldsPerRecord,
    ) -> &mut ReaderBuilder {
        self.fields = mode;
        self
    }

    /// Set the capacity (in bytes) of the buffer used in the reader.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut ReaderBuilder {
        self.capacity = capacity;
        self
    }
}

/// A reader of delimiter-separated records.
///
/// The reader pulls bytes from any `io::Read`, decodes them as UTF-8 and
/// splits them into records of fields. Invalid UTF-8 is replaced with
/// U+FFFD. A leading byte order mark is skipped.
///
/// Records are produced one at a time. `read_record` reuses a caller
/// supplied record, while `read`, `read_all` and the iterators allocate.
///
/// # Example
///
/// ```
/// use dsv::Reader;
///
/// let data = "a,\"b\",\"c,d\"\n,\"\",\"g\n\"\n";
/// let mut rdr = Reader::from_reader(data.as_bytes());
///
/// assert_eq!(rdr.read().unwrap().unwrap(), vec!["a", "b", "c,d"]);
/// assert_eq!(rdr.read().unwrap().unwrap(), vec!["", "", "g\n"]);
/// assert!(rdr.read().unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct Reader<R> {
    /// The underlying state machine. Boxed since it owns the terminator.
    core: Box<CoreReader>,
    /// The source of characters.
    rdr: Lookahead<R>,
    /// Various bits of state maintained across records.
    state: ReaderState,
}

#[derive(Debug)]
struct ReaderState {
    /// The 1-based index of the next record to be returned.
    record: u64,
    /// The line on which the record being read started.
    line: u64,
    /// Validates the number of fields in each record.
    counter: FieldCounter,
    /// Whether any read has been attempted. The BOM is probed on the first.
    has_read: bool,
    /// Whether the end of the underlying reader has been reached.
    eof: bool,
}

impl Reader<File> {
    /// Create a new reader with a default configuration for the file at
    /// `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
        ReaderBuilder::new().from_path(path)
    }
}

impl<R: io::Read> Reader<R> {
    fn new(builder: &ReaderBuilder, rdr: R) -> Reader<R> {
        let mode = if builder.flexible {
            FieldsPerRecord::Flexible
        } else {
            builder.fields
        };
        Reader {
            core: Box::new(builder.builder.build()),
            rdr: Lookahead::with_capacity(builder.capacity, rdr),
            state: ReaderState {
                record: 1,
                line: 1,
                counter: FieldCounter::new(mode),
                has_read: false,
                eof: false,
            },
        }
    }

    /// Create a new reader with a default configuration for `rdr`.
    ///
    /// To customize the reader, use a `ReaderBuilder`. As with
    /// `ReaderBuilder::from_reader`, nothing is read (and no byte order mark
    /// is skipped) until the first record is requested.
    pub fn from_reader(rdr: R) -> Reader<R> {
        ReaderBuilder::new().from_reader(rdr)
    }

    /// Read a single record into the record given.
    ///
    /// Returns `false` when the end of input has been reached, in which case
    /// `record` is left empty. The contents of `record` are replaced on each
    /// call, so one record can be reused to avoid allocations.
    ///
    /// On error, `record` is cleared. The reader is not resynchronized, so
    /// continuing to read after an error yields unspecified records.
    ///
    /// # Example
    ///
    /// ```
    /// use dsv::{Reader, StringRecord};
    ///
    /// let mut rdr = Reader::from_reader("a,b\r\nc,d\r\n".as_bytes());
    /// let mut record = StringRecord::new();
    /// let mut count = 0;
    /// while rdr.read_record(&mut record).unwrap() {
    ///     assert_eq!(record.len(), 2);
    ///     count += 1;
    /// }
    /// assert_eq!(count, 2);
    /// ```
    pub fn read_record(&mut self, record: &mut StringRecord) -> Result<bool> {
        let result = self.read_record_impl(record);
        if result.is_err() {
            record.clear();
        }
        result
    }

    fn read_record_impl(&mut self, record: &mut StringRecord) -> Result<bool> {
        record.clear();
        if self.state.eof {
            return Ok(false);
        }
        if !self.state.has_read {
            self.state.has_read = true;
            if self.rdr.strip_bom()? {
                debug!("skipped leading byte order mark");
            }
        }
        self.state.line = self.rdr.line();

        let mut state = FieldState::Start;
        loop {
            let c = match self.rdr.next()? {
                Some(c) => c,
                None => return self.finish(state, record),
            };
            if !state.in_quotes() && self.at_terminator(c)? {
                record.end_field();
                self.complete(record)?;
                return Ok(true);
            }
            let (next, action) = self.core.transition(state, c);
            state = next;
            match action {
                Action::Discard => {}
                Action::Output(c) => record.push_char(c),
                Action::EndField => record.end_field(),
                Action::Error(kind) => return Err(self.error(record, kind)),
            }
        }
    }

    /// Returns true if a record terminator starts at `c`, consuming the rest
    /// of it.
    fn at_terminator(&mut self, c: char) -> io::Result<bool> {
        let term = self.core.terminator();
        let need = term.lookahead(c);
        let ahead: &[char] =
            if need == 0 { &[] } else { self.rdr.peek(need)? };
        match term.matches(c, ahead) {
            Match::Yes { consume } => {
                self.rdr.consume(consume);
                Ok(true)
            }
            Match::No => Ok(false),
        }
    }

    /// Handle the end of input while in `state`.
    fn finish(
        &mut self,
        state: FieldState,
        record: &mut StringRecord,
    ) -> Result<bool> {
        if let Err(kind) = self.core.transition_final(state) {
            return Err(self.error(record, kind));
        }
        self.state.eof = true;
        if record.is_empty() && !record.has_partial() {
            trace!("end of input after {} records", self.state.record - 1);
            return Ok(false);
        }
        record.end_field();
        self.complete(record)?;
        Ok(true)
    }

    /// Validate a finished record and count it.
    fn complete(&mut self, record: &StringRecord) -> Result<()> {
        if let Err(kind) = self.state.counter.check(record.len() as u64) {
            return Err(self.error(record, kind));
        }
        self.state.record += 1;
        Ok(())
    }

    fn error(&self, record: &StringRecord, kind: ErrorKind) -> Error {
        let (line, column) = if kind.is_field_level() {
            (self.rdr.line(), record.len() as u64 + 1)
        } else {
            (self.state.line, 0)
        };
        let err = ParseError::new(self.state.record, line, column, kind);
        debug!("{}", err);
        Error::Parse(err)
    }

    /// Read a single record, allocating a new `StringRecord` for it.
    ///
    /// Returns `None` when the end of input has been reached.
    pub fn read(&mut self) -> Result<Option<StringRecord>> {
        let mut record = StringRecord::new();
        if self.read_record(&mut record)? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    /// Read all remaining records.
    ///
    /// This stops at and returns the first error.
    pub fn read_all(&mut self) -> Result<Vec<StringRecord>> {
        self.records().collect()
    }

    /// Returns a borrowed iterator over all records.
    ///
    /// Each item yielded by this iterator is a `Result<StringRecord, Error>`.
    /// The iterator stops after yielding the first error.
    pub fn records(&mut self) -> StringRecordsIter<R> {
        StringRecordsIter { rdr: self, done: false }
    }

    /// Returns an owned iterator over all records.
    ///
    /// This is mostly useful when a reader needs to be returned from a
    /// function along with its records.
    pub fn into_records(self) -> StringRecordsIntoIter<R> {
        StringRecordsIntoIter { rdr: self, done: false }
    }

    /// Returns the current position of this reader.
    ///
    /// The record index is that of the next record to be read.
    pub fn position(&self) -> Position {
        Position { record: self.state.record, line: self.rdr.line() }
    }

    /// Returns true if and only if this reader has been exhausted.
    ///
    /// Once this is true, every read reports the end of input without
    /// touching the underlying reader.
    pub fn is_done(&self) -> bool {
        self.state.eof
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.rdr.get_ref()
    }

    /// Returns a mutable reference to the underlying reader.
    ///
    /// Reading from it directly skips any data that has already been
    /// buffered by this reader.
    pub fn get_mut(&mut self) -> &mut R {
        self.rdr.get_mut()
    }

    /// Unwraps this reader, returning the underlying reader.
    ///
    /// Any buffered data is lost.
    pub fn into_inner(self) -> R {
        self.rdr.into_inner()
    }
}

/// A position in delimiter-separated data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    record: u64,
    line: u64,
}

impl Position {
    /// The 1-based record index.
    pub fn record(&self) -> u64 {
        self.record
    }

    /// The 1-based line number.
    pub fn line(&self) -> u64 {
        self.line
    }
}

/// A borrowed iterator over records.
///
/// The lifetime parameter `'r` refers to the lifetime of the underlying
/// reader.
pub struct StringRecordsIter<'r, R: 'r> {
    rdr: &'r mut Reader<R>,
    done: bool,
}

impl<'r, R: io::Read> StringRecordsIter<'r, R> {
    /// Return a reference to the underlying reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Return a mutable reference to the underlying reader.
    pub fn reader_mut(&mut self) -> &mut Reader<R> {
        &mut self.rdr
    }
}

impl<'r, R: io::Read> Iterator for StringRecordsIter<'r, R> {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Result<StringRecord>> {
        if self.done {
            return None;
        }
        match self.rdr.read() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// An owned iterator over records.
pub struct StringRecordsIntoIter<R> {
    rdr: Reader<R>,
    done: bool,
}

impl<R: io::Read> StringRecordsIntoIter<R> {
    /// Return a reference to the underlying reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Return a mutable reference to the underlying reader.
    pub fn reader_mut(&mut self) -> &mut Reader<R> {
        &mut self.rdr
    }

    /// Drop this iterator and return the underlying reader.
    pub fn into_reader(self) -> Reader<R> {
        self.rdr
    }
}

impl<R: io::Read> Iterator for StringRecordsIntoIter<R> {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Result<StringRecord>> {
        if self.done {
            return None;
        }
        match self.rdr.read() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
