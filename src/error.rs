use std::error;
use std::fmt;
use std::io;
use std::result;

use dsv_core::ErrorKind;

/// A type alias for `Result<T, dsv::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing delimiter-separated data.
///
/// This error can happen when writing or reading. Writing can only fail
/// with an I/O error.
#[derive(Debug)]
pub enum Error {
    /// An I/O error that occurred while reading or writing.
    Io(io::Error),
    /// The data being read is malformed, or a record has the wrong number
    /// of fields.
    Parse(ParseError),
}

impl Error {
    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        match *self {
            Error::Io(_) => true,
            Error::Parse(_) => false,
        }
    }

    /// Returns the parse error, if this is one.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match *self {
            Error::Io(_) => None,
            Error::Parse(ref err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(err) => err,
            Error::Parse(err) => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Parse(ref err) => Some(err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::Parse(ref err) => err.fmt(f),
        }
    }
}

/// A parse error with the position at which it was detected.
///
/// Field-level errors report the 1-based position of the field being built
/// in `column`. Record-level errors (a wrong number of fields) report a
/// `column` of `0`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    record: u64,
    line: u64,
    column: u64,
    kind: ErrorKind,
}

impl ParseError {
    pub(crate) fn new(
        record: u64,
        line: u64,
        column: u64,
        kind: ErrorKind,
    ) -> ParseError {
        ParseError { record, line, column, kind }
    }

    /// The 1-based index of the record in which this error occurred.
    pub fn record(&self) -> u64 {
        self.record
    }

    /// The 1-based line number at which this error was detected.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The 1-based position of the offending field, or `0` if this error
    /// concerns the record as a whole.
    pub fn column(&self) -> u64 {
        self.column
    }

    /// The kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.column == 0 {
            write!(
                f,
                "parse error on record {} (line {}): {}",
                self.record, self.line, self.kind
            )
        } else {
            write!(
                f,
                "parse error on record {}, column {} (line {}): {}",
                self.record, self.column, self.line, self.kind
            )
        }
    }
}

/// `IntoInnerError` occurs when consuming a `Writer` fails.
///
/// Consuming the `Writer` causes a flush to happen. If the flush fails, then
/// this error is returned, which contains both the original `Writer` and
/// the error that occurred.
///
/// The type parameter `W` is the unconsumed writer.
pub struct IntoInnerError<W> {
    wtr: W,
    err: io::Error,
}

impl<W> IntoInnerError<W> {
    pub(crate) fn new(wtr: W, err: io::Error) -> IntoInnerError<W> {
        IntoInnerError { wtr, err }
    }

    /// Returns the error which caused the call to `into_inner` to fail.
    ///
    /// This error was returned when attempting to flush the internal buffer.
    pub fn error(&self) -> &io::Error {
        &self.err
    }

    /// Returns the underlying writer which generated the error.
    ///
    /// The returned value can be used for error recovery, such as
    /// re-inspecting the buffer.
    pub fn into_inner(self) -> W {
        self.wtr
    }
}

impl<W: std::any::Any> error::Error for IntoInnerError<W> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.err)
    }
}

impl<W> fmt::Display for IntoInnerError<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl<W> fmt::Debug for IntoInnerError<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.err.fmt(f)
    }
}
