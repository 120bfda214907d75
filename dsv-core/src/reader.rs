use std::fmt;

/// A record terminator.
///
/// Use this to specify the record separator while parsing. The default is
/// `CRLF`, which treats `\r`, `\n` or `\r\n` as a single record terminator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Terminator {
    /// Parses `\r`, `\n` or `\r\n` as a single record terminator.
    CRLF,
    /// Parses the exact (non-empty) string given as a record terminator.
    ///
    /// Prefer [`Terminator::any`](#method.any) for construction, which maps
    /// an empty string to `CRLF`.
    Any(String),
}

impl Terminator {
    /// Create a terminator from arbitrary separator text.
    ///
    /// An empty string means "no custom separator", so it yields `CRLF`.
    pub fn any<S: Into<String>>(sep: S) -> Terminator {
        let sep = sep.into();
        if sep.is_empty() {
            Terminator::CRLF
        } else {
            Terminator::Any(sep)
        }
    }

    /// Returns the number of characters that must be peeked after `c` in
    /// order to decide whether `c` begins a record terminator.
    ///
    /// This is `0` whenever `c` cannot start a terminator, so ordinary field
    /// content never forces a peek.
    pub fn lookahead(&self, c: char) -> usize {
        match *self {
            Terminator::CRLF => (c == '\r') as usize,
            Terminator::Any(ref sep) => {
                let mut chars = sep.chars();
                if chars.next() == Some(c) {
                    chars.count()
                } else {
                    0
                }
            }
        }
    }

    /// Decide whether a record terminator begins at `c`.
    ///
    /// `ahead` holds the characters that follow `c` in the stream without
    /// having been consumed. It should contain at least
    /// `self.lookahead(c)` characters, and may only be shorter at the end of
    /// input.
    ///
    /// On a match, the number of characters from `ahead` that belong to the
    /// terminator is returned and the caller must consume exactly that many.
    /// A failed partial match never asks the caller to consume anything.
    pub fn matches(&self, c: char, ahead: &[char]) -> Match {
        match *self {
            Terminator::CRLF => match c {
                '\n' => Match::Yes { consume: 0 },
                '\r' if ahead.first() == Some(&'\n') => {
                    Match::Yes { consume: 1 }
                }
                '\r' => Match::Yes { consume: 0 },
                _ => Match::No,
            },
            Terminator::Any(ref sep) => {
                let mut chars = sep.chars();
                if chars.next() != Some(c) {
                    return Match::No;
                }
                let mut consume = 0;
                for want in chars {
                    match ahead.get(consume) {
                        Some(&got) if got == want => consume += 1,
                        _ => return Match::No,
                    }
                }
                Match::Yes { consume }
            }
        }
    }
}

impl Default for Terminator {
    fn default() -> Terminator {
        Terminator::CRLF
    }
}

/// The outcome of testing a position for a record terminator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Match {
    /// A terminator starts here.
    Yes {
        /// How many of the peeked characters belong to the terminator.
        consume: usize,
    },
    /// No terminator starts here. Nothing must be consumed.
    No,
}

/// The state of the field currently being accumulated.
///
/// This value lives only for the duration of reading one record. A driver
/// threads it through
/// [`Reader::transition`](struct.Reader.html#method.transition) and resets
/// it at each record boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldState {
    /// Nothing has been read for this field yet.
    Start,
    /// Accumulating a field that did not start with a quote.
    Unquoted,
    /// Inside an open quote. Delimiters and terminators are content here.
    Quoted,
    /// Saw a quote inside a quoted field. The next character decides
    /// between an escaped quote and the end of the quoted section.
    QuotePending,
}

impl FieldState {
    /// Returns true if and only if a quote is currently open.
    ///
    /// Record terminators are not recognized in this state.
    pub fn in_quotes(self) -> bool {
        self == FieldState::Quoted
    }
}

impl Default for FieldState {
    fn default() -> FieldState {
        FieldState::Start
    }
}

/// What a driver must do with the character it just fed to the reader.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// The character was syntax (an opening or closing quote). Drop it.
    Discard,
    /// Append this character to the current field.
    Output(char),
    /// The current field is complete and a new one begins.
    EndField,
    /// The input is malformed at this character.
    Error(ErrorKind),
}

/// The kinds of errors the state machine and field counter can report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A quote appeared inside an unquoted field after content had begun.
    BareQuote,
    /// Content followed the closing quote of a quoted field without an
    /// intervening delimiter or terminator.
    UnescapedQuote,
    /// The input ended inside an open quote.
    QuoteNotClosed,
    /// A record had a different number of fields than expected.
    UnequalLengths {
        /// The number of fields every record is expected to have.
        expected_len: u64,
        /// The number of fields in the offending record.
        len: u64,
    },
}

impl ErrorKind {
    /// Returns true if this error concerns a specific field, as opposed to
    /// the record as a whole.
    pub fn is_field_level(&self) -> bool {
        match *self {
            ErrorKind::UnequalLengths { .. } => false,
            _ => true,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::BareQuote => {
                write!(f, "bare quote in non-quoted field")
            }
            ErrorKind::UnescapedQuote => {
                write!(f, "unescaped quote in quoted field")
            }
            ErrorKind::QuoteNotClosed => write!(f, "quote is not closed"),
            ErrorKind::UnequalLengths { expected_len, len } => write!(
                f,
                "wrong number of fields: found record with {} fields, \
                 but expected {} fields",
                len, expected_len
            ),
        }
    }
}

/// A character driven state machine for delimiter-separated values.
///
/// This reader never reads anything itself. Callers feed it characters with
/// `transition` and act on the returned `Action`. Before feeding a character
/// (unless the current state is inside an open quote), callers must first
/// ask the `Terminator` whether a record ends there.
#[derive(Clone, Debug)]
pub struct Reader {
    /// The delimiter that separates fields.
    delimiter: char,
    /// The quotation character.
    quote: char,
    /// The terminator that separates records.
    term: Terminator,
}

impl Default for Reader {
    fn default() -> Reader {
        Reader { delimiter: ',', quote: '"', term: Terminator::default() }
    }
}

/// Builds a reader with various configuration knobs.
///
/// Once a `Reader` is built, its configuration cannot be changed.
#[derive(Debug, Default)]
pub struct ReaderBuilder {
    rdr: Reader,
}

impl ReaderBuilder {
    /// Create a new builder.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a reader from this configuration.
    pub fn build(&self) -> Reader {
        self.rdr.clone()
    }

    /// The field delimiter to use when parsing.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ReaderBuilder {
        self.rdr.delimiter = delimiter;
        self
    }

    /// The quote character to use when parsing.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut ReaderBuilder {
        self.rdr.quote = quote;
        self
    }

    /// The record terminator to use when parsing.
    ///
    /// `Terminator::Any("")` is treated as `Terminator::CRLF`.
    pub fn terminator(&mut self, term: Terminator) -> &mut ReaderBuilder {
        self.rdr.term = match term {
            Terminator::Any(sep) => Terminator::any(sep),
            crlf => crlf,
        };
        self
    }
}

impl Reader {
    /// Create a new reader with the default configuration.
    pub fn new() -> Reader {
        ReaderBuilder::new().build()
    }

    /// The field delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The quote character.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// The record terminator.
    pub fn terminator(&self) -> &Terminator {
        &self.term
    }

    /// Feed a single character to the state machine.
    ///
    /// Returns the state to use for the next character along with what to
    /// do with `c`. After `Action::EndField`, the returned state is always
    /// `FieldState::Start`. After `Action::Error`, the state is meaningless.
    pub fn transition(
        &self,
        state: FieldState,
        c: char,
    ) -> (FieldState, Action) {
        use self::FieldState::*;

        if c == self.delimiter && state != Quoted {
            return (Start, Action::EndField);
        }
        if c == self.quote {
            return match state {
                Start => (Quoted, Action::Discard),
                Quoted => (QuotePending, Action::Discard),
                QuotePending => (Quoted, Action::Output(c)),
                Unquoted => (Unquoted, Action::Error(ErrorKind::BareQuote)),
            };
        }
        match state {
            QuotePending => {
                (QuotePending, Action::Error(ErrorKind::UnescapedQuote))
            }
            Quoted => (Quoted, Action::Output(c)),
            Start | Unquoted => (Unquoted, Action::Output(c)),
        }
    }

    /// Called when the input is exhausted in the given state.
    ///
    /// Returns an error only if a quote is still open. Deciding whether any
    /// record remains is up to the caller, since that depends on what has
    /// been accumulated.
    pub fn transition_final(
        &self,
        state: FieldState,
    ) -> Result<(), ErrorKind> {
        if state.in_quotes() {
            Err(ErrorKind::QuoteNotClosed)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Action, ErrorKind, FieldState, Match, Reader, ReaderBuilder,
        Terminator,
    };

    type Csv = Vec<Vec<String>>;

    macro_rules! csv {
        ($([$($field:expr),*]),*) => {{
            #[allow(unused_mut)]
            fn x() -> Csv {
                let mut csv = Csv::new();
                $(
                    let mut row = Vec::new();
                    $(
                        row.push(String::from($field));
                    )*
                    csv.push(row);
                )*
                csv
            }
            x()
        }}
    }

    // A minimal in-memory driver. It mirrors the loop in the `dsv` crate
    // closely enough to exercise terminators and the state machine
    // together.
    fn parse(rdr: &Reader, data: &str) -> Result<Csv, (usize, ErrorKind)> {
        let chars: Vec<char> = data.chars().collect();
        let mut csv = Csv::new();
        let mut row = vec![];
        let mut field = String::new();
        let mut state = FieldState::Start;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            i += 1;
            if !state.in_quotes() {
                let need = rdr.terminator().lookahead(c);
                let end = chars.len().min(i + need);
                if let Match::Yes { consume } =
                    rdr.terminator().matches(c, &chars[i..end])
                {
                    i += consume;
                    row.push(field.split_off(0));
                    csv.push(row.split_off(0));
                    state = FieldState::Start;
                    continue;
                }
            }
            let (next, action) = rdr.transition(state, c);
            state = next;
            match action {
                Action::Discard => {}
                Action::Output(c) => field.push(c),
                Action::EndField => row.push(field.split_off(0)),
                Action::Error(err) => return Err((row.len() + 1, err)),
            }
        }
        rdr.transition_final(state).map_err(|err| (row.len() + 1, err))?;
        if !row.is_empty() || !field.is_empty() {
            row.push(field);
            csv.push(row);
        }
        Ok(csv)
    }

    macro_rules! parses_to {
        ($name:ident, $data:expr, $expected:expr) => {
            parses_to!($name, $data, $expected, |builder| builder);
        };
        ($name:ident, $data:expr, $expected:expr, $config:expr) => {
            #[test]
            fn $name() {
                let mut builder = ReaderBuilder::new();
                $config(&mut builder);
                let rdr = builder.build();
                let got = parse(&rdr, $data).unwrap();
                assert_eq!($expected, got);
            }
        };
    }

    macro_rules! fails_with {
        ($name:ident, $data:expr, $column:expr, $kind:expr) => {
            #[test]
            fn $name() {
                let rdr = Reader::new();
                assert_eq!(Err(($column, $kind)), parse(&rdr, $data));
            }
        };
    }

    parses_to!(one_row_one_field, "a", csv![["a"]]);
    parses_to!(one_row_many_fields, "a,b,c", csv![["a", "b", "c"]]);
    parses_to!(one_row_trailing_comma, "a,b,", csv![["a", "b", ""]]);
    parses_to!(one_row_one_field_lf, "a\n", csv![["a"]]);
    parses_to!(one_row_one_field_crlf, "a\r\n", csv![["a"]]);
    parses_to!(one_row_one_field_cr, "a\r", csv![["a"]]);
    parses_to!(
        many_rows_mixed_terminators,
        "a,b\nc,d\r\ne,f\rg,h",
        csv![["a", "b"], ["c", "d"], ["e", "f"], ["g", "h"]]
    );
    parses_to!(empty, "", csv![]);
    parses_to!(only_lf, "\n", csv![[""]]);
    parses_to!(blank_lines_are_records, "a\n\nb", csv![["a"], [""], ["b"]]);

    parses_to!(quote_empty, "\"\",x", csv![["", "x"]]);
    parses_to!(quote_delimiter, "\"a,b\"", csv![["a,b"]]);
    parses_to!(quote_newline, "\"a\nb\"\nc", csv![["a\nb"], ["c"]]);
    parses_to!(
        quote_doubled,
        r#""a","","a,b","""","""""","a""b""#,
        csv![["a", "", "a,b", "\"", "\"\"", "a\"b"]]
    );
    parses_to!(
        quote_change,
        "'a','b'\n'''''',''",
        csv![["a", "b"], ["''", ""]],
        |b: &mut ReaderBuilder| {
            b.quote('\'');
        }
    );
    parses_to!(
        delimiter_tab,
        "a\tb\n\"\t\"\t",
        csv![["a", "b"], ["\t", ""]],
        |b: &mut ReaderBuilder| {
            b.delimiter('\t');
        }
    );
    parses_to!(
        non_ascii,
        "あ,\"日本語,한글\"\n",
        csv![["あ", "日本語,한글"]]
    );

    parses_to!(
        term_one_char,
        "a,b|c,d|e\n,\"f|\"",
        csv![["a", "b"], ["c", "d"], ["e\n", "f|"]],
        |b: &mut ReaderBuilder| {
            b.terminator(Terminator::any("|"));
        }
    );
    parses_to!(
        term_multi_char,
        "a,b[RS]c\n,[RS[RS]d,\"[RS]\"\"\"[RS]",
        csv![["a", "b"], ["c\n", "[RS"], ["d", "[RS]\""]],
        |b: &mut ReaderBuilder| {
            b.terminator(Terminator::any("[RS]"));
        }
    );
    parses_to!(
        term_partial_at_end,
        "a[R",
        csv![["a[R"]],
        |b: &mut ReaderBuilder| {
            b.terminator(Terminator::any("[RS]"));
        }
    );
    parses_to!(
        term_empty_is_crlf,
        "a\r\nb",
        csv![["a"], ["b"]],
        |b: &mut ReaderBuilder| {
            b.terminator(Terminator::Any(String::new()));
        }
    );

    fails_with!(bare_quote, "a,b\",c", 2, ErrorKind::BareQuote);
    fails_with!(unescaped_quote, "a,b,\"c\"d\"", 3, ErrorKind::UnescapedQuote);
    fails_with!(quote_not_closed, "d,e,\"f,\n", 3, ErrorKind::QuoteNotClosed);

    #[test]
    fn matches_crlf() {
        let t = Terminator::CRLF;
        assert_eq!(Match::Yes { consume: 0 }, t.matches('\n', &[]));
        assert_eq!(Match::Yes { consume: 0 }, t.matches('\r', &[]));
        assert_eq!(Match::Yes { consume: 0 }, t.matches('\r', &['x']));
        assert_eq!(Match::Yes { consume: 1 }, t.matches('\r', &['\n']));
        assert_eq!(Match::No, t.matches('x', &['\n']));
    }

    #[test]
    fn matches_any() {
        let t = Terminator::any("[RS]");
        assert_eq!(3, t.lookahead('['));
        assert_eq!(0, t.lookahead('R'));
        assert_eq!(
            Match::Yes { consume: 3 },
            t.matches('[', &['R', 'S', ']'])
        );
        assert_eq!(Match::No, t.matches('[', &['R', 'S', '[']));
        assert_eq!(Match::No, t.matches('[', &['R', 'S']));
        assert_eq!(Match::No, t.matches('x', &['R', 'S', ']']));

        let t = Terminator::any("|");
        assert_eq!(0, t.lookahead('|'));
        assert_eq!(Match::Yes { consume: 0 }, t.matches('|', &[]));
    }

    #[test]
    fn lookahead_crlf_only_for_cr() {
        let t = Terminator::CRLF;
        assert_eq!(1, t.lookahead('\r'));
        assert_eq!(0, t.lookahead('\n'));
        assert_eq!(0, t.lookahead('a'));
    }

    #[test]
    fn builder_settings() {
        let rdr = Reader::new();
        assert_eq!(',', rdr.delimiter());
        assert_eq!('"', rdr.quote());
        assert_eq!(&Terminator::CRLF, rdr.terminator());

        let rdr = ReaderBuilder::new()
            .delimiter(';')
            .quote('\'')
            .terminator(Terminator::any("[RS]"))
            .build();
        assert_eq!(';', rdr.delimiter());
        assert_eq!('\'', rdr.quote());
        assert_eq!(&Terminator::any("[RS]"), rdr.terminator());

        let rdr = ReaderBuilder::new()
            .terminator(Terminator::Any(String::new()))
            .build();
        assert_eq!(&Terminator::CRLF, rdr.terminator());
    }

    #[test]
    fn quote_pending_accepts_delimiter() {
        let rdr = Reader::new();
        let (state, action) = rdr.transition(FieldState::QuotePending, ',');
        assert_eq!(FieldState::Start, state);
        assert_eq!(Action::EndField, action);
    }

    #[test]
    fn final_transition() {
        let rdr = Reader::new();
        assert_eq!(Ok(()), rdr.transition_final(FieldState::Start));
        assert_eq!(Ok(()), rdr.transition_final(FieldState::QuotePending));
        assert_eq!(
            Err(ErrorKind::QuoteNotClosed),
            rdr.transition_final(FieldState::Quoted)
        );
    }
}
