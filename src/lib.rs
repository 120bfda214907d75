/*!
The `dsv` crate provides a streaming reader and writer for
delimiter-separated values, with a configurable delimiter, quote character
and record terminator.

Any character may be used as the delimiter or the quote, and the record
terminator may be arbitrary text, including multi-character separators like
`"[RS]"`. By default, `\n`, `\r` and `\r\n` all end a record when reading,
while `\r\n` is written after each record when writing.

The parsing and encoding logic lives in the I/O-free `dsv-core` crate. This
crate wraps it around `std::io`, decodes UTF-8 and provides convenient
record types.

# Example: reading

```
use dsv::{ReaderBuilder, Terminator};

# fn main() -> Result<(), dsv::Error> {
let data = "city|pop[RS]Boston|4628910[RS]\"Concord|NH\"|42695[RS]";
let mut rdr = ReaderBuilder::new()
    .delimiter('|')
    .terminator(Terminator::any("[RS]"))
    .from_reader(data.as_bytes());
for result in rdr.records() {
    let record = result?;
    assert_eq!(record.len(), 2);
}
# Ok(())
# }
```

# Example: writing

```
use dsv::{QuoteStyle, WriterBuilder};

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let mut wtr = WriterBuilder::new()
    .quote_style(QuoteStyle::Necessary)
    .from_writer(vec![]);
wtr.write_record(&["name", "quote"])?;
wtr.write_record(&["Alice", "say \"hi\""])?;

let data = String::from_utf8(wtr.into_inner()?)?;
assert_eq!(data, "name,quote\r\nAlice,\"say \"\"hi\"\"\"\r\n");
# Ok(())
# }
```

# Errors

Reading can fail with an I/O error or a parse error. Parse errors carry the
record index, line and column at which they were detected. Parsing stops at
the first error: no attempt is made to resynchronize with the input.
*/

#![deny(missing_docs)]

pub use dsv_core::{
    ErrorKind as ParseErrorKind, FieldsPerRecord, QuoteStyle, Terminator,
};

pub use crate::config::{ReaderConfig, WriterConfig};
pub use crate::error::{Error, IntoInnerError, ParseError, Result};
pub use crate::reader::{
    Position, Reader, ReaderBuilder, StringRecordsIntoIter, StringRecordsIter,
};
pub use crate::string_record::{StringRecord, StringRecordIter};
pub use crate::writer::{Writer, WriterBuilder};

mod config;
mod error;
mod lookahead;
mod reader;
mod string_record;
mod writer;

/// The default capacity of read and write buffers.
const DEFAULT_BUFFER_CAPACITY: usize = 8 * (1 << 10);
