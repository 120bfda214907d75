/*!
`dsv-core` provides the I/O-free parts of a delimiter-separated value reader
and writer.

Nothing in this crate touches a stream. The reader side is a state machine
that is fed one character at a time (plus a small amount of lookahead when a
character might begin a record terminator) and tells the caller what to do
with it. The writer side is a pure encoder from field text to its quoted and
escaped form. The `dsv` crate wraps both around `std::io`.

# Example: driving the state machine

This example tokenizes a single record. A real driver also consults
[`Terminator::matches`](enum.Terminator.html#method.matches) before each
transition; see the `dsv` crate for the complete loop.

```
use dsv_core::{Action, FieldState, Reader};

let rdr = Reader::new();
let mut state = FieldState::default();
let (mut fields, mut field) = (vec![], String::new());
for c in r#"a,"b,c",d"#.chars() {
    let (next, action) = rdr.transition(state, c);
    state = next;
    match action {
        Action::Output(c) => field.push(c),
        Action::EndField => fields.push(std::mem::take(&mut field)),
        Action::Discard => {}
        Action::Error(err) => panic!("{}", err),
    }
}
rdr.transition_final(state).unwrap();
fields.push(field);
assert_eq!(fields, vec!["a", "b,c", "d"]);
```

# Example: encoding fields

```
use dsv_core::Writer;

let wtr = Writer::new();
assert_eq!(wtr.encode_field("plain"), "plain");
assert_eq!(wtr.encode_field("a,b"), "\"a,b\"");
assert_eq!(wtr.encode_field("say \"hi\""), "\"say \"\"hi\"\"\"");
```
*/

#![deny(missing_docs)]

pub use crate::fields::{FieldCounter, FieldsPerRecord};
pub use crate::reader::{
    Action, ErrorKind, FieldState, Match, Reader, ReaderBuilder, Terminator,
};
pub use crate::writer::{QuoteStyle, Writer, WriterBuilder};

mod fields;
mod reader;
mod writer;
