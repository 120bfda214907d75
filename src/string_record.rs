use std::fmt;
use std::iter::FromIterator;
use std::ops::{self, Range};

/// A single record stored as text.
///
/// All fields are stored contiguously in one `String`, alongside the end
/// offset of each field. Reading into the same record repeatedly therefore
/// reuses its allocations.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct StringRecord {
    /// All fields in this record, stored contiguously.
    fields: String,
    /// The number of and location of each field in this record.
    bounds: Bounds,
}

impl StringRecord {
    /// Create a new empty `StringRecord`.
    pub fn new() -> StringRecord {
        StringRecord::default()
    }

    /// Create a new empty `StringRecord` with the given capacity.
    ///
    /// `buffer` refers to the capacity of the buffer used to store the
    /// actual field contents, while `fields` refers to the number of fields
    /// one might expect to store.
    pub fn with_capacity(buffer: usize, fields: usize) -> StringRecord {
        StringRecord {
            fields: String::with_capacity(buffer),
            bounds: Bounds { ends: Vec::with_capacity(fields) },
        }
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.bounds.get(i).map(|range| &self.fields[range])
    }

    /// Returns true if and only if this record is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Clear this record so that it has zero fields.
    ///
    /// Note that it is not necessary to clear the record to reuse it with
    /// a reader.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.bounds.ends.clear();
    }

    /// Returns an iterator over all fields in this record.
    pub fn iter(&self) -> StringRecordIter {
        StringRecordIter { r: self, start: 0, i: 0 }
    }

    /// Add a new field to this record.
    pub fn push_field(&mut self, field: &str) {
        self.fields.push_str(field);
        self.end_field();
    }

    /// Return the contents of all fields concatenated together.
    pub fn as_slice(&self) -> &str {
        &self.fields[..self.bounds.end()]
    }

    /// Append a character to the field currently being built.
    pub(crate) fn push_char(&mut self, c: char) {
        self.fields.push(c);
    }

    /// Complete the field currently being built, which may be empty.
    pub(crate) fn end_field(&mut self) {
        self.bounds.add(self.fields.len());
    }

    /// Returns true if a field is being built and has content.
    pub(crate) fn has_partial(&self) -> bool {
        self.fields.len() > self.bounds.end()
    }
}

/// The bounds of fields in a single record.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Bounds {
    /// The ending index of each field. Guaranteed to fall on UTF-8
    /// boundaries.
    ends: Vec<usize>,
}

impl Bounds {
    /// Returns the bounds of field `i`.
    fn get(&self, i: usize) -> Option<Range<usize>> {
        let end = *self.ends.get(i)?;
        let start = match i.checked_sub(1).and_then(|i| self.ends.get(i)) {
            None => 0,
            Some(&start) => start,
        };
        Some(start..end)
    }

    /// Return the last position of the last field.
    ///
    /// If there are no fields, this returns `0`.
    fn end(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Returns the number of fields in these bounds.
    fn len(&self) -> usize {
        self.ends.len()
    }

    /// Add a new field with the given ending position.
    fn add(&mut self, pos: usize) {
        self.ends.push(pos);
    }
}

impl fmt::Debug for StringRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fields: Vec<&str> = self.iter().collect();
        write!(f, "StringRecord({:?})", fields)
    }
}

impl ops::Index<usize> for StringRecord {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        match self.get(i) {
            Some(field) => field,
            None => panic!(
                "index out of bounds: the record has {} fields but the \
                 index is {}",
                self.len(),
                i
            ),
        }
    }
}

impl<T: AsRef<str>> PartialEq<[T]> for StringRecord {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<'a, T: AsRef<str>> PartialEq<&'a [T]> for StringRecord {
    fn eq(&self, other: &&'a [T]) -> bool {
        *self == **other
    }
}

impl<T: AsRef<str>> PartialEq<Vec<T>> for StringRecord {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == **other
    }
}

impl<T: AsRef<str>> From<Vec<T>> for StringRecord {
    fn from(xs: Vec<T>) -> StringRecord {
        StringRecord::from_iter(xs)
    }
}

impl<'a, T: AsRef<str>> From<&'a [T]> for StringRecord {
    fn from(xs: &'a [T]) -> StringRecord {
        StringRecord::from_iter(xs)
    }
}

impl<T: AsRef<str>> FromIterator<T> for StringRecord {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> StringRecord {
        let mut record = StringRecord::new();
        record.extend(iter);
        record
    }
}

impl<T: AsRef<str>> Extend<T> for StringRecord {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for x in iter {
            self.push_field(x.as_ref());
        }
    }
}

impl<'a> IntoIterator for &'a StringRecord {
    type IntoIter = StringRecordIter<'a>;
    type Item = &'a str;

    fn into_iter(self) -> StringRecordIter<'a> {
        self.iter()
    }
}

/// An iterator over the fields in a string record.
///
/// The `'r` lifetime variable refers to the lifetime of the `StringRecord`
/// that is being iterated over.
pub struct StringRecordIter<'r> {
    r: &'r StringRecord,
    start: usize,
    i: usize,
}

impl<'r> Iterator for StringRecordIter<'r> {
    type Item = &'r str;

    fn next(&mut self) -> Option<&'r str> {
        let end = *self.r.bounds.ends.get(self.i)?;
        let field = &self.r.fields[self.start..end];
        self.start = end;
        self.i += 1;
        Some(field)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.r.len() - self.i;
        (n, Some(n))
    }
}

impl<'r> ExactSizeIterator for StringRecordIter<'r> {}

#[cfg(test)]
mod tests {
    use super::StringRecord;

    #[test]
    fn record_1() {
        let mut rec = StringRecord::new();
        rec.push_field("foo");

        assert_eq!(rec.len(), 1);
        assert_eq!(rec.get(0), Some("foo"));
        assert_eq!(rec.get(1), None);
        assert_eq!(rec.get(2), None);
    }

    #[test]
    fn record_2() {
        let mut rec = StringRecord::new();
        rec.push_field("foo");
        rec.push_field("quux");

        assert_eq!(rec.len(), 2);
        assert_eq!(rec.get(0), Some("foo"));
        assert_eq!(rec.get(1), Some("quux"));
        assert_eq!(rec.get(2), None);
        assert_eq!(&rec[1], "quux");
        assert_eq!(rec.as_slice(), "fooquux");
    }

    #[test]
    fn empty_fields() {
        let rec = StringRecord::from(vec!["", "", ""]);
        assert_eq!(rec.len(), 3);
        assert!(rec.iter().all(|f| f.is_empty()));
        assert_eq!(rec, vec!["", "", ""]);
    }

    #[test]
    fn partial_field_is_not_a_field() {
        let mut rec = StringRecord::new();
        rec.push_char('a');
        assert!(rec.is_empty());
        assert!(rec.has_partial());
        assert_eq!(rec.get(0), None);
        rec.end_field();
        assert!(!rec.has_partial());
        assert_eq!(rec, vec!["a"]);
    }

    #[test]
    fn multi_byte_fields() {
        let rec: StringRecord = vec!["あ", "日本語,한글"].into();
        assert_eq!(rec.get(1), Some("日本語,한글"));
        assert_eq!(rec.iter().len(), 2);
    }

    #[test]
    fn clear_then_reuse() {
        let mut rec = StringRecord::from(vec!["a", "b"]);
        rec.clear();
        assert!(rec.is_empty());
        rec.push_field("c");
        assert_eq!(rec, vec!["c"]);
    }

    #[test]
    fn debug() {
        let rec = StringRecord::from(vec!["a", "b,c"]);
        assert_eq!(format!("{:?}", rec), r#"StringRecord(["a", "b,c"])"#);
    }
}
