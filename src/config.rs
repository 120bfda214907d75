#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use dsv_core::{FieldsPerRecord, QuoteStyle, Terminator};

use crate::reader::ReaderBuilder;
use crate::writer::WriterBuilder;
use crate::DEFAULT_BUFFER_CAPACITY;

/// A reader dialect as plain data.
///
/// With the `serde` feature enabled (the default), this can be loaded from
/// any serde format. Missing keys take their default values.
///
/// # Example
///
/// ```
/// use dsv::ReaderConfig;
///
/// let config = ReaderConfig { delimiter: '|', ..ReaderConfig::default() };
/// let mut rdr = config.builder().from_reader("a|b\n".as_bytes());
/// assert_eq!(rdr.read().unwrap().unwrap(), vec!["a", "b"]);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReaderConfig {
    /// The field delimiter.
    pub delimiter: char,
    /// The quote character.
    pub quote: char,
    /// The record separator. When absent or empty, `\n`, `\r` and `\r\n`
    /// all end a record.
    pub record_separator: Option<String>,
    /// How to validate the number of fields in each record.
    pub fields_per_record: FieldsPerRecord,
    /// The capacity (in bytes) of the read buffer.
    pub buffer_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> ReaderConfig {
        ReaderConfig {
            delimiter: ',',
            quote: '"',
            record_separator: None,
            fields_per_record: FieldsPerRecord::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl ReaderConfig {
    /// Create a reader builder with this configuration.
    pub fn builder(&self) -> ReaderBuilder {
        let term = match self.record_separator {
            None => Terminator::CRLF,
            Some(ref sep) => Terminator::any(sep.as_str()),
        };
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .terminator(term)
            .fields_per_record(self.fields_per_record)
            .buffer_capacity(self.buffer_capacity);
        builder
    }
}

/// A writer dialect as plain data.
///
/// With the `serde` feature enabled (the default), this can be loaded from
/// any serde format. Missing keys take their default values.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WriterConfig {
    /// The field delimiter.
    pub delimiter: char,
    /// The quote character.
    pub quote: char,
    /// When to quote fields.
    pub quote_style: QuoteStyle,
    /// The text written after every record.
    pub record_separator: String,
    /// The capacity (in bytes) of the write buffer.
    pub buffer_capacity: usize,
}

impl Default for WriterConfig {
    fn default() -> WriterConfig {
        WriterConfig {
            delimiter: ',',
            quote: '"',
            quote_style: QuoteStyle::default(),
            record_separator: String::from("\r\n"),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl WriterConfig {
    /// Create a writer builder with this configuration.
    pub fn builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .quote_style(self.quote_style)
            .terminator(self.record_separator.as_str())
            .buffer_capacity(self.buffer_capacity);
        builder
    }
}

#[cfg(test)]
mod tests {
    use dsv_core::{FieldsPerRecord, QuoteStyle};

    use super::{ReaderConfig, WriterConfig};

    #[test]
    fn reader_builder_uses_config() {
        let config = ReaderConfig {
            delimiter: ';',
            quote: '\'',
            record_separator: Some(String::from("|")),
            fields_per_record: FieldsPerRecord::Flexible,
            buffer_capacity: 16,
        };
        let mut rdr = config.builder().from_reader("a;'b;c'|d\n|".as_bytes());
        let records = rdr.read_all().unwrap();
        assert_eq!(records, vec![vec!["a", "b;c"], vec!["d\n"]]);
    }

    #[test]
    fn empty_record_separator_is_newlines() {
        let config = ReaderConfig {
            record_separator: Some(String::new()),
            ..ReaderConfig::default()
        };
        let mut rdr = config.builder().from_reader("a\r\nb".as_bytes());
        assert_eq!(rdr.read_all().unwrap(), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn writer_builder_uses_config() {
        let config = WriterConfig {
            delimiter: '\t',
            quote_style: QuoteStyle::Always,
            record_separator: String::from("\n"),
            ..WriterConfig::default()
        };
        let mut wtr = config.builder().from_writer(vec![]);
        wtr.write_record(&["a", "b"]).unwrap();
        let got = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(got, "\"a\"\t\"b\"\n");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_reader_config() {
        let config: ReaderConfig = serde_json::from_str(
            r#"{
                "delimiter": "\t",
                "record_separator": "[RS]",
                "fields_per_record": {"exact": 3}
            }"#,
        )
        .unwrap();
        assert_eq!(
            config,
            ReaderConfig {
                delimiter: '\t',
                record_separator: Some(String::from("[RS]")),
                fields_per_record: FieldsPerRecord::Exact(3),
                ..ReaderConfig::default()
            }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_writer_config() {
        let config: WriterConfig =
            serde_json::from_str(r#"{"quote": "'", "quote_style": "always"}"#)
                .unwrap();
        assert_eq!(config.quote, '\'');
        assert_eq!(config.quote_style, QuoteStyle::Always);
        assert_eq!(config.record_separator, "\r\n");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn empty_object_is_default() {
        let config: ReaderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ReaderConfig::default());
    }
}
