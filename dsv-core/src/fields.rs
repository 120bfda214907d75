#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::reader::ErrorKind;

/// How the number of fields per record is validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FieldsPerRecord {
    /// Records may have any number of fields.
    Flexible,
    /// Every record must have as many fields as the first record.
    ///
    /// This is the default.
    Infer,
    /// Every record, including the first, must have exactly this many
    /// fields.
    Exact(u64),
}

impl FieldsPerRecord {
    /// Interpret a signed field count.
    ///
    /// `0` infers the count from the first record, a positive count is
    /// enforced exactly and a negative count disables validation.
    pub fn from_count(count: i64) -> FieldsPerRecord {
        if count < 0 {
            FieldsPerRecord::Flexible
        } else if count == 0 {
            FieldsPerRecord::Infer
        } else {
            FieldsPerRecord::Exact(count as u64)
        }
    }
}

impl Default for FieldsPerRecord {
    fn default() -> FieldsPerRecord {
        FieldsPerRecord::Infer
    }
}

/// Checks the field count of each record against a `FieldsPerRecord`
/// policy.
///
/// In `Infer` mode, the first record checked establishes the expected count
/// for the lifetime of the counter.
#[derive(Clone, Debug)]
pub struct FieldCounter {
    mode: FieldsPerRecord,
    expected: Option<u64>,
}

impl FieldCounter {
    /// Create a new counter for the given policy.
    pub fn new(mode: FieldsPerRecord) -> FieldCounter {
        let expected = match mode {
            FieldsPerRecord::Exact(n) => Some(n),
            FieldsPerRecord::Flexible | FieldsPerRecord::Infer => None,
        };
        FieldCounter { mode, expected }
    }

    /// The count every record must have, if one has been established.
    ///
    /// This is always `None` for `Flexible`.
    pub fn expected(&self) -> Option<u64> {
        match self.mode {
            FieldsPerRecord::Flexible => None,
            _ => self.expected,
        }
    }

    /// Check a record with `len` fields.
    pub fn check(&mut self, len: u64) -> Result<(), ErrorKind> {
        if self.mode == FieldsPerRecord::Flexible {
            return Ok(());
        }
        match self.expected {
            None => {
                self.expected = Some(len);
                Ok(())
            }
            Some(expected_len) if expected_len == len => Ok(()),
            Some(expected_len) => {
                Err(ErrorKind::UnequalLengths { expected_len, len })
            }
        }
    }
}
