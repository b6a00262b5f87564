//! Sample fixed-width person record
//!
//! The record layout used by the form-driven application on top of the
//! engine, and by the randomized tester. Every field occupies a fixed number
//! of bytes regardless of the actual string length: longer values are
//! truncated at construction, shorter ones zero-padded on encode.
//!
//! ## Layout (59 bytes)
//! ```text
//! [len: u32][first_name: 15 bytes][len: u32][last_name: 14 bytes]
//! [born_at_millis: i64][len: u32][id: 10 bytes]
//! ```

use crate::record::Record;
use crate::{Result, StorageError};

pub const MAX_FIRST_NAME_LEN: usize = 15;
pub const MAX_LAST_NAME_LEN: usize = 14;
pub const ID_LEN: usize = 10;

/// A person record keyed by its fixed-width `id` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    first_name: String,
    last_name: String,
    born_at_millis: i64,
    id: String,
}

impl Person {
    /// Build a person, truncating over-long fields to their fixed widths.
    pub fn new(first_name: &str, last_name: &str, born_at_millis: i64, id: &str) -> Self {
        Self {
            first_name: truncate_to(first_name, MAX_FIRST_NAME_LEN),
            last_name: truncate_to(last_name, MAX_LAST_NAME_LEN),
            born_at_millis,
            id: truncate_to(id, ID_LEN),
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn born_at_millis(&self) -> i64 {
        self.born_at_millis
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Person {
    type Key = str;

    // 3 length prefixes + 3 fixed-width fields + timestamp
    const SIZE: usize = 4 + MAX_FIRST_NAME_LEN + 4 + MAX_LAST_NAME_LEN + 8 + 4 + ID_LEN;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        write_fixed_string(&mut buf, &self.first_name, MAX_FIRST_NAME_LEN);
        write_fixed_string(&mut buf, &self.last_name, MAX_LAST_NAME_LEN);
        buf.extend_from_slice(&self.born_at_millis.to_le_bytes());
        write_fixed_string(&mut buf, &self.id, ID_LEN);
        debug_assert_eq!(buf.len(), Self::SIZE);
        buf
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(StorageError::InvalidData(format!(
                "person record expects {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        let mut offset = 0;
        let first_name = read_fixed_string(bytes, &mut offset, MAX_FIRST_NAME_LEN)?;
        let last_name = read_fixed_string(bytes, &mut offset, MAX_LAST_NAME_LEN)?;
        let born_at_millis = i64::from_le_bytes(
            bytes[offset..offset + 8]
                .try_into()
                .expect("slice length checked above"),
        );
        offset += 8;
        let id = read_fixed_string(bytes, &mut offset, ID_LEN)?;
        Ok(Self {
            first_name,
            last_name,
            born_at_millis,
            id,
        })
    }

    fn matches(&self, key: &str) -> bool {
        self.id == key
    }
}

/// Truncate to the largest char boundary at or below `max` bytes.
fn truncate_to(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

fn write_fixed_string(buf: &mut Vec<u8>, value: &str, width: usize) {
    debug_assert!(value.len() <= width);
    buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
    buf.extend_from_slice(value.as_bytes());
    buf.resize(buf.len() + width - value.len(), 0);
}

fn read_fixed_string(bytes: &[u8], offset: &mut usize, width: usize) -> Result<String> {
    let len = u32::from_le_bytes(
        bytes[*offset..*offset + 4]
            .try_into()
            .expect("slice length checked by caller"),
    ) as usize;
    *offset += 4;
    if len > width {
        return Err(StorageError::InvalidData(format!(
            "string length {} exceeds field width {}",
            len, width
        )));
    }
    let field = &bytes[*offset..*offset + width];
    *offset += width;
    String::from_utf8(field[..len].to_vec())
        .map_err(|e| StorageError::InvalidData(format!("invalid UTF-8 in string field: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let person = Person::new("Ada", "Lovelace", 1_234_567_890, "id-0000001");
        let bytes = person.encode();
        assert_eq!(bytes.len(), Person::SIZE);

        let decoded = Person::decode(&bytes).unwrap();
        assert_eq!(decoded, person);
    }

    #[test]
    fn test_long_fields_truncated() {
        let person = Person::new(
            "a-very-long-first-name",
            "a-very-long-last-name",
            0,
            "an-id-that-is-too-long",
        );
        assert_eq!(person.first_name().len(), MAX_FIRST_NAME_LEN);
        assert_eq!(person.last_name().len(), MAX_LAST_NAME_LEN);
        assert_eq!(person.id().len(), ID_LEN);

        // Truncation happens at construction, so the codec stays lossless.
        let decoded = Person::decode(&person.encode()).unwrap();
        assert_eq!(decoded, person);
    }

    #[test]
    fn test_matches_compares_key_only() {
        let a = Person::new("Ada", "Lovelace", 1, "same-id-00");
        let b = Person::new("Grace", "Hopper", 2, "same-id-00");
        assert!(a.matches("same-id-00"));
        assert!(b.matches("same-id-00"));
        assert!(!a.matches("other-id-0"));
    }

    #[test]
    fn test_zero_record_decodes_to_empty_fields() {
        let zero = Person::decode(&vec![0u8; Person::SIZE]).unwrap();
        assert_eq!(zero.first_name(), "");
        assert_eq!(zero.last_name(), "");
        assert_eq!(zero.born_at_millis(), 0);
        assert_eq!(zero.id(), "");
        // The zero record's key is the empty string, which no real id uses.
        assert!(zero.matches(""));
        assert!(!zero.matches("id-0000001"));
    }
}
