//! Line formats for list files and custom die entity files.
//!
//! Fields are separated by the ASCII unit separator, which cannot be typed
//! into a name. List files hold one `name SEP file` entry per line; a custom
//! die file is a single record `name SEP min SEP max [SEP face]...`.

use rtb_core::MAX_FACES;

use crate::error::{StoreError, StoreResult};

/// Field separator used by every flat file.
pub const FIELD_SEPARATOR: char = '\u{1F}';

/// One line of a list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Display name, unique within the list.
    pub name: String,
    /// Entity file holding the item.
    pub file: String,
}

impl ListEntry {
    /// The line for this entry, without a trailing newline.
    pub fn to_line(&self) -> String {
        format!("{}{FIELD_SEPARATOR}{}", self.name, self.file)
    }
}

/// Parse a whole list file. Blank lines are skipped.
pub fn parse_list(text: &str) -> StoreResult<Vec<ListEntry>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(number, line)| {
            let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
            match fields.as_slice() {
                [name, file] if !name.is_empty() && !file.is_empty() => Ok(ListEntry {
                    name: (*name).to_string(),
                    file: (*file).to_string(),
                }),
                _ => Err(StoreError::CorruptData(format!(
                    "list line {} has {} fields, expected 2",
                    number + 1,
                    fields.len()
                ))),
            }
        })
        .collect()
}

/// Render a whole list file.
pub fn format_list<'a>(entries: impl IntoIterator<Item = &'a ListEntry>) -> String {
    entries
        .into_iter()
        .map(|entry| format!("{}\n", entry.to_line()))
        .collect()
}

/// Fail if `name` could not be stored in a list or entity file.
pub fn check_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidOperation("names cannot be empty".into()));
    }
    if name.contains(FIELD_SEPARATOR) || name.contains(['\n', '\r']) {
        return Err(StoreError::InvalidOperation(format!(
            "name {name:?} contains a reserved character"
        )));
    }
    Ok(())
}

/// The persisted fields of a custom die type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDieRecord {
    /// Name as written in the file.
    pub name: String,
    /// Lowest result.
    pub min: i32,
    /// Highest result.
    pub max: i32,
    /// Face source per result; empty strings mean no explicit image. May be
    /// shorter than the range, in which case the rest are generic.
    pub faces: Vec<String>,
}

impl CustomDieRecord {
    /// Decode an entity file.
    pub fn parse(text: &str) -> StoreResult<Self> {
        let text = text.strip_suffix('\n').unwrap_or(text);
        let mut fields = text.split(FIELD_SEPARATOR);
        let name = fields.next().unwrap_or_default().to_string();
        let min = parse_bound(fields.next(), "minimum")?;
        let max = parse_bound(fields.next(), "maximum")?;
        if min > max {
            return Err(StoreError::CorruptData(format!(
                "minimum {min} is above maximum {max}"
            )));
        }
        let span = i64::from(max) - i64::from(min) + 1;
        if span > MAX_FACES as i64 {
            return Err(StoreError::CorruptData(format!(
                "range {min}-{max} has more than {MAX_FACES} results"
            )));
        }
        let faces: Vec<String> = fields.map(str::to_string).collect();
        if faces.len() as i64 > span {
            return Err(StoreError::CorruptData(format!(
                "{} face fields for a range of {span}",
                faces.len()
            )));
        }
        Ok(Self {
            name,
            min,
            max,
            faces,
        })
    }

    /// Encode as entity file text. Face fields are omitted when every face is generic.
    pub fn format(&self) -> String {
        let mut text = format!(
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.name, self.min, self.max
        );
        if self.faces.iter().any(|face| !face.is_empty()) {
            for face in &self.faces {
                text.push(FIELD_SEPARATOR);
                text.push_str(face);
            }
        }
        text
    }
}

fn parse_bound(field: Option<&str>, what: &str) -> StoreResult<i32> {
    let field = field.ok_or_else(|| StoreError::CorruptData(format!("{what} is missing")))?;
    field
        .trim()
        .parse()
        .map_err(|_| StoreError::CorruptData(format!("{what} {field:?} is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::string::string_regex;

    fn stored_name() -> impl Strategy<Value = String> {
        string_regex("[A-Za-z0-9 _.'-]{1,16}").unwrap()
    }

    #[test]
    fn list_lines() {
        let text = "Coin\u{1F}a1\n\nFudge\u{1F}b2\n";
        let entries = parse_list(text).unwrap();
        assert_eq!(
            entries,
            vec![
                ListEntry {
                    name: "Coin".into(),
                    file: "a1".into()
                },
                ListEntry {
                    name: "Fudge".into(),
                    file: "b2".into()
                },
            ]
        );
        assert_eq!(format_list(&entries), "Coin\u{1F}a1\nFudge\u{1F}b2\n");
    }

    #[test]
    fn corrupt_list_lines() {
        assert!(matches!(
            parse_list("only-a-name\n"),
            Err(StoreError::CorruptData(_))
        ));
        assert!(parse_list("a\u{1F}b\u{1F}c").is_err());
        assert!(parse_list("\u{1F}file").is_err());
    }

    #[test]
    fn names_with_separators_are_rejected() {
        assert!(check_name("Fine name").is_ok());
        assert!(check_name("").is_err());
        assert!(check_name("bad\u{1F}name").is_err());
        assert!(check_name("two\nlines").is_err());
    }

    #[test]
    fn die_record_with_faces() {
        let text = "Coin\u{1F}1\u{1F}2\u{1F}\u{1F}tails.png";
        let record = CustomDieRecord::parse(text).unwrap();
        assert_eq!(record.min, 1);
        assert_eq!(record.max, 2);
        assert_eq!(record.faces, vec!["".to_string(), "tails.png".to_string()]);
        assert_eq!(record.format(), text);
    }

    #[test]
    fn die_record_without_faces() {
        let record = CustomDieRecord {
            name: "Fudge".into(),
            min: -1,
            max: 1,
            faces: vec![String::new(); 3],
        };
        assert_eq!(record.format(), "Fudge\u{1F}-1\u{1F}1");
        let parsed = CustomDieRecord::parse(&record.format()).unwrap();
        assert!(parsed.faces.is_empty());
    }

    #[test]
    fn corrupt_die_records() {
        for text in [
            "Name",
            "Name\u{1F}x\u{1F}3",
            "Name\u{1F}4\u{1F}2",
            "Name\u{1F}1\u{1F}2\u{1F}a\u{1F}b\u{1F}c",
        ] {
            assert!(
                matches!(CustomDieRecord::parse(text), Err(StoreError::CorruptData(_))),
                "{text:?}"
            );
        }
    }

    #[test]
    fn oversized_ranges_are_corrupt() {
        let limit = MAX_FACES as i32;
        assert!(CustomDieRecord::parse(&format!("Wide\u{1F}1\u{1F}{limit}")).is_ok());
        for text in [
            format!("Wider\u{1F}0\u{1F}{limit}"),
            "Huge\u{1F}1\u{1F}30000000".to_string(),
            format!("All\u{1F}{}\u{1F}{}", i32::MIN, i32::MAX),
        ] {
            assert!(
                matches!(CustomDieRecord::parse(&text), Err(StoreError::CorruptData(_))),
                "{text:?}"
            );
        }
    }

    proptest! {
        #[test]
        fn list_survives_format_and_parse(
            pairs in proptest::collection::vec((stored_name(), "[a-f0-9-]{1,36}"), 0..8)
        ) {
            let entries: Vec<ListEntry> = pairs
                .into_iter()
                .map(|(name, file)| ListEntry { name, file })
                .collect();
            prop_assert_eq!(parse_list(&format_list(&entries)).unwrap(), entries);
        }

        #[test]
        fn die_record_survives_format_and_parse(
            name in stored_name(),
            min in -1000i32..1000,
            width in 0i32..40,
            faces in proptest::collection::vec("[a-z0-9_./]{0,12}", 0..41),
        ) {
            let max = min + width;
            let mut faces = faces;
            faces.truncate((width + 1) as usize);
            let record = CustomDieRecord { name, min, max, faces };

            let parsed = CustomDieRecord::parse(&record.format()).unwrap();
            prop_assert_eq!(&parsed.name, &record.name);
            prop_assert_eq!((parsed.min, parsed.max), (record.min, record.max));
            if record.faces.iter().all(String::is_empty) {
                prop_assert!(parsed.faces.is_empty());
            } else {
                prop_assert_eq!(&parsed.faces, &record.faces);
            }
        }
    }
}
