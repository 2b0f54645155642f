//! The `Key: Value` record format.
//!
//! ```text
//! Name: Everest Base Camp
//! Base Price: 1200.0
//! ------------------------
//! ```

/// Line that closes every record.
pub const DELIMITER: &str = "------------------------";

const SEPARATOR: &str = ": ";

/// One parsed record, fields in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    /// 1-based line of the record's first field.
    pub line: usize,
    pub fields: Vec<(String, String)>,
}

impl RawRecord {
    /// Last value written for `key`, matching how repeated keys overwrite.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn require(&self, key: &str) -> Result<&str, String> {
        self.get(key)
            .ok_or_else(|| format!("missing field '{}'", key))
    }

    pub fn parse<T>(&self, key: &str) -> Result<T, String>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.require(key)?;
        raw.trim()
            .parse()
            .map_err(|e| format!("field '{}' has invalid value '{}': {}", key, raw, e))
    }

    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, String>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(v) if !v.trim().is_empty() => self.parse(key),
            _ => Ok(default),
        }
    }
}

/// A block that could not be read as a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Malformed {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ParsedFile {
    pub records: Vec<RawRecord>,
    pub malformed: Vec<Malformed>,
}

/// Splits a file into records. A block containing a line without `": "` is reported
/// whole, as is a trailing block with no closing delimiter.
pub fn parse_records(text: &str) -> ParsedFile {
    let mut parsed = ParsedFile::default();
    let mut current = RawRecord::default();
    let mut broken: Option<Malformed> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim_end_matches('\r');

        if line == DELIMITER {
            match broken.take() {
                Some(malformed) => parsed.malformed.push(malformed),
                None if !current.fields.is_empty() => parsed.records.push(current),
                None => {}
            }
            current = RawRecord::default();
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        if current.fields.is_empty() && broken.is_none() {
            current.line = line_no;
        }

        // Empty values are written as "Key: " and may lose the trailing space in transit.
        let split = line
            .split_once(SEPARATOR)
            .or_else(|| line.strip_suffix(':').map(|key| (key, "")));
        match split {
            Some((key, value)) if !key.trim().is_empty() => {
                current
                    .fields
                    .push((key.trim().to_string(), unescape(value)));
            }
            _ => {
                if broken.is_none() {
                    broken = Some(Malformed {
                        line: line_no,
                        reason: format!("expected 'Key: Value', found '{}'", line),
                    });
                }
            }
        }
    }

    if let Some(malformed) = broken {
        parsed.malformed.push(malformed);
    } else if !current.fields.is_empty() {
        parsed.malformed.push(Malformed {
            line: current.line,
            reason: "record is missing its closing delimiter".to_string(),
        });
    }

    parsed
}

/// Serializes one record, delimiter included.
pub fn write_record(out: &mut String, fields: &[(&str, String)]) {
    for (key, value) in fields {
        out.push_str(key);
        out.push_str(SEPARATOR);
        out.push_str(&escape(value));
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\r', "")
        .replace('\n', "\\n")
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_records() {
        let text = "Name: Pokhara Lake\nBase Price: 200.0\n------------------------\n\
                    Name: Chitwan Safari\nBase Price: 300.0\n------------------------\n";
        let parsed = parse_records(text);

        assert!(parsed.malformed.is_empty());
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1].get("Name"), Some("Chitwan Safari"));
        assert_eq!(parsed.records[1].line, 4);
        assert_eq!(parsed.records[0].parse::<f64>("Base Price"), Ok(200.0));
    }

    #[test]
    fn test_value_may_contain_separator() {
        let parsed = parse_records("Notes: meet at: 6am\n------------------------\n");
        assert_eq!(parsed.records[0].get("Notes"), Some("meet at: 6am"));
    }

    #[test]
    fn test_trailing_partial_record_is_reported() {
        let text = "Name: Pokhara Lake\n------------------------\nName: Half\nBase Price: 1";
        let parsed = parse_records(text);

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.malformed.len(), 1);
        assert_eq!(parsed.malformed[0].line, 3);
        assert!(parsed.malformed[0].reason.contains("closing delimiter"));
    }

    #[test]
    fn test_garbage_line_poisons_only_its_record() {
        let text = "Name: A\ngarbage\n------------------------\nName: B\n------------------------\n";
        let parsed = parse_records(text);

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].get("Name"), Some("B"));
        assert_eq!(parsed.malformed[0].line, 2);
    }

    #[test]
    fn test_empty_value_and_escaped_notes() {
        let mut out = String::new();
        write_record(
            &mut out,
            &[
                ("Guide", String::new()),
                ("Notes", "line one\nline two \\ end".to_string()),
            ],
        );
        assert!(out.starts_with("Guide: \nNotes: line one\\nline two \\\\ end\n"));

        let parsed = parse_records(&out.replace("Guide: \n", "Guide:\n"));
        let record = &parsed.records[0];
        assert_eq!(record.get("Guide"), Some(""));
        assert_eq!(record.get("Notes"), Some("line one\nline two \\ end"));
    }

    #[test]
    fn test_parse_or_defaults_blank_values() {
        let parsed = parse_records("Max Capacity: \nActive: false\n------------------------\n");
        let record = &parsed.records[0];
        assert_eq!(record.parse_or("Max Capacity", 50u32), Ok(50));
        assert_eq!(record.parse_or("Active", true), Ok(false));
        assert_eq!(record.parse_or("Missing", 7u32), Ok(7));
    }
}
