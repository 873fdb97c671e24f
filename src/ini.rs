//! Minimal INI reader for the config file.
//!
//! Supports what the config format needs and nothing more:
//!
//! ```ini
//! # comment
//! ; also a comment
//! [looks]
//! opacity = 70
//! buttons: cancel, logout,
//!     shutdown
//! ```
//!
//! * keys are trimmed and lowercased, values are trimmed;
//! * `=` and `:` both separate key from value (whichever comes first);
//! * a line indented deeper than its key continues that key's value,
//!   joined with `\n`; blank lines inside such a value are kept;
//! * a repeated key overrides the earlier value, a repeated section merges.
//!
//! Anything the parser cannot make sense of is logged and skipped.

use log::warn;

/// One `[name]` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    fn set(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

/// A parsed INI document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ini {
    sections: Vec<Section>,
}

impl Ini {
    /// Parse `text`, skipping (and logging) malformed lines.
    pub fn parse(text: &str) -> Self {
        let mut ini = Ini::default();
        let mut current: Option<usize> = None;
        let mut last_key: Option<String> = None;
        // Indent of the line that set `last_key`.
        let mut key_indent = 0;
        // Blank lines seen since `last_key` was last extended.
        let mut pending_blank = 0;

        for (idx, raw) in text.lines().enumerate() {
            let lineno = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                pending_blank += 1;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indent = raw.len() - raw.trim_start().len();
            if indent > key_indent {
                if let (Some(sec), Some(key)) = (current, last_key.as_ref()) {
                    let section = &mut ini.sections[sec];
                    if let Some(entry) = section.entries.iter_mut().find(|(k, _)| k == key) {
                        for _ in 0..=pending_blank {
                            entry.1.push('\n');
                        }
                        entry.1.push_str(trimmed);
                        pending_blank = 0;
                        continue;
                    }
                }
            }
            pending_blank = 0;

            if let Some(rest) = trimmed.strip_prefix('[') {
                match rest.strip_suffix(']') {
                    Some(name) => {
                        let name = name.trim();
                        current = Some(ini.section_index_or_insert(name));
                        last_key = None;
                    }
                    None => warn!("config line {}: unterminated section header {:?}", lineno, trimmed),
                }
                continue;
            }

            let Some(split) = trimmed.find(['=', ':']) else {
                warn!("config line {}: expected `key = value`, got {:?}", lineno, trimmed);
                continue;
            };
            let key = trimmed[..split].trim().to_lowercase();
            let value = trimmed[split + 1..].trim().to_string();

            if key.is_empty() {
                warn!("config line {}: empty key", lineno);
                continue;
            }
            let Some(sec) = current else {
                warn!("config line {}: key {:?} outside of any section, ignoring", lineno, key);
                continue;
            };

            ini.sections[sec].set(key.clone(), value);
            last_key = Some(key);
            key_indent = indent;
        }

        ini
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        match self.sections.iter().position(|s| s.name == name) {
            Some(i) => i,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        }
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Value of `key` in `section`.  `key` is matched case-insensitively.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.section(section)?
            .entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All entries of `section`, or an empty slice if it does not exist.
    pub fn items(&self, section: &str) -> &[(String, String)] {
        self.section(section).map(Section::entries).unwrap_or(&[])
    }
}
