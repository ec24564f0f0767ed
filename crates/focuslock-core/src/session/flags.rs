use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One of the four hideable page sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Editorial,
    Solutions,
    Submissions,
    Discussion,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Editorial,
        Section::Solutions,
        Section::Submissions,
        Section::Discussion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Editorial => "editorial",
            Section::Solutions => "solutions",
            Section::Submissions => "submissions",
            Section::Discussion => "discussion",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "editorial" => Ok(Section::Editorial),
            "solutions" => Ok(Section::Solutions),
            "submissions" => Ok(Section::Submissions),
            "discussion" => Ok(Section::Discussion),
            other => Err(ValidationError::UnknownSection(other.to_string())),
        }
    }
}

/// Which sections to hide for the duration of a session.
///
/// Captured once from the popup switches when the session starts and
/// read-only afterwards. `true` means the section is removed from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityFlags {
    #[serde(default = "default_true")]
    pub editorial: bool,
    #[serde(default = "default_true")]
    pub solutions: bool,
    #[serde(default = "default_true")]
    pub submissions: bool,
    #[serde(default = "default_true")]
    pub discussion: bool,
}

fn default_true() -> bool {
    true
}

impl Default for VisibilityFlags {
    /// The popup defaults every switch to on (all four sections hidden).
    fn default() -> Self {
        Self {
            editorial: true,
            solutions: true,
            submissions: true,
            discussion: true,
        }
    }
}

impl VisibilityFlags {
    /// No sections hidden.
    pub fn none() -> Self {
        Self {
            editorial: false,
            solutions: false,
            submissions: false,
            discussion: false,
        }
    }

    pub fn is_hidden(&self, section: Section) -> bool {
        match section {
            Section::Editorial => self.editorial,
            Section::Solutions => self.solutions,
            Section::Submissions => self.submissions,
            Section::Discussion => self.discussion,
        }
    }

    pub fn set(&mut self, section: Section, hidden: bool) {
        match section {
            Section::Editorial => self.editorial = hidden,
            Section::Solutions => self.solutions = hidden,
            Section::Submissions => self.submissions = hidden,
            Section::Discussion => self.discussion = hidden,
        }
    }

    pub fn toggle(&mut self, section: Section) {
        let hidden = self.is_hidden(section);
        self.set(section, !hidden);
    }

    /// The sections this session removes, in declaration order.
    pub fn hidden_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.is_hidden(*s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hides_everything() {
        let flags = VisibilityFlags::default();
        assert_eq!(flags.hidden_sections(), Section::ALL.to_vec());
    }

    #[test]
    fn none_hides_nothing() {
        let flags = VisibilityFlags::none();
        assert!(flags.hidden_sections().is_empty());
    }

    #[test]
    fn toggle_flips_one_switch() {
        let mut flags = VisibilityFlags::default();
        flags.toggle(Section::Solutions);
        assert!(!flags.is_hidden(Section::Solutions));
        assert!(flags.is_hidden(Section::Editorial));
        flags.toggle(Section::Solutions);
        assert!(flags.is_hidden(Section::Solutions));
    }

    #[test]
    fn section_parses_case_insensitively() {
        assert_eq!("Editorial".parse::<Section>().unwrap(), Section::Editorial);
        assert_eq!(" discussion ".parse::<Section>().unwrap(), Section::Discussion);
        assert!("comments".parse::<Section>().is_err());
    }

    #[test]
    fn flags_serialize_as_plain_booleans() {
        let flags = VisibilityFlags {
            editorial: true,
            solutions: false,
            submissions: true,
            discussion: false,
        };
        let json = serde_json::to_value(&flags).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "editorial": true,
                "solutions": false,
                "submissions": true,
                "discussion": false,
            })
        );
    }
}
