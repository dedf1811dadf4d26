//! Decoding of the UPS status export.
//!
//! The export encodes meaning by element position, not by element name:
//! each section holds ordered groups whose ordered children are the
//! readings. The decoders below turn those positions into named fields and
//! report an explicit error for anything the document does not carry, so an
//! absent or reshuffled reading can never be mistaken for a neighbouring
//! one.

use roxmltree::{Document, Node};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("status document is not well-formed XML: {0}")]
    Malformed(#[from] roxmltree::Error),
    #[error("status document has no <{0}> section")]
    MissingSection(&'static str),
    #[error("section <{section}> has no group {index}")]
    MissingGroup { section: &'static str, index: usize },
    #[error("group {group} of section <{section}> carries no {field} value")]
    MissingField {
        section: &'static str,
        group: usize,
        field: &'static str,
    },
}

/// Readings of the `system` section.
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub site: String,
    pub time: String,
    pub uptime: String,
    pub sw_ver: String,
}

/// Readings of the `load` section.
#[derive(Debug, Clone)]
pub struct LoadReadings {
    pub voltage: String,
    pub current: String,
    pub power: String,
    pub percent: String,
}

/// Readings of one battery bank. The third bank reports no temperature.
#[derive(Debug, Clone)]
pub struct BatteryBank {
    pub top: String,
    pub mid: String,
    pub symm: String,
    pub temp: Option<String>,
}

/// Readings of one input feed. The totals feed reports no voltage.
#[derive(Debug, Clone)]
pub struct InputFeed {
    pub voltage: Option<String>,
    pub current: String,
    pub power: String,
    pub energy: String,
}

/// A parsed status document with typed access to its sections.
pub struct StatusDocument<'input> {
    doc: Document<'input>,
}

impl<'input> StatusDocument<'input> {
    pub fn parse(text: &'input str) -> Result<Self, DocumentError> {
        Ok(StatusDocument {
            doc: Document::parse(text)?,
        })
    }

    /// Decodes the system information from group 0 of `<system>`.
    /// Position 2 of the group is not consumed by any check.
    pub fn system(&self) -> Result<SystemInfo, DocumentError> {
        let group = self.group("system", 0)?;
        Ok(SystemInfo {
            site: group.field(0, "site")?,
            time: group.field(1, "time")?,
            uptime: group.field(3, "uptime")?,
            sw_ver: group.field(4, "sw_ver")?,
        })
    }

    /// Decodes the load readings from group 0 of `<load>`.
    pub fn load(&self) -> Result<LoadReadings, DocumentError> {
        let group = self.group("load", 0)?;
        Ok(LoadReadings {
            voltage: group.field(0, "voltage")?,
            current: group.field(1, "current")?,
            power: group.field(2, "power")?,
            percent: group.field(3, "percent")?,
        })
    }

    /// Decodes battery bank 0, 1 or 2. Position 0 of a bank group is not a
    /// reading and is skipped; banks 0 and 1 carry a temperature at
    /// position 4, bank 2 does not.
    pub fn battery(&self, bank: usize) -> Result<BatteryBank, DocumentError> {
        let group = self.group("battery", bank)?;
        let temp = if bank < 2 {
            Some(group.field(4, "temp")?)
        } else {
            None
        };
        Ok(BatteryBank {
            top: group.field(1, "top")?,
            mid: group.field(2, "mid")?,
            symm: group.field(3, "symm")?,
            temp,
        })
    }

    /// Decodes input feed 0 (AC/DC), 1 (solar) or 2 (running totals).
    /// Position 0 of a feed group is not a reading and is skipped; the
    /// totals feed starts with its current where the others carry a
    /// voltage, shifting the remaining positions by one.
    pub fn input(&self, feed: usize) -> Result<InputFeed, DocumentError> {
        let group = self.group("input", feed)?;
        let voltage = if feed < 2 {
            Some(group.field(1, "voltage")?)
        } else {
            None
        };
        let offset = usize::from(voltage.is_some());
        Ok(InputFeed {
            voltage,
            current: group.field(1 + offset, "current")?,
            power: group.field(2 + offset, "power")?,
            energy: group.field(3 + offset, "energy")?,
        })
    }

    fn group(&self, section: &'static str, index: usize) -> Result<Group<'_, 'input>, DocumentError> {
        let parent = self
            .doc
            .root()
            .descendants()
            .find(|node| node.has_tag_name(section))
            .ok_or(DocumentError::MissingSection(section))?;
        let node = nth_element(parent, index)
            .ok_or(DocumentError::MissingGroup { section, index })?;
        Ok(Group {
            node,
            section,
            index,
        })
    }
}

#[derive(Clone, Copy)]
struct Group<'a, 'input> {
    node: Node<'a, 'input>,
    section: &'static str,
    index: usize,
}

impl Group<'_, '_> {
    /// Scrubbed text of the element at `position`, counting element
    /// children only. An absent element and an empty one are the same
    /// error: the reading is not there.
    fn field(&self, position: usize, name: &'static str) -> Result<String, DocumentError> {
        let value = nth_element(self.node, position)
            .and_then(|node| node.text())
            .map(scrub)
            .unwrap_or_default();
        if value.is_empty() {
            return Err(DocumentError::MissingField {
                section: self.section,
                group: self.index,
                field: name,
            });
        }
        Ok(value)
    }
}

fn nth_element<'a, 'input>(parent: Node<'a, 'input>, index: usize) -> Option<Node<'a, 'input>> {
    parent.children().filter(|node| node.is_element()).nth(index)
}

/// Strips the `%l`/`%p` markers the export appends to its values, plus any
/// surrounding whitespace.
fn scrub(raw: &str) -> String {
    raw.replace("%l", "").replace("%p", "").trim().to_string()
}
