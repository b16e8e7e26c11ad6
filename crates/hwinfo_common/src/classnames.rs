//! Device class names.
//!
//! Probe entries carry numeric `class_id` / `sub_class_id` fields. The names
//! are opaque lookup data: a small built-in table with the base class names,
//! extendable from a TOML file:
//!
//! ```toml
//! [0x03]
//! name = "Display controller"
//! 0x00 = "VGA compatible controller"
//! ```

use crate::error::{HwinfoError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Name used when a class id is not in the table.
pub const UNKNOWN_CLASS: &str = "unknown class";

/// Lookup seam for device class names.
pub trait DeviceClasses {
    /// Name of the base class.
    fn class_name(&self, class_id: i64) -> Option<&str>;

    /// Name of the subclass within a base class.
    fn class_and_subclass_name(&self, class_id: i64, sub_class_id: i64) -> Option<&str>;

    /// Base class name, falling back to [`UNKNOWN_CLASS`].
    fn resolve_class(&self, class_id: i64) -> String {
        self.class_name(class_id).unwrap_or(UNKNOWN_CLASS).to_string()
    }

    /// Subclass name, then base class name, then [`UNKNOWN_CLASS`].
    fn resolve_subclass(&self, class_id: i64, sub_class_id: i64) -> String {
        self.class_and_subclass_name(class_id, sub_class_id)
            .or_else(|| self.class_name(class_id))
            .unwrap_or(UNKNOWN_CLASS)
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ClassEntry {
    name: Option<String>,
    subclasses: HashMap<i64, String>,
}

/// In-memory class table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTable {
    classes: HashMap<i64, ClassEntry>,
}

// Base class names (PCI class code high byte) plus the backend's own
// pseudo-classes for non-PCI hardware.
const BUILTIN_CLASSES: &[(i64, &str)] = &[
    (0x00, "Unclassified device"),
    (0x01, "Mass storage controller"),
    (0x02, "Network controller"),
    (0x03, "Display controller"),
    (0x04, "Multimedia controller"),
    (0x05, "Memory controller"),
    (0x06, "Bridge"),
    (0x07, "Communication controller"),
    (0x08, "Generic system peripheral"),
    (0x09, "Input device controller"),
    (0x0a, "Docking station"),
    (0x0b, "Processor"),
    (0x0c, "Serial bus controller"),
    (0x0d, "Wireless controller"),
    (0x0e, "Intelligent controller"),
    (0x0f, "Satellite communications controller"),
    (0x10, "Encryption controller"),
    (0x11, "Signal processing controller"),
    (0x100, "Monitor"),
    (0x101, "Internally Used Class"),
    (0x102, "Modem"),
    (0x103, "ISDN Adapter"),
    (0x104, "PS/2 Controller"),
    (0x105, "Mass Storage Device"),
    (0x106, "Storage Device"),
    (0x107, "Network Interface"),
    (0x108, "Keyboard"),
    (0x109, "Printer"),
    (0x10a, "Hub"),
    (0x10b, "Braille Display"),
    (0x10c, "Scanner"),
    (0x10d, "Joystick"),
    (0x10e, "Chipcard Reader"),
    (0x10f, "Camera"),
    (0x110, "Framebuffer Device"),
    (0x111, "DVB Card"),
    (0x112, "TV Card"),
    (0x113, "Partition"),
    (0x114, "DSL Adapter"),
    (0x115, "Bluetooth Device"),
    (0x116, "Fingerprint Reader"),
];

impl ClassTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with base class names only.
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for &(id, name) in BUILTIN_CLASSES {
            table.insert_class(id, name);
        }
        table
    }

    pub fn insert_class(&mut self, class_id: i64, name: &str) {
        self.classes.entry(class_id).or_default().name = Some(name.to_string());
    }

    pub fn insert_subclass(&mut self, class_id: i64, sub_class_id: i64, name: &str) {
        self.classes
            .entry(class_id)
            .or_default()
            .subclasses
            .insert(sub_class_id, name.to_string());
    }

    /// Overlay entries from another table; `other` wins on conflicts.
    pub fn merge(&mut self, other: ClassTable) {
        for (id, entry) in other.classes {
            let target = self.classes.entry(id).or_default();
            if entry.name.is_some() {
                target.name = entry.name;
            }
            target.subclasses.extend(entry.subclasses);
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Parse the TOML class table format (see module docs).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, String>> = toml::from_str(content)?;
        let mut table = Self::default();

        for (class_key, fields) in raw {
            let class_id = parse_id(&class_key)?;
            for (field, name) in fields {
                if field == "name" {
                    table.insert_class(class_id, &name);
                } else {
                    table.insert_subclass(class_id, parse_id(&field)?, &name);
                }
            }
        }

        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl DeviceClasses for ClassTable {
    fn class_name(&self, class_id: i64) -> Option<&str> {
        self.classes.get(&class_id)?.name.as_deref()
    }

    fn class_and_subclass_name(&self, class_id: i64, sub_class_id: i64) -> Option<&str> {
        self.classes
            .get(&class_id)?
            .subclasses
            .get(&sub_class_id)
            .map(String::as_str)
    }
}

/// Decimal or `0x`-prefixed hex id.
fn parse_id(s: &str) -> Result<i64> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => s.parse::<i64>(),
    };
    parsed.map_err(|_| HwinfoError::ClassTable(format!("invalid class id '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_base_classes() {
        let table = ClassTable::builtin();
        assert_eq!(table.class_name(0x03), Some("Display controller"));
        assert_eq!(table.class_and_subclass_name(0x03, 0x00), None);
        assert_eq!(table.resolve_subclass(0x03, 0x00), "Display controller");
        assert_eq!(table.resolve_class(0xfff), UNKNOWN_CLASS);
    }

    #[test]
    fn test_toml_table() {
        let table = ClassTable::from_toml_str(
            r#"
            [0x03]
            name = "Display controller"
            0x00 = "VGA compatible controller"

            [2]
            0 = "Ethernet controller"
            "#,
        )
        .unwrap();

        assert_eq!(table.resolve_subclass(3, 0), "VGA compatible controller");
        assert_eq!(table.resolve_subclass(2, 0), "Ethernet controller");
        assert_eq!(table.resolve_class(2), UNKNOWN_CLASS);
    }

    #[test]
    fn test_bad_id_is_an_error() {
        let err = ClassTable::from_toml_str("[zz]\nname = \"x\"\n").unwrap_err();
        assert_eq!(err.code(), "class_table");
    }

    #[test]
    fn test_merge_overrides_builtin() {
        let mut table = ClassTable::builtin();
        let mut extra = ClassTable::empty();
        extra.insert_class(0x02, "Network");
        extra.insert_subclass(0x02, 0x80, "Other network controller");
        table.merge(extra);

        assert_eq!(table.class_name(0x02), Some("Network"));
        assert_eq!(table.resolve_subclass(0x02, 0x80), "Other network controller");
        assert_eq!(table.class_name(0x01), Some("Mass storage controller"));
    }
}
