//! Label type registry.
//!
//! # Responsibility
//! - Define the compiled-in set of label types and their static metadata.
//! - Resolve external identifiers (`"PatchCord RIMPORT"`) and code prefixes
//!   (`"PCR"`) back to a registry entry.
//!
//! # Invariants
//! - Every `LabelType` variant has exactly one `LabelTypeConfig` entry.
//! - Prefixes are unique across the registry.
//! - Registry data is immutable; there is no runtime registration.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Category of physical item that receives a stamped code.
///
/// Each variant owns an independent numbering sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LabelType {
    #[serde(rename = "PatchCord")]
    PatchCord,
    #[serde(rename = "PatchCord RIMPORT")]
    PatchCordRimport,
    #[serde(rename = "PatchCord COENTEL")]
    PatchCordCoentel,
    #[serde(rename = "PatchCord Duplex")]
    PatchCordDuplex,
    #[serde(rename = "PatchCord Duplex RIMPORT")]
    PatchCordDuplexRimport,
    #[serde(rename = "PatchCord Duplex COENTEL")]
    PatchCordDuplexCoentel,
    #[serde(rename = "Pigtail")]
    Pigtail,
    #[serde(rename = "Pigtail RIMPORT")]
    PigtailRimport,
    #[serde(rename = "Pigtail COENTEL")]
    PigtailCoentel,
    #[serde(rename = "Bobina")]
    Bobina,
}

impl LabelType {
    /// All label types in registry order.
    pub const ALL: [LabelType; 10] = [
        LabelType::PatchCord,
        LabelType::PatchCordRimport,
        LabelType::PatchCordCoentel,
        LabelType::PatchCordDuplex,
        LabelType::PatchCordDuplexRimport,
        LabelType::PatchCordDuplexCoentel,
        LabelType::Pigtail,
        LabelType::PigtailRimport,
        LabelType::PigtailCoentel,
        LabelType::Bobina,
    ];

    /// Stable external identifier, also used as the storage key.
    pub fn as_str(self) -> &'static str {
        self.config().id
    }

    /// Registry entry for this type.
    pub fn config(self) -> &'static LabelTypeConfig {
        // LABEL_TYPES is declared in `LabelType::ALL` order.
        &LABEL_TYPES[self as usize]
    }

    /// Code prefix used when formatting sequence numbers.
    pub fn prefix(self) -> &'static str {
        self.config().code_prefix
    }
}

impl Display for LabelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an identifier does not name a registered label type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabelType(pub String);

impl Display for UnknownLabelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown label type: `{}`", self.0)
    }
}

impl std::error::Error for UnknownLabelType {}

impl FromStr for LabelType {
    type Err = UnknownLabelType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        label_type_config(value)
            .map(|config| config.label_type)
            .ok_or_else(|| UnknownLabelType(value.to_string()))
    }
}

/// Static metadata for one label type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTypeConfig {
    pub label_type: LabelType,
    /// External identifier.
    pub id: &'static str,
    pub display_name: &'static str,
    pub code_prefix: &'static str,
    /// Pre-printed template the codes are drawn onto.
    pub template_ref: &'static str,
    pub description: &'static str,
}

impl LabelTypeConfig {
    const fn new(
        label_type: LabelType,
        id: &'static str,
        display_name: &'static str,
        code_prefix: &'static str,
        template_ref: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            label_type,
            id,
            display_name,
            code_prefix,
            template_ref,
            description,
        }
    }

    pub fn prefix(&self) -> &'static str {
        self.code_prefix
    }
}

/// Compiled-in registry, ordered like `LabelType::ALL`.
pub static LABEL_TYPES: [LabelTypeConfig; 10] = [
    LabelTypeConfig::new(
        LabelType::PatchCord,
        "PatchCord",
        "PatchCord EFO",
        "PC",
        "AdhesivosPatchCords80x60.pdf",
        "Cables PatchCord estándar EFO",
    ),
    LabelTypeConfig::new(
        LabelType::PatchCordRimport,
        "PatchCord RIMPORT",
        "PatchCord RIMPORT",
        "PCR",
        "AdhesivosPatchCords RIMPORT80x60.pdf",
        "Cables PatchCord marca RIMPORT",
    ),
    LabelTypeConfig::new(
        LabelType::PatchCordCoentel,
        "PatchCord COENTEL",
        "PatchCord COENTEL",
        "PCC",
        "AdhesivosPatchCordsCOENTEL80x60.pdf",
        "Cables PatchCord marca COENTEL",
    ),
    LabelTypeConfig::new(
        LabelType::PatchCordDuplex,
        "PatchCord Duplex",
        "PatchCord Duplex EFO",
        "PCD",
        "AdhesivosPatchCordsDuplex80x60.pdf",
        "Cables PatchCord Duplex estándar EFO",
    ),
    LabelTypeConfig::new(
        LabelType::PatchCordDuplexRimport,
        "PatchCord Duplex RIMPORT",
        "PatchCord Duplex RIMPORT",
        "PCDR",
        "AdhesivosPatchCordsDuplex RIMPORT80X60.pdf",
        "Cables PatchCord Duplex marca RIMPORT",
    ),
    LabelTypeConfig::new(
        LabelType::PatchCordDuplexCoentel,
        "PatchCord Duplex COENTEL",
        "PatchCord Duplex COENTEL",
        "PCDC",
        "AdhesivosPatchCordsDuplexCOENTEL80X60.pdf",
        "Cables PatchCord Duplex marca COENTEL",
    ),
    LabelTypeConfig::new(
        LabelType::Pigtail,
        "Pigtail",
        "Pigtail EFO",
        "PT",
        "AdhesivosPigtails80x60.pdf",
        "Cables Pigtail estándar EFO",
    ),
    LabelTypeConfig::new(
        LabelType::PigtailRimport,
        "Pigtail RIMPORT",
        "Pigtail RIMPORT",
        "PTR",
        "AdhesivosPigtails RIMPORT80x60.pdf",
        "Cables Pigtail marca RIMPORT",
    ),
    LabelTypeConfig::new(
        LabelType::PigtailCoentel,
        "Pigtail COENTEL",
        "Pigtail COENTEL",
        "PTC",
        "AdhesivosPigtailsCOENTEL80x60.pdf",
        "Cables Pigtail marca COENTEL",
    ),
    LabelTypeConfig::new(
        LabelType::Bobina,
        "Bobina",
        "Bobina",
        "BB",
        "AdhesivosBobina80x60.pdf",
        "Bobinas de cable",
    ),
];

/// Looks up a registry entry by external identifier (exact match).
pub fn label_type_config(id: &str) -> Option<&'static LabelTypeConfig> {
    LABEL_TYPES.iter().find(|config| config.id == id)
}

/// Looks up a registry entry by code prefix (exact match).
pub fn label_type_by_prefix(prefix: &str) -> Option<&'static LabelTypeConfig> {
    LABEL_TYPES.iter().find(|config| config.code_prefix == prefix)
}
