//! Core types for Stata dataset handling.

use std::collections::BTreeMap;
use std::fmt;

use crate::dates::DateFormat;

/// Stata file format release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DtaVersion {
    /// Stata 8-9.
    V113,
    /// Stata 10-12.
    V114,
    /// Stata 12 (more than 32,767 variables).
    V115,
    /// Stata 13, tagged layout, latin-1 strings.
    V117,
    /// Stata 14-18, tagged layout, UTF-8 strings.
    V118,
    /// Stata 15-18 with more than 32,767 variables.
    V119,
}

impl DtaVersion {
    pub fn from_release(release: u16) -> Option<Self> {
        match release {
            113 => Some(Self::V113),
            114 => Some(Self::V114),
            115 => Some(Self::V115),
            117 => Some(Self::V117),
            118 => Some(Self::V118),
            119 => Some(Self::V119),
            _ => None,
        }
    }

    pub const fn release(self) -> u16 {
        match self {
            Self::V113 => 113,
            Self::V114 => 114,
            Self::V115 => 115,
            Self::V117 => 117,
            Self::V118 => 118,
            Self::V119 => 119,
        }
    }

    /// Whether the file uses the tagged (`<stata_dta>`) layout.
    pub const fn is_tagged(self) -> bool {
        matches!(self, Self::V117 | Self::V118 | Self::V119)
    }

    /// Whether text is stored as UTF-8 (otherwise latin-1).
    pub const fn is_utf8(self) -> bool {
        matches!(self, Self::V118 | Self::V119)
    }

    pub const fn name_len(self) -> usize {
        match self {
            Self::V118 | Self::V119 => 129,
            _ => 33,
        }
    }

    pub const fn format_len(self) -> usize {
        match self {
            Self::V113 => 12,
            Self::V118 | Self::V119 => 57,
            _ => 49,
        }
    }

    pub const fn variable_label_len(self) -> usize {
        match self {
            Self::V118 | Self::V119 => 321,
            _ => 81,
        }
    }

    /// Bits of a strL reference occupied by the variable number.
    pub(crate) const fn strl_variable_bits(self) -> u32 {
        match self {
            Self::V118 => 16,
            Self::V119 => 24,
            _ => 32,
        }
    }
}

impl fmt::Display for DtaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dta {}", self.release())
    }
}

/// Byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// `MSF` / `HILO`.
    Big,
    /// `LSF` / `LOHI`.
    Little,
}

/// Storage type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtaType {
    /// Fixed-width string of the given byte length.
    Str(u16),
    /// Long string stored in the strL section.
    StrL,
    Byte,
    Int,
    Long,
    Float,
    Double,
}

impl DtaType {
    /// Decodes a 117+ type code.
    pub fn from_tagged_code(code: u16) -> Option<Self> {
        match code {
            1..=2045 => Some(Self::Str(code)),
            32768 => Some(Self::StrL),
            65526 => Some(Self::Double),
            65527 => Some(Self::Float),
            65528 => Some(Self::Long),
            65529 => Some(Self::Int),
            65530 => Some(Self::Byte),
            _ => None,
        }
    }

    /// Decodes a 113-115 type code.
    pub fn from_legacy_code(code: u8) -> Option<Self> {
        match code {
            1..=244 => Some(Self::Str(u16::from(code))),
            251 => Some(Self::Byte),
            252 => Some(Self::Int),
            253 => Some(Self::Long),
            254 => Some(Self::Float),
            255 => Some(Self::Double),
            _ => None,
        }
    }

    /// Bytes occupied by one value in a data record.
    pub const fn width(self) -> usize {
        match self {
            Self::Str(len) => len as usize,
            Self::StrL | Self::Double => 8,
            Self::Float | Self::Long => 4,
            Self::Int => 2,
            Self::Byte => 1,
        }
    }

    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Byte | Self::Int | Self::Long)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    pub const fn is_string(self) -> bool {
        matches!(self, Self::Str(_) | Self::StrL)
    }
}

/// Variable metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct DtaVariable {
    pub name: String,
    pub kind: DtaType,
    pub format: String,
    pub label: String,
    /// Name of the attached value label table, empty when there is none.
    pub value_label: String,
}

impl DtaVariable {
    /// The calendar unit of a `%t` display format on a numeric variable.
    pub fn date_format(&self) -> Option<DateFormat> {
        if self.kind.is_string() {
            return None;
        }
        DateFormat::from_display_format(&self.format)
    }
}

/// Value label table: integer codes to their text.
pub type ValueLabels = BTreeMap<i32, String>;

/// A single observation value.
///
/// Stata missing codes (`.`, `.a`-`.z`) all collapse to `Missing`.
#[derive(Debug, Clone, PartialEq)]
pub enum DtaValue {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl DtaValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The value as a label code; floats qualify when they are whole.
    pub fn label_code(&self) -> Option<i32> {
        match self {
            Self::Int(i) => i32::try_from(*i).ok(),
            Self::Float(f) if f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX) => {
                Some(*f as i32)
            }
            _ => None,
        }
    }
}

/// A fully decoded Stata dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DtaDataset {
    pub version: DtaVersion,
    pub label: String,
    pub variables: Vec<DtaVariable>,
    pub rows: Vec<Vec<DtaValue>>,
    /// Value label tables by name.
    pub value_labels: BTreeMap<String, ValueLabels>,
}

impl DtaDataset {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.variables.len()
    }

    /// The value label table attached to variable `index`, if it was stored.
    pub fn labels_of(&self, index: usize) -> Option<&ValueLabels> {
        let variable = self.variables.get(index)?;
        if variable.value_label.is_empty() {
            return None;
        }
        self.value_labels.get(&variable.value_label)
    }

    /// Values of one variable, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &DtaValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}
