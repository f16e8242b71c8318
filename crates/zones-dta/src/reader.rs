//! Stata file reader.
//!
//! Handles the fixed-layout releases 113-115 and the tagged releases 117-119.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::cursor::{ByteCursor, decode_text};
use crate::error::{DtaError, Result};
use crate::types::{
    ByteOrder, DtaDataset, DtaType, DtaValue, DtaVariable, DtaVersion, ValueLabels,
};

const BYTE_MAX_VALID: i8 = 100;
const INT_MAX_VALID: i16 = 32_740;
const LONG_MAX_VALID: i32 = 2_147_483_620;
/// Bit patterns at or above these (positive) values are Stata missing codes.
const FLOAT_MISSING_BITS: u32 = 0x7f00_0000;
const DOUBLE_MISSING_BITS: u64 = 0x7fe0_0000_0000_0000;

const GSO_BINARY: u8 = 129;

/// Stata file reader.
pub struct DtaReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> DtaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read the entire file into memory and decode it.
    pub fn read_dataset(mut self) -> Result<DtaDataset> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_dta(&data)
    }
}

impl DtaReader<File> {
    /// Open a `.dta` file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DtaError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DtaError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Read a `.dta` file from a path.
pub fn read_dta(path: &Path) -> Result<DtaDataset> {
    DtaReader::open(path)?.read_dataset()
}

/// Decode a `.dta` file held in memory, auto-detecting the release.
pub fn parse_dta(data: &[u8]) -> Result<DtaDataset> {
    if data.starts_with(b"<stata_dta>") {
        parse_tagged(data)
    } else {
        parse_legacy(data)
    }
}

struct Layout {
    version: DtaVersion,
    label: String,
    nobs: usize,
    variables: Vec<DtaVariable>,
}

fn parse_tagged(data: &[u8]) -> Result<DtaDataset> {
    let mut cur = ByteCursor::new(data, ByteOrder::Little);
    cur.expect(b"<stata_dta>")?;
    cur.expect(b"<header>")?;

    cur.expect(b"<release>")?;
    let release = std::str::from_utf8(cur.take(3)?)
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| DtaError::invalid_format("release is not a number"))?;
    let version = DtaVersion::from_release(release)
        .filter(|v| v.is_tagged())
        .ok_or(DtaError::UnsupportedRelease { release })?;
    cur.expect(b"</release>")?;

    cur.expect(b"<byteorder>")?;
    let order = match cur.take(3)? {
        b"LSF" => ByteOrder::Little,
        b"MSF" => ByteOrder::Big,
        _ => return Err(DtaError::invalid_format("byte order must be LSF or MSF")),
    };
    cur.set_order(order);
    cur.expect(b"</byteorder>")?;

    cur.expect(b"<K>")?;
    let nvar = match version {
        DtaVersion::V119 => cur.u32()? as usize,
        _ => usize::from(cur.u16()?),
    };
    cur.expect(b"</K>")?;

    cur.expect(b"<N>")?;
    let nobs = match version {
        DtaVersion::V117 => u64::from(cur.u32()?),
        _ => cur.u64()?,
    };
    cur.expect(b"</N>")?;

    cur.expect(b"<label>")?;
    let label_len = match version {
        DtaVersion::V117 => usize::from(cur.u8()?),
        _ => usize::from(cur.u16()?),
    };
    let label = decode_text(cur.take(label_len)?, version);
    cur.expect(b"</label>")?;

    cur.expect(b"<timestamp>")?;
    let stamp_len = usize::from(cur.u8()?);
    cur.skip(stamp_len)?;
    cur.expect(b"</timestamp>")?;
    cur.expect(b"</header>")?;

    // Section offsets are not needed for a front-to-back read.
    cur.expect(b"<map>")?;
    cur.skip(14 * 8)?;
    cur.expect(b"</map>")?;

    cur.expect(b"<variable_types>")?;
    let mut kinds = Vec::with_capacity(nvar);
    for index in 0..nvar {
        let code = cur.u16()?;
        kinds.push(DtaType::from_tagged_code(code).ok_or(DtaError::UnknownType { code, index })?);
    }
    cur.expect(b"</variable_types>")?;

    cur.expect(b"<varnames>")?;
    let names = read_fixed_strings(&mut cur, nvar, version.name_len(), version)?;
    cur.expect(b"</varnames>")?;

    cur.expect(b"<sortlist>")?;
    let sort_width = if version == DtaVersion::V119 { 4 } else { 2 };
    cur.skip((nvar + 1) * sort_width)?;
    cur.expect(b"</sortlist>")?;

    cur.expect(b"<formats>")?;
    let formats = read_fixed_strings(&mut cur, nvar, version.format_len(), version)?;
    cur.expect(b"</formats>")?;

    cur.expect(b"<value_label_names>")?;
    let value_label_names = read_fixed_strings(&mut cur, nvar, version.name_len(), version)?;
    cur.expect(b"</value_label_names>")?;

    cur.expect(b"<variable_labels>")?;
    let labels = read_fixed_strings(&mut cur, nvar, version.variable_label_len(), version)?;
    cur.expect(b"</variable_labels>")?;

    cur.expect(b"<characteristics>")?;
    while cur.peek_is(b"<ch>") {
        cur.expect(b"<ch>")?;
        let len = cur.u32()? as usize;
        cur.skip(len)?;
        cur.expect(b"</ch>")?;
    }
    cur.expect(b"</characteristics>")?;

    let layout = Layout {
        version,
        label,
        nobs: checked_nobs(nobs)?,
        variables: build_variables(names, kinds, formats, labels, value_label_names),
    };

    cur.expect(b"<data>")?;
    let (mut rows, pending) = read_records(&mut cur, &layout)?;
    cur.expect(b"</data>")?;

    cur.expect(b"<strls>")?;
    let strls = read_strls(&mut cur, version)?;
    cur.expect(b"</strls>")?;

    cur.expect(b"<value_labels>")?;
    let mut value_labels = BTreeMap::new();
    while cur.peek_is(b"<lbl>") {
        cur.expect(b"<lbl>")?;
        let (name, table) = read_value_label_table(&mut cur, version)?;
        value_labels.insert(name, table);
        cur.expect(b"</lbl>")?;
    }
    cur.expect(b"</value_labels>")?;

    for (row, col, key) in pending {
        let text = if key == (0, 0) {
            String::new()
        } else {
            strls.get(&key).cloned().ok_or_else(|| {
                DtaError::invalid_format(format!(
                    "strL ({}, {}) referenced but not stored",
                    key.0, key.1
                ))
            })?
        };
        rows[row][col] = DtaValue::Text(text);
    }

    Ok(DtaDataset {
        version: layout.version,
        label: layout.label,
        variables: layout.variables,
        rows,
        value_labels,
    })
}

fn parse_legacy(data: &[u8]) -> Result<DtaDataset> {
    let mut cur = ByteCursor::new(data, ByteOrder::Little);
    let release = u16::from(cur.u8()?);
    let version = DtaVersion::from_release(release)
        .filter(|v| !v.is_tagged())
        .ok_or(DtaError::UnsupportedRelease { release })?;
    let order = match cur.u8()? {
        1 => ByteOrder::Big,
        2 => ByteOrder::Little,
        other => {
            return Err(DtaError::invalid_format(format!(
                "unknown byte order flag {other}"
            )));
        }
    };
    cur.set_order(order);
    // filetype, unused
    cur.skip(2)?;
    let nvar = usize::from(cur.u16()?);
    let nobs = u64::from(cur.u32()?);
    let label = cur.fixed_str(81, version)?;
    cur.skip(18)?;

    let mut kinds = Vec::with_capacity(nvar);
    for index in 0..nvar {
        let code = cur.u8()?;
        kinds.push(DtaType::from_legacy_code(code).ok_or(DtaError::UnknownType {
            code: u16::from(code),
            index,
        })?);
    }
    let names = read_fixed_strings(&mut cur, nvar, version.name_len(), version)?;
    cur.skip(2 * (nvar + 1))?;
    let formats = read_fixed_strings(&mut cur, nvar, version.format_len(), version)?;
    let value_label_names = read_fixed_strings(&mut cur, nvar, version.name_len(), version)?;
    let labels = read_fixed_strings(&mut cur, nvar, version.variable_label_len(), version)?;

    // Expansion fields end with a zero type and zero length.
    loop {
        let kind = cur.u8()?;
        let len = cur.u32()? as usize;
        if kind == 0 && len == 0 {
            break;
        }
        cur.skip(len)?;
    }

    let layout = Layout {
        version,
        label,
        nobs: checked_nobs(nobs)?,
        variables: build_variables(names, kinds, formats, labels, value_label_names),
    };
    let (rows, pending) = read_records(&mut cur, &layout)?;
    if !pending.is_empty() {
        return Err(DtaError::invalid_format("strL values in a pre-117 file"));
    }

    // Value label tables run from the end of the data to the end of the file.
    let mut value_labels = BTreeMap::new();
    while cur.remaining() > 0 {
        let (name, table) = read_value_label_table(&mut cur, version)?;
        value_labels.insert(name, table);
    }

    Ok(DtaDataset {
        version: layout.version,
        label: layout.label,
        variables: layout.variables,
        rows,
        value_labels,
    })
}

fn checked_nobs(nobs: u64) -> Result<usize> {
    usize::try_from(nobs)
        .map_err(|_| DtaError::invalid_format(format!("observation count {nobs} too large")))
}

fn read_fixed_strings(
    cur: &mut ByteCursor<'_>,
    count: usize,
    width: usize,
    version: DtaVersion,
) -> Result<Vec<String>> {
    (0..count).map(|_| cur.fixed_str(width, version)).collect()
}

fn build_variables(
    names: Vec<String>,
    kinds: Vec<DtaType>,
    formats: Vec<String>,
    labels: Vec<String>,
    value_label_names: Vec<String>,
) -> Vec<DtaVariable> {
    names
        .into_iter()
        .zip(kinds)
        .zip(formats.into_iter().zip(labels))
        .zip(value_label_names)
        .map(|(((name, kind), (format, label)), value_label)| DtaVariable {
            name,
            kind,
            format,
            label,
            value_label,
        })
        .collect()
}

/// Reads one value label table: its length, name and three bytes of
/// padding, then `n`, the text length, `n` text offsets, `n` codes and the
/// NUL-separated texts.
fn read_value_label_table(
    cur: &mut ByteCursor<'_>,
    version: DtaVersion,
) -> Result<(String, ValueLabels)> {
    let len = cur.u32()? as usize;
    let name = cur.fixed_str(version.name_len(), version)?;
    cur.skip(3)?;
    let mut table = ByteCursor::new(cur.take(len)?, cur.order());

    let count = table.u32()? as usize;
    let text_len = table.u32()? as usize;
    // Offsets and codes take eight bytes per entry.
    if count.saturating_mul(8) > table.remaining() {
        return Err(DtaError::invalid_format(format!(
            "value label table '{name}' claims {count} entries"
        )));
    }
    let offsets = (0..count)
        .map(|_| table.u32().map(|o| o as usize))
        .collect::<Result<Vec<_>>>()?;
    let codes = (0..count)
        .map(|_| table.i32())
        .collect::<Result<Vec<_>>>()?;
    let text = table.take(text_len)?;

    let mut labels = ValueLabels::new();
    for (code, offset) in codes.into_iter().zip(offsets) {
        let rest = text.get(offset..).ok_or_else(|| {
            DtaError::invalid_format(format!(
                "value label table '{name}' points past its text"
            ))
        })?;
        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        labels.insert(code, decode_text(&rest[..end], version));
    }
    Ok((name, labels))
}

type PendingStrl = (usize, usize, (u64, u64));

fn read_records(
    cur: &mut ByteCursor<'_>,
    layout: &Layout,
) -> Result<(Vec<Vec<DtaValue>>, Vec<PendingStrl>)> {
    let record_width: usize = layout.variables.iter().map(|v| v.kind.width()).sum();
    let needed = record_width
        .checked_mul(layout.nobs)
        .ok_or_else(|| DtaError::invalid_format("data section size overflows"))?;
    if needed > cur.remaining() {
        return Err(DtaError::Truncated {
            offset: cur.position(),
            needed: needed - cur.remaining(),
        });
    }
    // Zero-width records occupy no bytes, so the count cannot be checked
    // against the file size.
    if record_width == 0 && layout.nobs > 0 {
        return Err(DtaError::invalid_format(format!(
            "{} observations without variables",
            layout.nobs
        )));
    }

    let mut rows = Vec::with_capacity(layout.nobs);
    let mut pending = Vec::new();
    for row_idx in 0..layout.nobs {
        let mut row = Vec::with_capacity(layout.variables.len());
        for (col_idx, variable) in layout.variables.iter().enumerate() {
            let value = match variable.kind {
                DtaType::Str(len) => DtaValue::Text(cur.fixed_str(usize::from(len), layout.version)?),
                DtaType::StrL => {
                    pending.push((row_idx, col_idx, cur.strl_ref(layout.version)?));
                    DtaValue::Missing
                }
                DtaType::Byte => {
                    let v = cur.i8()?;
                    if v > BYTE_MAX_VALID {
                        DtaValue::Missing
                    } else {
                        DtaValue::Int(i64::from(v))
                    }
                }
                DtaType::Int => {
                    let v = cur.i16()?;
                    if v > INT_MAX_VALID {
                        DtaValue::Missing
                    } else {
                        DtaValue::Int(i64::from(v))
                    }
                }
                DtaType::Long => {
                    let v = cur.i32()?;
                    if v > LONG_MAX_VALID {
                        DtaValue::Missing
                    } else {
                        DtaValue::Int(i64::from(v))
                    }
                }
                DtaType::Float => {
                    let bits = cur.u32()?;
                    let v = f32::from_bits(bits);
                    if v.is_nan() || (bits < 0x8000_0000 && bits >= FLOAT_MISSING_BITS) {
                        DtaValue::Missing
                    } else {
                        DtaValue::Float(f64::from(v))
                    }
                }
                DtaType::Double => {
                    let bits = cur.u64()?;
                    let v = f64::from_bits(bits);
                    if v.is_nan() || (bits < 0x8000_0000_0000_0000 && bits >= DOUBLE_MISSING_BITS)
                    {
                        DtaValue::Missing
                    } else {
                        DtaValue::Float(v)
                    }
                }
            };
            row.push(value);
        }
        rows.push(row);
    }
    Ok((rows, pending))
}

fn read_strls(cur: &mut ByteCursor<'_>, version: DtaVersion) -> Result<HashMap<(u64, u64), String>> {
    let mut strls = HashMap::new();
    while cur.peek_is(b"GSO") {
        cur.expect(b"GSO")?;
        let v = u64::from(cur.u32()?);
        let o = match version {
            DtaVersion::V117 => u64::from(cur.u32()?),
            _ => cur.u64()?,
        };
        let kind = cur.u8()?;
        let len = cur.u32()? as usize;
        let raw = cur.take(len)?;
        let text = if kind == GSO_BINARY {
            decode_text(raw, version)
        } else {
            // ASCII strLs carry a trailing NUL.
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            decode_text(&raw[..end], version)
        };
        strls.insert((v, o), text);
    }
    Ok(strls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_release() {
        let mut bytes = vec![116u8, 2, 1, 0];
        bytes.extend_from_slice(&[0u8; 200]);
        assert!(matches!(
            parse_dta(&bytes),
            Err(DtaError::UnsupportedRelease { release: 116 })
        ));
    }

    #[test]
    fn rejects_tagged_file_with_bad_byte_order() {
        let bytes = b"<stata_dta><header><release>118</release><byteorder>XYZ</byteorder>";
        assert!(matches!(
            parse_dta(bytes),
            Err(DtaError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn truncated_header_is_reported() {
        let bytes = b"<stata_dta><header><release>118</release><byteorder>LSF</byteorder><K>";
        assert!(matches!(parse_dta(bytes), Err(DtaError::Truncated { .. })));
    }

    #[test]
    fn value_label_table_decodes_codes_and_texts() {
        let mut table = Vec::new();
        table.extend_from_slice(&2u32.to_le_bytes());
        table.extend_from_slice(&9u32.to_le_bytes());
        table.extend_from_slice(&0u32.to_le_bytes());
        table.extend_from_slice(&5u32.to_le_bytes());
        table.extend_from_slice(&1i32.to_le_bytes());
        table.extend_from_slice(&(-3i32).to_le_bytes());
        table.extend_from_slice(b"Asia\0Sur\0");

        let mut bytes = (table.len() as u32).to_le_bytes().to_vec();
        let mut name = b"region".to_vec();
        name.resize(33, 0);
        bytes.extend(name);
        bytes.extend_from_slice(&[0u8; 3]);
        bytes.extend(table);

        let mut cur = ByteCursor::new(&bytes, ByteOrder::Little);
        let (name, labels) = read_value_label_table(&mut cur, DtaVersion::V114).unwrap();
        assert_eq!(name, "region");
        assert_eq!(labels.get(&1).map(String::as_str), Some("Asia"));
        assert_eq!(labels.get(&-3).map(String::as_str), Some("Sur"));
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn value_label_offsets_past_the_text_fail() {
        let mut table = Vec::new();
        table.extend_from_slice(&1u32.to_le_bytes());
        table.extend_from_slice(&2u32.to_le_bytes());
        table.extend_from_slice(&40u32.to_le_bytes());
        table.extend_from_slice(&1i32.to_le_bytes());
        table.extend_from_slice(b"a\0");

        let mut bytes = (table.len() as u32).to_le_bytes().to_vec();
        bytes.extend(vec![0u8; 33 + 3]);
        bytes.extend(table);

        let mut cur = ByteCursor::new(&bytes, ByteOrder::Little);
        assert!(matches!(
            read_value_label_table(&mut cur, DtaVersion::V114),
            Err(DtaError::InvalidFormat { .. })
        ));
    }
}
