//! MetaImage (`.mhd` + `.raw`) volume I/O.
//!
//! A header is a list of `Key = Value` lines ending with `ElementDataFile`.
//! The payload is either the rest of the header file (`LOCAL`) or a separate
//! file named relative to the header's directory:
//!
//! ```text
//! ObjectType = Image
//! NDims = 3
//! BinaryData = True
//! BinaryDataByteOrderMSB = False
//! CompressedData = False
//! Offset = 0 0 0
//! ElementSpacing = 0.5 0.5 1
//! DimSize = 128 128 64
//! ElementType = MET_FLOAT
//! ElementDataFile = coral_skel.raw
//! ```
//!
//! Samples are stored X fastest, the same order as [`VoxelGrid`]. Compressed
//! payloads and multi-channel images are rejected as format errors.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{Result, SkeletonError};
use crate::grid::{Dims, Field, Mask, Spacing, VoxelGrid};

// =============================================================================
// Element types
// =============================================================================

/// Scalar sample type of a MetaImage payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
  UChar,
  Char,
  UShort,
  Short,
  UInt,
  Int,
  Float,
  Double,
}

impl ElementType {
  pub fn from_tag(tag: &str) -> Result<Self> {
    Ok(match tag {
      "MET_UCHAR" => Self::UChar,
      "MET_CHAR" => Self::Char,
      "MET_USHORT" => Self::UShort,
      "MET_SHORT" => Self::Short,
      "MET_UINT" => Self::UInt,
      "MET_INT" => Self::Int,
      "MET_FLOAT" => Self::Float,
      "MET_DOUBLE" => Self::Double,
      other => return Err(SkeletonError::format(format!("unsupported ElementType {}", other))),
    })
  }

  pub fn tag(self) -> &'static str {
    match self {
      Self::UChar => "MET_UCHAR",
      Self::Char => "MET_CHAR",
      Self::UShort => "MET_USHORT",
      Self::Short => "MET_SHORT",
      Self::UInt => "MET_UINT",
      Self::Int => "MET_INT",
      Self::Float => "MET_FLOAT",
      Self::Double => "MET_DOUBLE",
    }
  }

  /// Bytes per sample.
  pub fn size(self) -> usize {
    match self {
      Self::UChar | Self::Char => 1,
      Self::UShort | Self::Short => 2,
      Self::UInt | Self::Int | Self::Float => 4,
      Self::Double => 8,
    }
  }
}

// =============================================================================
// Header
// =============================================================================

/// Where the payload lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataFile {
  /// Directly after the header, in the same file.
  Local,
  /// Path relative to the header's directory.
  External(String),
}

/// Parsed MetaImage header.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaHeader {
  pub dims: Dims,
  pub spacing: Spacing,
  pub offset: [f64; 3],
  pub element_type: ElementType,
  pub big_endian: bool,
  /// Bytes to skip at the start of an external data file; `-1` means the
  /// payload is the tail of the file.
  pub header_size: i64,
  pub data_file: DataFile,
  /// Keys this reader does not interpret, in file order.
  pub extra: Vec<(String, String)>,
}

impl MetaHeader {
  /// Header for a new little-endian volume with its payload in `data_file`.
  pub fn new(dims: Dims, spacing: Spacing, element_type: ElementType, data_file: DataFile) -> Self {
    Self {
      dims,
      spacing,
      offset: [0.0; 3],
      element_type,
      big_endian: false,
      header_size: 0,
      data_file,
      extra: Vec::new(),
    }
  }

  /// Payload size in bytes.
  pub fn payload_len(&self) -> usize {
    self.dims.iter().product::<usize>() * self.element_type.size()
  }

  /// Parse header text. Parsing stops at `ElementDataFile`.
  pub fn parse(text: &str) -> Result<Self> {
    Ok(parse_lines(text.as_bytes())?.0)
  }

  /// Render the header as `Key = Value` lines.
  pub fn to_text(&self) -> String {
    let mut out = String::new();
    let mut line = |key: &str, value: String| {
      out.push_str(key);
      out.push_str(" = ");
      out.push_str(&value);
      out.push('\n');
    };

    line("ObjectType", "Image".into());
    line("NDims", "3".into());
    line("BinaryData", "True".into());
    line("BinaryDataByteOrderMSB", bool_value(self.big_endian).into());
    line("CompressedData", "False".into());
    line("Offset", join(&self.offset));
    line("ElementSpacing", join(&self.spacing.0));
    line("DimSize", join(&self.dims));
    for (key, value) in &self.extra {
      line(key.as_str(), value.clone());
    }
    if self.header_size != 0 {
      line("HeaderSize", self.header_size.to_string());
    }
    line("ElementType", self.element_type.tag().into());
    line(
      "ElementDataFile",
      match &self.data_file {
        DataFile::Local => "LOCAL".into(),
        DataFile::External(name) => name.clone(),
      },
    );
    out
  }
}

fn bool_value(v: bool) -> &'static str {
  if v {
    "True"
  } else {
    "False"
  }
}

fn join<T: ToString>(values: &[T]) -> String {
  values.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
  match value.to_ascii_lowercase().as_str() {
    "true" | "1" => Ok(true),
    "false" | "0" => Ok(false),
    _ => Err(SkeletonError::format(format!("{} expects True or False, got {}", key, value))),
  }
}

fn parse_triple<T: std::str::FromStr>(key: &str, value: &str) -> Result<[T; 3]> {
  let parts: Vec<T> = value
    .split_whitespace()
    .map(|p| p.parse::<T>())
    .collect::<std::result::Result<_, _>>()
    .map_err(|_| SkeletonError::format(format!("{} has a non-numeric entry: {}", key, value)))?;
  <[T; 3]>::try_from(parts)
    .map_err(|parts| SkeletonError::format(format!("{} needs 3 values, got {}", key, parts.len())))
}

/// Parse header lines from the start of `bytes`. Returns the header and the
/// byte position right after the `ElementDataFile` line.
fn parse_lines(bytes: &[u8]) -> Result<(MetaHeader, usize)> {
  let mut dims: Option<Dims> = None;
  let mut spacing: Option<[f64; 3]> = None;
  let mut element_size: Option<[f64; 3]> = None;
  let mut offset = [0.0; 3];
  let mut element_type: Option<ElementType> = None;
  let mut big_endian = false;
  let mut header_size = 0i64;
  let mut extra = Vec::new();

  let mut pos = 0;
  while pos < bytes.len() {
    let end = bytes[pos..]
      .iter()
      .position(|&b| b == b'\n')
      .map_or(bytes.len(), |i| pos + i + 1);
    let raw = std::str::from_utf8(&bytes[pos..end])
      .map_err(|_| SkeletonError::format("header is not valid text"))?;
    pos = end;

    let line = raw.trim();
    if line.is_empty() {
      continue;
    }
    let (key, value) = line
      .split_once('=')
      .ok_or_else(|| SkeletonError::format(format!("header line without '=': {}", line)))?;
    let (key, value) = (key.trim(), value.trim());

    match key {
      "ObjectType" => {
        if value != "Image" {
          return Err(SkeletonError::format(format!("ObjectType {} is not an image", value)));
        }
      }
      "NDims" => {
        if value != "3" {
          return Err(SkeletonError::format(format!("expected NDims = 3, got {}", value)));
        }
      }
      "DimSize" => {
        let d = parse_triple::<usize>(key, value)?;
        if d.contains(&0) {
          return Err(SkeletonError::format(format!("DimSize {:?} has an empty axis", d)));
        }
        dims = Some(d);
      }
      "ElementSpacing" => spacing = Some(parse_triple(key, value)?),
      "ElementSize" => element_size = Some(parse_triple(key, value)?),
      "Offset" | "Origin" | "Position" => offset = parse_triple(key, value)?,
      "ElementType" => element_type = Some(ElementType::from_tag(value)?),
      "ElementNumberOfChannels" => {
        if value != "1" {
          return Err(SkeletonError::format(format!("{} channels per voxel, expected 1", value)));
        }
      }
      "BinaryData" => {
        if !parse_bool(key, value)? {
          return Err(SkeletonError::format("ASCII payloads are not supported"));
        }
      }
      "BinaryDataByteOrderMSB" | "ElementByteOrderMSB" => big_endian = parse_bool(key, value)?,
      "CompressedData" => {
        if parse_bool(key, value)? {
          return Err(SkeletonError::format("compressed payloads are not supported"));
        }
      }
      "CompressedDataSize" => {}
      "HeaderSize" => {
        header_size = value
          .parse()
          .map_err(|_| SkeletonError::format(format!("HeaderSize is not an integer: {}", value)))?;
      }
      "ElementDataFile" => {
        let data_file = match value {
          "LOCAL" | "Local" | "local" => DataFile::Local,
          "" => return Err(SkeletonError::format("ElementDataFile is empty")),
          name => DataFile::External(name.to_string()),
        };
        let dims = dims.ok_or_else(|| SkeletonError::format("missing DimSize"))?;
        let element_type = element_type.ok_or_else(|| SkeletonError::format("missing ElementType"))?;
        let spacing = Spacing::new(spacing.or(element_size).unwrap_or([1.0; 3]))
          .map_err(|e| SkeletonError::format(e.to_string()))?;
        dims
          .iter()
          .try_fold(element_type.size(), |acc, &d| acc.checked_mul(d))
          .ok_or_else(|| SkeletonError::format(format!("DimSize {:?} overflows", dims)))?;

        let header = MetaHeader {
          dims,
          spacing,
          offset,
          element_type,
          big_endian,
          header_size,
          data_file,
          extra,
        };
        return Ok((header, pos));
      }
      _ => extra.push((key.to_string(), value.to_string())),
    }
  }

  Err(SkeletonError::format("header has no ElementDataFile line"))
}

// =============================================================================
// Reading
// =============================================================================

/// Read a header and its raw payload bytes.
pub fn read_raw(path: &Path) -> Result<(MetaHeader, Vec<u8>)> {
  let bytes = fs::read(path).map_err(|e| SkeletonError::io(path, e))?;
  let (header, body_start) = parse_lines(&bytes)?;
  let expected = header.payload_len();

  let payload = match &header.data_file {
    DataFile::Local => {
      let body = &bytes[body_start..];
      if body.len() != expected {
        return Err(SkeletonError::format(format!(
          "local payload is {} bytes, expected {}",
          body.len(),
          expected
        )));
      }
      body.to_vec()
    }
    DataFile::External(name) => {
      let data_path = path.parent().unwrap_or_else(|| Path::new("")).join(name);
      let data = fs::read(&data_path).map_err(|e| SkeletonError::io(&data_path, e))?;
      let body = match header.header_size {
        -1 => data.len().checked_sub(expected).map(|start| &data[start..]),
        skip if skip >= 0 => data.get(skip as usize..),
        other => {
          return Err(SkeletonError::format(format!("invalid HeaderSize {}", other)));
        }
      };
      match body {
        Some(body) if body.len() == expected => body.to_vec(),
        _ => {
          return Err(SkeletonError::format(format!(
            "{} holds {} bytes, expected {} after a {}-byte header",
            data_path.display(),
            data.len(),
            expected,
            header.header_size
          )));
        }
      }
    }
  };

  tracing::debug!(
    path = %path.display(),
    dims = ?header.dims,
    element = header.element_type.tag(),
    "read MetaImage"
  );
  Ok((header, payload))
}

/// Decode every sample as `f64` and hand it to `convert`.
fn decode<T: Send>(
  payload: &[u8],
  element_type: ElementType,
  big_endian: bool,
  convert: impl Fn(f64) -> T + Sync,
) -> Vec<T> {
  fn samples<const N: usize, T: Send>(
    payload: &[u8],
    big_endian: bool,
    sample: impl Fn([u8; N]) -> f64 + Sync,
    convert: &(impl Fn(f64) -> T + Sync),
  ) -> Vec<T> {
    payload
      .par_chunks_exact(N)
      .map(|chunk| {
        let mut le = [0u8; N];
        le.copy_from_slice(chunk);
        if big_endian {
          le.reverse();
        }
        convert(sample(le))
      })
      .collect()
  }

  let be = big_endian;
  match element_type {
    ElementType::UChar => samples(payload, be, |b: [u8; 1]| b[0] as f64, &convert),
    ElementType::Char => samples(payload, be, |b: [u8; 1]| b[0] as i8 as f64, &convert),
    ElementType::UShort => samples(payload, be, |b| u16::from_le_bytes(b) as f64, &convert),
    ElementType::Short => samples(payload, be, |b| i16::from_le_bytes(b) as f64, &convert),
    ElementType::UInt => samples(payload, be, |b| u32::from_le_bytes(b) as f64, &convert),
    ElementType::Int => samples(payload, be, |b| i32::from_le_bytes(b) as f64, &convert),
    ElementType::Float => samples(payload, be, |b| f32::from_le_bytes(b) as f64, &convert),
    ElementType::Double => samples(payload, be, f64::from_le_bytes, &convert),
  }
}

/// Read a volume as a binary mask: any nonzero sample is foreground.
pub fn read_mask(path: &Path) -> Result<(Mask, MetaHeader)> {
  let (header, payload) = read_raw(path)?;
  let data = decode(&payload, header.element_type, header.big_endian, |v| v != 0.0);
  let mask = VoxelGrid::from_vec(header.dims, header.spacing, data)?;
  Ok((mask, header))
}

/// Read a volume as a scalar field.
pub fn read_field(path: &Path) -> Result<(Field, MetaHeader)> {
  let (header, payload) = read_raw(path)?;
  let data = decode(&payload, header.element_type, header.big_endian, |v| v as f32);
  let field = VoxelGrid::from_vec(header.dims, header.spacing, data)?;
  Ok((field, header))
}

// =============================================================================
// Writing
// =============================================================================

/// Payload file written next to a header: `dir/name.mhd` → `name.raw`.
pub fn data_file_name(header_path: &Path) -> Result<String> {
  header_path
    .file_stem()
    .and_then(|s| s.to_str())
    .map(|stem| format!("{}.raw", stem))
    .ok_or_else(|| SkeletonError::format(format!("no file name in {}", header_path.display())))
}

/// Write a field as `MET_FLOAT` little-endian with a sibling `.raw` payload.
///
/// `template` supplies the offset and any extra keys to carry over, usually
/// the header of the volume the field was computed from.
pub fn write_field(path: &Path, field: &Field, template: Option<&MetaHeader>) -> Result<()> {
  let payload: Vec<u8> = field.as_slice().iter().flat_map(|v| v.to_le_bytes()).collect();
  write_volume(path, field.dims(), field.spacing(), ElementType::Float, &payload, template)
}

/// Write a mask as `MET_UCHAR` with foreground stored as 255.
pub fn write_mask(path: &Path, mask: &Mask, template: Option<&MetaHeader>) -> Result<()> {
  let payload: Vec<u8> = mask.as_slice().iter().map(|&v| if v { 255 } else { 0 }).collect();
  write_volume(path, mask.dims(), mask.spacing(), ElementType::UChar, &payload, template)
}

fn write_volume(
  path: &Path,
  dims: Dims,
  spacing: Spacing,
  element_type: ElementType,
  payload: &[u8],
  template: Option<&MetaHeader>,
) -> Result<()> {
  let data_name = data_file_name(path)?;
  let mut header = MetaHeader::new(dims, spacing, element_type, DataFile::External(data_name.clone()));
  if let Some(template) = template {
    header.offset = template.offset;
    header.extra = template.extra.clone();
  }

  let data_path = path.with_file_name(&data_name);
  let data_tmp = temp_sibling(&data_path);
  let header_tmp = temp_sibling(path);

  let written = write_file(&data_tmp, payload)
    .and_then(|_| write_file(&header_tmp, header.to_text().as_bytes()))
    .and_then(|_| fs::rename(&data_tmp, &data_path).map_err(|e| SkeletonError::io(&data_path, e)))
    .and_then(|_| fs::rename(&header_tmp, path).map_err(|e| SkeletonError::io(path, e)));

  if written.is_err() {
    let _ = fs::remove_file(&data_tmp);
    let _ = fs::remove_file(&header_tmp);
  } else {
    tracing::debug!(path = %path.display(), dims = ?dims, element = element_type.tag(), "wrote MetaImage");
  }
  written
}

fn temp_sibling(path: &Path) -> PathBuf {
  let mut name = path.file_name().unwrap_or_default().to_os_string();
  name.push(".tmp");
  path.with_file_name(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
  let mut file = fs::File::create(path).map_err(|e| SkeletonError::io(path, e))?;
  file
    .write_all(bytes)
    .and_then(|_| file.sync_all())
    .map_err(|e| SkeletonError::io(path, e))
}

#[cfg(test)]
#[path = "metaimage_test.rs"]
mod metaimage_test;
