//! Binary NBT encoding.
//!
//! Big-endian, root compound with an empty name. Compressed with gzip when
//! used through [`NbtFormat`].

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::TagError;
use crate::format::TagFormat;
use crate::tag::{Compound, Tag};

const TAG_END: u8 = 0;
const TAG_COMPOUND: u8 = 10;
/// Deepest compound/list nesting accepted by the reader. Stored schemas nest
/// a handful of levels; the limit keeps recursion well inside a 2 MiB stack.
pub const MAX_DEPTH: usize = 64;

/// Gzip-compressed binary NBT files.
#[derive(Clone, Copy, Debug, Default)]
pub struct NbtFormat;

impl TagFormat for NbtFormat {
    fn extension(&self) -> &'static str {
        ".dat"
    }

    fn encode(&self, root: &Compound) -> Result<Vec<u8>, TagError> {
        let mut raw = Vec::new();
        write_compound(&mut raw, root)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw)?;
        Ok(encoder.finish()?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Compound, TagError> {
        let mut raw = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut raw)?;
        read_compound(&raw)
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes `root` as an uncompressed NBT document.
pub fn write_compound(out: &mut Vec<u8>, root: &Compound) -> Result<(), TagError> {
    out.push(TAG_COMPOUND);
    out.extend_from_slice(&0u16.to_be_bytes());
    write_compound_body(out, root)
}

fn write_name(out: &mut Vec<u8>, s: &str) -> Result<(), TagError> {
    let len = u16::try_from(s.len())
        .map_err(|_| TagError::Malformed(format!("string of {} bytes is too long", s.len())))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

fn write_compound_body(out: &mut Vec<u8>, compound: &Compound) -> Result<(), TagError> {
    for (name, tag) in compound.iter() {
        out.push(tag.type_id());
        write_name(out, name)?;
        write_payload(out, tag)?;
    }
    out.push(TAG_END);
    Ok(())
}

fn write_payload(out: &mut Vec<u8>, tag: &Tag) -> Result<(), TagError> {
    match tag {
        Tag::Byte(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Short(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::ByteArray(bytes) => {
            out.extend_from_slice(&len_i32(bytes.len())?.to_be_bytes());
            out.extend_from_slice(bytes);
        }
        Tag::String(s) => write_name(out, s)?,
        Tag::List(items) => {
            let element_id = items.first().map_or(TAG_END, Tag::type_id);
            if items.iter().any(|t| t.type_id() != element_id) {
                return Err(TagError::Malformed("list with mixed element types".into()));
            }
            out.push(element_id);
            out.extend_from_slice(&len_i32(items.len())?.to_be_bytes());
            for item in items {
                write_payload(out, item)?;
            }
        }
        Tag::Compound(c) => write_compound_body(out, c)?,
    }
    Ok(())
}

fn len_i32(len: usize) -> Result<i32, TagError> {
    i32::try_from(len).map_err(|_| TagError::Malformed(format!("length {len} overflows i32")))
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Reads an uncompressed NBT document. The root name is discarded.
pub fn read_compound(bytes: &[u8]) -> Result<Compound, TagError> {
    let mut r = Reader { bytes, pos: 0 };
    if r.u8()? != TAG_COMPOUND {
        return Err(TagError::RootNotCompound);
    }
    let _ = r.string()?;
    r.compound_body(0)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], TagError> {
        let end = self.pos.checked_add(n).ok_or(TagError::Truncated)?;
        let slice = self.bytes.get(self.pos..end).ok_or(TagError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], TagError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8, TagError> {
        Ok(self.take(1)?[0])
    }

    fn len(&mut self) -> Result<usize, TagError> {
        let len = i32::from_be_bytes(self.array()?);
        usize::try_from(len).map_err(|_| TagError::Malformed(format!("negative length {len}")))
    }

    fn string(&mut self) -> Result<String, TagError> {
        let len = u16::from_be_bytes(self.array()?) as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| TagError::Malformed("string is not valid UTF-8".into()))
    }

    fn compound_body(&mut self, depth: usize) -> Result<Compound, TagError> {
        if depth > MAX_DEPTH {
            return Err(TagError::TooDeep(MAX_DEPTH));
        }
        let mut compound = Compound::new();
        loop {
            let id = self.u8()?;
            if id == TAG_END {
                return Ok(compound);
            }
            let name = self.string()?;
            let tag = self.payload(id, depth)?;
            compound.insert(name, tag);
        }
    }

    fn payload(&mut self, id: u8, depth: usize) -> Result<Tag, TagError> {
        Ok(match id {
            1 => Tag::Byte(i8::from_be_bytes(self.array()?)),
            2 => Tag::Short(i16::from_be_bytes(self.array()?)),
            3 => Tag::Int(i32::from_be_bytes(self.array()?)),
            4 => Tag::Long(i64::from_be_bytes(self.array()?)),
            5 => Tag::Float(f32::from_be_bytes(self.array()?)),
            6 => Tag::Double(f64::from_be_bytes(self.array()?)),
            7 => {
                let len = self.len()?;
                Tag::ByteArray(self.take(len)?.to_vec())
            }
            8 => Tag::String(self.string()?),
            9 => {
                if depth + 1 > MAX_DEPTH {
                    return Err(TagError::TooDeep(MAX_DEPTH));
                }
                let element_id = self.u8()?;
                let len = self.len()?;
                if element_id == TAG_END && len > 0 {
                    return Err(TagError::Malformed("non-empty list of end tags".into()));
                }
                // Every element takes at least one byte, so cap the
                // preallocation by what is left.
                let mut items = Vec::with_capacity(len.min(self.bytes.len() - self.pos));
                for _ in 0..len {
                    items.push(self.payload(element_id, depth + 1)?);
                }
                Tag::List(items)
            }
            10 => Tag::Compound(self.compound_body(depth + 1)?),
            other => return Err(TagError::UnknownTagId(other)),
        })
    }
}
