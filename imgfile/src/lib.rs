//! Output image and container formats for the [asm65](../asm65/index.html) assembler.
//!
//! The assembler emits into an [`Image`](struct.Image.html), a dense 64 KiB byte
//! buffer with a parallel "written" bitmap. Untouched cells keep the memory-init
//! fill byte. The [`write`](fn.write.html) family serializes an image into one of
//! the supported container [`Format`](enum.Format.html)s:
//!
//! Format  | Layout
//! --------|----------------------------------------------------------
//! `plain` | raw bytes from the lowest touched address to the highest
//! `cbm`   | little-endian 16-bit load address, then the plain bytes
//! `apple` | little-endian load address and length, then the plain bytes
//! `hex`   | Intel HEX type-00 data records (max 16 bytes) plus a type-01 EOF
//!
//! Additionally, [`write_vice_labels`](fn.write_vice_labels.html) dumps a label
//! list in the format understood by the VICE monitor (`ll` command).

use byteorder::WriteBytesExt;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;
use util::{Endian, ParseEnumError};


pub const IMAGE_SIZE: usize = 0x10000;

/// Container format selected with the assembler's `-f` switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Plain,
    Cbm,
    Apple,
    Hex,
}

impl FromStr for Format {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Format, ParseEnumError> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(Format::Plain),
            "cbm" => Ok(Format::Cbm),
            "apple" => Ok(Format::Apple),
            "hex" => Ok(Format::Hex),
            _ => Err(ParseEnumError::new(s, "Format")),
        }
    }
}

impl Format {
    /// Default file extension for output paths derived from the input name.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Plain => "bin",
            Format::Cbm => "prg",
            Format::Apple => "b",
            Format::Hex => "hex",
        }
    }
}

/// Dense 64 KiB output image addressed by the real program counter.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    bytes: Vec<u8>,
    written: Vec<bool>,
    fill: u8,
    lowest: usize,
    highest: usize,
}

impl Image {
    pub fn new(fill: u8) -> Image {
        Image {
            bytes: vec![fill; IMAGE_SIZE],
            written: vec![false; IMAGE_SIZE],
            fill,
            lowest: IMAGE_SIZE,
            highest: 0,
        }
    }

    pub fn fill_byte(&self) -> u8 {
        self.fill
    }

    /// Changes the memory-init byte. Cells that have not been written yet are
    /// re-initialized so that gaps inside the final range carry the new value.
    pub fn set_fill(&mut self, fill: u8) {
        self.fill = fill;
        for (byte, written) in self.bytes.iter_mut().zip(self.written.iter()) {
            if !written {
                *byte = fill;
            }
        }
    }

    /// Stores one byte, extending the touched range. Returns whether the cell
    /// had been written before (used for overlap warnings).
    pub fn put(&mut self, addr: u16, byte: u8) -> bool {
        let addr = addr as usize;
        let overlap = self.written[addr];
        self.bytes[addr] = byte;
        self.written[addr] = true;
        if addr < self.lowest {
            self.lowest = addr;
        }
        if addr > self.highest {
            self.highest = addr;
        }
        overlap
    }

    pub fn get(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    pub fn is_written(&self, addr: u16) -> bool {
        self.written[addr as usize]
    }

    /// Lowest and highest touched address, or `None` for an empty image.
    pub fn range(&self) -> Option<(u16, u16)> {
        if self.lowest > self.highest {
            None
        } else {
            Some((self.lowest as u16, self.highest as u16))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.range().is_none()
    }

    pub fn len(&self) -> usize {
        match self.range() {
            Some((lo, hi)) => hi as usize - lo as usize + 1,
            None => 0,
        }
    }

    /// The plain serialization: all bytes from the lowest touched address to
    /// the highest, untouched gaps holding the fill byte.
    pub fn to_plain(&self) -> Vec<u8> {
        match self.range() {
            Some((lo, hi)) => self.bytes[lo as usize..=hi as usize].to_vec(),
            None => Vec::new(),
        }
    }
}

pub fn write<W: Write>(writer: &mut W, image: &Image, format: Format) -> std::io::Result<()> {
    match format {
        Format::Plain => write_plain(writer, image),
        Format::Cbm => write_cbm(writer, image),
        Format::Apple => write_apple(writer, image),
        Format::Hex => write_hex(writer, image),
    }
}

pub fn write_file<P: AsRef<Path>>(path: P, image: &Image, format: Format) -> std::io::Result<()> {
    write(&mut BufWriter::new(File::create(path)?), image, format)
}

fn write_plain<W: Write>(writer: &mut W, image: &Image) -> std::io::Result<()> {
    writer.write_all(&image.to_plain())
}

fn write_cbm<W: Write>(writer: &mut W, image: &Image) -> std::io::Result<()> {
    let load = image.range().map(|(lo, _)| lo).unwrap_or(0);
    writer.write_u16::<Endian>(load)?;
    write_plain(writer, image)
}

fn write_apple<W: Write>(writer: &mut W, image: &Image) -> std::io::Result<()> {
    let load = image.range().map(|(lo, _)| lo).unwrap_or(0);
    writer.write_u16::<Endian>(load)?;
    writer.write_u16::<Endian>(image.len() as u16)?;
    write_plain(writer, image)
}

/// Intel HEX: one type-00 record per run of up to 16 consecutive written
/// bytes, closed by the type-01 EOF record. The checksum is the two's
/// complement of the sum of all preceding record bytes.
fn write_hex<W: Write>(writer: &mut W, image: &Image) -> std::io::Result<()> {
    if let Some((lo, hi)) = image.range() {
        let mut addr = lo as usize;
        let hi = hi as usize;
        while addr <= hi {
            if !image.written[addr] {
                addr += 1;
                continue;
            }
            let mut data = Vec::with_capacity(16);
            let start = addr;
            while addr <= hi && image.written[addr] && data.len() < 16 {
                data.push(image.bytes[addr]);
                addr += 1;
            }
            write_hex_record(writer, start as u16, 0x00, &data)?;
        }
    }
    write_hex_record(writer, 0, 0x01, &[])
}

fn write_hex_record<W: Write>(
    writer: &mut W,
    addr: u16,
    record_type: u8,
    data: &[u8],
) -> std::io::Result<()> {
    let mut sum = data.len() as u8;
    sum = sum
        .wrapping_add((addr >> 8) as u8)
        .wrapping_add(addr as u8)
        .wrapping_add(record_type);
    write!(writer, ":{:02X}{:04X}{:02X}", data.len(), addr, record_type)?;
    for byte in data {
        sum = sum.wrapping_add(*byte);
        write!(writer, "{:02X}", byte)?;
    }
    writeln!(writer, "{:02X}", sum.wrapping_neg())
}

/// Writes a VICE monitor label file: `al C:hhhh .name` per label, sorted by
/// address.
pub fn write_vice_labels<W: Write>(writer: &mut W, labels: &[(String, u16)]) -> std::io::Result<()> {
    let mut sorted: Vec<&(String, u16)> = labels.iter().collect();
    sorted.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    for (name, addr) in sorted {
        writeln!(writer, "al C:{:04x} .{}", addr, name)?;
    }
    Ok(())
}

pub fn write_vice_labels_file<P: AsRef<Path>>(
    path: P,
    labels: &[(String, u16)],
) -> std::io::Result<()> {
    write_vice_labels(&mut BufWriter::new(File::create(path)?), labels)
}
