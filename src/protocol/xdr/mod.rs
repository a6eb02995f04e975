//! The XDR (External Data Representation) module defines data structures and
//! methods for serializing/deserializing data according to RFC 1832.
//!
//! XDR provides a machine-independent data representation format, which is
//! critical for network protocols like NFS.
//!
//! All data structures that cross the wire implement the [`Serialize`] and
//! [`Deserialize`] traits. Structs and enums are wired up with the
//! `SerializeStruct!`/`DeserializeStruct!` and `SerializeEnum!`/
//! `DeserializeEnum!` macros; XDR bool-discriminated unions with a void arm
//! are modelled as `Option<T>`.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

pub mod mount;
pub mod nfs3;
pub mod nfs4;
pub mod portmap;
pub mod rpc;

mod utils;

pub use utils::{invalid_data, read_padding, write_padding};

/// Type alias for the standard endianness used in XDR serialization.
pub type XDREndian = BigEndian;

/// Serialization half of the XDR codec.
pub trait Serialize {
    /// Serializes the implementing type to the provided writer.
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()>;
}

/// Deserialization half of the XDR codec.
///
/// Deserialization is in-place into a default-constructed value; use the
/// free [`deserialize`] function for the common by-value form.
pub trait Deserialize {
    /// Deserializes data from the provided reader into the implementing type.
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()>;
}

/// Reads a complete value of type `T` from the provided reader.
pub fn deserialize<T: Default + Deserialize>(src: &mut impl Read) -> std::io::Result<T> {
    let mut value = T::default();
    value.deserialize(src)?;
    Ok(value)
}

/// Serializes a value into a fresh byte buffer.
pub fn serialize_to_vec<T: Serialize>(value: &T) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    value.serialize(&mut buf)?;
    Ok(buf)
}

/// Macro for implementing XDR serialization for enumerations.
///
/// Enums are represented on the wire as 32-bit big endian integers; the
/// enum must be `Copy` and castable to `u32`.
#[macro_export]
macro_rules! SerializeEnum {
    ($t:ident) => {
        impl $crate::protocol::xdr::Serialize for $t {
            fn serialize<W: std::io::Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
                use $crate::protocol::xdr::Serialize;
                (*self as u32).serialize(dest)
            }
        }
    };
}

/// Macro for implementing XDR deserialization for enumerations.
///
/// The enum must derive `FromPrimitive`; values outside the enumeration are
/// rejected as invalid data.
#[macro_export]
macro_rules! DeserializeEnum {
    ($t:ident) => {
        impl $crate::protocol::xdr::Deserialize for $t {
            fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
                let raw: u32 = $crate::protocol::xdr::deserialize(src)?;
                match <$t as ::num_traits::cast::FromPrimitive>::from_u32(raw) {
                    Some(parsed) => {
                        *self = parsed;
                        Ok(())
                    }
                    None => Err($crate::protocol::xdr::invalid_data(&format!(
                        "Invalid value {} for {}",
                        raw,
                        stringify!($t)
                    ))),
                }
            }
        }
    };
}

/// Macro for implementing XDR serialization for structs: each field is
/// serialized in declaration order.
#[macro_export]
macro_rules! SerializeStruct {
    ($t:ident, $($element:ident),*) => {
        impl $crate::protocol::xdr::Serialize for $t {
            fn serialize<W: std::io::Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
                use $crate::protocol::xdr::Serialize;
                $(self.$element.serialize(dest)?;)*
                Ok(())
            }
        }
    };
}

/// Macro for implementing XDR deserialization for structs.
#[macro_export]
macro_rules! DeserializeStruct {
    ($t:ident, $($element:ident),*) => {
        impl $crate::protocol::xdr::Deserialize for $t {
            fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
                use $crate::protocol::xdr::Deserialize;
                $(self.$element.deserialize(src)?;)*
                Ok(())
            }
        }
    };
}

impl Serialize for bool {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_u32::<XDREndian>(*self as u32)
    }
}

impl Deserialize for bool {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = src.read_u32::<XDREndian>()? > 0;
        Ok(())
    }
}

impl Serialize for i32 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_i32::<XDREndian>(*self)
    }
}

impl Deserialize for i32 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = src.read_i32::<XDREndian>()?;
        Ok(())
    }
}

impl Serialize for i64 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_i64::<XDREndian>(*self)
    }
}

impl Deserialize for i64 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = src.read_i64::<XDREndian>()?;
        Ok(())
    }
}

impl Serialize for u32 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_u32::<XDREndian>(*self)
    }
}

impl Deserialize for u32 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = src.read_u32::<XDREndian>()?;
        Ok(())
    }
}

impl Serialize for u64 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_u64::<XDREndian>(*self)
    }
}

impl Deserialize for u64 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = src.read_u64::<XDREndian>()?;
        Ok(())
    }
}

/// Fixed-size byte arrays are serialized as raw bytes without a length
/// prefix. All fixed opaques used by the protocols here are multiples of
/// four bytes, so no padding is involved.
impl<const N: usize> Serialize for [u8; N] {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_all(self)
    }
}

impl<const N: usize> Deserialize for [u8; N] {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        src.read_exact(self)
    }
}

/// Variable-length opaque data: 4-byte length prefix, the bytes, padding to
/// a multiple of four bytes.
impl Serialize for Vec<u8> {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        assert!(self.len() < u32::MAX as usize);
        (self.len() as u32).serialize(dest)?;
        dest.write_all(self)?;
        write_padding(self.len(), dest)
    }
}

impl Deserialize for Vec<u8> {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let length: u32 = deserialize(src)?;
        self.clear();
        self.resize(length as usize, 0);
        src.read_exact(self)?;
        read_padding(length as usize, src)
    }
}

/// Counted array of 32-bit unsigned integers.
impl Serialize for Vec<u32> {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        assert!(self.len() < u32::MAX as usize);
        (self.len() as u32).serialize(dest)?;
        for item in self {
            item.serialize(dest)?;
        }
        Ok(())
    }
}

impl Deserialize for Vec<u32> {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let length: u32 = deserialize(src)?;
        self.clear();
        for _ in 0..length {
            self.push(deserialize(src)?);
        }
        Ok(())
    }
}

impl Serialize for String {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        assert!(self.len() < u32::MAX as usize);
        (self.len() as u32).serialize(dest)?;
        dest.write_all(self.as_bytes())?;
        write_padding(self.len(), dest)
    }
}

impl Deserialize for String {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let bytes: Vec<u8> = deserialize(src)?;
        *self = String::from_utf8(bytes).map_err(|_| invalid_data("string is not UTF-8"))?;
        Ok(())
    }
}

/// XDR bool-discriminated unions with a void arm: `None` serializes as
/// FALSE, `Some(v)` as TRUE followed by the value.
impl<T: Serialize> Serialize for Option<T> {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            None => false.serialize(dest),
            Some(value) => {
                true.serialize(dest)?;
                value.serialize(dest)
            }
        }
    }
}

impl<T: Default + Deserialize> Deserialize for Option<T> {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let present: bool = deserialize(src)?;
        *self = if present { Some(deserialize(src)?) } else { None };
        Ok(())
    }
}

/// Serializes a counted array: 4-byte element count followed by each
/// element. Used where the element type is not covered by the vector
/// impls above.
pub fn serialize_array<T: Serialize, W: Write + ?Sized>(items: &[T], dest: &mut W) -> std::io::Result<()> {
    assert!(items.len() < u32::MAX as usize);
    (items.len() as u32).serialize(dest)?;
    for item in items {
        item.serialize(dest)?;
    }
    Ok(())
}

/// Deserializes a counted array, bounding the element count to guard
/// against hostile length prefixes.
pub fn deserialize_array<T: Default + Deserialize, R: Read>(
    src: &mut R,
    max_items: usize,
) -> std::io::Result<Vec<T>> {
    let count: u32 = deserialize(src)?;
    if count as usize > max_items {
        return Err(invalid_data(&format!("array length {count} exceeds {max_items}")));
    }
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(deserialize(src)?);
    }
    Ok(items)
}

pub use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};
