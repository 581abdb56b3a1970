//! Wire and address encodings
//!
//! Bitcoin varints and a bounds-checked byte reader for the transaction
//! codec, Base58Check for legacy addresses and keys, CashAddr for Bitcoin
//! Cash and bech32 (segwit v0) for native Bitcoin receive addresses.

use bech32::{FromBase32, ToBase32, Variant};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58check: {0}")]
    InvalidBase58(String),

    #[error("invalid cashaddr: {0}")]
    InvalidCashAddr(String),

    #[error("invalid bech32: {0}")]
    InvalidBech32(String),

    #[error("{0} trailing bytes after transaction")]
    TrailingData(usize),
}

// ---------------------------------------------------------------------------
// Varint / byte reader
// ---------------------------------------------------------------------------

/// Encode a u64 as a Bitcoin varint.
pub fn write_varint(buf: &mut Vec<u8>, n: u64) {
    if n < 0xfd {
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(0xfd);
        buf.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(0xfe);
        buf.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        buf.push(0xff);
        buf.extend_from_slice(&n.to_le_bytes());
    }
}

/// Serialized length of a varint holding `n`.
pub fn varint_len(n: u64) -> usize {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Write `data` prefixed with its varint length.
pub fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    write_varint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

/// Cursor over a byte slice that never reads past its end.
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], EncodingError> {
        if self.remaining() < n {
            return Err(EncodingError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], EncodingError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, EncodingError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, EncodingError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, EncodingError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, EncodingError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_varint(&mut self) -> Result<u64, EncodingError> {
        match self.read_u8()? {
            0xfd => Ok(self.read_u16_le()? as u64),
            0xfe => Ok(self.read_u32_le()? as u64),
            0xff => self.read_u64_le(),
            n => Ok(n as u64),
        }
    }

    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], EncodingError> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| EncodingError::UnexpectedEof {
            needed: usize::MAX,
            remaining: self.remaining(),
        })?;
        self.read_bytes(len)
    }
}

/// Decode a hex string to bytes.
pub fn hex_decode(hex_str: &str) -> Result<Vec<u8>, EncodingError> {
    hex::decode(hex_str.trim()).map_err(|e| EncodingError::InvalidHex(e.to_string()))
}

// ---------------------------------------------------------------------------
// Base58Check
// ---------------------------------------------------------------------------

pub fn base58check_encode(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

pub fn base58check_decode(s: &str) -> Result<Vec<u8>, EncodingError> {
    bs58::decode(s.trim())
        .with_check(None)
        .into_vec()
        .map_err(|e| EncodingError::InvalidBase58(e.to_string()))
}

// ---------------------------------------------------------------------------
// CashAddr
// ---------------------------------------------------------------------------

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CASHADDR_CHECKSUM_LEN: usize = 8;

fn cashaddr_polymod(values: impl Iterator<Item = u8>) -> u64 {
    const GENERATORS: [u64; 5] = [
        0x98f2bc8e61,
        0x79b76d99e2,
        0xf33e5fb3c4,
        0xae2eabe2a8,
        0x1e4f43e470,
    ];
    let mut c: u64 = 1;
    for d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ d as u64;
        for (i, g) in GENERATORS.iter().enumerate() {
            if (c0 >> i) & 1 == 1 {
                c ^= g;
            }
        }
    }
    c ^ 1
}

fn prefix_values(prefix: &str) -> impl Iterator<Item = u8> + '_ {
    prefix.bytes().map(|b| b & 0x1f).chain(std::iter::once(0))
}

/// Regroup bits; `pad` controls whether a trailing partial group is kept.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max = (1u32 << to) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for &value in data {
        if (value as u32) >> from != 0 {
            return None;
        }
        acc = (acc << from) | value as u32;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max) != 0 {
        return None;
    }
    Some(out)
}

/// Encode `version || payload` as a CashAddr string with prefix.
pub fn cashaddr_encode(prefix: &str, version: u8, payload: &[u8]) -> String {
    let mut raw = Vec::with_capacity(payload.len() + 1);
    raw.push(version);
    raw.extend_from_slice(payload);
    // 8-bit groups always regroup into 5-bit groups with padding
    let data = convert_bits(&raw, 8, 5, true).unwrap_or_default();

    let checksum_input = prefix_values(prefix)
        .chain(data.iter().copied())
        .chain(std::iter::repeat(0).take(CASHADDR_CHECKSUM_LEN));
    let checksum = cashaddr_polymod(checksum_input);

    let mut out = String::with_capacity(prefix.len() + 1 + data.len() + CASHADDR_CHECKSUM_LEN);
    out.push_str(prefix);
    out.push(':');
    for d in &data {
        out.push(CHARSET[*d as usize] as char);
    }
    for i in 0..CASHADDR_CHECKSUM_LEN {
        let d = (checksum >> (5 * (7 - i))) & 0x1f;
        out.push(CHARSET[d as usize] as char);
    }
    out
}

/// Decode a CashAddr string. The prefix may be omitted, in which case
/// `default_prefix` is used for checksum verification.
///
/// Returns `(prefix, version byte, payload)`.
pub fn cashaddr_decode(
    address: &str,
    default_prefix: &str,
) -> Result<(String, u8, Vec<u8>), EncodingError> {
    let address = address.trim();
    let has_lower = address.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = address.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(EncodingError::InvalidCashAddr("mixed case".into()));
    }
    let address = address.to_ascii_lowercase();

    let (prefix, body) = match address.split_once(':') {
        Some((prefix, body)) => (prefix.to_string(), body),
        None => (default_prefix.to_string(), address.as_str()),
    };
    if body.len() <= CASHADDR_CHECKSUM_LEN {
        return Err(EncodingError::InvalidCashAddr("too short".into()));
    }

    let values = body
        .bytes()
        .map(|b| {
            CHARSET
                .iter()
                .position(|c| *c == b)
                .map(|p| p as u8)
                .ok_or_else(|| {
                    EncodingError::InvalidCashAddr(format!("invalid character '{}'", b as char))
                })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    if cashaddr_polymod(prefix_values(&prefix).chain(values.iter().copied())) != 0 {
        return Err(EncodingError::InvalidCashAddr("checksum mismatch".into()));
    }

    let data = &values[..values.len() - CASHADDR_CHECKSUM_LEN];
    let raw = convert_bits(data, 5, 8, false)
        .ok_or_else(|| EncodingError::InvalidCashAddr("invalid padding".into()))?;
    let (version, payload) = raw
        .split_first()
        .ok_or_else(|| EncodingError::InvalidCashAddr("empty payload".into()))?;
    Ok((prefix, *version, payload.to_vec()))
}

// ---------------------------------------------------------------------------
// bech32 (segwit v0)
// ---------------------------------------------------------------------------

/// Encode a version-0 witness program.
pub fn segwit_encode(hrp: &str, program: &[u8]) -> Result<String, EncodingError> {
    let mut data = vec![bech32::u5::try_from_u8(0)
        .map_err(|e| EncodingError::InvalidBech32(e.to_string()))?];
    data.extend(program.to_base32());
    bech32::encode(hrp, data, Variant::Bech32).map_err(|e| EncodingError::InvalidBech32(e.to_string()))
}

/// Decode a version-0 witness address, checking the human-readable part.
pub fn segwit_decode(hrp: &str, address: &str) -> Result<Vec<u8>, EncodingError> {
    let (found_hrp, data, variant) =
        bech32::decode(address.trim()).map_err(|e| EncodingError::InvalidBech32(e.to_string()))?;
    if found_hrp != hrp {
        return Err(EncodingError::InvalidBech32(format!(
            "expected hrp '{}', got '{}'",
            hrp, found_hrp
        )));
    }
    if variant != Variant::Bech32 {
        return Err(EncodingError::InvalidBech32("only witness version 0 is supported".into()));
    }
    let (version, program) = data
        .split_first()
        .ok_or_else(|| EncodingError::InvalidBech32("empty data".into()))?;
    if version.to_u8() != 0 {
        return Err(EncodingError::InvalidBech32(format!(
            "unsupported witness version {}",
            version.to_u8()
        )));
    }
    Vec::<u8>::from_base32(program).map_err(|e| EncodingError::InvalidBech32(e.to_string()))
}
