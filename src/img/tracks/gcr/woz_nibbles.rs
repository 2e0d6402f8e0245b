//! Module for handling Steve Wozniak's nibbles
//!
//! Only the 16 sector scheme is here: 4&4 for address fields, and 6&2 for data fields.
//! Each byte of data is scrambled across multiple non-contiguous nibbles, so that every
//! disk byte has its high bit set and no more than two consecutive zero bits.
//!
//! The sector codec is a rust port of C++ code that appears in CiderPress 1.

use crate::DYNERR;
use crate::img::NibbleError;

const INVALID_NIB_BYTE: u8 = 0xff;
const CHUNK62: usize = 0x56;
/// nibbles in a 6&2 data field, including the checksum
pub const SECTOR_NIBS: usize = 343;

const FWD_62: [u8;64] = [
    0x96, 0x97, 0x9a, 0x9b, 0x9d, 0x9e, 0x9f, 0xa6,
    0xa7, 0xab, 0xac, 0xad, 0xae, 0xaf, 0xb2, 0xb3,
    0xb4, 0xb5, 0xb6, 0xb7, 0xb9, 0xba, 0xbb, 0xbc,
    0xbd, 0xbe, 0xbf, 0xcb, 0xcd, 0xce, 0xcf, 0xd3,
    0xd6, 0xd7, 0xd9, 0xda, 0xdb, 0xdc, 0xdd, 0xde,
    0xdf, 0xe5, 0xe6, 0xe7, 0xe9, 0xea, 0xeb, 0xec,
    0xed, 0xee, 0xef, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6,
    0xf7, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0xfe, 0xff
];

const REV_62: [u8;256] = [
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0x00,0x01,0xFF,0xFF,0x02,0x03,0xFF,0x04,0x05,0x06,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0x07,0x08,0xFF,0xFF,0xFF,0x09,0x0A,0x0B,0x0C,0x0D,
    0xFF,0xFF,0x0E,0x0F,0x10,0x11,0x12,0x13,0xFF,0x14,0x15,0x16,0x17,0x18,0x19,0x1A,
    0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0xFF,0x1B,0xFF,0x1C,0x1D,0x1E,
    0xFF,0xFF,0xFF,0x1F,0xFF,0xFF,0x20,0x21,0xFF,0x22,0x23,0x24,0x25,0x26,0x27,0x28,
    0xFF,0xFF,0xFF,0xFF,0xFF,0x29,0x2A,0x2B,0xFF,0x2C,0x2D,0x2E,0x2F,0x30,0x31,0x32,
    0xFF,0xFF,0x33,0x34,0x35,0x36,0x37,0x38,0xFF,0x39,0x3A,0x3B,0x3C,0x3D,0x3E,0x3F
];

/// encode a normal byte as two 4&4 nibbles
pub fn encode_44(val: u8) -> [u8;2] {
    return [(val >> 1) | 0xaa, val | 0xaa];
}

/// decode two 4&4 nibbles as a normal byte, invalid nibble will yield error
pub fn decode_44(nibs: [u8;2]) -> Result<u8,DYNERR> {
    if nibs[0] & 0xaa != 0xaa || nibs[1] & 0xaa != 0xaa {
        Err(Box::new(NibbleError::InvalidByte))
    } else {
        Ok(((nibs[0] << 1) | 0x01) & nibs[1])
    }
}

/// encode a 6-bit value as a 6&2 nibble
pub fn encode_62(val: u8) -> u8 {
    return FWD_62[(val & 0x3f) as usize];
}

/// decode a 6&2 nibble as a 6-bit value, invalid nibble will yield error
pub fn decode_62(nib: u8) -> Result<u8,DYNERR> {
    let ans = REV_62[nib as usize];
    if ans == INVALID_NIB_BYTE {
        Err(Box::new(NibbleError::InvalidByte))
    } else {
        Ok(ans)
    }
}

/// encode 256 bytes as 343 nibbles
pub fn encode_sector_62(dat: &[u8]) -> Result<Vec<u8>,DYNERR> {
    // port of CiderPress `EncodeNibble62`
    if dat.len()!=256 {
        return Err(Box::new(NibbleError::BadTrack));
    }
    let mut bak_buf: Vec<u8> = Vec::with_capacity(SECTOR_NIBS);
    let mut top: [u8;256] = [0;256];
    let mut twos: [u8;CHUNK62] = [0;CHUNK62];
    let mut two_shift = 0;
    let mut two_pos_n = CHUNK62-1;
    for i in 0..256 {
        let val = dat[i];
        top[i] = val >> 2;
        twos[two_pos_n] |= ((val & 1) << 1 | (val & 2) >> 1) << two_shift;
        if two_pos_n==0 {
            two_pos_n = CHUNK62;
            two_shift += 2;
        }
        two_pos_n -= 1;
    }
    let mut chksum = 0;
    for i in (0..CHUNK62).rev() {
        bak_buf.push(encode_62(twos[i] ^ chksum));
        chksum = twos[i];
    }
    for i in 0..256 {
        bak_buf.push(encode_62(top[i] ^ chksum));
        chksum = top[i];
    }
    bak_buf.push(encode_62(chksum));
    Ok(bak_buf)
}

/// decode 343 nibbles as 256 bytes
pub fn decode_sector_62(bak_buf: &[u8],verify_chk: bool) -> Result<Vec<u8>,DYNERR> {
    // port of CiderPress `DecodeNibble62`
    if bak_buf.len()!=SECTOR_NIBS {
        return Err(Box::new(NibbleError::BadTrack));
    }
    let mut ans: Vec<u8> = Vec::new();
    let mut twos: [u8;CHUNK62*3] = [0;CHUNK62*3];
    let mut chksum = 0;
    let mut idx = 0;
    for i in 0..CHUNK62 {
        let val = decode_62(bak_buf[idx])?;
        chksum ^= val;
        twos[i] = ((chksum & 0x01) << 1) | ((chksum & 0x02) >> 1);
        twos[i + CHUNK62] = ((chksum & 0x04) >> 1) | ((chksum & 0x08) >> 3);
        twos[i + CHUNK62*2] = ((chksum & 0x10) >> 3) | ((chksum & 0x20) >> 5);
        idx += 1;
    }
    for i in 0..256 {
        let val = decode_62(bak_buf[idx])?;
        chksum ^= val;
        ans.push((chksum << 2) | twos[i]);
        idx += 1;
    }
    // we have the sector, now verify checksum
    let val = decode_62(bak_buf[idx])?;
    chksum ^= val;
    if verify_chk && chksum!=0 {
        return Err(Box::new(NibbleError::BadChecksum));
    }
    return Ok(ans);
}

#[test]
fn sector_62() {
    let dat: Vec<u8> = (0..256).map(|i| (i*7 + 3) as u8).collect();
    let nibs = encode_sector_62(&dat).expect("encode");
    assert_eq!(nibs.len(),SECTOR_NIBS);
    assert!(nibs.iter().all(|n| *n >= 0x96));
    assert_eq!(decode_sector_62(&nibs,true).expect("decode"),dat);
}

#[test]
fn four_and_four() {
    assert_eq!(encode_44(0xfe),[0xff,0xfe]);
    assert_eq!(decode_44(encode_44(0x5a)).expect("decode"),0x5a);
    assert!(decode_44([0x00,0xff]).is_err());
}
