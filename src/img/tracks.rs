//! # Track bits
//!
//! `TrackBits` holds one revolution of a track as a stream of bit cells, each bit indicating
//! whether there is a flux transition.  It is used in two directions:
//! * as a writer, bytes are appended as explicit bit runs and the running offset is the bit count
//! * as a reader, nibbles are recovered with a simple latch model, wrapping around the track
//!
//! The emulated controller does not use this, it works directly on the container's buffer.

use bit_vec::BitVec;
use crate::img::woz2;
use crate::img;
use crate::DYNERR;

pub mod gcr;

pub struct TrackBits {
    /// each bit represents a cell, bit value indicates whether there is a transition
    stream: BitVec,
    /// current location in the stream
    ptr: usize
}

impl TrackBits {
    pub fn new() -> Self {
        Self {
            stream: BitVec::new(),
            ptr: 0
        }
    }
    /// Create cells from a WOZ track buffer, any padding beyond `bit_count` is dropped
    pub fn from_buffer(buf: &[u8],bit_count: usize) -> Self {
        let mut stream = BitVec::from_bytes(buf);
        stream.truncate(bit_count);
        Self {
            stream,
            ptr: 0
        }
    }
    pub fn len(&self) -> usize {
        self.stream.len()
    }
    pub fn ptr(&self) -> usize {
        self.ptr
    }
    pub fn set_ptr(&mut self,ptr: usize) {
        self.ptr = match self.stream.len() {
            0 => 0,
            l => ptr % l
        };
    }
    pub fn get(&self,i: usize) -> bool {
        self.stream.get(i).unwrap_or(false)
    }
    /// Append the `count` most significant bits of `val`, advancing the running offset
    pub fn write_bits(&mut self,val: u8,count: usize) {
        for i in 0..count.min(8) {
            self.stream.push(val & (0x80 >> i) > 0);
        }
        self.ptr = self.stream.len();
    }
    pub fn write_nibbles(&mut self,nibs: &[u8]) {
        for nib in nibs {
            self.write_bits(*nib,8);
        }
    }
    /// Append `count` 10-bit self-sync bytes, i.e., 0xff followed by two zero cells
    pub fn write_sync(&mut self,count: usize) {
        for _i in 0..count {
            self.write_bits(0xff,8);
            self.write_bits(0x00,2);
        }
    }
    /// Convert to a WOZ track buffer padded with zeros to `padded_len` bytes.
    /// Returns (buf,bit_count).
    pub fn to_woz_buf(&self,padded_len: usize) -> Result<(Vec<u8>,u32),DYNERR> {
        let mut buf = self.stream.to_bytes();
        if buf.len() > padded_len {
            log::error!("track needs {} bytes, only {} available",buf.len(),padded_len);
            return Err(Box::new(img::Error::TrackAccess));
        }
        buf.resize(padded_len,0);
        Ok((buf,self.stream.len() as u32))
    }
    /// Same as `to_woz_buf` with the standard 5.25 inch allotment
    pub fn to_woz_track(&self) -> Result<(Vec<u8>,u32),DYNERR> {
        self.to_woz_buf(woz2::TRACK_BLOCKS_525 as usize * woz2::BLOCK_SIZE)
    }
    fn next_bit(&mut self) -> bool {
        let ans = self.get(self.ptr);
        self.ptr += 1;
        if self.ptr >= self.stream.len() {
            self.ptr = 0;
        }
        ans
    }
    /// Read a nibble the way the controller latches it: leading zeros are skipped,
    /// then the first 1 is shifted until it reaches the top bit.
    /// Returns 0 if a whole revolution passes without a transition.
    pub fn read_nibble(&mut self) -> u8 {
        for _try in 0..self.stream.len() {
            if self.next_bit() {
                let mut val: u8 = 1;
                for _bit in 0..7 {
                    val = (val << 1) | self.next_bit() as u8;
                }
                return val;
            }
        }
        0
    }
    /// Find the start of `pattern`, treating the track as circular
    pub fn find_bits(&self,pattern: &BitVec) -> Option<usize> {
        let l = self.stream.len();
        if pattern.len()==0 || pattern.len() > l {
            return None;
        }
        for start in 0..l {
            if (0..pattern.len()).all(|j| self.stream[(start+j)%l]==pattern[j]) {
                return Some(start);
            }
        }
        None
    }
    /// Bits from `start` to `start+count`, wrapping around the track
    pub fn bits(&self,start: usize,count: usize) -> BitVec {
        let l = self.stream.len();
        let mut ans = BitVec::new();
        if l==0 {
            return ans;
        }
        for i in 0..count {
            ans.push(self.stream[(start+i)%l]);
        }
        ans
    }
}

#[test]
fn latch_skips_sync_zeros() {
    let mut cells = TrackBits::new();
    cells.write_sync(2);
    cells.write_nibbles(&[0xd5,0xaa]);
    assert_eq!(cells.len(),36);
    cells.set_ptr(0);
    assert_eq!(cells.read_nibble(),0xff);
    assert_eq!(cells.read_nibble(),0xff);
    assert_eq!(cells.read_nibble(),0xd5);
    assert_eq!(cells.read_nibble(),0xaa);
    // wraps around
    assert_eq!(cells.read_nibble(),0xff);
}
