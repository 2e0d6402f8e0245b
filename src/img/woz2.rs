//! ## Support for WOZ v2 disk images
//!
//! The container is unpacked into its INFO, TMAP, and TRKS parts, with the track bits kept
//! in one buffer that starts at block 3, exactly as it will be written back out.
//! Fixed layout structures are read and written with `binrw`, every offset taken from the
//! file is checked against the buffer length before it is used.
//!
//! Track bits are stored most significant bit first, so bit `n` of a track is bit `7 - n%8`
//! of byte `n/8` in that track's block range.

use std::io::Cursor;
use binrw::{BinRead,BinWrite};
use num_derive::FromPrimitive;
use log::{debug,info,warn,error};
use crate::img;
use crate::img::woz;
use crate::img::woz::{INFO_ID,TMAP_ID,TRKS_ID};
use crate::img::tracks::TrackBits;
use crate::DYNERR;

/// quarter-track slots in the TMAP and records in TRKS
pub const TRACK_SLOTS: usize = 160;
/// byte offset to the first track's bits in a canonical file
pub const TRACK_BITS_OFFSET: usize = 1536;
pub const BLOCK_SIZE: usize = 512;
/// blocks allotted to each 5.25 inch track
pub const TRACK_BLOCKS_525: u16 = 13;
/// bits in one revolution of an unformatted 5.25 inch track
pub const DEFAULT_BIT_COUNT: u32 = 51200;
pub const STD_TRACKS: usize = 35;
pub const UNFORMATTED: u8 = 0xff;

pub fn file_extensions() -> Vec<String> {
    vec!["woz".to_string()]
}

/// values of the INFO boot sector format field
#[derive(FromPrimitive,PartialEq,Eq,Clone,Copy,Debug)]
pub enum BootSectorFormat {
    Unknown = 0,
    Sector16 = 1,
    Sector13 = 2,
    Both = 3
}

#[derive(BinRead,BinWrite,Clone,Debug)]
#[brw(little)]
pub struct Info {
    pub vers: u8,
    pub disk_type: u8,
    pub write_protected: u8,
    pub synchronized: u8,
    pub cleaned: u8,
    pub creator: [u8;32],
    pub disk_sides: u8,
    pub boot_sector_format: u8,
    pub optimal_bit_timing: u8,
    pub compatible_hardware: u16,
    pub required_ram: u16,
    pub largest_track: u16,
    pub flux_block: u16,
    pub largest_flux_track: u16,
    pad: [u8;10]
}

#[derive(BinRead,BinWrite,Clone,Copy,Debug,Default)]
#[brw(little)]
pub struct Trk {
    pub starting_block: u16,
    pub block_count: u16,
    pub bit_count: u32
}

pub struct Woz2 {
    info: Info,
    tmap: [u8;TRACK_SLOTS],
    trks: Vec<Trk>,
    /// track data starting at `TRACK_BITS_OFFSET`
    bits: Vec<u8>,
    /// chunks carried along verbatim (META, WRIT, unknown), including id and size
    extra: Vec<Vec<u8>>
}

impl Info {
    /// INFO for a 5.25 inch disk made by this crate
    pub fn create() -> Self {
        let creator_str = "a2disk v".to_string() + env!("CARGO_PKG_VERSION");
        let mut creator: [u8;32] = [0x20;32];
        for (i,c) in creator_str.bytes().take(32).enumerate() {
            creator[i] = c;
        }
        Self {
            vers: 2,
            disk_type: 1,
            write_protected: 0,
            synchronized: 0,
            cleaned: 0,
            creator,
            disk_sides: 1,
            boot_sector_format: 0,
            optimal_bit_timing: 32,
            compatible_hardware: 0,
            required_ram: 0,
            largest_track: TRACK_BLOCKS_525,
            flux_block: 0,
            largest_flux_track: 0,
            pad: [0;10]
        }
    }
    pub fn creator(&self) -> String {
        String::from_utf8_lossy(&self.creator).trim_end().to_string()
    }
}

/// Standard 5.25 inch map: each track also answers at the neighboring quarter tracks
pub fn standard_tmap(tracks: usize) -> [u8;TRACK_SLOTS] {
    let mut map = [UNFORMATTED;TRACK_SLOTS];
    for t in 0..tracks.min(40) {
        let m = t*4;
        if m > 0 {
            map[m-1] = t as u8;
        }
        map[m] = t as u8;
        map[m+1] = t as u8;
    }
    map
}

impl Woz2 {
    /// Build a container from raw track buffers.  Each buffer is padded out to whole blocks,
    /// tracks are laid out contiguously starting at block 3.  TMAP entries that point at
    /// tracks that do not exist are marked unformatted.
    pub fn assemble(mut info: Info,mut tmap: [u8;TRACK_SLOTS],tracks: Vec<(Vec<u8>,u32)>,extra: Vec<Vec<u8>>) -> Result<Self,DYNERR> {
        if tracks.len() > TRACK_SLOTS {
            error!("too many tracks: {}",tracks.len());
            return Err(Box::new(img::Error::TrackCountMismatch));
        }
        let mut trks = vec![Trk::default();TRACK_SLOTS];
        let mut bits: Vec<u8> = Vec::new();
        let mut largest: u16 = 0;
        for (i,(mut buf,bit_count)) in tracks.into_iter().enumerate() {
            if bit_count as usize > buf.len()*8 {
                error!("track {} bit count {} exceeds its buffer",i,bit_count);
                return Err(Box::new(img::Error::ImageSizeMismatch));
            }
            let blocks = (buf.len() + BLOCK_SIZE - 1) / BLOCK_SIZE;
            buf.resize(blocks*BLOCK_SIZE,0);
            let (starting_block,block_count) = match (u16::try_from((TRACK_BITS_OFFSET + bits.len()) / BLOCK_SIZE),u16::try_from(blocks)) {
                (Ok(start),Ok(count)) if start.checked_add(count).is_some() => (start,count),
                _ => {
                    error!("track {} does not fit in the block address space",i);
                    return Err(Box::new(img::Error::ImageSizeMismatch));
                }
            };
            trks[i] = Trk {
                starting_block,
                block_count,
                bit_count
            };
            largest = largest.max(block_count);
            bits.append(&mut buf);
        }
        for slot in 0..TRACK_SLOTS {
            let idx = tmap[slot] as usize;
            if tmap[slot]!=UNFORMATTED && (idx >= TRACK_SLOTS || trks[idx].block_count==0 || trks[idx].bit_count==0) {
                warn!("quarter track {} maps to missing track {}, marking unformatted",slot,idx);
                tmap[slot] = UNFORMATTED;
            }
        }
        info.vers = 2;
        info.largest_track = largest;
        Ok(Self {
            info,
            tmap,
            trks,
            bits,
            extra
        })
    }
    /// 35 zero filled tracks with the standard bit count
    pub fn blank() -> Self {
        let mut trks = vec![Trk::default();TRACK_SLOTS];
        for t in 0..STD_TRACKS {
            trks[t] = Trk {
                starting_block: 3 + t as u16 * TRACK_BLOCKS_525,
                block_count: TRACK_BLOCKS_525,
                bit_count: DEFAULT_BIT_COUNT
            };
        }
        Self {
            info: Info::create(),
            tmap: standard_tmap(STD_TRACKS),
            trks,
            bits: vec![0;STD_TRACKS*TRACK_BLOCKS_525 as usize*BLOCK_SIZE],
            extra: Vec::new()
        }
    }
    pub fn from_bytes(buf: &[u8]) -> Result<Self,DYNERR> {
        if img::detect(buf)!=img::Signature::Native {
            return Err(Box::new(img::Error::UnknownImageType));
        }
        info!("identified WOZ v2 header");
        img::verify(buf);
        let mut maybe_info: Option<Info> = None;
        let mut maybe_tmap: Option<[u8;TRACK_SLOTS]> = None;
        let mut maybe_trks: Option<Vec<(Vec<u8>,u32)>> = None;
        let mut track_slot_map: Vec<usize> = Vec::new();
        let mut extra: Vec<Vec<u8>> = Vec::new();
        let mut ptr: usize = 12;
        while ptr>0 {
            let (next,maybe_chunk) = woz::get_next_chunk(ptr,buf);
            let chunk = match maybe_chunk {
                Some(c) => c,
                None => break
            };
            match chunk.id {
                INFO_ID => maybe_info = Some(Info::read(&mut Cursor::new(chunk.data))?),
                TMAP_ID => {
                    if chunk.data.len() < TRACK_SLOTS {
                        error!("TMAP chunk is too small");
                        return Err(Box::new(img::Error::InternalStructureAccess));
                    }
                    let mut map = [UNFORMATTED;TRACK_SLOTS];
                    map.copy_from_slice(&chunk.data[0..TRACK_SLOTS]);
                    maybe_tmap = Some(map);
                },
                TRKS_ID => {
                    let (tracks,slots) = Self::unpack_trks(chunk.data,buf)?;
                    maybe_trks = Some(tracks);
                    track_slot_map = slots;
                },
                0 => debug!("skipping null chunk"),
                id => {
                    debug!("keeping chunk {}",String::from_utf8_lossy(&u32::to_le_bytes(id)));
                    extra.push(woz::wrap_chunk(id,chunk.data));
                }
            }
            ptr = next;
        }
        match (maybe_info,maybe_tmap,maybe_trks) {
            (Some(info),Some(tmap),Some(tracks)) => {
                if info.flux_block!=0 {
                    warn!("FLUX chunk is ignored");
                }
                // empty records were squeezed out, so renumber the map
                let mut new_map = [UNFORMATTED;TRACK_SLOTS];
                for slot in 0..TRACK_SLOTS {
                    if tmap[slot]!=UNFORMATTED {
                        if let Some(pos) = track_slot_map.iter().position(|x| *x==tmap[slot] as usize) {
                            new_map[slot] = pos as u8;
                        } else {
                            warn!("quarter track {} maps to empty record {}",slot,tmap[slot]);
                        }
                    }
                }
                Self::assemble(info,new_map,tracks,extra)
            },
            _ => {
                error!("WOZ is missing a required chunk");
                Err(Box::new(img::Error::InternalStructureAccess))
            }
        }
    }
    /// Unpack the TRKS records and copy out each nonempty track.
    /// Returns the track buffers and the original record index of each.
    fn unpack_trks(dat: &[u8],buf: &[u8]) -> Result<(Vec<(Vec<u8>,u32)>,Vec<usize>),DYNERR> {
        if dat.len() < TRACK_SLOTS*8 {
            error!("TRKS chunk is too small");
            return Err(Box::new(img::Error::InternalStructureAccess));
        }
        let mut cursor = Cursor::new(dat);
        let mut tracks = Vec::new();
        let mut slots = Vec::new();
        for i in 0..TRACK_SLOTS {
            let trk = Trk::read(&mut cursor)?;
            if trk.block_count==0 || trk.bit_count==0 {
                continue;
            }
            let begin = trk.starting_block as usize * BLOCK_SIZE;
            let end = begin + trk.block_count as usize * BLOCK_SIZE;
            if end > buf.len() {
                error!("track record {} runs past end of file",i);
                return Err(Box::new(img::Error::ImageSizeMismatch));
            }
            if trk.bit_count as usize > trk.block_count as usize * BLOCK_SIZE * 8 {
                error!("track record {} has more bits than blocks",i);
                return Err(Box::new(img::Error::ImageSizeMismatch));
            }
            tracks.push((buf[begin..end].to_vec(),trk.bit_count));
            slots.push(i);
        }
        Ok((tracks,slots))
    }
    /// Serialize with a fresh checksum
    pub fn to_bytes(&self) -> Result<Vec<u8>,DYNERR> {
        let mut ans: Vec<u8> = u32::to_le_bytes(woz::WOZ2_ID).to_vec();
        ans.extend_from_slice(&woz::HEADER_TAIL);
        ans.extend_from_slice(&[0,0,0,0]);
        let mut info_buf = Cursor::new(Vec::new());
        self.info.write(&mut info_buf)?;
        ans.append(&mut woz::wrap_chunk(INFO_ID,info_buf.get_ref()));
        ans.append(&mut woz::wrap_chunk(TMAP_ID,&self.tmap));
        let mut trks_buf = Cursor::new(Vec::new());
        for trk in &self.trks {
            trk.write(&mut trks_buf)?;
        }
        let mut trks_dat = trks_buf.into_inner();
        trks_dat.extend_from_slice(&self.bits);
        ans.append(&mut woz::wrap_chunk(TRKS_ID,&trks_dat));
        for chunk in &self.extra {
            ans.extend_from_slice(chunk);
        }
        let crc = woz::crc32(0,&ans[12..]);
        ans[8..12].copy_from_slice(&u32::to_le_bytes(crc));
        Ok(ans)
    }
    pub fn info(&self) -> &Info {
        &self.info
    }
    pub fn tmap(&self) -> &[u8;TRACK_SLOTS] {
        &self.tmap
    }
    pub fn is_write_protected(&self) -> bool {
        self.info.write_protected > 0
    }
    pub fn set_write_protected(&mut self,state: bool) {
        self.info.write_protected = state as u8;
    }
    /// number of tracks that have data
    pub fn num_tracks(&self) -> usize {
        self.trks.iter().filter(|t| t.bit_count>0).count()
    }
    /// Track index seated at quarter track `qtr`, or None if unformatted
    pub fn track_index(&self,qtr: usize) -> Option<usize> {
        match self.tmap.get(qtr) {
            Some(&UNFORMATTED) | None => None,
            Some(&idx) => Some(idx as usize)
        }
    }
    pub fn track_bit_count(&self,idx: usize) -> usize {
        match self.trks.get(idx) {
            Some(trk) => trk.bit_count as usize,
            None => 0
        }
    }
    /// byte offset into `bits` and bit count of a track
    fn track_origin(&self,idx: usize) -> Option<(usize,usize)> {
        let trk = self.trks.get(idx)?;
        let begin = (trk.starting_block as usize * BLOCK_SIZE).checked_sub(TRACK_BITS_OFFSET)?;
        if trk.bit_count==0 || begin + (trk.bit_count as usize + 7)/8 > self.bits.len() {
            return None;
        }
        Some((begin,trk.bit_count as usize))
    }
    /// Bit at position `pos` of track `idx`, false if out of range
    pub fn get_bit(&self,idx: usize,pos: usize) -> bool {
        match self.track_origin(idx) {
            Some((begin,count)) if pos < count => (self.bits[begin + pos/8] >> (7 - pos%8)) & 1 > 0,
            _ => false
        }
    }
    /// Set bit at position `pos` of track `idx`, returns true if the buffer changed
    pub fn set_bit(&mut self,idx: usize,pos: usize,val: bool) -> bool {
        match self.track_origin(idx) {
            Some((begin,count)) if pos < count => {
                let mask = 1u8 << (7 - pos%8);
                let old = self.bits[begin + pos/8];
                let new = match val {
                    true => old | mask,
                    false => old & !mask
                };
                self.bits[begin + pos/8] = new;
                new != old
            },
            _ => false
        }
    }
    /// Copy of the bits of track `idx`
    pub fn track_cells(&self,idx: usize) -> Option<TrackBits> {
        let (begin,count) = self.track_origin(idx)?;
        Some(TrackBits::from_buffer(&self.bits[begin..begin + (count+7)/8],count))
    }
}

#[test]
fn blank_geometry() {
    let woz = Woz2::blank();
    assert_eq!(woz.num_tracks(),35);
    assert_eq!(woz.tmap()[0],0);
    assert_eq!(woz.tmap()[1],0);
    assert_eq!(woz.tmap()[2],UNFORMATTED);
    assert_eq!(woz.tmap()[3],1);
    assert_eq!(woz.tmap()[139],34);
    assert_eq!(woz.tmap()[140],UNFORMATTED);
    assert_eq!(woz.track_bit_count(34),51200);
}

#[test]
fn canonical_offsets() {
    let buf = Woz2::blank().to_bytes().expect("serialize");
    assert_eq!(&buf[12..16],"INFO".as_bytes());
    assert_eq!(&buf[80..84],"TMAP".as_bytes());
    assert_eq!(&buf[248..252],"TRKS".as_bytes());
    assert_eq!(u16::from_le_bytes([buf[256],buf[257]]),3);
    assert_eq!(buf.len(),TRACK_BITS_OFFSET + 35*13*512);
}

#[test]
fn block_space_exhausted() {
    let huge = vec![0;65535*BLOCK_SIZE];
    let tracks = vec![(vec![0;TRACK_BLOCKS_525 as usize*BLOCK_SIZE],DEFAULT_BIT_COUNT),(huge,DEFAULT_BIT_COUNT)];
    assert!(Woz2::assemble(Info::create(),standard_tmap(2),tracks,Vec::new()).is_err());
}
