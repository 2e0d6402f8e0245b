//! ## Support for WOZ v1 disk images
//!
//! WOZ v1 is only read, it is immediately upgraded to WOZ v2 so the drive never sees it.
//! In v1 every track occupies a fixed 6656 byte record inside TRKS, with the bit count
//! stored after the bits.  The upgrade gives every track 13 blocks, which holds a v1 record.

use std::io::Cursor;
use binrw::BinRead;
use log::{debug,info,warn,error};
use crate::img;
use crate::img::woz;
use crate::img::woz::{INFO_ID,TMAP_ID,TRKS_ID};
use crate::img::woz2;
use crate::DYNERR;

const TRACK_BYTE_CAPACITY: usize = 6646;
const TRACK_RECORD_LEN: usize = 6656;

#[derive(BinRead)]
#[br(little)]
pub struct Info {
    pub vers: u8,
    pub disk_type: u8,
    pub write_protected: u8,
    pub synchronized: u8,
    pub cleaned: u8,
    pub creator: [u8;32]
}

#[derive(BinRead)]
#[br(little)]
pub struct Trk {
    #[br(count = TRACK_BYTE_CAPACITY)]
    bits: Vec<u8>,
    bytes_used: u16,
    bit_count: u16,
    _splice_point: u16,
    _splice_nib: u8,
    _splice_bit_count: u8,
    _pad: [u8;2]
}

pub struct Woz1 {
    info: Info,
    tmap: [u8;woz2::TRACK_SLOTS],
    tracks: Vec<Trk>,
    extra: Vec<Vec<u8>>
}

impl Woz1 {
    pub fn from_bytes(buf: &[u8]) -> Result<Self,DYNERR> {
        if img::detect(buf)!=img::Signature::LegacyV1 {
            return Err(Box::new(img::Error::UnknownImageType));
        }
        info!("identified WOZ v1 header");
        img::verify(buf);
        let mut maybe_info: Option<Info> = None;
        let mut maybe_tmap: Option<[u8;woz2::TRACK_SLOTS]> = None;
        let mut tracks: Vec<Trk> = Vec::new();
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
                    if chunk.data.len() < woz2::TRACK_SLOTS {
                        error!("TMAP chunk is too small");
                        return Err(Box::new(img::Error::InternalStructureAccess));
                    }
                    let mut map = [woz2::UNFORMATTED;woz2::TRACK_SLOTS];
                    map.copy_from_slice(&chunk.data[0..woz2::TRACK_SLOTS]);
                    maybe_tmap = Some(map);
                },
                TRKS_ID => {
                    let count = chunk.data.len() / TRACK_RECORD_LEN;
                    if count > woz2::TRACK_SLOTS {
                        return Err(Box::new(img::Error::TrackCountMismatch));
                    }
                    debug!("TRKS has {} records",count);
                    let mut cursor = Cursor::new(chunk.data);
                    for _i in 0..count {
                        tracks.push(Trk::read(&mut cursor)?);
                    }
                },
                0 => debug!("skipping null chunk"),
                id => extra.push(woz::wrap_chunk(id,chunk.data))
            }
            ptr = next;
        }
        match (maybe_info,maybe_tmap) {
            (Some(info),Some(tmap)) => Ok(Self { info, tmap, tracks, extra }),
            _ => {
                error!("WOZ is missing a required chunk");
                Err(Box::new(img::Error::InternalStructureAccess))
            }
        }
    }
    /// Convert to WOZ v2.  Shared INFO fields and the TMAP are copied,
    /// each track's bits are copied verbatim into its own 13 block allotment.
    pub fn upgrade(self) -> Result<woz2::Woz2,DYNERR> {
        let mut info = woz2::Info::create();
        info.disk_type = self.info.disk_type;
        info.write_protected = self.info.write_protected;
        info.synchronized = self.info.synchronized;
        info.cleaned = self.info.cleaned;
        info.creator = self.info.creator;
        info.boot_sector_format = woz2::BootSectorFormat::Unknown as u8;
        let mut tracks = Vec::new();
        for (i,trk) in self.tracks.into_iter().enumerate() {
            let mut bit_count = trk.bit_count as u32;
            if bit_count as usize > TRACK_BYTE_CAPACITY*8 {
                warn!("track {} bit count {} is too large, truncating",i,bit_count);
                bit_count = (TRACK_BYTE_CAPACITY*8) as u32;
            }
            if trk.bytes_used as usize > TRACK_BYTE_CAPACITY {
                warn!("track {} claims {} bytes",i,trk.bytes_used);
            }
            let mut bits = trk.bits;
            bits.resize(woz2::TRACK_BLOCKS_525 as usize * woz2::BLOCK_SIZE,0);
            tracks.push((bits,bit_count));
        }
        info!("upgrading WOZ v1 with {} tracks",tracks.len());
        woz2::Woz2::assemble(info,self.tmap,tracks,self.extra)
    }
}
