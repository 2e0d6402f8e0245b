//! ## module for GCR tracks
//!
//! Lays out and decodes the standard 16 sector track.  Each sector is
//! * address field: prolog, 4&4 volume, track, sector, checksum, epilog
//! * a short self-sync gap
//! * data field: prolog, 343 6&2 nibbles, epilog
//! * a trailing self-sync gap
//!
//! The track starts with its own self-sync run, so that the latch is in step before the first sector.

use log::{debug,trace};
use super::TrackBits;
use crate::img::NibbleError;
use crate::DYNERR;

pub mod woz_nibbles;

pub const ADDR_PROLOG: [u8;3] = [0xd5,0xaa,0x96];
pub const DATA_PROLOG: [u8;3] = [0xd5,0xaa,0xad];
pub const EPILOG: [u8;3] = [0xde,0xaa,0xeb];
pub const DEFAULT_VOLUME: u8 = 254;
pub const SECTORS: usize = 16;
const LEAD_SYNC: usize = 16;
const GAP2_SYNC: usize = 7;
const GAP3_SYNC: usize = 16;

/// Nibblize one track.  `dat` is the track's 4096 bytes in image order,
/// `skew[p]` is the image sector that is written into physical sector `p`.
pub fn nibblize_track(vol: u8,track: u8,dat: &[u8],skew: &[usize;SECTORS]) -> Result<TrackBits,DYNERR> {
    if dat.len()!=SECTORS*256 {
        return Err(Box::new(NibbleError::BadTrack));
    }
    let mut cells = TrackBits::new();
    cells.write_sync(LEAD_SYNC);
    for psec in 0..SECTORS {
        let lsec = skew[psec];
        cells.write_nibbles(&ADDR_PROLOG);
        cells.write_nibbles(&woz_nibbles::encode_44(vol));
        cells.write_nibbles(&woz_nibbles::encode_44(track));
        cells.write_nibbles(&woz_nibbles::encode_44(psec as u8));
        cells.write_nibbles(&woz_nibbles::encode_44(vol ^ track ^ psec as u8));
        cells.write_nibbles(&EPILOG);
        cells.write_sync(GAP2_SYNC);
        cells.write_nibbles(&DATA_PROLOG);
        cells.write_nibbles(&woz_nibbles::encode_sector_62(&dat[lsec*256..(lsec+1)*256])?);
        cells.write_nibbles(&EPILOG);
        cells.write_sync(GAP3_SYNC);
    }
    trace!("track {} nibblized into {} bits",track,cells.len());
    Ok(cells)
}

/// Advance until the last three nibbles match `prolog`, giving up after `max_nibs`
fn find_prolog(cells: &mut TrackBits,prolog: &[u8;3],max_nibs: usize) -> Result<(),DYNERR> {
    let mut window = [0u8;3];
    for _i in 0..max_nibs {
        window = [window[1],window[2],cells.read_nibble()];
        if window==*prolog {
            return Ok(());
        }
    }
    Err(Box::new(NibbleError::BitPatternNotFound))
}

/// Read an address field that follows a prolog, returns (vol,track,sector)
fn read_address(cells: &mut TrackBits) -> Result<(u8,u8,u8),DYNERR> {
    let mut vals = [0u8;4];
    for i in 0..4 {
        let nibs = [cells.read_nibble(),cells.read_nibble()];
        vals[i] = woz_nibbles::decode_44(nibs)?;
    }
    if vals[0] ^ vals[1] ^ vals[2] != vals[3] {
        debug!("address field checksum mismatch");
        return Err(Box::new(NibbleError::BadChecksum));
    }
    Ok((vals[0],vals[1],vals[2]))
}

/// Find physical sector `sector` of `track` and decode its 256 bytes.
/// The search starts wherever the track pointer is and gives up after two revolutions.
pub fn decode_sector(cells: &mut TrackBits,track: u8,sector: u8) -> Result<Vec<u8>,DYNERR> {
    let max_nibs = cells.len() / 4;
    for _field in 0..SECTORS*2 {
        if find_prolog(cells,&ADDR_PROLOG,max_nibs).is_err() {
            break;
        }
        match read_address(cells) {
            Ok((_vol,t,s)) if t==track && s==sector => {
                find_prolog(cells,&DATA_PROLOG,64)?;
                let mut nibs = Vec::with_capacity(woz_nibbles::SECTOR_NIBS);
                for _i in 0..woz_nibbles::SECTOR_NIBS {
                    nibs.push(cells.read_nibble());
                }
                return woz_nibbles::decode_sector_62(&nibs,true);
            },
            Ok((_vol,t,_s)) if t!=track => debug!("expected track {}, found {}",track,t),
            _ => {}
        }
    }
    Err(Box::new(NibbleError::SectorNotFound))
}
