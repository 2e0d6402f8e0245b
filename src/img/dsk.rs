//! ## Support for flat sector images
//!
//! A 140K image is 35 tracks of 16 sectors of 256 bytes, optionally preceded by a 128 byte
//! header.  Nothing in the data says which order the sectors are in, so the order is
//! taken from the file extension, or guessed from the DOS VTOC or ProDOS volume directory.
//! Once the order is known the image is converted to WOZ v2 with `woz_ify`.

use log::{debug,info};
use crate::img;
use crate::img::DiskType;
use crate::img::woz2;
use crate::img::tracks::gcr;
use crate::bios::skew;
use crate::DYNERR;

pub const TRACKS: usize = 35;
pub const TRACK_BYTES: usize = gcr::SECTORS*256;
pub const IMAGE_BYTES: usize = TRACKS*TRACK_BYTES;
pub const HEADER_BYTES: usize = 128;
/// offset of the DOS VTOC, track 17 sector 0
const VTOC_OFFSET: usize = 17*TRACK_BYTES;

pub fn file_extensions() -> Vec<String> {
    vec!["dsk".to_string(),"do".to_string(),"po".to_string()]
}

/// Strip the optional header, returning the sector data if the size is right
pub fn sector_data(buf: &[u8]) -> Option<&[u8]> {
    match buf.len() {
        IMAGE_BYTES => Some(buf),
        l if l==IMAGE_BYTES+HEADER_BYTES => Some(&buf[HEADER_BYTES..]),
        _ => None
    }
}

fn is_dos_vtoc(dat: &[u8]) -> bool {
    let vtoc = &dat[VTOC_OFFSET..VTOC_OFFSET+256];
    vtoc[1]==17 && vtoc[0x27]==122 && vtoc[0x34]==TRACKS as u8 && vtoc[0x35]==16
}

/// Look for a ProDOS volume directory key block at `offset`
fn is_prodos_volume(dat: &[u8],offset: usize) -> bool {
    let key = &dat[offset..offset+256];
    key[0]==0 && key[1]==0 && key[4] >> 4 == 0xf && key[0x23]==0x27 && key[0x24]==0x0d
}

/// Decide the sector order from the content, or None if there is no clue.
pub fn fingerprint(dat: &[u8]) -> Option<DiskType> {
    if dat.len()!=IMAGE_BYTES {
        return None;
    }
    if is_dos_vtoc(dat) {
        debug!("found DOS VTOC");
        return Some(DiskType::Dos33);
    }
    // block 2 is at ProDOS sector 4, which lands at DOS sector 11 when DOS ordered
    if is_prodos_volume(dat,4*256) {
        debug!("found ProDOS volume directory in ProDOS order");
        return Some(DiskType::ProDos);
    }
    if is_prodos_volume(dat,11*256) {
        debug!("found ProDOS volume directory in DOS order");
        return Some(DiskType::Dos33);
    }
    None
}

/// Determine the sector order of a flat image.  The extension is lower case without the dot.
/// Returns `DiskType::Unrecognized` if the size is wrong.
pub fn classify(buf: &[u8],maybe_ext: Option<&str>) -> DiskType {
    let dat = match sector_data(buf) {
        Some(d) => d,
        None => return DiskType::Unrecognized
    };
    match maybe_ext {
        Some("po") => DiskType::ProDos,
        Some("do") => DiskType::Dos33,
        Some("dsk") => fingerprint(dat).unwrap_or(DiskType::Dos33),
        _ => fingerprint(dat).unwrap_or(DiskType::Linear)
    }
}

/// Convert a flat sector image to WOZ v2.  The sector order decides which
/// image sector is written into each physical sector.
pub fn woz_ify(buf: &[u8],typ: DiskType) -> Result<woz2::Woz2,DYNERR> {
    let dat = match sector_data(buf) {
        Some(d) => d,
        None => return Err(Box::new(img::Error::ImageSizeMismatch))
    };
    let table = skew::physical_to_image(typ);
    info!("nibblizing {} image",typ);
    let mut tracks = Vec::new();
    for track in 0..TRACKS {
        let cells = gcr::nibblize_track(gcr::DEFAULT_VOLUME,track as u8,&dat[track*TRACK_BYTES..(track+1)*TRACK_BYTES],table)?;
        tracks.push(cells.to_woz_track()?);
    }
    let mut info = woz2::Info::create();
    info.boot_sector_format = woz2::BootSectorFormat::Sector16 as u8;
    woz2::Woz2::assemble(info,woz2::standard_tmap(TRACKS),tracks,Vec::new())
}

#[test]
fn extension_decides() {
    let buf = vec![0;IMAGE_BYTES];
    assert_eq!(classify(&buf,Some("po")),DiskType::ProDos);
    assert_eq!(classify(&buf,Some("dsk")),DiskType::Dos33);
    assert_eq!(classify(&buf,Some("img")),DiskType::Linear);
    assert_eq!(classify(&buf[1..],Some("dsk")),DiskType::Unrecognized);
}

#[test]
fn prodos_fingerprint() {
    let mut buf = vec![0;IMAGE_BYTES+HEADER_BYTES];
    let key = HEADER_BYTES + 1024;
    buf[key+4] = 0xf8;
    buf[key+0x23] = 0x27;
    buf[key+0x24] = 0x0d;
    assert_eq!(classify(&buf,Some("dsk")),DiskType::ProDos);
}
