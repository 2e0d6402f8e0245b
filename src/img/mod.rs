//! # Disk Image Module
//!
//! This module parses and produces the images that can be seated in an emulated Disk II drive.
//! The drive itself only ever works with the native WOZ v2 container (`woz2::Woz2`).
//! Everything else that can be loaded is converted into that container on the way in:
//! * WOZ v1 containers are upgraded (`woz1`)
//! * flat 140K sector images (DSK, DO, PO) are nibblized track by track (`dsk`)
//!
//! ## Detection
//!
//! `detect` looks only at the 8 byte signature.  `verify` checks the CRC32 of a WOZ container,
//! but a mismatch is only a warning, since images with stale checksums are common.
//! The source format of whatever was loaded is remembered as a `DiskType`, so that saving
//! can decide whether the original file may be overwritten.
//!
//! ## Tracks
//!
//! Bit level track construction and decoding is in `tracks`, the nibble codecs are in
//! `tracks::gcr::woz_nibbles`, and the sector interleave tables are in `bios::skew`.

pub mod woz;
pub mod woz1;
pub mod woz2;
pub mod dsk;
pub mod tracks;

use log::{debug,warn};

/// Enumerates disk image errors.  The `Display` trait will print equivalent long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("unknown image type")]
    UnknownImageType,
    #[error("track count did not match request")]
    TrackCountMismatch,
	#[error("image size did not match the request")]
	ImageSizeMismatch,
    #[error("image type not compatible with request")]
    ImageTypeMismatch,
    #[error("error while accessing internal structures")]
    InternalStructureAccess,
    #[error("unable to access track")]
    TrackAccess,
    #[error("no image in drive")]
    NoImage,
    #[error("image has no file path")]
    NoPath
}

/// Errors pertaining to nibble encoding
#[derive(thiserror::Error,Debug)]
pub enum NibbleError {
    #[error("could not interpret track data")]
    BadTrack,
    #[error("invalid byte while decoding")]
    InvalidByte,
    #[error("bad checksum found in a sector")]
    BadChecksum,
    #[error("could not find bit pattern")]
    BitPatternNotFound,
    #[error("sector not found")]
    SectorNotFound
}

/// Result of matching the leading signature of a byte stream
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum Signature {
    None,
    LegacyV1,
    Native
}

/// Where the image seated in a drive came from.
/// The sector image variants determine the interleave used when nibblizing.
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum DiskType {
    Empty,
    Woz,
    Dos33,
    ProDos,
    Linear,
    Unrecognized
}

impl DiskType {
    /// true if saving back to the source path would destroy information
    pub fn is_sector_image(&self) -> bool {
        matches!(self,Self::Dos33 | Self::ProDos | Self::Linear)
    }
}

impl std::fmt::Display for DiskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f,"empty"),
            Self::Woz => write!(f,"WOZ"),
            Self::Dos33 => write!(f,"DOS 3.3 ordered sectors"),
            Self::ProDos => write!(f,"ProDOS ordered sectors"),
            Self::Linear => write!(f,"linear ordered sectors"),
            Self::Unrecognized => write!(f,"unrecognized")
        }
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f,"none"),
            Self::LegacyV1 => write!(f,"WOZ1"),
            Self::Native => write!(f,"WOZ2")
        }
    }
}

/// Match the 8 byte signature, anything short or different is `Signature::None`
pub fn detect(buf: &[u8]) -> Signature {
    if buf.len() < 12 {
        debug!("buffer too small for a WOZ header");
        return Signature::None;
    }
    if buf[4..8] != woz::HEADER_TAIL {
        return Signature::None;
    }
    match u32::from_le_bytes([buf[0],buf[1],buf[2],buf[3]]) {
        woz::WOZ1_ID => Signature::LegacyV1,
        woz::WOZ2_ID => Signature::Native,
        _ => Signature::None
    }
}

/// Check the stored CRC32 against the bytes that follow the 12 byte header.
/// A stored value of zero is accepted, some tools never fill it in.
pub fn verify(buf: &[u8]) -> bool {
    if buf.len() < 12 {
        return false;
    }
    let stored = u32::from_le_bytes([buf[8],buf[9],buf[10],buf[11]]);
    if stored == 0 {
        warn!("WOZ checksum is absent");
        return true;
    }
    let actual = woz::crc32(0,&buf[12..]);
    if actual != stored {
        warn!("WOZ checksum mismatch, stored {:08X}, computed {:08X}",stored,actual);
        return false;
    }
    true
}

/// File extensions that a drive will try to load
pub fn file_extensions() -> Vec<String> {
    let mut ans = woz2::file_extensions();
    ans.append(&mut dsk::file_extensions());
    ans
}
