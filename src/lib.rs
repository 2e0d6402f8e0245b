//! # `a2disk` main library
//!
//! This library models the Apple II Disk II subsystem at the level of flux transitions,
//! so that software which depends on exact disk timing runs unmodified.
//!
//! ## Architecture
//!
//! * `img` reads, verifies, upgrades, and writes WOZ containers, and converts flat sector images
//! * `bios` holds the sector skew tables needed for the conversion
//! * `disk2` is the controller card: stepper, logic state sequencer, two drives, and the
//!   image lifecycle (load, save, eject, swap)
//!
//! The drive always holds a WOZ v2 image in memory.  Whatever was loaded is converted on the way
//! in, and the sequencer reads and writes bits directly in the image's track buffers.
//! Changes are not permanent until the image is saved.
//!
//! ## Disk Images
//!
//! As of this writing `a2disk` accepts
//! * WOZ (1 and 2), WOZ 1 is upgraded
//! * DSK, DO, PO (140K, with or without a 128 byte header)

pub mod bios;
pub mod img;
pub mod disk2;
pub mod commands;

use std::fmt::Write;
use log::{info,error};

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Given a bytestream return the WOZ v2 image and the type of the source.
/// The extension, if given, should be lower case without the dot.
pub fn create_img_from_bytestream(disk_img_data: &[u8],maybe_ext: Option<&str>) -> Result<(img::woz2::Woz2,img::DiskType),DYNERR> {
    match img::detect(disk_img_data) {
        img::Signature::Native => {
            return Ok((img::woz2::Woz2::from_bytes(disk_img_data)?,img::DiskType::Woz));
        },
        img::Signature::LegacyV1 => {
            let woz1 = img::woz1::Woz1::from_bytes(disk_img_data)?;
            return Ok((woz1.upgrade()?,img::DiskType::Woz));
        },
        img::Signature::None => {}
    }
    match img::dsk::classify(disk_img_data,maybe_ext) {
        img::DiskType::Unrecognized => {
            error!("image of {} bytes was not recognized",disk_img_data.len());
            Err(Box::new(img::Error::UnknownImageType))
        },
        typ => {
            info!("identified {}",typ);
            Ok((img::dsk::woz_ify(disk_img_data,typ)?,typ))
        }
    }
}

/// Calls `create_img_from_bytestream` getting the bytes from a file.
pub fn create_img_from_file(img_path: &str) -> Result<(img::woz2::Woz2,img::DiskType),DYNERR> {
    let buf = std::fs::read(img_path)?;
    let maybe_ext = std::path::Path::new(img_path).extension().map(|e| e.to_string_lossy().to_lowercase());
    create_img_from_bytestream(&buf,maybe_ext.as_deref())
}

/// Display binary to stdout in columns of hex and ascii
pub fn display_block(start_addr: u16,block: &[u8]) {
    let mut slice_start = 0;
    loop {
        let row_label = start_addr as usize + slice_start;
        let mut slice_end = slice_start + 16;
        if slice_end > block.len() {
            slice_end = block.len();
        }
        let slice = &block[slice_start..slice_end];
        let txt: String = slice.iter().map(|c| match *c {
            x if x<32 => '.',
            x if x<127 => x as char,
            x if x>=160 && x<255 => (x-128) as char,
            _ => '.'
        }).collect();
        let mut line = String::new();
        let _ = write!(line,"{:04X} : {:47} |{}|",row_label,hex::encode_upper(slice).as_bytes()
            .chunks(2).map(|c| String::from_utf8_lossy(c).to_string()).collect::<Vec<String>>().join(" "),txt);
        println!("{}",line);
        slice_start += 16;
        if slice_end==block.len() {
            break;
        }
    }
}
