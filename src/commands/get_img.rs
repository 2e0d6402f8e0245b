//! ## get from image
//! 
//! Pulls raw track data out of an image.
//! `nibbles` runs the emulated controller, so it shows what software would read,
//! including noise on unformatted tracks.  `sector` decodes directly from the track bits.

use clap;
use log::{debug,error};
use super::{CommandError,parse_num};
use crate::disk2::Disk2;
use crate::img::tracks::gcr;
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";
/// one revolution of a standard track, with a little to spare
const DEFAULT_CYCLES: &str = "210000";

/// Walk the head out from track 0 to `track` by cycling the stepper magnets
fn seek(ctrl: &mut Disk2,track: usize) {
    let mut magnet: u8 = 0;
    ctrl.control_stepper(1);
    for _half in 0..track*2 {
        let next = (magnet + 1) % 4;
        ctrl.control_stepper(next*2 + 1);
        ctrl.control_stepper(magnet*2);
        magnet = next;
    }
    ctrl.control_stepper(magnet*2);
}

/// Read nibbles the way a read loop would: poll the data register each cycle and
/// keep the value whenever the high bit appears.
pub fn nibbles(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let track = parse_num(cmd.get_one::<String>("track").expect(RCH),34)?;
    let cycles = parse_num(cmd.get_one::<String>("cycles").map(|s| s.as_str()).unwrap_or(DEFAULT_CYCLES),10_000_000)?;
    let mut ctrl = Disk2::new();
    if !ctrl.load_image(img_path,0) {
        error!("could not load {}",img_path);
        return Err(Box::new(CommandError::UnknownFormat));
    }
    ctrl.control_motor(9);
    seek(&mut ctrl,track);
    if let Some(drive) = ctrl.drive(0) {
        debug!("head at quarter track {}",drive.head_pos());
    }
    let mut nibs = Vec::new();
    let mut prev = 0;
    for _cycle in 0..cycles {
        ctrl.run_sequencer(1);
        let val = ctrl.data_register_read();
        if val & 0x80 > 0 && prev & 0x80 == 0 {
            nibs.push(val);
        }
        prev = val;
    }
    ctrl.control_motor(8);
    crate::display_block(0,&nibs);
    Ok(())
}

/// Decode one physical sector
pub fn sector(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let track = parse_num(cmd.get_one::<String>("track").expect(RCH),34)?;
    let sector = parse_num(cmd.get_one::<String>("sector").expect(RCH),15)?;
    let (disk,_typ) = crate::create_img_from_file(img_path)?;
    let mut cells = match disk.track_index(track*4).and_then(|idx| disk.track_cells(idx)) {
        Some(c) => c,
        None => {
            eprintln!("track {} is not formatted",track);
            return Err(Box::new(CommandError::OutOfRange));
        }
    };
    let dat = gcr::decode_sector(&mut cells,track as u8,sector as u8)?;
    crate::display_block(0,&dat);
    Ok(())
}
