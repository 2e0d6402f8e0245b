//! # Disk II Controller
//!
//! `Disk2` is the controller card with its two drives.  The processor emulator drives it
//! through the 16 soft switches of the card's I/O range (the `Peripheral` trait), and
//! advances it with `run_sequencer` as its own clock runs.
//!
//! Soft switch offsets:
//! * 0-7: stepper magnets, bits 1-2 select the magnet, bit 0 is on/off
//! * 8-9: motor off/on
//! * A-B: select drive 1/2
//! * C-D: Q6 off/on (shift/load)
//! * E-F: Q7 off/on (read/write)
//!
//! Reading an even offset returns the data register, writing D or F puts a value
//! on the bus for the next load.
//!
//! The lifecycle functions (load, save, eject, ...) report failure with a boolean.
//! The cause is logged; the drive is never left in a state that cannot run.

use std::path::Path;
use log::{debug,info,warn,error};
use crate::img::DiskType;
use crate::img::woz2::Woz2;

pub mod stepper;
pub mod drive;
pub mod lss;

pub use drive::{Drive,Light,Media,SPIN_DOWN_CYCLES,UNFORMATTED_TRACK_BITS};

/// Device in a slot, the dispatcher calls these with the offset within the slot's
/// 16 byte I/O range.
pub trait Peripheral {
    fn io_read(&mut self,offset: u8) -> u8;
    fn io_write(&mut self,offset: u8,value: u8);
}

pub struct Disk2 {
    drives: [Drive;2],
    active: usize,
    seq: lss::Sequencer
}

impl Disk2 {
    pub fn new() -> Self {
        Self {
            drives: [Drive::new(),Drive::new()],
            active: 0,
            seq: lss::Sequencer::new()
        }
    }
    fn active_has_image(&self) -> bool {
        self.drives[self.active].has_disk()
    }
    /// Stop the noise generator, useful for analysis where repeatability matters
    pub fn disable_noise(&mut self) {
        self.seq.disable_noise();
    }
    pub fn enable_noise(&mut self) {
        self.seq.enable_noise();
    }
    /// Stepper magnet switch, `addr` is the offset 0-7
    pub fn control_stepper(&mut self,addr: u8) {
        if !self.active_has_image() {
            return;
        }
        self.drives[self.active].step(addr & 7);
    }
    /// Motor switch, odd `addr` turns it on
    pub fn control_motor(&mut self,addr: u8) {
        if !self.active_has_image() {
            return;
        }
        self.drives[self.active].set_motor(addr & 1 > 0);
    }
    /// Drive select switch, odd `addr` selects the second drive.
    /// A spinning motor follows the selection, along with any spin down in progress.
    /// Like the other switches this does nothing while the active drive is empty,
    /// so a disk in drive 2 cannot be selected from an empty drive 1.
    pub fn drive_enable(&mut self,addr: u8) {
        let new = (addr & 1) as usize;
        if new==self.active || !self.active_has_image() {
            return;
        }
        debug!("select drive {}",new+1);
        let [d1,d2] = &mut self.drives;
        match new {
            1 => d1.pass_motor(d2),
            _ => d2.pass_motor(d1)
        }
        self.active = new;
    }
    /// Q6, true is load
    pub fn set_shift_load_switch(&mut self,state: bool) {
        if !self.active_has_image() {
            return;
        }
        self.seq.set_q6(state);
    }
    /// Q7, true is write
    pub fn set_read_write_switch(&mut self,state: bool) {
        if !self.active_has_image() {
            return;
        }
        self.seq.set_q7(state);
    }
    pub fn data_register_read(&mut self) -> u8 {
        self.drives[self.active].set_activity(drive::Activity::Read);
        self.seq.get_latch()
    }
    pub fn data_register_write(&mut self,val: u8) {
        self.drives[self.active].set_activity(drive::Activity::Write);
        self.seq.set_bus(val);
    }
    /// Advance the sequencer by 2 LSS cycles per processor cycle
    pub fn run_sequencer(&mut self,cycles: u64) {
        let drive = &mut self.drives[self.active];
        if !drive.has_disk() {
            return;
        }
        let turning = drive.spin(cycles);
        self.seq.run(turning*2,drive);
    }
    fn switch(&mut self,offset: u8) {
        match offset & 0x0f {
            0..=7 => self.control_stepper(offset & 7),
            8..=9 => self.control_motor(offset),
            0x0a..=0x0b => self.drive_enable(offset),
            0x0c..=0x0d => self.set_shift_load_switch(offset & 1 > 0),
            _ => self.set_read_write_switch(offset & 1 > 0)
        }
    }
    pub fn drive(&self,drive: usize) -> Option<&Drive> {
        self.drives.get(drive)
    }
    pub fn active_drive(&self) -> usize {
        self.active
    }
    /// Load an image from a file.  WOZ v1 is upgraded, sector images are nibblized.
    /// Returns false if the file could not be read, in which case nothing changes,
    /// or if it could not be interpreted, in which case the drive is left empty.
    pub fn load_image<P: AsRef<Path>>(&mut self,path: P,drive: usize) -> bool {
        let path = path.as_ref();
        if drive >= self.drives.len() {
            warn!("no drive {}",drive+1);
            return false;
        }
        let buf = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                error!("could not read {}: {}",path.display(),e);
                return false;
            }
        };
        let ext = path.extension().map(|e| e.to_string_lossy().to_lowercase());
        if let Some(x) = &ext {
            if !crate::img::file_extensions().contains(x) {
                warn!("unexpected extension `{}`, will try the contents",x);
            }
        }
        match crate::create_img_from_bytestream(&buf,ext.as_deref()) {
            Ok((disk,typ)) => {
                self.eject_image(drive);
                info!("drive {} loaded {} as {}",drive+1,path.display(),typ);
                self.drives[drive].insert(Media::from_file(disk,typ,path));
                true
            },
            Err(e) => {
                error!("could not interpret {}: {}",path.display(),e);
                self.eject_image(drive);
                self.drives[drive].media.disk_type = DiskType::Unrecognized;
                false
            }
        }
    }
    /// Write the image back to where it came from
    pub fn save_image(&mut self,drive: usize) -> bool {
        match self.drives.get_mut(drive) {
            Some(d) => match d.save() {
                Ok(()) => true,
                Err(e) => {
                    error!("could not save drive {}: {}",drive+1,e);
                    false
                }
            },
            None => false
        }
    }
    /// Write the image to a new path, which becomes the image's path
    pub fn save_image_as<P: AsRef<Path>>(&mut self,path: P,drive: usize) -> bool {
        match self.drives.get_mut(drive) {
            Some(d) => match d.save_as(path.as_ref()) {
                Ok(()) => true,
                Err(e) => {
                    error!("could not save drive {}: {}",drive+1,e);
                    false
                }
            },
            None => false
        }
    }
    /// Insert a freshly made blank disk
    pub fn create_blank_image(&mut self,drive: usize) {
        if drive >= self.drives.len() {
            return;
        }
        self.eject_image(drive);
        let mut media = Media::empty();
        media.disk = Some(Woz2::blank());
        media.disk_type = DiskType::Woz;
        media.name = "blank".to_string();
        self.drives[drive].insert(media);
    }
    pub fn swap_images(&mut self) {
        let [d1,d2] = &mut self.drives;
        std::mem::swap(&mut d1.media,&mut d2.media);
        d1.seat_track();
        d2.seat_track();
        debug!("swapped images");
    }
    /// Remove the image, saving it first if it was written to
    pub fn eject_image(&mut self,drive: usize) {
        let d = match self.drives.get_mut(drive) {
            Some(d) => d,
            None => return
        };
        if d.is_dirty() {
            if let Err(e) = d.save() {
                warn!("changes to {} are lost: {}",d.name(),e);
            }
        }
        d.insert(Media::empty());
    }
    pub fn image_name(&self,drive: usize) -> String {
        match self.drives.get(drive) {
            Some(d) => d.name().to_string(),
            None => String::new()
        }
    }
    pub fn is_empty(&self,drive: usize) -> bool {
        match self.drives.get(drive) {
            Some(d) => !d.has_disk(),
            None => true
        }
    }
    pub fn is_write_protected(&self,drive: usize) -> bool {
        match self.drives.get(drive) {
            Some(d) => d.is_write_protected(),
            None => false
        }
    }
    pub fn set_write_protect(&mut self,state: bool,drive: usize) {
        if let Some(d) = self.drives.get_mut(drive) {
            d.set_write_protect(state);
        }
    }
    pub fn drive_light_status(&self,drive: usize) -> Light {
        match self.drives.get(drive) {
            Some(d) => d.light(),
            None => Light::Off
        }
    }
    pub fn disk_type(&self,drive: usize) -> DiskType {
        match self.drives.get(drive) {
            Some(d) => d.disk_type(),
            None => DiskType::Empty
        }
    }
}

impl Peripheral for Disk2 {
    fn io_read(&mut self,offset: u8) -> u8 {
        self.switch(offset);
        match offset & 1 {
            0 => self.data_register_read(),
            _ => 0
        }
    }
    fn io_write(&mut self,offset: u8,value: u8) {
        self.switch(offset);
        if offset & 0x0d == 0x0d {
            self.data_register_write(value);
        }
    }
}
