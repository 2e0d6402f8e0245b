//! # Disk II drive
//!
//! A drive is the media (an optional WOZ v2 image plus where it came from) and the mechanism
//! (head positioner, spindle motor, rotational position of the disk under the head).
//! The media can be swapped between drives, the mechanism stays put.

use std::path::{Path,PathBuf};
use log::{debug,info,trace,warn};
use crate::img;
use crate::img::DiskType;
use crate::img::woz2::Woz2;
use super::stepper::Stepper;
use crate::STDRESULT;

/// bits per revolution assumed for a quarter track with no data
pub const UNFORMATTED_TRACK_BITS: usize = 51200;
/// cycles the spindle keeps turning after the motor is switched off
pub const SPIN_DOWN_CYCLES: u64 = 1_000_000;

/// What the drive was last asked to do, for the indicator
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum Activity {
    Read,
    Write
}

/// Indicator status
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum Light {
    Off,
    Reading,
    Writing
}

pub struct Media {
    pub disk: Option<Woz2>,
    pub disk_type: DiskType,
    pub dirty: bool,
    pub path: Option<PathBuf>,
    pub name: String
}

impl Media {
    pub fn empty() -> Self {
        Self {
            disk: None,
            disk_type: DiskType::Empty,
            dirty: false,
            path: None,
            name: String::new()
        }
    }
    pub fn from_file(disk: Woz2,disk_type: DiskType,path: &Path) -> Self {
        Self {
            disk: Some(disk),
            disk_type,
            dirty: false,
            path: Some(path.to_path_buf()),
            name: image_name(path)
        }
    }
}

/// base file name with directory and extension stripped
pub fn image_name(path: &Path) -> String {
    match path.file_stem() {
        Some(stem) => stem.to_string_lossy().to_string(),
        None => String::new()
    }
}

pub struct Drive {
    pub(super) media: Media,
    stepper: Stepper,
    /// bit under the head, always less than `track_len`
    current_pos: usize,
    /// bit count of the seated track
    track_len: usize,
    /// TRKS index of the seated track, None if unformatted or no disk
    track_idx: Option<usize>,
    motor_on: bool,
    /// counts down while spinning down, zero otherwise
    off_timer: u64,
    activity: Activity
}

impl Drive {
    pub fn new() -> Self {
        Self {
            media: Media::empty(),
            stepper: Stepper::new(),
            current_pos: 0,
            track_len: UNFORMATTED_TRACK_BITS,
            track_idx: None,
            motor_on: false,
            off_timer: 0,
            activity: Activity::Read
        }
    }
    pub fn has_disk(&self) -> bool {
        self.media.disk.is_some()
    }
    pub fn disk(&self) -> Option<&Woz2> {
        self.media.disk.as_ref()
    }
    pub fn disk_type(&self) -> DiskType {
        self.media.disk_type
    }
    pub fn name(&self) -> &str {
        &self.media.name
    }
    pub fn is_dirty(&self) -> bool {
        self.media.dirty
    }
    pub fn head_pos(&self) -> u8 {
        self.stepper.head_pos()
    }
    pub fn phase(&self) -> u8 {
        self.stepper.phase()
    }
    pub fn bit_position(&self) -> usize {
        self.current_pos
    }
    pub fn track_len(&self) -> usize {
        self.track_len
    }
    pub fn is_formatted(&self) -> bool {
        self.track_idx.is_some()
    }
    pub fn is_write_protected(&self) -> bool {
        match &self.media.disk {
            Some(disk) => disk.is_write_protected(),
            None => false
        }
    }
    pub fn set_write_protect(&mut self,state: bool) {
        if let Some(disk) = self.media.disk.as_mut() {
            disk.set_write_protected(state);
        }
    }
    /// Replace the media, the old media is returned
    pub fn insert(&mut self,media: Media) -> Media {
        let old = std::mem::replace(&mut self.media,media);
        self.seat_track();
        old
    }
    /// Seat whatever track is under the head.  The rotational position is rescaled from the
    /// length of the previously seated track, so the angle is preserved.
    pub(super) fn seat_track(&mut self) {
        let qtr = self.stepper.head_pos() as usize;
        let (idx,new_len) = match &self.media.disk {
            Some(disk) => match disk.track_index(qtr) {
                Some(i) if disk.track_bit_count(i) > 0 => (Some(i),disk.track_bit_count(i)),
                _ => (None,UNFORMATTED_TRACK_BITS)
            },
            None => (None,UNFORMATTED_TRACK_BITS)
        };
        if new_len!=self.track_len {
            self.current_pos = (self.current_pos as u64 * new_len as u64 / self.track_len as u64) as usize;
        }
        self.track_len = new_len;
        self.current_pos %= new_len;
        self.track_idx = idx;
        trace!("seated quarter track {}, track {:?}, {} bits",qtr,idx,new_len);
    }
    /// Respond to a stepper soft switch
    pub(super) fn step(&mut self,addr: u8) {
        if self.stepper.access(addr) {
            debug!("head at quarter track {}",self.stepper.head_pos());
            self.seat_track();
        }
    }
    /// Rotate by one bit cell and return the bit now under the head, None if unformatted
    pub(super) fn advance_bit(&mut self) -> Option<bool> {
        self.current_pos += 1;
        if self.current_pos >= self.track_len {
            self.current_pos = 0;
        }
        match (&self.media.disk,self.track_idx) {
            (Some(disk),Some(idx)) => Some(disk.get_bit(idx,self.current_pos)),
            _ => None
        }
    }
    /// Write a bit cell under the head, ignored if protected or there is nothing to write on
    pub(super) fn commit_bit(&mut self,val: bool) {
        if let (Some(disk),Some(idx)) = (self.media.disk.as_mut(),self.track_idx) {
            if !disk.is_write_protected() && disk.set_bit(idx,self.current_pos,val) {
                self.media.dirty = true;
            }
        }
    }
    pub(super) fn set_activity(&mut self,activity: Activity) {
        self.activity = activity;
    }
    /// Turn the motor on, or start the spin down
    pub(super) fn set_motor(&mut self,on: bool) {
        if on {
            self.motor_on = true;
            self.off_timer = 0;
        } else if self.motor_on && self.off_timer==0 {
            self.off_timer = SPIN_DOWN_CYCLES;
        }
    }
    /// Stop immediately, happens when the other drive is selected
    pub(super) fn stop_motor(&mut self) {
        self.motor_on = false;
        self.off_timer = 0;
    }
    /// Hand the spindle state over to `other`, including any spin down in progress,
    /// and stop this drive.
    pub(super) fn pass_motor(&mut self,other: &mut Drive) {
        other.motor_on = self.motor_on;
        other.off_timer = self.off_timer;
        self.stop_motor();
    }
    pub fn is_spinning(&self) -> bool {
        self.motor_on
    }
    /// Account for `cycles` of spindle time.  Returns how many of those cycles the disk
    /// was actually turning.
    pub(super) fn spin(&mut self,cycles: u64) -> u64 {
        if !self.motor_on {
            return 0;
        }
        if self.off_timer==0 {
            return cycles;
        }
        let run = cycles.min(self.off_timer);
        self.off_timer -= run;
        if self.off_timer==0 {
            debug!("motor stopped");
            self.motor_on = false;
        }
        run
    }
    pub fn light(&self) -> Light {
        match (self.motor_on,self.activity) {
            (false,_) => Light::Off,
            (true,Activity::Read) => Light::Reading,
            (true,Activity::Write) => Light::Writing
        }
    }
    /// Write the image back to its file.  Images that came from sector files are
    /// saved next to the original with a `woz` extension, and become WOZ images.
    pub fn save(&mut self) -> STDRESULT {
        let mut path = match &self.media.path {
            Some(p) => p.clone(),
            None => {
                warn!("image has no path, use save as");
                return Err(Box::new(img::Error::NoPath));
            }
        };
        if self.media.disk_type.is_sector_image() {
            path.set_extension("woz");
            info!("sector image will be saved as {}",path.display());
        }
        self.save_as(&path)
    }
    pub fn save_as(&mut self,path: &Path) -> STDRESULT {
        let disk = match &self.media.disk {
            Some(d) => d,
            None => return Err(Box::new(img::Error::NoImage))
        };
        std::fs::write(path,disk.to_bytes()?)?;
        info!("saved {}",path.display());
        self.media.path = Some(path.to_path_buf());
        self.media.name = image_name(path);
        self.media.disk_type = DiskType::Woz;
        self.media.dirty = false;
        Ok(())
    }
}
