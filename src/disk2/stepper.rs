//! # Head positioner
//!
//! The Disk II head is moved by a four phase stepper.  Energizing a magnet pulls the rotor
//! toward it, energizing two adjacent magnets pulls it half way between.  One full cycle of
//! the four magnets moves the head 8 quarter tracks, so the response to a magnet pattern
//! depends only on the pattern and on the head position modulo 8.
//!
//! Movement is instantaneous: once a pattern is applied the head settles at once.

use log::trace;

/// highest quarter track the head can reach
pub const MAX_HEAD_POS: u8 = 140;

/// Quarter track delta, indexed by `[magnet pattern][head position & 7]`.
/// Bit `n` of the pattern is magnet `n`.  No magnets, opposing magnets (0101, 1010), and
/// all four magnets produce no movement.
const STEP: [[i8;8];16] = [
    [ 0, 0, 0, 0, 0, 0, 0, 0], // 0000
    [ 0,-1,-2,-3, 0, 3, 2, 1], // 0001
    [ 2, 1, 0,-1,-2,-3, 0, 3], // 0010
    [ 1, 0,-1,-2,-3, 0, 3, 2], // 0011
    [ 0, 3, 2, 1, 0,-1,-2,-3], // 0100
    [ 0, 0, 0, 0, 0, 0, 0, 0], // 0101
    [ 3, 2, 1, 0,-1,-2,-3, 0], // 0110
    [ 2, 1, 0,-1,-2,-3, 0, 3], // 0111
    [-2,-3, 0, 3, 2, 1, 0,-1], // 1000
    [-1,-2,-3, 0, 3, 2, 1, 0], // 1001
    [ 0, 0, 0, 0, 0, 0, 0, 0], // 1010
    [ 0,-1,-2,-3, 0, 3, 2, 1], // 1011
    [-3, 0, 3, 2, 1, 0,-1,-2], // 1100
    [-2,-3, 0, 3, 2, 1, 0,-1], // 1101
    [ 0, 3, 2, 1, 0,-1,-2,-3], // 1110
    [ 0, 0, 0, 0, 0, 0, 0, 0]  // 1111
];

#[derive(Clone,Debug)]
pub struct Stepper {
    /// magnet pattern, bit `n` is magnet `n`
    phase: u8,
    /// head position in quarter tracks
    head_pos: u8
}

impl Stepper {
    pub fn new() -> Self {
        Self {
            phase: 0,
            head_pos: 0
        }
    }
    pub fn phase(&self) -> u8 {
        self.phase
    }
    pub fn head_pos(&self) -> u8 {
        self.head_pos
    }
    /// Respond to an access of soft switch `addr` (0-7).  Bits 1-2 select the magnet,
    /// bit 0 turns it on or off.  Returns true if the head moved.
    pub fn access(&mut self,addr: u8) -> bool {
        let magnet = 1 << ((addr >> 1) & 3);
        match addr & 1 {
            0 => self.phase &= !magnet,
            _ => self.phase |= magnet
        }
        let delta = STEP[self.phase as usize][(self.head_pos & 7) as usize];
        let new_pos = (self.head_pos as i16 + delta as i16).clamp(0,MAX_HEAD_POS as i16) as u8;
        if new_pos==self.head_pos {
            return false;
        }
        trace!("phases {:04b}, head {} -> {}",self.phase,self.head_pos,new_pos);
        self.head_pos = new_pos;
        true
    }
}

#[test]
fn half_steps() {
    let mut stepper = Stepper::new();
    assert!(!stepper.access(1));
    assert!(stepper.access(3));
    assert_eq!(stepper.head_pos(),1);
    assert!(stepper.access(0));
    assert_eq!(stepper.head_pos(),2);
    assert!(!stepper.access(0));
    assert_eq!(stepper.phase(),0b0010);
}

#[test]
fn opposing_magnets() {
    let mut stepper = Stepper::new();
    stepper.access(1);
    stepper.access(5);
    assert_eq!(stepper.phase(),0b0101);
    assert_eq!(stepper.head_pos(),0);
}
