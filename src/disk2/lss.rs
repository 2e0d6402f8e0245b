//! # Model for Disk II Controller
//!
//! This models the logic state sequencer (LSS) in the controller card, together with the
//! part of the analog board that turns flux transitions into read pulses.
//!
//! ## Basic timing parameters
//!
//! * The LSS is clocked at 2 MHz, i.e., twice per processor cycle
//! * The bit-cell duration is 8 LSS cycles (4 microseconds)
//! * A read pulse lasts 2 LSS cycles
//!
//! ## Write path
//!
//! In write mode the ROM walks through its 16 states once every 8 cycles, and the top bit of
//! the data register toggles the write signal.  This is modeled by storing the new top bit
//! as a cell after every shift, and a 1 after every load.  Since the ROM visits
//! its shift/load state once per pass, exactly one cell is committed per bit cell.
//!
//! ## Noise
//!
//! With no transitions for a while the automatic gain control turns up and the read amplifier
//! produces random pulses.  Some software depends on this to detect an empty or unformatted
//! disk.  The noise comes from a 17 bit LFSR, so it is repeatable.

use log::trace;
use super::drive::Drive;

/// ROM is accessed as `[Q6*2 + Q7][high-bit][pulse][sequence]`
const ROM: [[[[u8;16];2];2];4] = [
    // Q6=0,Q7=0 (read)
    [
        // high bit clear
        [
            // no pulse
            [0x18,0x2d,0x38,0x48,0x58,0x68,0x78,0x88,0x98,0x29,0xbd,0x59,0xd9,0x08,0xfd,0x4d],
            // pulse
            [0x18,0x2d,0xd8,0xd8,0xd8,0xd8,0xd8,0xd8,0xd8,0xd8,0xcd,0xd9,0xd9,0xd8,0xfd,0xdd]
        ],
        // high bit set
        [
            // no pulse
            [0x18,0x38,0x28,0x48,0x58,0x68,0x78,0x88,0x98,0xa8,0xb8,0xc8,0xa0,0xe8,0xf8,0xe0],
            // pulse
            [0x18,0x38,0x08,0x48,0xd8,0xd8,0xd8,0xd8,0xd8,0xd8,0xd8,0xd8,0xd8,0xe8,0xf8,0xe0]
        ]
    ],
    // Q6=0,Q7=1 (shift for write, pulse does not affect)
    [
        [
            [0x18,0x28,0x39,0x48,0x58,0x68,0x78,0x08,0x98,0xa8,0xb9,0xc8,0xd8,0xe8,0xf8,0x88],
            [0x18,0x28,0x39,0x48,0x58,0x68,0x78,0x08,0x98,0xa8,0xb9,0xc8,0xd8,0xe8,0xf8,0x88]
        ],
        [
            [0x18,0x28,0x39,0x48,0x58,0x68,0x78,0x88,0x98,0xa8,0xb9,0xc8,0xd8,0xe8,0xf8,0x08],
            [0x18,0x28,0x39,0x48,0x58,0x68,0x78,0x88,0x98,0xa8,0xb9,0xc8,0xd8,0xe8,0xf8,0x08]
        ]
    ],
    // Q6=1,Q7=0 (check write protect)
    [
        [
            [0x0a;16],
            [0x0a;16]
        ],
        [
            [0x0a;16],
            [0x0a;16]
        ]
    ],
    // Q6=1,Q7=1 (load for write, pulse does not affect)
    [
        [
            [0x18,0x28,0x3b,0x48,0x58,0x68,0x78,0x08,0x98,0xa8,0xbb,0xc8,0xd8,0xe8,0xf8,0x88],
            [0x18,0x28,0x3b,0x48,0x58,0x68,0x78,0x08,0x98,0xa8,0xbb,0xc8,0xd8,0xe8,0xf8,0x88]
        ],
        [
            [0x18,0x28,0x3b,0x48,0x58,0x68,0x78,0x88,0x98,0xa8,0xbb,0xc8,0xd8,0xe8,0xf8,0x08],
            [0x18,0x28,0x3b,0x48,0x58,0x68,0x78,0x88,0x98,0xa8,0xbb,0xc8,0xd8,0xe8,0xf8,0x08]
        ]
    ]
];

/// LSS cycles a read pulse stays asserted
const PULSE_WIDTH: u8 = 2;
/// consecutive zero cells after which the gain control starts producing noise
const AGC_ZEROS: u32 = 3;
/// Galois taps for x^17 + x^14 + 1
const NOISE_TAPS: u32 = 0x12000;
const NOISE_SEED: u32 = 0x1a2b3;

/// State of the controller, shared by whichever drive is selected
#[derive(Clone)]
pub struct Sequencer {
    /// sequence number in the LSS program
    seq: u8,
    /// current value of data latch
    latch: u8,
    /// value last put on the bus, is what will be loaded for writing
    bus: u8,
    /// first bit selecting arm of LSS program ($C08C -> off, $C08D -> on)
    q6: bool,
    /// second bit selecting arm of LSS program ($C08E -> off, $C08F -> on)
    q7: bool,
    /// LSS cycle within the bit cell, 0..7
    pulse_clock: u8,
    /// LSS cycles left in the current read pulse
    pulse_countdown: u8,
    zero_count: u32,
    lfsr: u32,
    noise: bool
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            seq: 0,
            latch: 0,
            bus: 0,
            q6: false,
            q7: false,
            pulse_clock: 0,
            pulse_countdown: 0,
            zero_count: 0,
            lfsr: NOISE_SEED,
            noise: true
        }
    }
    pub fn disable_noise(&mut self) {
        self.noise = false;
    }
    pub fn enable_noise(&mut self) {
        self.noise = true;
    }
    pub fn get_latch(&self) -> u8 {
        self.latch
    }
    pub fn set_bus(&mut self,val: u8) {
        self.bus = val;
    }
    /// shift/load switch, true is load
    pub fn set_q6(&mut self,state: bool) {
        self.q6 = state;
    }
    /// read/write switch, true is write
    pub fn set_q7(&mut self,state: bool) {
        self.q7 = state;
    }
    /// Step the noise generator, returns true if a pulse should be injected
    fn noise_pulse(&mut self) -> bool {
        let lsb = self.lfsr & 1;
        self.lfsr >>= 1;
        if lsb > 0 {
            self.lfsr ^= NOISE_TAPS;
        }
        self.lfsr & 0x1f == 0x1f
    }
    /// Check for a pulse while advancing through one LSS cycle.
    fn read_pulse(&mut self,drive: &mut Drive) -> bool {
        if self.pulse_clock == 0 {
            let bit = drive.advance_bit();
            if !self.q7 {
                match bit {
                    Some(true) => {
                        self.zero_count = 0;
                        self.pulse_countdown = PULSE_WIDTH;
                    },
                    Some(false) => self.zero_count = self.zero_count.saturating_add(1),
                    None => {}
                }
            }
        }
        if self.noise && !self.q7 && self.pulse_countdown==0 && (!drive.is_formatted() || self.zero_count > AGC_ZEROS) {
            if self.noise_pulse() {
                self.pulse_countdown = PULSE_WIDTH;
            }
        }
        let pulse = self.pulse_countdown > 0;
        if pulse {
            self.pulse_countdown -= 1;
        }
        pulse
    }
    /// Advance the state machine through one LSS cycle using the given drive
    pub fn tick(&mut self,drive: &mut Drive) {
        let pulse = self.read_pulse(drive);
        let q6q7 = self.q6 as usize * 2 + self.q7 as usize;
        let neg = (self.latch >> 7) as usize;
        let next = ROM[q6q7][neg][pulse as usize][self.seq as usize];
        match next & 0x0f {
            0x08 | 0x0c => {},
            0x09 => {
                self.latch = self.latch << 1;
                if self.q7 {
                    drive.commit_bit(self.latch & 0x80 > 0);
                }
            },
            0x0a | 0x0e => self.latch = (self.latch >> 1) | ((drive.is_write_protected() as u8) << 7),
            0x0b | 0x0f => {
                self.latch = self.bus;
                if self.q7 {
                    drive.commit_bit(true);
                }
            },
            0x0d => self.latch = (self.latch << 1) | 1,
            _ => self.latch = 0
        };
        self.seq = next >> 4;
        self.pulse_clock = (self.pulse_clock + 1) & 7;
    }
    /// Advance through `ticks` LSS cycles
    pub fn run(&mut self,ticks: u64,drive: &mut Drive) {
        trace!("run {} LSS cycles from state {:X}",ticks,self.seq);
        for _ in 0..ticks {
            self.tick(drive);
        }
    }
}

#[test]
fn noise_density() {
    let mut seq = Sequencer::new();
    let mut pulses = 0;
    for _i in 0..1000 {
        if seq.noise_pulse() {
            pulses += 1;
        }
        assert!(seq.lfsr > 0 && seq.lfsr < 1 << 17);
    }
    assert!(pulses > 0 && pulses < 250);
}
