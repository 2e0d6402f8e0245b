// test of the logic state sequencer through the controller
use bit_vec::BitVec;
use a2disk::disk2::Disk2;
use a2disk::img::tracks::gcr;

const STREAM: [u8;8] = [0xff,0xd5,0xaa,0x96,0xad,0xde,0xaa,0xeb];

/// Write bytes with 32 cycle timing, the way a write loop would
fn write_bytes(ctrl: &mut Disk2,dat: &[u8]) {
    ctrl.set_read_write_switch(true);
    for b in dat {
        ctrl.data_register_write(*b);
        ctrl.set_shift_load_switch(true);
        ctrl.run_sequencer(4);
        ctrl.set_shift_load_switch(false);
        ctrl.run_sequencer(28);
    }
    ctrl.set_read_write_switch(false);
}

/// Poll the data register every cycle, keeping values as the high bit appears
fn read_nibbles(ctrl: &mut Disk2,cycles: usize) -> Vec<u8> {
    let mut ans = Vec::new();
    let mut prev = 0;
    for _i in 0..cycles {
        ctrl.run_sequencer(1);
        let val = ctrl.data_register_read();
        if val & 0x80 > 0 && prev & 0x80 == 0 {
            ans.push(val);
        }
        prev = val;
    }
    ans
}

fn contains(haystack: &[u8],needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w==needle)
}

#[test]
fn bits_go_where_written() {
    let mut ctrl = Disk2::new();
    ctrl.create_blank_image(0);
    ctrl.control_motor(9);
    write_bytes(&mut ctrl,&STREAM);
    let drive = ctrl.drive(0).expect("drive");
    assert!(drive.is_dirty());
    let cells = drive.disk().expect("disk").track_cells(0).expect("track");
    let pattern = BitVec::from_bytes(&STREAM[1..]);
    let start = cells.find_bits(&pattern).expect("pattern not written");
    assert!(start < 64);
    let ones: usize = STREAM.iter().map(|b| b.count_ones() as usize).sum();
    let written = (0..cells.len()).filter(|i| cells.get(*i)).count();
    assert_eq!(written,ones);
}

#[test]
fn write_protect_blocks_writes() {
    let mut ctrl = Disk2::new();
    ctrl.create_blank_image(0);
    ctrl.set_write_protect(true,0);
    ctrl.control_motor(9);
    write_bytes(&mut ctrl,&STREAM);
    let drive = ctrl.drive(0).expect("drive");
    assert!(!drive.is_dirty());
    let cells = drive.disk().expect("disk").track_cells(0).expect("track");
    assert!((0..cells.len()).all(|i| !cells.get(i)));
}

#[test]
fn write_protect_sense() {
    let mut ctrl = Disk2::new();
    ctrl.create_blank_image(0);
    ctrl.control_motor(9);
    ctrl.set_write_protect(true,0);
    ctrl.set_shift_load_switch(true);
    ctrl.set_read_write_switch(false);
    ctrl.run_sequencer(4);
    assert_eq!(ctrl.data_register_read(),0xff);
    ctrl.set_write_protect(false,0);
    ctrl.run_sequencer(4);
    assert_eq!(ctrl.data_register_read(),0x00);
}

#[test]
fn read_formatted_track() -> Result<(),Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("zeros.dsk");
    std::fs::write(&path,vec![0;143360])?;
    let mut ctrl = Disk2::new();
    assert!(ctrl.load_image(&path,0));
    ctrl.control_motor(9);
    let nibs = read_nibbles(&mut ctrl,4000);
    assert!(contains(&nibs,&gcr::ADDR_PROLOG));
    assert!(contains(&nibs,&[0xff,0xfe,0xaa,0xaa,0xaa,0xaa,0xff,0xfe]));
    Ok(())
}

#[test]
fn read_back_what_was_written() {
    let mut ctrl = Disk2::new();
    ctrl.disable_noise();
    ctrl.create_blank_image(0);
    ctrl.control_motor(9);
    write_bytes(&mut ctrl,&STREAM);
    // one revolution brings the written bytes back under the head
    let nibs = read_nibbles(&mut ctrl,51200*4);
    assert!(contains(&nibs,&STREAM[1..]));
}

#[test]
fn unformatted_track_noise() {
    let mut ctrl = Disk2::new();
    ctrl.create_blank_image(0);
    // quarter track 2 is unformatted
    ctrl.control_stepper(1);
    ctrl.control_stepper(3);
    ctrl.control_stepper(0);
    assert!(!ctrl.drive(0).expect("drive").is_formatted());
    ctrl.control_motor(9);
    ctrl.disable_noise();
    // the register settles to zero once the power-on state has shifted out
    read_nibbles(&mut ctrl,1000);
    assert!(read_nibbles(&mut ctrl,10000).is_empty());
    ctrl.enable_noise();
    assert!(!read_nibbles(&mut ctrl,10000).is_empty());
}

#[test]
fn bit_position_wraps() {
    let mut ctrl = Disk2::new();
    ctrl.create_blank_image(0);
    ctrl.control_motor(9);
    ctrl.run_sequencer(4);
    assert_eq!(ctrl.drive(0).expect("drive").bit_position(),1);
    ctrl.run_sequencer(51199*4);
    assert_eq!(ctrl.drive(0).expect("drive").bit_position(),0);
    ctrl.run_sequencer(40);
    assert_eq!(ctrl.drive(0).expect("drive").bit_position(),10);
}

#[test]
fn chunked_runs_match() {
    let mut a = Disk2::new();
    let mut b = Disk2::new();
    for ctrl in [&mut a,&mut b] {
        ctrl.create_blank_image(0);
        ctrl.control_motor(9);
    }
    a.run_sequencer(12345);
    for _i in 0..12345 {
        b.run_sequencer(1);
    }
    let (da,db) = (a.drive(0).expect("drive"),b.drive(0).expect("drive"));
    assert_eq!(da.bit_position(),db.bit_position());
    assert_eq!(a.data_register_read(),b.data_register_read());
}
