//! ## Sector Skewing Module
//!
//! Flat sector images store each track's sectors in the order some operating system
//! asked for them, not in the order they pass under the head.  The tables here take
//! a *physical* sector (the number in the address field) to the sector's position
//! within the track in the image.

use crate::img::DiskType;

/// Physical sector to DOS 3.3 logical sector, i.e., position in a DO/DSK track
pub const DOS_PSEC_TO_DOS_LSEC: [usize;16] = [0,7,14,6,13,5,12,4,11,3,10,2,9,1,8,15];
/// Physical sector to ProDOS logical sector, i.e., position in a PO track
pub const DOS_PSEC_TO_PRODOS_LSEC: [usize;16] = [0,8,1,9,2,10,3,11,4,12,5,13,6,14,7,15];
/// No skew
pub const IDENTITY: [usize;16] = [0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,15];

/// Table that takes physical sectors to image sectors for a given image type
pub fn physical_to_image(typ: DiskType) -> &'static [usize;16] {
    match typ {
        DiskType::Dos33 => &DOS_PSEC_TO_DOS_LSEC,
        DiskType::ProDos => &DOS_PSEC_TO_PRODOS_LSEC,
        _ => &IDENTITY
    }
}

#[test]
fn tables_are_permutations() {
    for table in [DOS_PSEC_TO_DOS_LSEC,DOS_PSEC_TO_PRODOS_LSEC] {
        let mut seen = [false;16];
        for s in table {
            seen[s] = true;
        }
        assert!(seen.iter().all(|x| *x));
    }
}
