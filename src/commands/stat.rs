use clap;
use num_traits::FromPrimitive;
use crate::img;
use crate::img::woz2::BootSectorFormat;
use super::CommandError;
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";

/// Print what the image is and, for WOZ, the INFO chunk and track usage
pub fn stat(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let buf = match std::fs::read(img_path) {
        Ok(b) => b,
        Err(_) => {
            eprintln!("could not read {}",img_path);
            return Err(Box::new(CommandError::FileNotFound));
        }
    };
    let sig = img::detect(&buf);
    println!("signature: {}",sig);
    if sig!=img::Signature::None {
        println!("checksum: {}",match img::verify(&buf) { true => "ok", false => "mismatch" });
    }
    let maybe_ext = std::path::Path::new(img_path).extension().map(|e| e.to_string_lossy().to_lowercase());
    let (disk,typ) = crate::create_img_from_bytestream(&buf,maybe_ext.as_deref())?;
    println!("source: {}",typ);
    let info = disk.info();
    if sig!=img::Signature::None {
        println!("creator: {}",info.creator());
    }
    let boot = match BootSectorFormat::from_u8(info.boot_sector_format) {
        Some(BootSectorFormat::Sector16) => "16 sector",
        Some(BootSectorFormat::Sector13) => "13 sector",
        Some(BootSectorFormat::Both) => "13 and 16 sector",
        _ => "unknown"
    };
    println!("boot sector format: {}",boot);
    println!("write protected: {}",disk.is_write_protected());
    println!("synchronized: {}",info.synchronized > 0);
    println!("optimal bit timing: {} ns",info.optimal_bit_timing as u32 * 125);
    println!("tracks with data: {}",disk.num_tracks());
    println!("largest track: {} blocks",info.largest_track);
    Ok(())
}
