//! ## create or convert images
//! 
//! Both subcommands produce a WOZ v2 file.  Existing files are never overwritten.

use clap;
use std::path::Path;
use log::info;
use crate::img;
use crate::img::woz2::Woz2;
use super::CommandError;
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";

fn check_dest(dest_path: &str) -> STDRESULT {
    let path = Path::new(dest_path);
    let ext = path.extension().map(|e| e.to_string_lossy().to_lowercase()).unwrap_or_default();
    if !img::woz2::file_extensions().contains(&ext) {
        eprintln!("Extension was `{}`, should be one of {:?}",ext,img::woz2::file_extensions());
        return Err(Box::new(CommandError::UnsupportedFormat));
    }
    if path.exists() {
        eprintln!("refusing to overwrite {}",dest_path);
        return Err(Box::new(CommandError::FileExists));
    }
    Ok(())
}

fn write_woz(disk: &Woz2,dest_path: &str) -> STDRESULT {
    std::fs::write(dest_path,disk.to_bytes()?)?;
    info!("wrote {}",dest_path);
    Ok(())
}

/// Create a blank, unwritten, 35 track WOZ v2 image
pub fn mkdsk(cmd: &clap::ArgMatches) -> STDRESULT {
    let dest_path = cmd.get_one::<String>("dimg").expect(RCH);
    check_dest(dest_path)?;
    write_woz(&Woz2::blank(),dest_path)
}

/// Convert any loadable image to WOZ v2
pub fn convert(cmd: &clap::ArgMatches) -> STDRESULT {
    let src_path = cmd.get_one::<String>("dimg").expect(RCH);
    let dest_path = cmd.get_one::<String>("output").expect(RCH);
    if !Path::new(src_path).exists() {
        eprintln!("could not find {}",src_path);
        return Err(Box::new(CommandError::FileNotFound));
    }
    check_dest(dest_path)?;
    let (disk,typ) = crate::create_img_from_file(src_path)?;
    info!("source was {}",typ);
    write_woz(&disk,dest_path)
}
