use clap::{crate_version, Arg, Command, ValueHint};

const TRACK_HELP: &str = "track number 0-34, decimal or hex with `$` or `0x` prefix";

fn dimg_arg(help: &'static str) -> Arg {
    Arg::new("dimg").short('d').long("dimg").help(help)
        .value_name("PATH")
        .value_hint(ValueHint::FilePath)
        .required(true)
}

fn track_arg() -> Arg {
    Arg::new("track").short('t').long("track").help("track to read")
        .value_name("TRACK")
        .long_help(TRACK_HELP)
        .required(true)
}

pub fn build_cli() -> Command {
    let long_help = "a2disk is always invoked with exactly one of several subcommands.
Whatever image is given is converted to WOZ v2 in memory, sector images are nibblized
using the interleave implied by the extension or contents.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
inspect an image:      `a2disk stat -d myimg.woz`
create blank image:    `a2disk mkdsk -d blank.woz`
convert to WOZ:        `a2disk convert -d myimg.dsk -o myimg.woz`
emulated read:         `a2disk nibbles -d myimg.woz -t 17`
decode a sector:       `a2disk sector -d myimg.dsk -t 17 -s 0`";

    let mut main_cmd = Command::new("a2disk")
        .about("Emulates the Apple II Disk II down to the flux transitions, and manipulates WOZ images.")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("stat")
        .arg(dimg_arg("path to disk image"))
        .about("identify a disk image and print its WOZ information"));
    main_cmd = main_cmd.subcommand(Command::new("mkdsk")
        .arg(dimg_arg("disk image path to create"))
        .about("create a blank 35 track WOZ v2 image"));
    main_cmd = main_cmd.subcommand(Command::new("convert")
        .arg(dimg_arg("path to source disk image"))
        .arg(Arg::new("output").short('o').long("output").help("WOZ v2 image path to create")
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .required(true))
        .about("convert a WOZ v1 or sector image to WOZ v2"));
    main_cmd = main_cmd.subcommand(Command::new("nibbles")
        .arg(dimg_arg("path to disk image"))
        .arg(track_arg())
        .arg(Arg::new("cycles").short('c').long("cycles").help("processor cycles to run")
            .value_name("CYCLES")
            .required(false))
        .about("read nibbles through the emulated controller, write to stdout"));
    main_cmd = main_cmd.subcommand(Command::new("sector")
        .arg(dimg_arg("path to disk image"))
        .arg(track_arg())
        .arg(Arg::new("sector").short('s').long("sector").help("physical sector 0-15")
            .value_name("SECTOR")
            .required(true))
        .about("decode a physical sector, write to stdout"));
    main_cmd
}
