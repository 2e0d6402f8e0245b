// test of sector image conversion
use a2disk::img;
use a2disk::img::DiskType;
use a2disk::img::dsk;
use a2disk::img::tracks::gcr;
use a2disk::bios::skew;

/// Every sector is filled with a pattern that identifies it
fn tagged_image() -> Vec<u8> {
    let mut buf = vec![0;dsk::IMAGE_BYTES];
    for t in 0..35 {
        for s in 0..16 {
            let offset = t*4096 + s*256;
            for i in 0..256 {
                buf[offset+i] = (t*16 + s + i) as u8;
            }
            buf[offset] = t as u8;
            buf[offset+1] = s as u8;
        }
    }
    buf
}

fn check_skew(typ: DiskType,table: &[usize;16]) -> Result<(),Box<dyn std::error::Error>> {
    let buf = tagged_image();
    let woz = dsk::woz_ify(&buf,typ)?;
    assert_eq!(woz.num_tracks(),35);
    for track in [0,17,34] {
        let idx = woz.track_index(track*4).expect("track not mapped");
        let mut cells = woz.track_cells(idx).expect("no track bits");
        for psec in 0..16 {
            let dat = gcr::decode_sector(&mut cells,track as u8,psec as u8)?;
            let offset = track*4096 + table[psec]*256;
            assert_eq!(dat,buf[offset..offset+256].to_vec(),"track {} physical sector {}",track,psec);
        }
    }
    Ok(())
}

#[test]
fn dos_order_round_trip() -> Result<(),Box<dyn std::error::Error>> {
    check_skew(DiskType::Dos33,&skew::DOS_PSEC_TO_DOS_LSEC)
}

#[test]
fn prodos_order_round_trip() -> Result<(),Box<dyn std::error::Error>> {
    check_skew(DiskType::ProDos,&skew::DOS_PSEC_TO_PRODOS_LSEC)
}

#[test]
fn linear_order_round_trip() -> Result<(),Box<dyn std::error::Error>> {
    check_skew(DiskType::Linear,&skew::IDENTITY)
}

#[test]
fn track_geometry() -> Result<(),Box<dyn std::error::Error>> {
    let woz = dsk::woz_ify(&vec![0;dsk::IMAGE_BYTES],DiskType::Dos33)?;
    // 16 lead sync, then per sector: address 14 nibbles, 7 sync, data 349 nibbles, 16 sync
    let expected = 16*10 + 16*(14*8 + 7*10 + 349*8 + 16*10);
    assert_eq!(expected,50304);
    for t in 0..35 {
        assert_eq!(woz.track_bit_count(t),expected);
    }
    assert_eq!(woz.track_index(1),Some(0));
    assert_eq!(woz.track_index(2),None);
    assert_eq!(woz.track_index(3),Some(1));
    let buf = woz.to_bytes()?;
    assert!(img::verify(&buf));
    Ok(())
}

#[test]
fn address_field_layout() -> Result<(),Box<dyn std::error::Error>> {
    let woz = dsk::woz_ify(&vec![0;dsk::IMAGE_BYTES],DiskType::Dos33)?;
    let mut cells = woz.track_cells(woz.track_index(68).expect("track 17")).expect("bits");
    let mut nibs = Vec::new();
    for _i in 0..30 {
        nibs.push(cells.read_nibble());
    }
    let start = nibs.windows(3).position(|w| w==gcr::ADDR_PROLOG).expect("no address prolog");
    // volume 254, track 17, sector 0, checksum
    assert_eq!(&nibs[start+3..start+11],&[0xff,0xfe,0xaa,0xbb,0xaa,0xaa,0xff,0xef]);
    assert_eq!(&nibs[start+11..start+14],&gcr::EPILOG);
    Ok(())
}

#[test]
fn missing_sector() -> Result<(),Box<dyn std::error::Error>> {
    let woz = dsk::woz_ify(&vec![0;dsk::IMAGE_BYTES],DiskType::Dos33)?;
    let mut cells = woz.track_cells(0).expect("bits");
    assert!(gcr::decode_sector(&mut cells,1,0).is_err());
    assert!(gcr::decode_sector(&mut cells,0,16).is_err());
    Ok(())
}

#[test]
fn order_detection() {
    let mut buf = vec![0;dsk::IMAGE_BYTES];
    assert_eq!(dsk::classify(&buf,Some("do")),DiskType::Dos33);
    assert_eq!(dsk::classify(&buf,Some("po")),DiskType::ProDos);
    assert_eq!(dsk::classify(&buf,None),DiskType::Linear);
    // DOS VTOC on track 17
    let vtoc = 17*4096;
    buf[vtoc+1] = 17;
    buf[vtoc+0x27] = 122;
    buf[vtoc+0x34] = 35;
    buf[vtoc+0x35] = 16;
    assert_eq!(dsk::classify(&buf,None),DiskType::Dos33);
    assert_eq!(dsk::classify(&buf,Some("dsk")),DiskType::Dos33);
    // extension wins over content
    assert_eq!(dsk::classify(&buf,Some("po")),DiskType::ProDos);
    assert_eq!(dsk::classify(&buf[0..1000],Some("dsk")),DiskType::Unrecognized);
}
