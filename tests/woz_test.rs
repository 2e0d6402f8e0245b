// test of WOZ container handling
use a2disk::img;
use a2disk::img::woz;
use a2disk::img::woz2::{Woz2,TRACK_SLOTS,UNFORMATTED};

const WOZ1_TRACK_BYTES: usize = 6646;

/// Hand-assemble a WOZ v1 image with a single track at quarter track 0.
/// The checksum is left at zero.
fn build_woz1(bits: &[u8],bit_count: u16) -> Vec<u8> {
    let mut ans = u32::to_le_bytes(woz::WOZ1_ID).to_vec();
    ans.extend_from_slice(&woz::HEADER_TAIL);
    ans.extend_from_slice(&[0,0,0,0]);
    let mut info = vec![0;60];
    info[0] = 1; // version
    info[1] = 1; // 5.25 inch
    info[2] = 1; // write protected
    let creator = "hand built".as_bytes();
    info[5..5+32].fill(0x20);
    info[5..5+creator.len()].copy_from_slice(creator);
    ans.append(&mut woz::wrap_chunk(woz::INFO_ID,&info));
    let mut tmap = vec![UNFORMATTED;TRACK_SLOTS];
    tmap[0] = 0;
    tmap[1] = 0;
    ans.append(&mut woz::wrap_chunk(woz::TMAP_ID,&tmap));
    let mut trk = bits.to_vec();
    trk.resize(WOZ1_TRACK_BYTES,0);
    trk.extend_from_slice(&u16::to_le_bytes(((bit_count as usize + 7)/8) as u16));
    trk.extend_from_slice(&u16::to_le_bytes(bit_count));
    trk.extend_from_slice(&[0xff,0xff,0,0,0,0]);
    ans.append(&mut woz::wrap_chunk(woz::TRKS_ID,&trk));
    ans
}

#[test]
fn blank_verifies() -> Result<(),Box<dyn std::error::Error>> {
    let buf = Woz2::blank().to_bytes()?;
    assert_eq!(img::detect(&buf),img::Signature::Native);
    assert!(img::verify(&buf));
    let woz = Woz2::from_bytes(&buf)?;
    assert_eq!(woz.num_tracks(),35);
    assert_eq!(woz.track_index(4),Some(1));
    assert_eq!(woz.track_index(6),None);
    assert!(!woz.get_bit(0,1000));
    Ok(())
}

#[test]
fn checksum_mismatch_is_not_fatal() -> Result<(),Box<dyn std::error::Error>> {
    let mut buf = Woz2::blank().to_bytes()?;
    let last = buf.len() - 1;
    buf[last] ^= 0x55;
    assert!(!img::verify(&buf));
    let woz = Woz2::from_bytes(&buf)?;
    assert_eq!(woz.num_tracks(),35);
    // absent checksum is accepted
    buf[8..12].copy_from_slice(&[0,0,0,0]);
    assert!(img::verify(&buf));
    Ok(())
}

#[test]
fn signature_detection() {
    assert_eq!(img::detect(&[]),img::Signature::None);
    assert_eq!(img::detect(&build_woz1(&[],0)),img::Signature::LegacyV1);
    let mut buf = build_woz1(&[],0);
    buf[7] = 0;
    assert_eq!(img::detect(&buf),img::Signature::None);
    assert_eq!(img::detect(&[0;143360]),img::Signature::None);
}

#[test]
fn truncated_input_fails_closed() -> Result<(),Box<dyn std::error::Error>> {
    let buf = Woz2::blank().to_bytes()?;
    for len in [0,8,12,20,79,80,100,247,248,256,1000,1535,1536,2000,10000] {
        assert!(a2disk::create_img_from_bytestream(&buf[0..len],Some("woz")).is_err(),"length {}",len);
    }
    Ok(())
}

#[test]
fn oversized_track_record_is_rejected() -> Result<(),Box<dyn std::error::Error>> {
    let mut buf = Woz2::blank().to_bytes()?;
    // first TRKS record claims more blocks than the file has
    buf[258..260].copy_from_slice(&u16::to_le_bytes(1000));
    assert!(Woz2::from_bytes(&buf).is_err());
    Ok(())
}

#[test]
fn upgrade_legacy() -> Result<(),Box<dyn std::error::Error>> {
    let pattern: Vec<u8> = (0..6250).map(|i| (i % 251) as u8).collect();
    let buf = build_woz1(&pattern,50000);
    let (woz,typ) = a2disk::create_img_from_bytestream(&buf,None)?;
    assert_eq!(typ,img::DiskType::Woz);
    assert_eq!(woz.info().vers,2);
    assert!(woz.is_write_protected());
    assert_eq!(woz.info().creator(),"hand built");
    assert_eq!(woz.num_tracks(),1);
    assert_eq!(woz.track_index(0),Some(0));
    assert_eq!(woz.track_index(1),Some(0));
    assert_eq!(woz.track_index(4),None);
    assert_eq!(woz.track_bit_count(0),50000);
    let cells = woz.track_cells(0).expect("track 0 missing");
    assert_eq!(cells.len(),50000);
    for pos in [0,7,8,9,1001,49999] {
        let expected = (pattern[pos/8] >> (7 - pos%8)) & 1 > 0;
        assert_eq!(woz.get_bit(0,pos),expected);
    }
    // serialized form uses 13 blocks starting at block 3
    let out = woz.to_bytes()?;
    assert!(img::verify(&out));
    assert_eq!(u16::from_le_bytes([out[256],out[257]]),3);
    assert_eq!(u16::from_le_bytes([out[258],out[259]]),13);
    assert_eq!(u32::from_le_bytes([out[260],out[261],out[262],out[263]]),50000);
    assert_eq!(&out[1536..1536+6250],&pattern[..]);
    Ok(())
}

#[test]
fn extra_chunks_survive() -> Result<(),Box<dyn std::error::Error>> {
    let mut buf = Woz2::blank().to_bytes()?;
    let meta = "title\tBlank Disk\n".as_bytes();
    buf.append(&mut woz::wrap_chunk(woz::META_ID,meta));
    let out = Woz2::from_bytes(&buf)?.to_bytes()?;
    assert!(img::verify(&out));
    let tail = &out[out.len()-8-meta.len()..];
    assert_eq!(&tail[0..4],"META".as_bytes());
    assert_eq!(&tail[8..],meta);
    Ok(())
}

#[test]
fn bit_access() {
    let mut woz = Woz2::blank();
    assert!(woz.set_bit(3,100,true));
    assert!(!woz.set_bit(3,100,true));
    assert!(woz.get_bit(3,100));
    assert!(!woz.get_bit(3,99));
    assert!(!woz.set_bit(3,51200,true));
    assert!(!woz.set_bit(100,0,true));
    assert!(!woz.get_bit(100,0));
}
