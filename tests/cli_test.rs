use assert_cmd::cargo; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

#[test]
fn mkdsk_then_stat() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let dimg_path = dir.path().join("blank.woz");
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.arg("mkdsk").arg("-d").arg(&dimg_path)
        .assert()
        .success();
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.arg("stat").arg("-d").arg(&dimg_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("signature: WOZ2"))
        .stdout(predicate::str::contains("checksum: ok"))
        .stdout(predicate::str::contains("tracks with data: 35"));
    Ok(())
}

#[test]
fn mkdsk_bad_ext() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let dimg_path = dir.path().join("blank.dsk");
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.arg("mkdsk").arg("-d").arg(dimg_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Extension was"));
    Ok(())
}

#[test]
fn mkdsk_no_overwrite() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let dimg_path = dir.path().join("taken.woz");
    std::fs::write(&dimg_path,"keep me")?;
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.arg("mkdsk").arg("-d").arg(&dimg_path)
        .assert()
        .failure();
    assert_eq!(std::fs::read_to_string(&dimg_path)?,"keep me");
    Ok(())
}

#[test]
fn convert_dsk() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src_path = dir.path().join("zeros.dsk");
    let dest_path = dir.path().join("zeros.woz");
    std::fs::write(&src_path,vec![0;143360])?;
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.arg("convert").arg("-d").arg(&src_path).arg("-o").arg(&dest_path)
        .assert()
        .success();
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.arg("stat").arg("-d").arg(&dest_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("source: WOZ"))
        .stdout(predicate::str::contains("boot sector format: 16 sector"));
    Ok(())
}

#[test]
fn stat_sector_image() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src_path = dir.path().join("zeros.po");
    std::fs::write(&src_path,vec![0;143360])?;
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.arg("stat").arg("-d").arg(&src_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("signature: none"))
        .stdout(predicate::str::contains("source: ProDOS ordered sectors"));
    Ok(())
}

#[test]
fn read_sector() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src_path = dir.path().join("zeros.do");
    std::fs::write(&src_path,vec![0;143360])?;
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.arg("sector").arg("-d").arg(&src_path).arg("-t").arg("$11").arg("-s").arg("15")
        .assert()
        .success()
        .stdout(predicate::str::contains("00F0 : 00 00"));
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.arg("sector").arg("-d").arg(&src_path).arg("-t").arg("35").arg("-s").arg("0")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn read_nibbles() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src_path = dir.path().join("zeros.dsk");
    std::fs::write(&src_path,vec![0;143360])?;
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.arg("nibbles").arg("-d").arg(&src_path).arg("-t").arg("1").arg("-c").arg("4000")
        .assert()
        .success()
        .stdout(predicate::str::contains("D5 AA 96 FF FE AA AB"));
    Ok(())
}

#[test]
fn missing_subcommand() -> STDRESULT {
    let mut cmd = cargo::cargo_bin_cmd!("a2disk");
    cmd.assert().failure();
    Ok(())
}
