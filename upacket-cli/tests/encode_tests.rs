use std::fs;
use tempfile::tempdir;

use upacket_cli::commands::encode;
use upacket_core::{scanner::scan_stream, Config};

fn write_file<P: AsRef<std::path::Path>>(p: P, s: &str) {
    fs::write(p, s.as_bytes()).unwrap();
}

#[test]
fn encode_strings_and_bytes() {
    let td = tempdir().unwrap();
    let in_path = td.path().join("in.json");
    let out_path = td.path().join("out.upk");

    write_file(&in_path, r#"["HELLO", "A|B", [0, 124, 255], {"t": 21}]"#);

    let count = encode::execute(
        in_path.to_str().unwrap(),
        out_path.to_str().unwrap(),
        &Config::default(),
    )
    .unwrap();
    assert_eq!(count, 4);

    let bytes = fs::read(&out_path).unwrap();
    assert_eq!(hex::encode(&bytes[..13]), "7c58da0000000048454c4c4f7c");

    let packets = scan_stream(&Config::default(), &bytes);
    assert_eq!(packets.len(), 4);
    assert_eq!(packets[1].packet.payload.as_ref(), b"A|B");
    assert_eq!(packets[2].packet.payload.as_ref(), &[0, 124, 255]);
    assert_eq!(packets[3].packet.payload.as_ref(), br#"{"t":21}"#);
}

#[test]
fn encode_rejects_oversized_payload() {
    let td = tempdir().unwrap();
    let in_path = td.path().join("in.json");
    let out_path = td.path().join("out.upk");

    write_file(&in_path, r#"["this payload is far too long for one packet"]"#);

    let result = encode::execute(
        in_path.to_str().unwrap(),
        out_path.to_str().unwrap(),
        &Config::default(),
    );

    assert!(result.is_err());
    assert!(!out_path.exists());
}

#[test]
fn encode_rejects_out_of_range_bytes() {
    let td = tempdir().unwrap();
    let in_path = td.path().join("in.json");
    let out_path = td.path().join("out.upk");

    write_file(&in_path, "[[1, 2, 300]]");

    let result = encode::execute(
        in_path.to_str().unwrap(),
        out_path.to_str().unwrap(),
        &Config::default(),
    );
    assert!(result.is_err());
}

#[test]
fn encode_with_custom_delimiter() {
    let td = tempdir().unwrap();
    let in_path = td.path().join("in.json");
    let out_path = td.path().join("out.upk");
    let config = Config::builder()
        .delimiter(b'~')
        .placeholder(b'_')
        .build()
        .unwrap();

    write_file(&in_path, r#"["a~b"]"#);

    encode::execute(in_path.to_str().unwrap(), out_path.to_str().unwrap(), &config).unwrap();

    let bytes = fs::read(&out_path).unwrap();
    assert_eq!(bytes.first(), Some(&b'~'));
    assert_eq!(&bytes[7..10], b"a_b");
    assert_eq!(
        scan_stream(&config, &bytes)[0].packet.payload.as_ref(),
        b"a~b"
    );
}
