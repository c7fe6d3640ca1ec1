//! Unit tests for the VCD writer's output format.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use lanternsim_core::trace::VcdWriter;

#[test]
fn header_declares_vars_in_order() {
    let mut buf = Vec::new();
    let mut writer = VcdWriter::new(&mut buf);
    let _mosi = writer.declare("MOSI", 8);
    let _xlat = writer.declare("XLAT", 1);
    writer.write_header("lantern").unwrap();
    drop(writer);

    let text = String::from_utf8(buf).unwrap();
    let mosi_at = text.find("$var wire 8 ! MOSI $end").unwrap();
    let xlat_at = text.find("$var wire 1 \" XLAT $end").unwrap();
    assert!(mosi_at < xlat_at);
    assert!(text.find("$timescale 1 us $end").unwrap() < mosi_at);
    assert!(text.contains("$scope module lantern $end"));
    assert!(text.contains("$enddefinitions $end"));
}

#[test]
fn initial_dump_is_unknown() {
    let mut buf = Vec::new();
    let mut writer = VcdWriter::new(&mut buf);
    let _wide = writer.declare("MOSI", 8);
    let _bit = writer.declare("XLAT", 1);
    writer.write_header("lantern").unwrap();
    drop(writer);

    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("$dumpvars\nbx !\nx\"\n$end\n"));
}

#[test]
fn scalar_and_vector_changes_format_differently() {
    let mut buf = Vec::new();
    let mut writer = VcdWriter::new(&mut buf);
    let bit = writer.declare("XLAT", 1);
    let byte = writer.declare("MOSI", 8);
    writer.write_header("lantern").unwrap();
    writer.change(10, bit, 1).unwrap();
    writer.change(10, byte, 0x55).unwrap();
    drop(writer);

    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("#10\n1!\nb1010101 \"\n"));
}

#[test]
fn one_stamp_line_covers_coincident_changes() {
    let mut buf = Vec::new();
    let mut writer = VcdWriter::new(&mut buf);
    let a = writer.declare("A", 1);
    let b = writer.declare("B", 1);
    writer.write_header("top").unwrap();
    writer.change(5, a, 1).unwrap();
    writer.change(5, b, 1).unwrap();
    drop(writer);

    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.matches("#5\n").count(), 1);
}

#[test]
fn regressing_stamps_are_clamped() {
    let mut buf = Vec::new();
    let mut writer = VcdWriter::new(&mut buf);
    let a = writer.declare("A", 1);
    writer.write_header("top").unwrap();
    writer.change(50, a, 1).unwrap();
    writer.change(10, a, 0).unwrap();
    drop(writer);

    let text = String::from_utf8(buf).unwrap();
    assert!(!text.contains("#10"));
    assert!(text.contains("#50\n1!\n0!\n"));
}

#[test]
fn header_writes_only_once() {
    let mut buf = Vec::new();
    let mut writer = VcdWriter::new(&mut buf);
    let _a = writer.declare("A", 1);
    writer.write_header("top").unwrap();
    writer.write_header("top").unwrap();
    drop(writer);

    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.matches("$enddefinitions").count(), 1);
}

proptest! {
    /// Whatever the input stamps do, the stamps on disk never decrease.
    #[test]
    fn output_stamps_never_decrease(stamps in proptest::collection::vec(0u64..10_000, 1..64)) {
        let mut buf = Vec::new();
        let mut writer = VcdWriter::new(&mut buf);
        let var = writer.declare("sig", 1);
        writer.write_header("top").unwrap();
        for (i, &stamp) in stamps.iter().enumerate() {
            writer.change(stamp, var, (i % 2) as u32).unwrap();
        }
        drop(writer);

        let text = String::from_utf8(buf).unwrap();
        let written: Vec<u64> = text
            .lines()
            .filter_map(|line| line.strip_prefix('#'))
            .map(|t| t.parse().unwrap())
            .collect();
        prop_assert!(written.windows(2).all(|w| w[0] <= w[1]));
    }
}
