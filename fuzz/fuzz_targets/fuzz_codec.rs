#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use querylog::records::RecordCodec;
use querylog::request::{QueryLogCodec, QueryLogRecords, QueryRecord};
use std::cmp::Ordering;
use std::io::Write;

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    points: Vec<u16>,
}

fuzz_target!(|input: Input| {
    let data = &input.data;

    // Decoding from offset 0 must terminate and only visit frontiers
    let mut offset = 0;
    let mut decoded = 0;
    while offset < data.len() {
        let (_, next) = QueryLogCodec::decode(data, offset);
        assert!(next > offset && next <= data.len());
        offset = next;
        decoded += 1;
    }

    // Frontiers found from arbitrary offsets must bracket the offset
    for &point in &input.points {
        let at = point as usize % (data.len() + 1);
        let before = QueryLogCodec::frontier_before(data, at);
        let after = QueryLogCodec::frontier_after(data, at);
        assert!(before <= at);
        assert!(after >= at && after <= data.len());
        assert!(before == 0 || data[before - 1] == b'\n');
    }

    // The mapped engine sees the same records and always seeks to a frontier
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    let records = QueryLogRecords::open(file.path()).unwrap();
    assert_eq!(records.iterate(records.begin()).count(), decoded);

    for &point in &input.points {
        let target = point as u64;
        let location = records.locate_by(|record: &QueryRecord<'_>| {
            if record.timestamp() < target {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });
        let at = location.offset();
        assert!(at <= data.len());
        assert!(at == 0 || data[at - 1] == b'\n');
        records.iterate(location).for_each(drop);
    }
});
