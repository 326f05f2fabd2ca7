//! Binary search properties of the record engine on query logs.

use querylog::records::{RecordCodec, RecordLocation};
use querylog::request::{QueryLogCodec, QueryLogRecords, QueryRecord, Timestamp};
use std::cmp::Ordering;
use std::io::Write;

/// Write records with timestamps `base + 10 * i` shifted back by up to
/// `disorder` seconds
fn disordered_log(count: u64, disorder: u64) -> (tempfile::NamedTempFile, Vec<Timestamp>) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut stamps = Vec::new();
    let mut state = 0x9e3779b97f4a7c15u64;
    for i in 0..count {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let shift = if disorder == 0 { 0 } else { state % (disorder + 1) };
        let ts = 1_000_000 + i * 10 - shift.min(i * 10);
        // Variable-length queries exercise byte-midpoint realignment
        let query = "q".repeat(1 + (state % 40) as usize);
        writeln!(file, "{}\t{}", ts, query).unwrap();
        stamps.push(ts);
    }
    file.flush().unwrap();
    (file, stamps)
}

/// First frontier not ordered before `target`
fn seek(records: &QueryLogRecords, target: Timestamp) -> RecordLocation<'_, QueryLogCodec> {
    records.locate_by(|record: &QueryRecord<'_>| {
        if record.timestamp() < target {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    })
}

#[test]
fn test_sorted_log_locate_finds_every_later_record() {
    let (file, stamps) = disordered_log(2_000, 0);
    let records = QueryLogRecords::open(file.path()).unwrap();
    let data = records.region().as_bytes();

    for target in (999_990..1_020_010).step_by(7) {
        let location = records.locate(&QueryRecord::at(target));
        let offset = location.offset();
        assert!(offset == 0 || offset == data.len() || data[offset - 1] == b'\n');

        let visited = records.iterate(location).filter(|r| r.timestamp() >= target).count();
        let expected = stamps.iter().filter(|&&ts| ts >= target).count();
        assert_eq!(visited, expected, "target {}", target);
    }
}

#[test]
fn test_jittered_seek_never_misses_records() {
    let jitter = 60;
    let (file, stamps) = disordered_log(3_000, 45);
    let records = QueryLogRecords::open(file.path()).unwrap();
    let data = records.region().as_bytes();

    for target in (1_000_000..1_030_000).step_by(113) {
        let location = seek(&records, target - jitter);
        let offset = location.offset();
        assert!(offset == 0 || offset == data.len() || data[offset - 1] == b'\n');

        let visited = records
            .iterate(location)
            .filter(|r| r.timestamp() >= target)
            .count();
        let expected = stamps.iter().filter(|&&ts| ts >= target).count();
        assert_eq!(visited, expected, "target {}", target);
    }
}

#[test]
fn test_locate_exact_returns_matching_record() {
    let (file, stamps) = disordered_log(500, 0);
    let records = QueryLogRecords::open(file.path()).unwrap();

    for &ts in stamps.iter().step_by(17) {
        let first = records
            .iterate(records.locate(&QueryRecord::at(ts)))
            .next()
            .unwrap();
        assert_eq!(first.timestamp(), ts);
    }
}

#[test]
fn test_frontiers_agree_with_decode() {
    let (file, _) = disordered_log(200, 30);
    let records = QueryLogRecords::open(file.path()).unwrap();
    let data = records.region().as_bytes();

    let mut offset = 0;
    while offset < data.len() {
        let (record, next) = QueryLogCodec::decode(data, offset);
        assert!(record.is_valid());
        for inner in offset..next {
            assert_eq!(QueryLogCodec::frontier_before(data, inner), offset);
            assert_eq!(QueryLogCodec::frontier_after(data, inner), next);
        }
        offset = next;
    }
}
