use std::io::Cursor;

use rand::Rng;
use rand::SeedableRng;

use kmerqf::{
    build_index, build_index_with, index_stream, query_lines, query_window_counts,
    verify_estimates, CountingStructure, ExactCounter, IndexParams, KeyScheme, KmerKeyer,
    LockMode, SlotCounter, StructureParams,
};

fn random_kmers(seed: u64, n: usize, k: usize) -> Vec<String> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let dna = [b'A', b'C', b'G', b'T'];
    (0..n)
        .map(|_| (0..k).map(|_| dna[rng.gen_range(0..4)] as char).collect())
        .collect()
}

fn revcomp(kmer: &str) -> String {
    kmer.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'C' => 'G',
            'G' => 'C',
            _ => 'A',
        })
        .collect()
}

fn slot_counter(log_slots: u32, key_bits: u32) -> SlotCounter {
    SlotCounter::new(StructureParams {
        num_slots: 1 << log_slots,
        key_bits,
        value_bits: 32,
    })
    .unwrap()
}

#[test]
fn build_then_query_never_undercounts() {
    let kmer = "ACGTTGCAACGTTGCAAAAACCCCGGGGTTTA";
    let mut counter = slot_counter(4, 16);
    build_index(vec![(kmer, 7)], &mut counter, 32).unwrap();

    let hits: Vec<(usize, u64)> = query_window_counts(kmer, 32, &counter).unwrap().collect();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].1 >= 7);

    let rc = revcomp(kmer);
    let hits: Vec<(usize, u64)> = query_window_counts(&rc, 32, &counter).unwrap().collect();
    assert!(hits[0].1 >= 7);
}

#[test]
fn random_absent_kmers_mostly_miss() {
    let present = random_kmers(42, 5_000, 32);
    let absent = random_kmers(7, 5_000, 32);

    let mut counter = slot_counter(14, 32);
    build_index(present.iter().map(|k| (k.as_str(), 1)), &mut counter, 32).unwrap();

    for kmer in &present {
        let mut windows = query_window_counts(kmer, 32, &counter).unwrap();
        assert!(windows.next().unwrap().1 >= 1);
    }

    let false_positives = absent
        .iter()
        .filter(|kmer| {
            let mut windows = query_window_counts(kmer.as_str(), 32, &counter).unwrap();
            windows.next().unwrap().1 > 0
        })
        .count();
    // 5000 keys among 2^32 truncated keys
    assert!(false_positives < 10, "{} false positives", false_positives);
}

#[test]
fn window_count_matches_read_length() {
    let counter = ExactCounter::new();
    for read in random_kmers(3, 20, 110) {
        for len in &[0usize, 31, 32, 33, 70, 110] {
            let n = query_window_counts(&read[..*len], 32, &counter)
                .unwrap()
                .count();
            let expected = if *len >= 32 { len - 31 } else { 0 };
            assert_eq!(n, expected);
        }
    }
}

#[test]
fn raw_scheme_round_trips_canonical_input() {
    // k-mer counters emit the lexicographically smaller strand
    let kmers: Vec<String> = random_kmers(11, 500, 32)
        .into_iter()
        .map(|k| {
            let rc = revcomp(&k);
            if k <= rc {
                k
            } else {
                rc
            }
        })
        .collect();
    let keyer = KmerKeyer::new(32, KeyScheme::Raw).unwrap();
    let mut counter = ExactCounter::new();
    let records: Vec<(&str, u64)> = kmers.iter().map(|k| (k.as_str(), 3)).collect();
    build_index_with(records.clone(), &mut counter, &keyer, LockMode::NoLock).unwrap();

    for kmer in &kmers {
        assert!(counter.query(keyer.query_key(kmer).unwrap()) >= 3);
        assert!(counter.query(keyer.query_key(&revcomp(kmer)).unwrap()) >= 3);
    }

    let report = verify_estimates(records, &counter, &keyer).unwrap();
    assert_eq!(report.underestimated, 0);
    assert_eq!(report.records, 500);
}

#[test]
fn index_stream_from_params() {
    let params =
        IndexParams::from_json(r#"{"k": 4, "log_slots": 6, "remainder_bits": 2}"#).unwrap();
    let data = "AACG\t5\nGATT\t2\nGATT\t1\n";
    let index = index_stream(Cursor::new(data), &params).unwrap();
    assert_eq!(index.summary.records, 3);
    assert_eq!(index.summary.total_count, 8);

    assert!(index.query("AACG").unwrap() >= 5);
    assert!(index.query("CGTT").unwrap() >= 5);
    assert!(index.query("AATC").unwrap() >= 3);

    let windows: Vec<(usize, u64)> = index.window_counts("GATTACA").collect();
    assert_eq!(windows.len(), 4);
    assert!(windows[0].1 >= 3);

    let reads = query_lines(
        Cursor::new("GATTACA\nAACGTT\n"),
        &*index.structure,
        &index.keyer,
    )
    .unwrap();
    assert_eq!(reads.len(), 2);
    assert!(reads[1].counts[0] >= 5);
    assert!(reads[1].counts[2] >= 5);
}

#[test]
fn malformed_stream_fails_fast() {
    let params = IndexParams::from_json(r#"{"k": 4, "log_slots": 6}"#).unwrap();
    let res = index_stream(Cursor::new("AACG\t5\nAACG\tfive\nGATT\t1\n"), &params);
    match res {
        Err(kmerqf::KmerQfError::MalformedRecord { line, .. }) => assert_eq!(line, 2),
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("malformed count was accepted"),
    }
}
