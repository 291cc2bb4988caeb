// synthetic.rs - Deterministic GISAID-style FASTA generator for benchmarks and tests

use chrono::{Duration, NaiveDate};

const SUBTYPES: [&str; 4] = ["A_/_H3N2", "A_/_H1N1", "A_/_H5N1", "A_/_H1N2"];
const SEGMENTS: [&str; 8] = ["HA", "NA", "PB2", "PB1", "PA", "NP", "M", "NS"];
const CLADES: [&str; 8] = [
    "3C.2a1b.2a.2a",
    "3C.2a1b.2a.2a1",
    "3C.3a",
    "6B.1A.5a.2a",
    "6B.1A.5a.1",
    "2.3.4.4b",
    "3C.2a",
    "6B.1A",
];

/// Place names used in isolate names. The Cyrillic half exercises UTF-8 handling.
pub const SYNTHETIC_LOCATIONS: [&str; 23] = [
    "California",
    "Texas",
    "New_York",
    "Florida",
    "Illinois",
    "Beijing",
    "Shanghai",
    "Tokyo",
    "Seoul",
    "Bangkok",
    "London",
    "Berlin",
    "Paris",
    "Amsterdam",
    "Stockholm",
    "Новосибирск",
    "Москва",
    "Екатеринбург",
    "Владивосток",
    "Омск",
    "Красноярск",
    "Хабаровск",
    "Иркутск",
];

/// Collection dates span 2020-01-01 ..= 2023-12-31
const DATE_SPAN_DAYS: u64 = 4 * 365;
const MIN_LENGTH: u64 = 1600;
const MAX_LENGTH: u64 = 1800;
const N_RUN_RATE: f64 = 0.05;

/// Minimal deterministic PRNG (xoshiro256**)
pub struct SyntheticRng {
    state: [u64; 4],
}

impl SyntheticRng {
    pub fn new(seed: u64) -> Self {
        let mut state = [0u64; 4];
        let mut x = seed;
        for slot in &mut state {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = self.state[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `lo..=hi`
    pub fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64() as usize % items.len()]
    }
}

/// Build a FASTA text of `n_sequences` standard 6-field records:
/// mixed subtypes and segments, human/avian/swine isolates (70/15/15),
/// hierarchical clades, 1600-1800 bp bodies and an N-run in about 5% of them.
/// The same seed always gives the same text.
pub fn generate_sample_gisaid(n_sequences: usize, seed: u64) -> String {
    let Some(base_date) = NaiveDate::from_ymd_opt(2020, 1, 1) else {
        return String::new();
    };
    let mut rng = SyntheticRng::new(seed);
    let mut out = String::with_capacity(n_sequences * (MAX_LENGTH as usize + 80));

    for i in 0..n_sequences {
        let subtype = *rng.choose(&SUBTYPES);
        let segment = *rng.choose(&SEGMENTS);
        let location = *rng.choose(&SYNTHETIC_LOCATIONS);
        let clade = *rng.choose(&CLADES);
        let accession = format!("EPI_ISL_{}", rng.range(100_000, 9_999_999));
        let offset_days = rng.range(0, DATE_SPAN_DAYS);
        let date = base_date + Duration::days(offset_days as i64);
        let year = 2020 + offset_days / 365;

        let host_roll = rng.next_f64();
        let isolate = if host_roll < 0.70 {
            format!("A/{}/{}/{}", location, i + 1, year)
        } else if host_roll < 0.85 {
            format!("A/duck/{}/{}/{}", location, i + 1, year)
        } else {
            format!("A/swine/{}/{}/{}", location, i + 1, year)
        };

        let length = rng.range(MIN_LENGTH, MAX_LENGTH) as usize;
        let mut sequence: Vec<u8> = (0..length).map(|_| *rng.choose(b"ACGT")).collect();
        if rng.next_f64() < N_RUN_RATE {
            let start = rng.range(0, (length - 30) as u64) as usize;
            let run = rng.range(10, 25) as usize;
            sequence[start..start + run].fill(b'N');
        }

        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            ">{}|{}|{}|{}|{}|{}\n",
            isolate,
            subtype,
            segment,
            date.format("%Y-%m-%d"),
            accession,
            clade
        ));
        out.push_str(&String::from_utf8_lossy(&sequence));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::refine::max_n_run;
    use crate::data::fasta::parse_fasta;
    use crate::hashers::{Md5Hasher, HASH_LENGTH};

    #[test]
    fn test_generator_is_deterministic() {
        assert_eq!(generate_sample_gisaid(50, 7), generate_sample_gisaid(50, 7));
        assert_ne!(generate_sample_gisaid(50, 7), generate_sample_gisaid(50, 8));
        assert!(generate_sample_gisaid(0, 7).is_empty());
    }

    #[test]
    fn test_rng_bounds() {
        let mut rng = SyntheticRng::new(42);
        for _ in 0..1_000 {
            let v = rng.range(10, 25);
            assert!((10..=25).contains(&v));
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_ten_thousand_synthetic_records() {
        let text = generate_sample_gisaid(10_000, 42);
        let batch = parse_fasta(&text, &Md5Hasher).unwrap();
        let records = batch.records;
        assert_eq!(records.len(), 10_000);

        let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let mut hosts = [0usize; 3];
        for record in &records {
            assert!((1600..=1800).contains(&record.sequence_length));
            assert_eq!(record.sequence_length, record.sequence.len());
            assert_eq!(record.sequence_hash.len(), HASH_LENGTH);
            assert!(["H3N2", "H1N1", "H5N1", "H1N2"].contains(&record.subtype_clean.as_str()));
            assert!(record.accession.starts_with("EPI_ISL_"));
            let date = record.collection_date.unwrap();
            assert!(date >= first && date <= last);
            assert!(record.clade_level(1).is_some());
            let location = record.location.as_deref().unwrap();
            assert!(SYNTHETIC_LOCATIONS.contains(&location), "location {}", location);
            match record.host.as_deref() {
                Some("Human") => hosts[0] += 1,
                Some("Avian") => hosts[1] += 1,
                Some("Mammalian") => hosts[2] += 1,
                other => panic!("unexpected host {:?}", other),
            }
        }
        assert!(hosts[0] > hosts[1] && hosts[0] > hosts[2]);
        assert!(hosts[1] > 0 && hosts[2] > 0);

        let clean = max_n_run(&records, 10);
        let with_runs = records.len() - clean.len();
        assert!(with_runs > 200 && with_runs < 800, "{} records with N-runs", with_runs);
        assert!(records.iter().any(|r| r.location.as_deref() == Some("Новосибирск")));
    }
}
