//! MinHash signatures with LSH banding for scalable near-duplicate removal
//!
//! Shingles are hashed with `FxHasher`, which is unseeded, so signatures are
//! reproducible across runs and processes. The hash-function bank is drawn
//! from a fixed-seed splitmix64 stream.

use crate::config::MinHashConfig;
use crate::extract::dedup::{jaccard_sets, similarity_tokens};
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use std::hash::Hasher;
use std::sync::LazyLock;

/// Largest prime below 2^32
pub const MERSENNE_MOD: u64 = (1 << 32) - 5;

const BANK_SEED: u64 = 42;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("valid regex"));

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn stable_hash(shingle: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(shingle.as_bytes());
    hasher.finish() % MERSENNE_MOD
}

pub struct MinHasher {
    config: MinHashConfig,
    hash_funcs: Vec<(u64, u64)>,
}

impl MinHasher {
    pub fn new(config: &MinHashConfig) -> Self {
        let mut state = BANK_SEED;
        let hash_funcs = (0..config.signature_size)
            .map(|_| {
                let a = 1 + splitmix64(&mut state) % (MERSENNE_MOD - 1);
                let b = splitmix64(&mut state) % MERSENNE_MOD;
                (a, b)
            })
            .collect();

        Self {
            config: *config,
            hash_funcs,
        }
    }

    /// Word k-shingles of `text`; the bare token set when it has fewer than k tokens
    pub fn shingles(&self, text: &str) -> FxHashSet<String> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN.find_iter(&lowered).map(|m| m.as_str()).collect();
        let k = self.config.shingle_k.max(1);

        if tokens.len() < k {
            return tokens.into_iter().map(str::to_string).collect();
        }
        tokens.windows(k).map(|window| window.join(" ")).collect()
    }

    /// Signature of a shingle set; every slot is `MERSENNE_MOD` when the set is empty
    pub fn signature_of(&self, shingles: &FxHashSet<String>) -> Vec<u64> {
        let hashes: Vec<u64> = shingles.iter().map(|s| stable_hash(s)).collect();

        self.hash_funcs
            .iter()
            .map(|&(a, b)| {
                hashes
                    .iter()
                    .map(|&h| ((a as u128 * h as u128 + b as u128) % MERSENNE_MOD as u128) as u64)
                    .min()
                    .unwrap_or(MERSENNE_MOD)
            })
            .collect()
    }

    pub fn signature(&self, text: &str) -> Vec<u64> {
        self.signature_of(&self.shingles(text))
    }

    /// Removes near-duplicates, keeping the first occurrence
    ///
    /// Items colliding in any LSH band with an earlier kept item are
    /// confirmed with exact Jaccard similarity before being dropped.
    pub fn dedupe<T: AsRef<str>>(&self, items: Vec<T>) -> Vec<T> {
        if items.is_empty() {
            return items;
        }

        let rows = self.config.rows_per_band().max(1);
        let bands = self.config.bands.min(self.config.signature_size / rows);
        let signatures: Vec<Vec<u64>> = items.iter().map(|i| self.signature(i.as_ref())).collect();
        let tokens: Vec<FxHashSet<String>> = items
            .iter()
            .map(|i| similarity_tokens(i.as_ref()))
            .collect();

        let mut buckets: FxHashMap<(usize, Vec<u64>), Vec<usize>> = FxHashMap::default();
        let mut keep = vec![true; items.len()];

        for (idx, signature) in signatures.iter().enumerate() {
            for band in 0..bands {
                let start = band * rows;
                let key = (band, signature[start..start + rows].to_vec());
                let bucket = buckets.entry(key).or_default();

                let duplicate = bucket.iter().filter(|&&other| keep[other]).any(|&other| {
                    jaccard_sets(&tokens[idx], &tokens[other]) >= self.config.confirm_threshold
                });
                if duplicate {
                    keep[idx] = false;
                    break;
                }
                bucket.push(idx);
            }
        }

        items
            .into_iter()
            .zip(keep)
            .filter_map(|(item, kept)| kept.then_some(item))
            .collect()
    }
}

/// Convenience wrapper building a fresh [`MinHasher`]
pub fn minhash_dedupe<T: AsRef<str>>(items: Vec<T>, config: &MinHashConfig) -> Vec<T> {
    MinHasher::new(config).dedupe(items)
}
