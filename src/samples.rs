//! Sample identity by filename convention.
//!
//! Raw reads are `<sample>_1.fastq` / `<sample>_2.fastq`; trimmed pairs are
//! `<sample>_1_paired.fastq` / `<sample>_2_paired.fastq`. Everything here is
//! suffix matching on file names, kept apart from directory scanning so the
//! rules can be tested on plain strings.

use crate::errors::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const FORWARD_READ_SUFFIX: &str = "_1.fastq";
pub const REVERSE_READ_SUFFIX: &str = "_2.fastq";
pub const PAIRED_SUFFIX: &str = "_paired.fastq";
pub const FORWARD_PAIRED_SUFFIX: &str = "_1_paired.fastq";
pub const REVERSE_PAIRED_SUFFIX: &str = "_2_paired.fastq";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn mate(self) -> u8 {
        match self {
            Self::Forward => 1,
            Self::Reverse => 2,
        }
    }
}

/// A paired-end sample found in the raw reads directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSample {
    pub name: String,
    pub forward: PathBuf,
    pub reverse: PathBuf,
}

/// The trimmed files grouped under one sample key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrimmedPair {
    pub forward: Option<String>,
    pub reverse: Option<String>,
}

impl TrimmedPair {
    pub fn complete(&self) -> Option<(&str, &str)> {
        Some((self.forward.as_deref()?, self.reverse.as_deref()?))
    }
}

/// Sample key of a raw forward-read file name, or `None` if the name does not
/// follow `<sample>_1.fastq`.
pub fn raw_sample_key(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(FORWARD_READ_SUFFIX)
        .filter(|sample| !sample.is_empty())
}

/// Sample key and direction of a trimmed paired file name. Names ending in
/// `_paired.fastq` without a mate number yield the bare stem and no
/// direction, so they form a group that can never be complete.
pub fn trimmed_pair_key(file_name: &str) -> Option<(&str, Option<Direction>)> {
    if let Some(sample) = file_name.strip_suffix(FORWARD_PAIRED_SUFFIX) {
        return Some((sample, Some(Direction::Forward)));
    }
    if let Some(sample) = file_name.strip_suffix(REVERSE_PAIRED_SUFFIX) {
        return Some((sample, Some(Direction::Reverse)));
    }
    file_name.strip_suffix(PAIRED_SUFFIX).map(|stem| (stem, None))
}

pub fn trimmed_output_name(sample: &str, direction: Direction, paired: bool) -> String {
    let kind = if paired { "paired" } else { "unpaired" };
    format!("{sample}_{}_{kind}.fastq", direction.mate())
}

/// Scans `fastq_dir` for raw forward reads. Only the forward file must exist;
/// the reverse path is derived and may be missing. Sorted by sample name.
pub fn discover_raw_samples(fastq_dir: &Path) -> Result<Vec<RawSample>> {
    let mut samples = Vec::new();
    for name in list_file_names(fastq_dir)? {
        if let Some(sample) = raw_sample_key(&name) {
            samples.push(RawSample {
                name: sample.to_string(),
                forward: fastq_dir.join(&name),
                reverse: fastq_dir.join(format!("{sample}{REVERSE_READ_SUFFIX}")),
            });
        }
    }
    samples.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(samples)
}

/// Groups trimmed file names by sample key, ordered by key.
pub fn group_trimmed_pairs<I, S>(file_names: I) -> BTreeMap<String, TrimmedPair>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names: Vec<String> = file_names
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .filter(|name| name.ends_with(PAIRED_SUFFIX))
        .collect();
    names.sort();

    let mut groups: BTreeMap<String, TrimmedPair> = BTreeMap::new();
    for name in names {
        let Some((sample, direction)) = trimmed_pair_key(&name) else {
            continue;
        };
        let entry = groups.entry(sample.to_string()).or_default();
        match direction {
            Some(Direction::Forward) => entry.forward = Some(name.clone()),
            Some(Direction::Reverse) => entry.reverse = Some(name.clone()),
            None => {}
        }
    }
    groups
}

/// Names of the files directly inside `dir`, sorted. Symlinks count when
/// their target is a regular file.
pub fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => names.push(name.to_string()),
            None => warn!(path = %path.display(), "skipping file with non-UTF-8 name"),
        }
    }
    names.sort();
    Ok(names)
}
