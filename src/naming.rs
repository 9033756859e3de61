//! Average package and class name lengths of an archive.
//!
//! Obfuscated or aggressively shaded jars tend to have very short names, so
//! this is a hint for reports rather than evidence of a version.
//!
//! Counts and length sums saturate at `u32::MAX`. That only matters for
//! archives far beyond any realistic size: a saturated count biases the
//! average low, a saturated sum biases it high.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::archive::class_entry_names;
use crate::error::Result;

const CLASS_SUFFIX: &str = ".class";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageNameLengths {
    pub package: f32,
    pub class: f32,
}

#[derive(Debug, Default)]
struct LengthTally {
    count: u32,
    total: u32,
}

impl LengthTally {
    fn add(&mut self, len: usize) {
        self.count = self.count.saturating_add(1);
        self.total = self
            .total
            .saturating_add(u32::try_from(len).unwrap_or(u32::MAX));
    }

    fn average(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.total as f32 / self.count as f32
    }
}

/// Averages over every `.class` entry name. Package segments are counted
/// once per distinct segment; class names are counted per entry.
pub fn average_name_lengths<I, S>(entry_names: I) -> AverageNameLengths
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut packages: HashSet<String> = HashSet::new();
    let mut classes = LengthTally::default();

    for name in entry_names {
        let Some(path) = name.as_ref().strip_suffix(CLASS_SUFFIX) else {
            continue;
        };
        // Zip entry names always use '/'.
        let (dirs, class_name) = match path.rsplit_once('/') {
            Some((dirs, class_name)) => (Some(dirs), class_name),
            None => (None, path),
        };
        for segment in dirs.into_iter().flat_map(|d| d.split('/')) {
            if !segment.is_empty() && !packages.contains(segment) {
                packages.insert(segment.to_string());
            }
        }
        classes.add(class_name.len());
    }

    let mut package_tally = LengthTally::default();
    for segment in &packages {
        package_tally.add(segment.len());
    }

    AverageNameLengths {
        package: package_tally.average(),
        class: classes.average(),
    }
}

pub fn average_name_lengths_in_jar(jar_path: &Path) -> Result<AverageNameLengths> {
    Ok(average_name_lengths(class_entry_names(jar_path)?))
}
