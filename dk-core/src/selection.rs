//! Candidate disambiguation
//!
//! When more than one package version folder matches, the resolver asks a
//! [`Disambiguator`] to pick one. The default policy is deterministic and
//! headless; the CLI plugs in an interactive chooser.

use std::cmp::Ordering;

use crate::library::PackageVersionFolder;

/// Strategy for choosing one of several matching version folders
///
/// Implementations receive at least two candidates, sorted by name, and return
/// the index of the chosen one. `None` declines the choice.
#[cfg_attr(test, mockall::automock)]
pub trait Disambiguator {
    fn choose(&self, candidates: &[PackageVersionFolder]) -> Option<usize>;
}

/// Newest modification time wins; ties go to the greatest name
#[derive(Debug, Clone, Copy, Default)]
pub struct NewestFirst;

impl Disambiguator for NewestFirst {
    fn choose(&self, candidates: &[PackageVersionFolder]) -> Option<usize> {
        candidates
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| newest_first_order(a, b))
            .map(|(index, _)| index)
    }
}

/// Closures work as ad hoc strategies
impl<F> Disambiguator for F
where
    F: Fn(&[PackageVersionFolder]) -> Option<usize>,
{
    fn choose(&self, candidates: &[PackageVersionFolder]) -> Option<usize> {
        self(candidates)
    }
}

/// Ordering used by [`NewestFirst`]: greater means preferred
///
/// A folder without a readable timestamp ranks below any folder with one.
pub fn newest_first_order(a: &PackageVersionFolder, b: &PackageVersionFolder) -> Ordering {
    a.modified
        .cmp(&b.modified)
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn folder(name: &str, age_secs: Option<u64>) -> PackageVersionFolder {
        PackageVersionFolder {
            name: name.to_string(),
            path: PathBuf::from("/lib").join(name),
            modified: age_secs.map(|s| SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 - s)),
        }
    }

    #[test]
    fn test_newest_wins() {
        let candidates = vec![folder("a", Some(10)), folder("b", Some(500)), folder("c", Some(90))];
        assert_eq!(NewestFirst.choose(&candidates), Some(0));
    }

    #[test]
    fn test_tie_breaks_on_greatest_name() {
        let candidates = vec![folder("30.0", Some(5)), folder("31.0", Some(5)), folder("29.0", Some(5))];
        assert_eq!(NewestFirst.choose(&candidates), Some(1));
    }

    #[test]
    fn test_missing_timestamp_ranks_last() {
        let candidates = vec![folder("zzz", None), folder("aaa", Some(1000))];
        assert_eq!(NewestFirst.choose(&candidates), Some(1));
    }

    #[test]
    fn test_empty_candidates() {
        assert_eq!(NewestFirst.choose(&[]), None);
    }

    #[test]
    fn test_closure_strategy() {
        let first = |_: &[PackageVersionFolder]| Some(0usize);
        let candidates = vec![folder("a", Some(1)), folder("b", Some(2))];
        assert_eq!(first.choose(&candidates), Some(0));
    }
}
