use std::collections::{BTreeMap, BTreeSet};

/// Partition of two path sets: `removed` only in old, `common` in both,
/// `added` only in new. Direction (which tree is "old") is the caller's
/// choice — push and pull use opposite orientations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetDiff {
    pub removed: BTreeSet<String>,
    pub common: BTreeSet<String>,
    pub added: BTreeSet<String>,
}

impl SetDiff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Compute the (removed, common, added) partition of `old` and `new`.
pub fn diff_sets(old: &BTreeSet<String>, new: &BTreeSet<String>) -> SetDiff {
    SetDiff {
        removed: old.difference(new).cloned().collect(),
        common: old.intersection(new).cloned().collect(),
        added: new.difference(old).cloned().collect(),
    }
}

fn depth(path: &str) -> usize {
    path.split('/').count()
}

/// Order paths so children come before their parents. Used for deletions,
/// where a directory must be empty before it can be removed.
pub fn deepest_first(paths: &BTreeSet<String>) -> Vec<String> {
    let mut out: Vec<String> = paths.iter().cloned().collect();
    out.sort_by(|a, b| depth(b).cmp(&depth(a)).then_with(|| a.cmp(b)));
    out
}

/// Order paths so parents come before their children. Used for creations.
pub fn shallowest_first(paths: &BTreeSet<String>) -> Vec<String> {
    let mut out: Vec<String> = paths.iter().cloned().collect();
    out.sort_by(|a, b| depth(a).cmp(&depth(b)).then_with(|| a.cmp(b)));
    out
}

/// Group file paths by their parent directory (`""` for the root). The VSS
/// client binds a destination project per add, so adds are batched per
/// directory.
pub fn group_by_parent(files: &BTreeSet<String>) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for file in files {
        let parent = match file.rfind('/') {
            Some(idx) => file[..idx].to_string(),
            None => String::new(),
        };
        groups.entry(parent).or_default().push(file.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diff_partitions_correctly() {
        let old = set(&["README", "src/main", "docs/guide"]);
        let new = set(&["src/main", "src/util", "docs/guide"]);
        let diff = diff_sets(&old, &new);

        assert_eq!(diff.removed, set(&["README"]));
        assert_eq!(diff.common, set(&["src/main", "docs/guide"]));
        assert_eq!(diff.added, set(&["src/util"]));

        // removed ∪ common = old, common ∪ added = new, removed ∩ added = ∅
        let mut reunion = diff.removed.clone();
        reunion.extend(diff.common.iter().cloned());
        assert_eq!(reunion, old);
        let mut newnion = diff.common.clone();
        newnion.extend(diff.added.iter().cloned());
        assert_eq!(newnion, new);
        assert!(diff.removed.intersection(&diff.added).next().is_none());
    }

    #[test]
    fn diff_is_symmetric_under_swap() {
        let a = set(&["x", "y", "shared"]);
        let b = set(&["shared", "z"]);
        let forward = diff_sets(&a, &b);
        let backward = diff_sets(&b, &a);

        assert_eq!(forward.removed, backward.added);
        assert_eq!(forward.added, backward.removed);
        assert_eq!(forward.common, backward.common);
    }

    #[test]
    fn diff_of_identical_sets_is_empty() {
        let a = set(&["one", "two"]);
        let diff = diff_sets(&a, &a);
        assert!(diff.is_empty());
        assert_eq!(diff.common, a);
    }

    #[test]
    fn deletion_order_places_children_before_parents() {
        let dirs = set(&["x", "x/y", "x/y/z"]);
        assert_eq!(deepest_first(&dirs), vec!["x/y/z", "x/y", "x"]);
    }

    #[test]
    fn creation_order_places_parents_before_children() {
        let dirs = set(&["a/b/c", "a", "a/b"]);
        assert_eq!(shallowest_first(&dirs), vec!["a", "a/b", "a/b/c"]);
    }

    #[test]
    fn group_by_parent_batches_per_directory() {
        let files = set(&["README", "src/util", "src/main", "docs/guide"]);
        let groups = group_by_parent(&files);

        assert_eq!(groups[""], vec!["README"]);
        assert_eq!(groups["src"], vec!["src/main", "src/util"]);
        assert_eq!(groups["docs"], vec!["docs/guide"]);
    }
}
