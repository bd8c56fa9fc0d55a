//! Entry equivalence

use crate::domain::entities::{Entry, Node, Target};

/// Optional caller-supplied equivalence over raw targets.
pub type EquivalenceFn<'a, N> = &'a dyn Fn(&Target<N>, &Target<N>) -> Option<bool>;

/// Decide whether `candidate` and `target` denote the same selection.
///
/// Rules, first match wins:
/// 1. branch entries (up or down) are never equal to anything;
/// 2. an override that returns `Some` decides;
/// 3. free text equals free text with identical text and branch;
/// 4. nodes are equal when identity and the full path match.
pub fn is_equivalent<N: Node>(
    candidate: &Entry<N>,
    target: &Entry<N>,
    override_fn: Option<EquivalenceFn<'_, N>>,
) -> bool {
    if candidate.is_branch() || target.is_branch() {
        return false;
    }

    if let Some(decided) = override_fn.and_then(|f| f(&candidate.target, &target.target)) {
        return decided;
    }

    match (&candidate.target, &target.target) {
        (Target::FreeText(a), Target::FreeText(b)) => a.text == b.text && a.branch == b.branch,
        (Target::FreeText(_), _) | (_, Target::FreeText(_)) => false,
        (Target::Node(a), Target::Node(b)) => a == b && candidate.path == target.path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FreeText;
    use rstest::rstest;

    fn leaf(node: u32, path: &[u32]) -> Entry<u32> {
        Entry::leaf(Target::Node(node), path.to_vec())
    }

    fn text(s: &str, branch: Option<u32>) -> Entry<u32> {
        Entry::leaf(Target::FreeText(FreeText::new(s, branch)), vec![])
    }

    #[rstest]
    #[case(Entry::down_branch(1, vec![]), Entry::down_branch(1, vec![]))]
    #[case(Entry::up_branch(1, vec![]), Entry::up_branch(1, vec![]))]
    #[case(Entry::down_branch(1, vec![0]), leaf(1, &[0]))]
    #[case(leaf(1, &[0]), Entry::up_branch(1, vec![0]))]
    fn given_branch_entry_when_compared_then_never_equal(
        #[case] a: Entry<u32>,
        #[case] b: Entry<u32>,
    ) {
        let always = |_: &Target<u32>, _: &Target<u32>| Some(true);
        assert!(!is_equivalent(&a, &b, None));
        assert!(!is_equivalent(&a, &b, Some(&always)));
    }

    #[test]
    fn given_same_node_via_different_paths_when_compared_then_distinct() {
        assert!(is_equivalent(&leaf(7, &[3, 1]), &leaf(7, &[3, 1]), None));
        assert!(!is_equivalent(&leaf(7, &[3, 1]), &leaf(7, &[4, 1]), None));
        assert!(!is_equivalent(&leaf(7, &[3]), &leaf(7, &[3, 1]), None));
    }

    #[test]
    fn given_free_text_when_compared_then_text_and_branch_must_match() {
        assert!(is_equivalent(&text("xyz", Some(1)), &text("xyz", Some(1)), None));
        assert!(!is_equivalent(&text("xyz", Some(1)), &text("xyz", Some(2)), None));
        assert!(!is_equivalent(&text("xyz", None), &text("xy", None), None));
        assert!(!is_equivalent(&text("7", None), &leaf(7, &[]), None));
    }

    #[test]
    fn given_override_when_compared_then_override_decides() {
        let by_parity = |a: &Target<u32>, b: &Target<u32>| match (a.node(), b.node()) {
            (Some(x), Some(y)) => Some(x % 2 == y % 2),
            _ => None,
        };

        assert!(is_equivalent(&leaf(2, &[9]), &leaf(4, &[1]), Some(&by_parity)));
        assert!(!is_equivalent(&leaf(2, &[]), &leaf(3, &[]), Some(&by_parity)));
        // override abstains for free text, default rules apply
        assert!(is_equivalent(&text("a", None), &text("a", None), Some(&by_parity)));
    }
}
