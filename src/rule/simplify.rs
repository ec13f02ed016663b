use tracing::warn;

use super::{HeadRule, Rule};

/// Upper bound on simplification passes.
const MAX_PASSES: usize = 16;

/// Result of reducing a sub-tree.
#[derive(Debug, Clone, PartialEq)]
enum Reduced {
    All,
    Nothing,
    Rule(Rule),
}

pub(super) fn remove_common(hr: &HeadRule) -> HeadRule {
    let Some(mut rule) = hr.root().cloned() else {
        return HeadRule::new();
    };
    for _ in 0..MAX_PASSES {
        match reduce(&rule) {
            Reduced::All => return HeadRule::new(),
            Reduced::Nothing => {
                warn!(rule = %hr, "rule reduces to the empty set; left unsimplified");
                return hr.clone();
            }
            Reduced::Rule(next) => {
                if next == rule {
                    break;
                }
                rule = next;
            }
        }
    }
    HeadRule::from_rule(rule)
}

fn reduce(rule: &Rule) -> Reduced {
    match rule {
        Rule::Literal(_) => Reduced::Rule(rule.clone()),
        Rule::Intersection(items) => reduce_group(items, true),
        Rule::Union(items) => reduce_group(items, false),
    }
}

/// Reduces an intersection (`is_and`) or union.
///
/// For an intersection: `A A = A`, `A -A = {}`, `A (A : B) = A` and
/// `A (-A : B) = A B`. The union case applies the duals.
fn reduce_group(items: &[Rule], is_and: bool) -> Reduced {
    // Absorbing and neutral elements for this operator
    let (absorbing, neutral) = if is_and {
        (Reduced::Nothing, Reduced::All)
    } else {
        (Reduced::All, Reduced::Nothing)
    };

    let mut flat: Vec<Rule> = Vec::with_capacity(items.len());
    for item in items {
        match reduce(item) {
            r if r == absorbing => return absorbing,
            r if r == neutral => {}
            Reduced::Rule(r) => push_flat(&mut flat, r, is_and),
            Reduced::All | Reduced::Nothing => {}
        }
    }

    // Duplicates and complementary pairs
    let mut unique: Vec<Rule> = Vec::with_capacity(flat.len());
    for item in flat {
        if unique.contains(&item) {
            continue;
        }
        if unique.contains(&item.complement()) {
            return absorbing;
        }
        unique.push(item);
    }

    // Absorption and complement elimination against the sibling terms
    let siblings: Vec<Rule> = unique
        .iter()
        .filter(|r| !is_dual(r, is_and))
        .cloned()
        .collect();
    let mut out: Vec<Rule> = Vec::with_capacity(unique.len());
    for item in unique {
        let Some(sub) = dual_items(&item, is_and) else {
            out.push(item);
            continue;
        };
        if sub.iter().any(|s| siblings.contains(s)) {
            continue;
        }
        let kept: Vec<Rule> = sub
            .iter()
            .filter(|s| !siblings.contains(&s.complement()))
            .cloned()
            .collect();
        if kept.is_empty() {
            return absorbing;
        }
        let rebuilt = if is_and { Rule::or(kept) } else { Rule::and(kept) };
        push_flat(&mut out, rebuilt, is_and);
    }

    match out.len() {
        0 => neutral,
        1 => Reduced::Rule(out.swap_remove(0)),
        _ if is_and => Reduced::Rule(Rule::Intersection(out)),
        _ => Reduced::Rule(Rule::Union(out)),
    }
}

fn push_flat(out: &mut Vec<Rule>, rule: Rule, is_and: bool) {
    match (is_and, rule) {
        (true, Rule::Intersection(sub)) | (false, Rule::Union(sub)) => out.extend(sub),
        (_, other) => out.push(other),
    }
}

/// True when `rule` is the opposite operator of the group being reduced.
fn is_dual(rule: &Rule, is_and: bool) -> bool {
    matches!(
        (is_and, rule),
        (true, Rule::Union(_)) | (false, Rule::Intersection(_))
    )
}

fn dual_items(rule: &Rule, is_and: bool) -> Option<&[Rule]> {
    match (is_and, rule) {
        (true, Rule::Union(sub)) | (false, Rule::Intersection(sub)) => Some(sub),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::{same_region, sample_rules, test_registry};
    use super::*;

    fn simplify(s: &str) -> String {
        HeadRule::parse(s).unwrap().remove_common().to_string()
    }

    #[test]
    fn duplicates_are_removed() {
        assert_eq!(simplify("1 2 1 -3 2"), "1 2 -3");
        assert_eq!(simplify("1 : 2 : 1"), "1 : 2");
    }

    #[test]
    fn absorption() {
        assert_eq!(simplify("1 (1 : 2)"), "1");
        assert_eq!(simplify("1 : 1 2"), "1");
        assert_eq!(simplify("3 1 (2 : 1 : 4)"), "3 1");
    }

    #[test]
    fn complement_elimination() {
        assert_eq!(simplify("1 (-1 : 2)"), "1 2");
        assert_eq!(simplify("1 : -1 2"), "1 : 2");
        assert_eq!(simplify("1 (-1 : 2 : 3)"), "1 (2 : 3)");
    }

    #[test]
    fn tautology_collapses_to_empty() {
        assert!(HeadRule::parse("1 : -1").unwrap().remove_common().is_empty());
        assert!(HeadRule::parse("(1 : -1) (2 : -2)").unwrap().remove_common().is_empty());
    }

    #[test]
    fn contradiction_is_left_unchanged() {
        let hr = HeadRule::parse("1 -1 2").unwrap();
        assert_eq!(hr.remove_common(), hr);
    }

    #[test]
    fn simplification_preserves_membership() {
        let reg = test_registry();
        for hr in sample_rules() {
            let simple = hr.remove_common();
            assert!(simple.len() <= hr.len());
            assert!(same_region(&hr, &simple, &reg), "{hr} -> {simple}");
        }
    }

    #[test]
    fn nested_complement_groups() {
        let reg = test_registry();
        let hr = HeadRule::parse("-4 #(4 : 1) (1 : -2) #(4 2)").unwrap();
        let simple = hr.remove_common();
        assert!(same_region(&hr, &simple, &reg));
        assert!(simple.len() < hr.len());
    }
}
