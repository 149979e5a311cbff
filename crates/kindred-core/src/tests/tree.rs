use super::person;
use crate::*;

fn build(people: &[Person], options: &TreeOptions) -> Option<FamilyTree> {
    let rel = Relations::resolve(people).unwrap();
    build_tree(&rel, options)
}

fn ids(nodes: &[FamilyNode]) -> Vec<&str> {
    nodes.iter().map(FamilyNode::id).collect()
}

#[test]
fn empty_input_builds_nothing() {
    assert!(build(&[], &TreeOptions::default()).is_none());
}

#[test]
fn children_sorted_by_birthdate_with_undated_last() {
    let people = vec![
        person("r", None),
        person("x", Some("r")).with_birthdate("1990-01-01"),
        person("y", Some("r")).with_birthdate("1985-05-05"),
        person("z", Some("r")),
    ];
    let tree = build(&people, &TreeOptions::default()).unwrap();
    let dates: Vec<&str> = tree
        .root
        .children
        .iter()
        .map(|c| c.person.birthdate.as_str())
        .collect();
    assert_eq!(dates, ["1985-05-05", "1990-01-01", ""]);
}

#[test]
fn undated_children_keep_input_order() {
    let people = vec![
        person("r", None),
        person("u1", Some("r")),
        person("d", Some("r")).with_birthdate("2000-01-01"),
        person("u2", Some("r")),
    ];
    let tree = build(&people, &TreeOptions::default()).unwrap();
    assert_eq!(ids(&tree.root.children), ["d", "u1", "u2"]);
}

#[test]
fn root_is_lowest_generation_candidate_first_on_ties() {
    let people = vec![
        person("late", None).with_generation(2),
        person("first", None).with_generation(0),
        person("second", None).with_generation(0),
    ];
    let tree = build(&people, &TreeOptions::default()).unwrap();
    assert_eq!(tree.root.id(), "first");
    assert_eq!(tree.report.root_candidates, 3);
    assert_eq!(tree.report.excluded, 2);
}

#[test]
fn explicit_root_overrides_policy_and_unknown_root_falls_back() {
    let people = vec![person("r", None), person("a", Some("r"))];
    let picked = build(
        &people,
        &TreeOptions {
            root: Some("a".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(picked.root.id(), "a");

    let fallback = build(
        &people,
        &TreeOptions {
            root: Some("nobody".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(fallback.root.id(), "r");
}

#[test]
fn mutual_parent_cycle_terminates_with_truncated_leaf() {
    let people = vec![
        person("a", Some("b")).with_generation(1),
        person("b", Some("a")).with_generation(2),
    ];
    let tree = build(&people, &TreeOptions::default()).unwrap();
    assert_eq!(tree.root.id(), "a");
    assert_eq!(tree.report.root_candidates, 0);
    assert_eq!(tree.report.truncated, 1);

    let b = &tree.root.children[0];
    assert_eq!(b.id(), "b");
    let back = &b.children[0];
    assert_eq!(back.id(), "a");
    assert!(back.truncated);
    assert!(back.is_leaf());
}

#[test]
fn spouse_attached_as_plain_person() {
    let people = vec![
        person("r", None).with_spouse("s"),
        person("s", None),
        person("a", Some("r")),
    ];
    let tree = build(&people, &TreeOptions::default()).unwrap();
    assert_eq!(tree.root.spouse.as_ref().map(|p| p.id.as_str()), Some("s"));
    assert_eq!(tree.root.len(), 2);
    assert_eq!(tree.report.excluded, 0);
}

#[test]
fn spouse_lineage_attached_only_when_requested() {
    // r → a; a married s, whose parent p and grandparent g live outside r's tree.
    let people = vec![
        person("r", None),
        person("a", Some("r")).with_spouse("s"),
        person("g", None).with_generation(-2),
        person("p", Some("g")).with_spouse("pm"),
        person("pm", None),
        person("s", Some("p")),
    ];
    let plain = build(
        &people,
        &TreeOptions {
            root: Some("r".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(plain.root.children[0].spouse_ancestors.is_none());

    let merged = build(
        &people,
        &TreeOptions {
            root: Some("r".into()),
            spouse_ancestors: true,
        },
    )
    .unwrap();
    let lineage = merged.root.children[0].spouse_ancestors.as_deref().unwrap();
    assert_eq!(lineage.id(), "p");
    assert_eq!(lineage.spouse.as_ref().map(|p| p.id.as_str()), Some("pm"));
    assert_eq!(ids(&lineage.children), ["g"]);
    assert_eq!(merged.report.lineage_nodes, 2);
    assert_eq!(merged.report.excluded, 0);
}

#[test]
fn spouse_lineage_skips_people_already_in_tree() {
    // a and b are cousins who married each other; b's parent is already in the tree.
    let people = vec![
        person("r", None),
        person("p1", Some("r")),
        person("p2", Some("r")),
        person("a", Some("p1")).with_spouse("b"),
        person("b", Some("p2")),
    ];
    let tree = build(
        &people,
        &TreeOptions {
            spouse_ancestors: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(tree.root.walk().all(|n| n.spouse_ancestors.is_none()));
    assert_eq!(tree.report.lineage_nodes, 0);
}

#[test]
fn walk_visits_every_reachable_person_once() {
    let people = vec![
        person("r", None),
        person("a", Some("r")),
        person("b", Some("r")),
        person("c", Some("a")),
        person("island", None).with_generation(5),
    ];
    let tree = build(&people, &TreeOptions::default()).unwrap();
    let walked: Vec<&str> = tree.root.walk().map(FamilyNode::id).collect();
    assert_eq!(walked, ["r", "a", "c", "b"]);
    assert_eq!(tree.report.reachable, 4);
    assert_eq!(tree.report.excluded, 1);
}

#[test]
fn build_from_store_resolves_and_builds() {
    let store = PersonStore::new(vec![person("r", None), person("a", Some("r"))]).unwrap();
    let tree = build_from_store(&store, &TreeOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(tree.root.find("a").map(FamilyNode::id), Some("a"));
}

#[test]
fn self_parent_is_a_one_person_cycle() {
    for policy in [LoadPolicy::Strict, LoadPolicy::Lenient] {
        let records = vec![Person::new("a", "A").with_parent("a")];
        let store = PersonStore::load(records, policy).unwrap();
        assert_eq!(store.len(), 1);

        let tree = build_from_store(&store, &TreeOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(tree.root.id(), "a");
        assert_eq!(tree.report.root_candidates, 0);
        assert_eq!(tree.report.truncated, 1);
        assert_eq!(tree.report.excluded, 0);
        assert_eq!(ids(&tree.root.children), ["a"]);
        assert!(tree.root.children[0].truncated);
    }
}

fn chain(prefix: &str, len: usize) -> Vec<Person> {
    (0..len)
        .map(|i| {
            let id = format!("{prefix}{i}");
            let parent = i.checked_sub(1).map(|p| format!("{prefix}{p}"));
            person(&id, parent.as_deref()).with_generation(i as i32)
        })
        .collect()
}

#[test]
fn descendants_below_the_depth_cap_are_dropped() {
    let people = chain("p", MAX_DEPTH + 50);
    let tree = build(&people, &TreeOptions::default()).unwrap();
    assert_eq!(tree.root.len(), MAX_DEPTH + 1);
    assert_eq!(tree.report.depth_limited, 1);
    assert_eq!(tree.report.reachable, MAX_DEPTH + 1);
    assert_eq!(tree.report.excluded, 49);

    let deepest = tree.root.walk().last().unwrap();
    assert_eq!(deepest.id(), format!("p{MAX_DEPTH}"));
    assert!(deepest.is_leaf());
    assert!(!deepest.truncated);
}

#[test]
fn spouse_lineage_stops_at_the_depth_cap() {
    // The spouse's ancestry is a chain a0 (oldest) .. a299, and s is a299's child.
    let mut people = vec![person("r", None).with_spouse("s")];
    people.extend(chain("a", 300));
    people.push(person("s", Some("a299")));
    let tree = build(
        &people,
        &TreeOptions {
            root: Some("r".into()),
            spouse_ancestors: true,
        },
    )
    .unwrap();
    assert_eq!(tree.report.lineage_nodes, MAX_DEPTH);
    assert_eq!(tree.report.depth_limited, 1);
    assert_eq!(tree.report.excluded, 300 - MAX_DEPTH);
    let lineage = tree.root.spouse_ancestors.as_deref().unwrap();
    assert_eq!(lineage.id(), "a299");
}
