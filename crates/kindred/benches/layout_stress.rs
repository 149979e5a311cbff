use criterion::{Criterion, criterion_group, criterion_main};
use kindred::{Engine, LayoutConfig, Person, PersonStore, TreeOptions, layout_family};
use std::hint::black_box;

/// A balanced family: every person has `fanout` children until `depth`, every second person
/// is married, and each spouse brings a short lineage.
fn synthetic_family(depth: usize, fanout: usize) -> Vec<Person> {
    let mut people = vec![Person::new("p0", "Person 0")];
    let mut frontier = vec!["p0".to_string()];
    let mut next_id = 1usize;
    for _ in 0..depth {
        let mut next = Vec::with_capacity(frontier.len() * fanout);
        for parent in &frontier {
            for _ in 0..fanout {
                let id = format!("p{next_id}");
                let mut child = Person::new(id.clone(), format!("Person {next_id}"))
                    .with_parent(parent.clone())
                    .with_birthdate(format!("{}-01-01", 1900 + next_id % 120));
                if next_id % 2 == 0 {
                    let spouse = format!("s{next_id}");
                    let elder = format!("e{next_id}");
                    child = child.with_spouse(spouse.clone());
                    people.push(Person::new(spouse, "Spouse").with_parent(elder.clone()));
                    people.push(Person::new(elder, "Elder").with_generation(1));
                }
                people.push(child);
                next.push(id);
                next_id += 1;
            }
        }
        frontier = next;
    }
    people
}

fn bench_layout_stress(c: &mut Criterion) {
    let people = synthetic_family(6, 4);
    let store = PersonStore::new(people).expect("valid synthetic family");
    let engine = Engine::new().with_options(TreeOptions {
        root: Some("p0".to_string()),
        spouse_ancestors: true,
    });
    let tree = engine
        .tree(&store)
        .expect("tree")
        .expect("non-empty family");
    let config = LayoutConfig::default();

    let mut group = c.benchmark_group("layout_stress");
    group.sample_size(30);

    group.bench_function("balanced_family_layout", |b| {
        b.iter(|| {
            let layout = layout_family(black_box(&tree.root), &config).expect("layout");
            black_box(layout.card_count());
        });
    });

    group.bench_function("balanced_family_pipeline", |b| {
        b.iter(|| {
            let chart = engine
                .chart(black_box(&store))
                .expect("chart")
                .expect("non-empty family");
            black_box(chart.layout.edges.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_layout_stress);
criterion_main!(benches);
