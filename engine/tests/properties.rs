mod common;

use common::{recommender, Dish};
use engine::{Constraint, Query, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K};
use proptest::prelude::*;

const PANTRY: &[&str] = &[
    "chicken", "rice", "beef", "curry", "onion", "garlic", "tomato", "basil", "pasta", "cheese",
    "egg", "flour",
];
const LEVELS: &[&str] = &["easy", "medium", "hard"];

#[derive(Debug, Clone)]
struct Row {
    ingredients: String,
    total_time: Option<f64>,
    difficulty: Option<&'static str>,
    rating: Option<f64>,
}

fn words(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(PANTRY), 0..max).prop_map(|w| w.join(" "))
}

fn row() -> impl Strategy<Value = Row> {
    (
        words(5),
        prop::option::of(0u32..120),
        prop::option::of(prop::sample::select(LEVELS)),
        prop::option::of(0u32..=10),
    )
        .prop_map(|(ingredients, time, difficulty, rating)| Row {
            ingredients,
            total_time: time.map(f64::from),
            difficulty,
            rating: rating.map(|r| f64::from(r) / 2.0),
        })
}

fn query() -> impl Strategy<Value = Query> {
    (
        words(4),
        prop::option::of(0u32..120),
        prop::option::of(prop::sample::select(LEVELS)),
        prop::option::of(0u32..=10),
    )
        .prop_map(|(ingredients, time, difficulty, rating)| {
            let mut q = Query::new(ingredients);
            if let Some(t) = time { q = q.max_time(f64::from(t)); }
            if let Some(d) = difficulty { q = q.difficulty(d); }
            if let Some(r) = rating { q = q.min_rating(f64::from(r) / 2.0); }
            q
        })
}

fn dishes(rows: &[Row]) -> Vec<Dish<'_>> {
    rows.iter()
        .map(|r| Dish {
            name: "dish",
            ingredients: &r.ingredients,
            total_time: r.total_time,
            difficulty: r.difficulty,
            rating: r.rating,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn results_respect_threshold_bound_and_order(rows in prop::collection::vec(row(), 1..30), q in query()) {
        let engine = recommender(&dishes(&rows));
        let results = engine.recommend(&q);

        prop_assert!(results.len() <= DEFAULT_TOP_K);
        for r in &results {
            prop_assert!(r.similarity > DEFAULT_SIMILARITY_THRESHOLD);
            prop_assert!(r.similarity <= 1.0);
        }
        for pair in results.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                a.similarity > b.similarity || (a.similarity == b.similarity && a.rating >= b.rating),
                "out of order: {:?} before {:?}", (a.similarity, a.rating), (b.similarity, b.rating)
            );
        }
    }

    #[test]
    fn results_satisfy_every_constraint(rows in prop::collection::vec(row(), 1..30), q in query()) {
        let engine = recommender(&dishes(&rows));
        for r in engine.recommend(&q) {
            let source = &rows[r.id];
            if let Constraint::Value(max) = q.max_time {
                prop_assert!(source.total_time.is_some());
                prop_assert!(source.total_time.unwrap() <= max);
            }
            if let Constraint::Value(d) = &q.difficulty {
                prop_assert_eq!(source.difficulty, Some(d.as_str()));
            }
            if let Constraint::Value(min) = q.min_rating {
                prop_assert!(source.rating.unwrap_or(0.0) >= min);
            }
            prop_assert_eq!(r.rating, source.rating.unwrap_or(0.0));
        }
    }

    #[test]
    fn index_rows_line_up_with_catalog_rows(rows in prop::collection::vec(row(), 1..30)) {
        let engine = recommender(&dishes(&rows));
        prop_assert_eq!(engine.index().len(), engine.catalog().len());
        for recipe in engine.catalog() {
            let text = &recipe.extra["ingredients"];
            prop_assert_eq!(&rows[recipe.id].ingredients, text);
            let expected = engine.index().vectorizer().transform(text);
            prop_assert_eq!(engine.index().row(recipe.id), Some(&expected));
        }
    }

    #[test]
    fn recommend_is_idempotent(rows in prop::collection::vec(row(), 1..30), q in query()) {
        let engine = recommender(&dishes(&rows));
        prop_assert_eq!(engine.recommend(&q), engine.recommend(&q));
    }
}
