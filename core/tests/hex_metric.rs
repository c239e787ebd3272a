use autobattler_core::{HexCoord, HexDirection};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = HexCoord> {
    (-1_000i32..1_000, -1_000i32..1_000).prop_map(|(q, r)| HexCoord::new(q, r))
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in coord(), b in coord()) {
        prop_assert_eq!(a.distance(b), b.distance(a));
    }

    #[test]
    fn distance_to_self_is_zero(a in coord()) {
        prop_assert_eq!(a.distance(a), 0);
    }

    #[test]
    fn distance_respects_triangle_inequality(a in coord(), b in coord(), c in coord()) {
        prop_assert!(a.distance(c) <= a.distance(b) + b.distance(c));
    }

    #[test]
    fn one_step_changes_distance_by_at_most_one(a in coord(), b in coord(), index in 0usize..6) {
        let stepped = a.neighbor(HexDirection::ALL[index]).expect("inside i32 range");
        let before = i64::from(a.distance(b));
        let after = i64::from(stepped.distance(b));
        prop_assert!((before - after).abs() <= 1);
    }
}
