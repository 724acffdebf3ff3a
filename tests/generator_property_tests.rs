// Property-Based Testing for identifier and weight generation
// Checks the generator invariants over arbitrary seeds and increment sequences

use powder_dispenser::weight::{round2, DEFAULT_TOLERANCE};
use powder_dispenser::{
    DispensingSimulator, IdentifierGenerator, ProductCatalog, TargetWeight, TickOutcome,
    WeightTargetGenerator,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    #[test]
    fn prop_catalog_entries_have_fixed_digit_groups(seed in any::<u64>()) {
        let mut generator = IdentifierGenerator::new(StdRng::seed_from_u64(seed));
        let catalog = ProductCatalog::generate(&mut generator, 10);
        prop_assert_eq!(catalog.len(), 10);

        for product in catalog.iter() {
            let widths: Vec<usize> = product.as_str().split('-').map(str::len).collect();
            prop_assert_eq!(widths, vec![5, 4, 2]);
            prop_assert!(product.as_str().chars().all(|c| c.is_ascii_digit() || c == '-'));
        }
    }

    #[test]
    fn prop_batch_starts_with_product_suffix(seed in any::<u64>()) {
        let mut generator = IdentifierGenerator::new(StdRng::seed_from_u64(seed));
        let product = generator.generate();
        let batch = generator.derive_batch(&product);

        let product_str = product.as_str();
        prop_assert_eq!(&batch.as_str()[..4], &product_str[product_str.len() - 4..]);
        prop_assert_eq!(batch.as_str().len(), 8);
    }

    #[test]
    fn prop_targets_inside_open_range_with_two_decimals(seed in any::<u64>()) {
        let mut generator = WeightTargetGenerator::new(StdRng::seed_from_u64(seed));
        for _ in 0..50 {
            let target = generator.generate().grams();
            prop_assert!(target > 0.5 && target < 100.0);
            prop_assert_eq!(round2(target), target);
        }
    }

    #[test]
    fn prop_weight_never_decreases_and_settles_inside_band(
        target in 1.0f64..100.0,
        increments in proptest::collection::vec(0.1f64..0.6, 1..400),
    ) {
        let band = TargetWeight::new(target).band(DEFAULT_TOLERANCE);
        let mut sim = DispensingSimulator::new();
        prop_assert!(sim.start(band));

        let mut previous = 0.0;
        for increment in increments {
            match sim.tick(increment) {
                TickOutcome::Settled { weight } => {
                    prop_assert!(band.contains(weight));
                    prop_assert_eq!(sim.final_weight(), Some(weight));
                    break;
                }
                TickOutcome::Advanced { weight } | TickOutcome::Clamped { weight } => {
                    prop_assert!(weight >= previous);
                    prop_assert!(weight <= band.upper);
                    previous = weight;
                }
                TickOutcome::Ignored => prop_assert!(false, "tick ignored while running"),
            }
        }
    }
}
