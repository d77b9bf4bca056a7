//! Property-based tests using proptest

use proptest::prelude::*;
use std::sync::Arc;
use SpamSieve::executor::{Filter, Pipeline, PipelineMode};
use SpamSieve::pipeline::filters::{
    BlocklistFilter, BlocklistMode, CapitalsFilter, CapitalsMode, LengthFilter, LengthMode,
};
use SpamSieve::pipeline::premade::{construct_filter_list, ChatOptions};

fn mode_strategy() -> impl Strategy<Value = PipelineMode> {
    prop::sample::select(PipelineMode::ALL.to_vec())
}

/// A pipeline where every filter may rewrite the text.
fn correcting_filters() -> Vec<Arc<dyn Filter>> {
    vec![
        Arc::new(LengthFilter::new(5, 40, LengthMode::Crop).unwrap()),
        Arc::new(CapitalsFilter::new(0.3, CapitalsMode::Crop, Some(3)).unwrap()),
        Arc::new(BlocklistFilter::new(["spam", "scam"], BlocklistMode::Tolerant)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn test_empty_pipeline_is_identity(text in "\\PC{0,200}", mode in mode_strategy()) {
        let pipeline = Pipeline::new(vec![], mode);
        let result = pipeline.check(&text).unwrap();

        prop_assert!(result.passed);
        prop_assert_eq!(result.changes_made, 0);
        prop_assert_eq!(&result.result, &text);
    }

    #[test]
    fn test_tolerant_always_passes(text in "\\PC{0,300}") {
        let filters = construct_filter_list(&ChatOptions::default().0).unwrap();
        let pipeline = Pipeline::new(filters, PipelineMode::Tolerant);

        prop_assert!(pipeline.check(&text).unwrap().passed);
    }

    #[test]
    fn test_zero_tolerance_never_changes_text(text in "\\PC{0,120}") {
        let pipeline = Pipeline::new(correcting_filters(), PipelineMode::ZeroTolerance);
        let result = pipeline.check(&text).unwrap();

        prop_assert_eq!(&result.result, &text);
        prop_assert_eq!(result.changes_made, 0);
    }

    #[test]
    fn test_changes_bounded_by_filter_count(text in "[a-zA-Z ]{0,80}", mode in mode_strategy()) {
        let pipeline = Pipeline::new(correcting_filters(), mode);
        let result = pipeline.check(&text).unwrap();

        prop_assert!(result.changes_made <= pipeline.len());
        prop_assert_eq!(result.original, text);
    }

    #[test]
    fn test_unchanged_result_means_no_changes(text in "\\PC{0,200}", mode in mode_strategy()) {
        let filters = construct_filter_list(&ChatOptions::default().0).unwrap();
        let pipeline = Pipeline::new(filters, mode);
        let result = pipeline.check(&text).unwrap();

        if result.changes_made == 0 {
            prop_assert_eq!(&result.result, &text);
        }
        if mode == PipelineMode::Normal {
            prop_assert_eq!(result.passed, result.failed_filters.is_empty());
        }
    }
}
