use std::error::Error;
use std::sync::Arc;

use proptest::prelude::*;

use benchrun::config::MapConfig;
use benchrun::launch::{BudgetSource, ResourceBudget, ResourceBudgetCalculator};
use benchrun_test_utils::builders::ConfigBuilder;
use benchrun_test_utils::host::FixedHost;
use benchrun_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn calculator(max_heap_mb: u64) -> ResourceBudgetCalculator {
    ResourceBudgetCalculator::new(Arc::new(FixedHost::new(max_heap_mb)))
}

#[test]
fn configured_value_is_used_verbatim() {
    init_tracing();
    let config = ConfigBuilder::new().max_memory("2g").build();

    let budget = calculator(512).compute_limit(&config);

    assert_eq!(
        budget,
        ResourceBudget {
            limit_mb: 2048,
            flag_value: "2g".to_string(),
            source: BudgetSource::Configured,
        }
    );
}

#[test]
fn empty_value_derives_three_times_own_heap() {
    init_tracing();
    let config = ConfigBuilder::new().max_memory("").build();

    let budget = calculator(512).compute_limit(&config);

    assert_eq!(budget.limit_mb, 1536);
    assert_eq!(budget.flag_value, "1536m");
    assert_eq!(budget.source, BudgetSource::DerivedDefault);
}

#[test]
fn missing_value_derives_default() {
    init_tracing();
    let budget = calculator(1000).compute_limit(&MapConfig::new());

    assert_eq!(budget.limit_mb, 3000);
    assert_eq!(budget.flag_value, "3000m");
    assert_eq!(budget.source, BudgetSource::DerivedDefault);
}

#[test]
fn malformed_values_fall_back_instead_of_failing() {
    init_tracing();
    for bad in ["2048", "2gb", "lots", "0m", "+5m", "   "] {
        let config = ConfigBuilder::new().max_memory(bad).build();
        let budget = calculator(256).compute_limit(&config);
        assert_eq!(budget.source, BudgetSource::DerivedDefault, "value {bad:?}");
        assert_eq!(budget.limit_mb, 768, "value {bad:?}");
    }
}

#[test]
fn surrounding_whitespace_is_trimmed() {
    init_tracing();
    let config = ConfigBuilder::new().max_memory("  4g ").build();

    let budget = calculator(512).compute_limit(&config);

    assert_eq!(budget.limit_mb, 4096);
    assert_eq!(budget.flag_value, "4g");
}

#[test]
fn kilobytes_round_up_to_whole_megabytes() {
    init_tracing();
    let config = ConfigBuilder::new().max_memory("1536k").build();

    let budget = calculator(512).compute_limit(&config);

    assert_eq!(budget.limit_mb, 2);
    assert_eq!(budget.flag_value, "1536k");
    assert_eq!(budget.source, BudgetSource::Configured);
}

#[test]
fn each_computation_reads_configuration_afresh() {
    init_tracing();
    let calc = calculator(100);

    let first = calc.compute_limit(&ConfigBuilder::new().max_memory("1g").build());
    let second = calc.compute_limit(&MapConfig::new());

    assert_eq!(first.limit_mb, 1024);
    assert_eq!(second.limit_mb, 300);
}

#[test]
fn budget_renders_as_toml() -> TestResult {
    let budget = calculator(512).compute_limit(&MapConfig::new());

    let rendered = toml::to_string(&budget)?;

    assert!(rendered.contains("limit_mb = 1536"), "{rendered}");
    assert!(rendered.contains("flag_value = \"1536m\""), "{rendered}");
    assert!(rendered.contains("source = \"derived-default\""), "{rendered}");
    Ok(())
}

proptest! {
    #[test]
    fn suffixed_values_are_always_configured(
        amount in 1u64..1_000_000,
        unit in prop_oneof![Just('m'), Just('M'), Just('g'), Just('G')],
    ) {
        let value = format!("{amount}{unit}");
        let config = ConfigBuilder::new().max_memory(&value).build();

        let budget = calculator(512).compute_limit(&config);

        let expected = if unit.eq_ignore_ascii_case(&'g') { amount * 1024 } else { amount };
        prop_assert_eq!(budget.limit_mb, expected);
        prop_assert_eq!(budget.flag_value, value);
        prop_assert_eq!(budget.source, BudgetSource::Configured);
    }

    #[test]
    fn derived_default_tracks_host_heap(max_heap_mb in 1u64..65_536) {
        let budget = calculator(max_heap_mb).compute_limit(&MapConfig::new());

        prop_assert_eq!(budget.limit_mb, max_heap_mb * 3);
        prop_assert_eq!(budget.flag_value, format!("{}m", max_heap_mb * 3));
    }
}
