use tracing::trace;

use super::types::{CalculatorInstance, FixedIncomeFigures, FixedIncomeRecord};

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub read: fn(&FixedIncomeRecord) -> Option<f64>,
    pub form_key: &'static str,
}

pub const START_BALANCE: FieldSpec = FieldSpec {
    name: "start_balance",
    read: read_start_balance,
    form_key: "fixed_income_start_balance",
};

pub const CONTRIBUTIONS: FieldSpec = FieldSpec {
    name: "contributions",
    read: read_contributions,
    form_key: "fixed_income_annual_contribution",
};

pub const LUMP_SUM_CONTRIBUTION: FieldSpec = FieldSpec {
    name: "lump_sum_contribution",
    read: read_lump_sum_contribution,
    form_key: "fixed_income_lump_sum_contribution",
};

pub const WITHDRAWALS: FieldSpec = FieldSpec {
    name: "withdrawals",
    read: read_withdrawals,
    form_key: "fixed_income_annual_withdrawal",
};

pub const LUMP_SUM_REDEMPTION: FieldSpec = FieldSpec {
    name: "lump_sum_redemption",
    read: read_lump_sum_redemption,
    form_key: "fixed_income_lump_sum_redemption",
};

pub const TOTAL_INCOME: FieldSpec = FieldSpec {
    name: "total_income",
    read: read_total_income,
    form_key: "fixed_income_total_income",
};

pub const END_BALANCE: FieldSpec = FieldSpec {
    name: "end_balance",
    read: read_end_balance,
    form_key: "fixed_income_end_balance",
};

fn read_start_balance(record: &FixedIncomeRecord) -> Option<f64> {
    record.start_balance
}

fn read_contributions(record: &FixedIncomeRecord) -> Option<f64> {
    record.contributions
}

fn read_lump_sum_contribution(record: &FixedIncomeRecord) -> Option<f64> {
    record.lump_sum_contribution
}

fn read_withdrawals(record: &FixedIncomeRecord) -> Option<f64> {
    record.withdrawals
}

fn read_lump_sum_redemption(record: &FixedIncomeRecord) -> Option<f64> {
    record.lump_sum_redemption
}

fn read_total_income(record: &FixedIncomeRecord) -> Option<f64> {
    record.total_income
}

fn read_end_balance(record: &FixedIncomeRecord) -> Option<f64> {
    record.end_balance
}

type Probe = fn(&CalculatorInstance, i32, &FieldSpec) -> Option<f64>;

// Sources in priority order. The three aggregate sources ignore `year`, so
// when one of them is the first hit every year row shows the same figure.
const SOURCES: [(&str, Probe); 6] = [
    ("projection.assetClass.fixedIncome", probe_projection),
    ("projection.assetClass.fixed_income", probe_projection_legacy),
    ("totals.assetClass.fixedIncome", probe_totals_asset_class),
    ("totals.byAssetClass.fixedIncome", probe_totals_by_asset_class),
    ("mainView.summary.assetClass.fixedIncome", probe_main_view_summary),
    ("formData", probe_form_data),
];

fn probe_projection(instance: &CalculatorInstance, year: i32, spec: &FieldSpec) -> Option<f64> {
    let record = instance
        .projection_entry(year)?
        .asset_class
        .as_ref()?
        .fixed_income
        .as_ref()?;
    (spec.read)(record)
}

fn probe_projection_legacy(
    instance: &CalculatorInstance,
    year: i32,
    spec: &FieldSpec,
) -> Option<f64> {
    let record = instance
        .projection_entry(year)?
        .asset_class
        .as_ref()?
        .legacy_fixed_income
        .as_ref()?;
    (spec.read)(record)
}

fn probe_totals_asset_class(
    instance: &CalculatorInstance,
    _year: i32,
    spec: &FieldSpec,
) -> Option<f64> {
    let record = instance
        .totals()?
        .asset_class
        .as_ref()?
        .any_fixed_income()?;
    (spec.read)(record)
}

fn probe_totals_by_asset_class(
    instance: &CalculatorInstance,
    _year: i32,
    spec: &FieldSpec,
) -> Option<f64> {
    let record = instance
        .totals()?
        .by_asset_class
        .as_ref()?
        .any_fixed_income()?;
    (spec.read)(record)
}

fn probe_main_view_summary(
    instance: &CalculatorInstance,
    _year: i32,
    spec: &FieldSpec,
) -> Option<f64> {
    let record = instance.summary_asset_class()?.any_fixed_income()?;
    (spec.read)(record)
}

fn probe_form_data(instance: &CalculatorInstance, _year: i32, spec: &FieldSpec) -> Option<f64> {
    instance.form_value(spec.form_key)
}

pub fn resolve_present(instance: &CalculatorInstance, year: i32, spec: &FieldSpec) -> Option<f64> {
    let candidates = SOURCES.map(|(_, probe)| probe(instance, year, spec));
    trace!(
        field = spec.name,
        year,
        ?candidates,
        "fixed income candidates"
    );
    candidates.into_iter().flatten().next()
}

pub fn resolve(instance: &CalculatorInstance, year: i32, spec: &FieldSpec) -> f64 {
    resolve_present(instance, year, spec).unwrap_or(0.0)
}

pub fn resolve_fixed_income(instance: Option<&CalculatorInstance>, year: i32) -> FixedIncomeFigures {
    let Some(instance) = instance else {
        return FixedIncomeFigures::default();
    };

    let contributions =
        resolve(instance, year, &CONTRIBUTIONS) + resolve(instance, year, &LUMP_SUM_CONTRIBUTION);
    let withdrawals =
        resolve(instance, year, &WITHDRAWALS) + resolve(instance, year, &LUMP_SUM_REDEMPTION);
    let income = resolve_present(instance, year, &TOTAL_INCOME).unwrap_or(withdrawals);

    FixedIncomeFigures {
        start: resolve(instance, year, &START_BALANCE),
        contributions,
        withdrawals,
        income,
        end_balance: resolve(instance, year, &END_BALANCE),
    }
}

pub fn source_names() -> impl Iterator<Item = &'static str> {
    SOURCES.iter().map(|(name, _)| *name)
}
