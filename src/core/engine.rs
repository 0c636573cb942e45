use tracing::debug;

use super::layout::{Column, ColumnSlot, TableLayout};
use super::resolver::resolve_fixed_income;
use super::target::{income_attainment, project_target_income};
use super::types::{
    CalculatorInstance, ResolvedYearRow, TableInputs, YearProjection, select_capital_assets,
};

#[derive(Debug, Clone)]
pub struct ProjectionTable {
    pub layout: TableLayout,
    pub rows: Vec<ResolvedYearRow>,
}

pub fn build_row(
    year_index: u32,
    start_year: i32,
    capital_assets: Option<&CalculatorInstance>,
    fixed_income: Option<&CalculatorInstance>,
    target_income: f64,
    inflation_rate: f64,
    associated_client_start_age: Option<u32>,
) -> ResolvedYearRow {
    let year = start_year + year_index as i32;
    let empty = YearProjection::default();
    let entry = capital_assets
        .and_then(|instance| instance.projection_entry(year))
        .unwrap_or(&empty);

    let inflated_target_income =
        project_target_income(entry, year_index, target_income, inflation_rate);
    let total_income = entry.figures.total_income.unwrap_or(0.0);
    let attainment = income_attainment(total_income, inflated_target_income);

    ResolvedYearRow {
        year,
        age: entry.age.and_then(whole_years),
        associated_client_age: associated_client_start_age.map(|age| age + year_index),
        fixed_income: resolve_fixed_income(fixed_income, year),
        inflated_target_income,
        manual_target_income: entry.manual_target_income,
        percent_achieved: attainment.percent_achieved,
        shortfall_surplus: attainment.shortfall_surplus,
        figures: entry.figures,
        has_capital_assets: capital_assets.is_some(),
    }
}

pub fn build_table(inputs: &TableInputs, instances: &[CalculatorInstance]) -> ProjectionTable {
    let capital_assets = select_capital_assets(instances);
    if capital_assets.is_none() {
        debug!(
            instances = instances.len(),
            "no capital_assets instance; fixed income columns fall back to zero"
        );
    }

    let rows = (0..=inputs.projection_years)
        .map(|year_index| {
            build_row(
                year_index,
                inputs.start_year,
                capital_assets,
                capital_assets,
                inputs.target_income,
                inputs.inflation_rate,
                inputs.associated_client_start_age,
            )
        })
        .collect::<Vec<_>>();

    let layout = TableLayout::new(inputs.associated_client_start_age.is_some());
    debug!(
        rows = rows.len(),
        columns = layout.column_count(),
        start_year = inputs.start_year,
        "built projection table"
    );

    ProjectionTable { layout, rows }
}

impl ResolvedYearRow {
    pub fn value(&self, column: Column) -> Option<f64> {
        let f = &self.figures;
        match column {
            Column::Year => Some(self.year as f64),
            Column::PrimaryAge => self.age.map(f64::from),
            Column::FixedIncomeStart => Some(self.fixed_income.start),
            Column::FixedIncomeContributions => Some(self.fixed_income.contributions),
            Column::FixedIncomeWithdrawals => Some(self.fixed_income.withdrawals),
            Column::FixedIncomeIncome => Some(self.fixed_income.income),
            Column::FixedIncomeEndBalance => Some(self.fixed_income.end_balance),
            Column::VariableIncome => f.variable_income,
            Column::TotalIncome => f.total_income,
            Column::TargetIncome => Some(self.inflated_target_income),
            Column::PercentAchieved => Some(self.percent_achieved),
            Column::ShortfallSurplus => Some(self.shortfall_surplus),
            Column::TaxEstimate => f.tax_estimate,
            Column::AfterTaxIncome => f.after_tax_income,
            Column::RegisteredIn => f.registered_in,
            Column::RegisteredOut => f.registered_out,
            Column::RegisteredBalance => f.registered_balance,
            Column::TfsaIn => f.tfsa_in,
            Column::TfsaOut => f.tfsa_out,
            Column::TfsaBalance => f.tfsa_balance,
            Column::NonRegisteredIn => f.non_registered_in,
            Column::NonRegisteredOut => f.non_registered_out,
            Column::NonRegisteredBalance => f.non_registered_balance,
            Column::PrincipalResidence => f.principal_residence,
            Column::InvestmentRealEstate => f.investment_real_estate,
            Column::OtherRealEstate => f.other_real_estate,
            Column::NetSaleProceeds => f.net_sale_proceeds,
            Column::PrincipalMortgage => f.principal_mortgage,
            Column::LongTermDebt => f.long_term_debt,
            Column::ShortTermDebt => f.short_term_debt,
            Column::NetWorth => f.net_worth,
            Column::InflationAdjustedNetWorth => f.inflation_adjusted_net_worth,
            Column::ActualNetWorth => f.actual_net_worth,
            Column::ProbateEstimate => f.probate_estimate,
            Column::FinalTaxOnRegistered => f.final_tax_on_registered,
        }
    }

    pub fn slot_value(&self, slot: ColumnSlot) -> Option<f64> {
        match slot {
            ColumnSlot::Base(column) => self.value(column),
            ColumnSlot::AssociatedClientAge => self.associated_client_age.map(f64::from),
        }
    }
}

fn whole_years(age: f64) -> Option<u32> {
    (age.is_finite() && age >= 0.0 && age <= u32::MAX as f64).then(|| age.trunc() as u32)
}
