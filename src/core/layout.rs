use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Year,
    PrimaryAge,
    FixedIncomeStart,
    FixedIncomeContributions,
    FixedIncomeWithdrawals,
    FixedIncomeIncome,
    FixedIncomeEndBalance,
    VariableIncome,
    TotalIncome,
    TargetIncome,
    PercentAchieved,
    ShortfallSurplus,
    TaxEstimate,
    AfterTaxIncome,
    RegisteredIn,
    RegisteredOut,
    RegisteredBalance,
    TfsaIn,
    TfsaOut,
    TfsaBalance,
    NonRegisteredIn,
    NonRegisteredOut,
    NonRegisteredBalance,
    PrincipalResidence,
    InvestmentRealEstate,
    OtherRealEstate,
    NetSaleProceeds,
    PrincipalMortgage,
    LongTermDebt,
    ShortTermDebt,
    NetWorth,
    InflationAdjustedNetWorth,
    ActualNetWorth,
    ProbateEstimate,
    FinalTaxOnRegistered,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnGroup {
    Client,
    FixedIncome,
    Income,
    Registered,
    Tfsa,
    NonRegistered,
    RealEstate,
    Liabilities,
    NetWorth,
    Estate,
}

impl ColumnGroup {
    pub fn label(self) -> &'static str {
        match self {
            ColumnGroup::Client => "",
            ColumnGroup::FixedIncome => "Fixed Income",
            ColumnGroup::Income => "Income",
            ColumnGroup::Registered => "Registered",
            ColumnGroup::Tfsa => "TFSA",
            ColumnGroup::NonRegistered => "Non-Registered",
            ColumnGroup::RealEstate => "Real Estate",
            ColumnGroup::Liabilities => "Liabilities",
            ColumnGroup::NetWorth => "Net Worth",
            ColumnGroup::Estate => "Estate",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColumnFormat {
    Year,
    Age,
    Currency,
    Percent,
}

pub const BASE_COLUMN_COUNT: usize = 35;

pub const ASSOCIATED_AGE_INDEX: usize = 2;

impl Column {
    pub const ALL: [Column; BASE_COLUMN_COUNT] = [
        Column::Year,
        Column::PrimaryAge,
        Column::FixedIncomeStart,
        Column::FixedIncomeContributions,
        Column::FixedIncomeWithdrawals,
        Column::FixedIncomeIncome,
        Column::FixedIncomeEndBalance,
        Column::VariableIncome,
        Column::TotalIncome,
        Column::TargetIncome,
        Column::PercentAchieved,
        Column::ShortfallSurplus,
        Column::TaxEstimate,
        Column::AfterTaxIncome,
        Column::RegisteredIn,
        Column::RegisteredOut,
        Column::RegisteredBalance,
        Column::TfsaIn,
        Column::TfsaOut,
        Column::TfsaBalance,
        Column::NonRegisteredIn,
        Column::NonRegisteredOut,
        Column::NonRegisteredBalance,
        Column::PrincipalResidence,
        Column::InvestmentRealEstate,
        Column::OtherRealEstate,
        Column::NetSaleProceeds,
        Column::PrincipalMortgage,
        Column::LongTermDebt,
        Column::ShortTermDebt,
        Column::NetWorth,
        Column::InflationAdjustedNetWorth,
        Column::ActualNetWorth,
        Column::ProbateEstimate,
        Column::FinalTaxOnRegistered,
    ];

    pub fn base_index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            Column::Year => "year",
            Column::PrimaryAge => "primary_age",
            Column::FixedIncomeStart => "fixed_income_start",
            Column::FixedIncomeContributions => "fixed_income_contributions",
            Column::FixedIncomeWithdrawals => "fixed_income_withdrawals",
            Column::FixedIncomeIncome => "fixed_income_income",
            Column::FixedIncomeEndBalance => "fixed_income_end_balance",
            Column::VariableIncome => "variable_income",
            Column::TotalIncome => "total_income",
            Column::TargetIncome => "target_income",
            Column::PercentAchieved => "percent_achieved",
            Column::ShortfallSurplus => "shortfall_surplus",
            Column::TaxEstimate => "tax_estimate",
            Column::AfterTaxIncome => "after_tax_income",
            Column::RegisteredIn => "registered_in",
            Column::RegisteredOut => "registered_out",
            Column::RegisteredBalance => "registered_balance",
            Column::TfsaIn => "tfsa_in",
            Column::TfsaOut => "tfsa_out",
            Column::TfsaBalance => "tfsa_balance",
            Column::NonRegisteredIn => "non_registered_in",
            Column::NonRegisteredOut => "non_registered_out",
            Column::NonRegisteredBalance => "non_registered_balance",
            Column::PrincipalResidence => "principal_residence",
            Column::InvestmentRealEstate => "investment_real_estate",
            Column::OtherRealEstate => "other_real_estate",
            Column::NetSaleProceeds => "net_sale_proceeds",
            Column::PrincipalMortgage => "principal_mortgage",
            Column::LongTermDebt => "long_term_debt",
            Column::ShortTermDebt => "short_term_debt",
            Column::NetWorth => "net_worth",
            Column::InflationAdjustedNetWorth => "inflation_adjusted_net_worth",
            Column::ActualNetWorth => "actual_net_worth",
            Column::ProbateEstimate => "probate_estimate",
            Column::FinalTaxOnRegistered => "final_tax_on_registered",
        }
    }

    pub fn from_key(key: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|column| column.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::Year => "Year",
            Column::PrimaryAge => "Age",
            Column::FixedIncomeStart => "Start",
            Column::FixedIncomeContributions => "Contributions",
            Column::FixedIncomeWithdrawals => "Withdrawals",
            Column::FixedIncomeIncome => "Income",
            Column::FixedIncomeEndBalance => "End Balance",
            Column::VariableIncome => "Variable Income",
            Column::TotalIncome => "Total Income",
            Column::TargetIncome => "Target Income",
            Column::PercentAchieved => "% Achieved",
            Column::ShortfallSurplus => "Shortfall / Surplus",
            Column::TaxEstimate => "Tax Estimate",
            Column::AfterTaxIncome => "After-Tax Income",
            Column::RegisteredIn | Column::TfsaIn | Column::NonRegisteredIn => "In",
            Column::RegisteredOut | Column::TfsaOut | Column::NonRegisteredOut => "Out",
            Column::RegisteredBalance | Column::TfsaBalance | Column::NonRegisteredBalance => {
                "Balance"
            }
            Column::PrincipalResidence => "Principal Residence",
            Column::InvestmentRealEstate => "Investment RE",
            Column::OtherRealEstate => "Other RE",
            Column::NetSaleProceeds => "Net Sale Proceeds",
            Column::PrincipalMortgage => "Principal Mortgage",
            Column::LongTermDebt => "Long-Term Debt",
            Column::ShortTermDebt => "Short-Term Debt",
            Column::NetWorth => "Projection",
            Column::InflationAdjustedNetWorth => "Inflation-Adjusted",
            Column::ActualNetWorth => "Actual",
            Column::ProbateEstimate => "Probate Estimate",
            Column::FinalTaxOnRegistered => "Final Tax on Registered",
        }
    }

    pub fn group(self) -> ColumnGroup {
        match self {
            Column::Year | Column::PrimaryAge => ColumnGroup::Client,
            Column::FixedIncomeStart
            | Column::FixedIncomeContributions
            | Column::FixedIncomeWithdrawals
            | Column::FixedIncomeIncome
            | Column::FixedIncomeEndBalance => ColumnGroup::FixedIncome,
            Column::VariableIncome
            | Column::TotalIncome
            | Column::TargetIncome
            | Column::PercentAchieved
            | Column::ShortfallSurplus
            | Column::TaxEstimate
            | Column::AfterTaxIncome => ColumnGroup::Income,
            Column::RegisteredIn | Column::RegisteredOut | Column::RegisteredBalance => {
                ColumnGroup::Registered
            }
            Column::TfsaIn | Column::TfsaOut | Column::TfsaBalance => ColumnGroup::Tfsa,
            Column::NonRegisteredIn | Column::NonRegisteredOut | Column::NonRegisteredBalance => {
                ColumnGroup::NonRegistered
            }
            Column::PrincipalResidence
            | Column::InvestmentRealEstate
            | Column::OtherRealEstate
            | Column::NetSaleProceeds => ColumnGroup::RealEstate,
            Column::PrincipalMortgage | Column::LongTermDebt | Column::ShortTermDebt => {
                ColumnGroup::Liabilities
            }
            Column::NetWorth | Column::InflationAdjustedNetWorth | Column::ActualNetWorth => {
                ColumnGroup::NetWorth
            }
            Column::ProbateEstimate | Column::FinalTaxOnRegistered => ColumnGroup::Estate,
        }
    }

    pub fn format(self) -> ColumnFormat {
        match self {
            Column::Year => ColumnFormat::Year,
            Column::PrimaryAge => ColumnFormat::Age,
            Column::PercentAchieved => ColumnFormat::Percent,
            _ => ColumnFormat::Currency,
        }
    }

    pub fn is_editable(self) -> bool {
        matches!(self, Column::TargetIncome | Column::ActualNetWorth)
    }
}

// Absolute column index. This is the only place the associated-age offset
// is applied; header and body rendering both go through it.
pub fn column_index(column: Column, has_associated_age: bool) -> usize {
    let base = column.base_index();
    if has_associated_age && base >= ASSOCIATED_AGE_INDEX {
        base + 1
    } else {
        base
    }
}

pub fn column_count(has_associated_age: bool) -> usize {
    if has_associated_age {
        BASE_COLUMN_COUNT + 1
    } else {
        BASE_COLUMN_COUNT
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColumnSlot {
    Base(Column),
    AssociatedClientAge,
}

impl ColumnSlot {
    pub fn key(self) -> &'static str {
        match self {
            ColumnSlot::Base(column) => column.key(),
            ColumnSlot::AssociatedClientAge => "associated_client_age",
        }
    }

    pub fn group(self) -> ColumnGroup {
        match self {
            ColumnSlot::Base(column) => column.group(),
            ColumnSlot::AssociatedClientAge => ColumnGroup::Client,
        }
    }

    pub fn is_editable(self) -> bool {
        matches!(self, ColumnSlot::Base(column) if column.is_editable())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TableLayout {
    pub has_associated_age: bool,
}

impl TableLayout {
    pub fn new(has_associated_age: bool) -> Self {
        Self { has_associated_age }
    }

    pub fn column_index(self, column: Column) -> usize {
        column_index(column, self.has_associated_age)
    }

    pub fn column_count(self) -> usize {
        column_count(self.has_associated_age)
    }

    pub fn slots(self) -> Vec<ColumnSlot> {
        let mut slots = vec![ColumnSlot::AssociatedClientAge; self.column_count()];
        for column in Column::ALL {
            slots[self.column_index(column)] = ColumnSlot::Base(column);
        }
        slots
    }

    pub fn slot_at(self, index: usize) -> Option<ColumnSlot> {
        self.slots().get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn base_order_matches_discriminants() {
        for (idx, column) in Column::ALL.into_iter().enumerate() {
            assert_eq!(column.base_index(), idx, "{column:?}");
        }
    }

    #[test]
    fn target_income_shifts_with_associated_age() {
        assert_eq!(column_index(Column::TargetIncome, false), 9);
        assert_eq!(column_index(Column::TargetIncome, true), 10);
    }

    #[test]
    fn year_and_primary_age_never_shift() {
        for has_associated in [false, true] {
            assert_eq!(column_index(Column::Year, has_associated), 0);
            assert_eq!(column_index(Column::PrimaryAge, has_associated), 1);
        }
    }

    #[test]
    fn documented_positions_hold() {
        let expected = [
            (Column::FixedIncomeStart, 2),
            (Column::FixedIncomeEndBalance, 6),
            (Column::TotalIncome, 8),
            (Column::ShortfallSurplus, 11),
            (Column::AfterTaxIncome, 13),
            (Column::RegisteredIn, 14),
            (Column::TfsaBalance, 19),
            (Column::NonRegisteredBalance, 22),
            (Column::PrincipalResidence, 23),
            (Column::NetSaleProceeds, 26),
            (Column::ShortTermDebt, 29),
            (Column::NetWorth, 30),
            (Column::ActualNetWorth, 32),
            (Column::FinalTaxOnRegistered, 34),
        ];
        for (column, index) in expected {
            assert_eq!(column_index(column, false), index, "{column:?}");
            assert_eq!(column_index(column, true), index + 1, "{column:?}");
        }
    }

    #[test]
    fn column_counts() {
        assert_eq!(column_count(false), 35);
        assert_eq!(column_count(true), 36);
    }

    #[test]
    fn slots_place_associated_age_at_index_two() {
        let with = TableLayout::new(true).slots();
        assert_eq!(with.len(), 36);
        assert_eq!(with[2], ColumnSlot::AssociatedClientAge);
        assert_eq!(with[10], ColumnSlot::Base(Column::TargetIncome));

        let without = TableLayout::new(false).slots();
        assert_eq!(without.len(), 35);
        assert!(!without.contains(&ColumnSlot::AssociatedClientAge));
        assert_eq!(without[2], ColumnSlot::Base(Column::FixedIncomeStart));
    }

    #[test]
    fn keys_round_trip_and_editable_columns() {
        for column in Column::ALL {
            assert_eq!(Column::from_key(column.key()), Some(column));
        }
        assert_eq!(Column::from_key("target_income"), Some(Column::TargetIncome));
        assert_eq!(Column::from_key("nope"), None);

        let editable = Column::ALL
            .into_iter()
            .filter(|column| column.is_editable())
            .collect::<Vec<_>>();
        assert_eq!(editable, vec![Column::TargetIncome, Column::ActualNetWorth]);
    }

    proptest! {
        #[test]
        fn prop_slots_agree_with_column_index(
            has_associated in any::<bool>(),
            idx in 0usize..BASE_COLUMN_COUNT
        ) {
            let layout = TableLayout::new(has_associated);
            let column = Column::ALL[idx];
            let index = layout.column_index(column);
            prop_assert!(index < layout.column_count());
            prop_assert_eq!(layout.slot_at(index), Some(ColumnSlot::Base(column)));
        }

        #[test]
        fn prop_offset_is_uniform_from_column_two(idx in 0usize..BASE_COLUMN_COUNT) {
            let column = Column::ALL[idx];
            let shift = column_index(column, true) - column_index(column, false);
            prop_assert_eq!(shift, usize::from(idx >= ASSOCIATED_AGE_INDEX));
        }
    }
}
