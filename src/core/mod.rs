mod edit;
mod engine;
mod highlight;
mod layout;
mod resolver;
mod target;
mod types;

pub use edit::{CellEdit, EditableField, apply_cell_edit, parse_cell_input};
pub use engine::{ProjectionTable, build_row, build_table};
pub use highlight::{Highlight, HighlightEvent};
pub use layout::{
    ASSOCIATED_AGE_INDEX, BASE_COLUMN_COUNT, Column, ColumnFormat, ColumnGroup, ColumnSlot,
    TableLayout, column_count, column_index,
};
pub use resolver::{
    CONTRIBUTIONS, END_BALANCE, FieldSpec, LUMP_SUM_CONTRIBUTION, LUMP_SUM_REDEMPTION,
    START_BALANCE, TOTAL_INCOME, WITHDRAWALS, resolve, resolve_fixed_income, resolve_present,
    source_names,
};
pub use target::{IncomeAttainment, income_attainment, inflate, project_target_income};
pub use types::{
    AssetClass, CAPITAL_ASSETS, CalculatorInstance, FixedIncomeFigures, FixedIncomeRecord,
    ResolvedYearRow, TableInputs, YearFigures, YearProjection, instances_from_value,
    select_capital_assets,
};
