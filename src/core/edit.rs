use serde::{Deserialize, Serialize};

use super::layout::Column;
use super::types::CalculatorInstance;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditableField {
    #[serde(alias = "manual_target_income")]
    ManualTargetIncome,
    #[serde(alias = "actual_net_worth")]
    ActualNetWorth,
}

impl EditableField {
    pub fn column(self) -> Column {
        match self {
            EditableField::ManualTargetIncome => Column::TargetIncome,
            EditableField::ActualNetWorth => Column::ActualNetWorth,
        }
    }

    pub fn for_column(column: Column) -> Option<EditableField> {
        match column {
            Column::TargetIncome => Some(EditableField::ManualTargetIncome),
            Column::ActualNetWorth => Some(EditableField::ActualNetWorth),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellEdit {
    pub year: i32,
    pub field: EditableField,
    pub value: Option<f64>,
}

impl CellEdit {
    pub fn from_input(year: i32, field: EditableField, raw: &str) -> Self {
        Self {
            year,
            field,
            value: parse_cell_input(raw),
        }
    }
}

// Parses typed cell input the way a browser `parseFloat` does: leading
// whitespace is skipped and the longest numeric prefix is taken, so
// `"1200abc"` is `1200`. Empty, unparseable or non-finite input clears
// the cell.
pub fn parse_cell_input(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    let mut frac_digits = 0;
    if end < len && bytes[end] == b'.' {
        let mut j = end + 1;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        frac_digits = j - end - 1;
        if int_digits > 0 || frac_digits > 0 {
            end = j;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if end < len && matches!(bytes[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < len && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

// A year with no projection entry gets an empty one so the edit sticks.
pub fn apply_cell_edit(instance: &mut CalculatorInstance, edit: &CellEdit) {
    let entry = instance.projection_entry_or_insert(edit.year);
    match edit.field {
        EditableField::ManualTargetIncome => entry.manual_target_income = edit.value,
        EditableField::ActualNetWorth => entry.figures.actual_net_worth = edit.value,
    }
}
