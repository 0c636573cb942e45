use serde::Serialize;

use crate::core::{
    Column, ColumnFormat, ColumnGroup, ColumnSlot, Highlight, ProjectionTable, ResolvedYearRow,
    TableLayout,
};

#[derive(Copy, Clone, Debug)]
pub struct ClientNames<'a> {
    pub primary: &'a str,
    pub associated: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCell {
    pub index: usize,
    pub key: &'static str,
    pub label: String,
    pub group: ColumnGroup,
    pub group_label: &'static str,
    pub editable: bool,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyCell {
    pub index: usize,
    pub text: String,
    pub editable: bool,
    pub highlighted: bool,
}

pub fn header_cells(
    layout: TableLayout,
    names: ClientNames<'_>,
    highlight: Highlight,
) -> Vec<HeaderCell> {
    layout
        .slots()
        .into_iter()
        .enumerate()
        .map(|(index, slot)| HeaderCell {
            index,
            key: slot.key(),
            label: header_label(slot, names),
            group: slot.group(),
            group_label: slot.group().label(),
            editable: slot.is_editable(),
            highlighted: highlight.covers_header(index),
        })
        .collect()
}

pub fn body_cells(
    row: &ResolvedYearRow,
    row_index: usize,
    layout: TableLayout,
    highlight: Highlight,
) -> Vec<BodyCell> {
    layout
        .slots()
        .into_iter()
        .enumerate()
        .map(|(index, slot)| BodyCell {
            index,
            text: cell_text(row, slot),
            editable: slot.is_editable() && row.has_capital_assets,
            highlighted: highlight.covers_cell(row_index, index),
        })
        .collect()
}

fn header_label(slot: ColumnSlot, names: ClientNames<'_>) -> String {
    match slot {
        ColumnSlot::Base(Column::PrimaryAge) if !names.primary.is_empty() => {
            format!("Age ({})", names.primary)
        }
        ColumnSlot::Base(column) => column.label().to_string(),
        ColumnSlot::AssociatedClientAge => match names.associated {
            Some(name) if !name.is_empty() => format!("Age ({name})"),
            _ => "Associated Age".to_string(),
        },
    }
}

pub fn cell_text(row: &ResolvedYearRow, slot: ColumnSlot) -> String {
    if slot == ColumnSlot::Base(Column::PercentAchieved) && row.inflated_target_income <= 0.0 {
        return "N/A".to_string();
    }
    let Some(value) = row.slot_value(slot) else {
        return String::new();
    };
    let format = match slot {
        ColumnSlot::Base(column) => column.format(),
        ColumnSlot::AssociatedClientAge => ColumnFormat::Age,
    };
    match format {
        ColumnFormat::Year | ColumnFormat::Age => format!("{value:.0}"),
        ColumnFormat::Currency => format_currency(value),
        ColumnFormat::Percent => format!("{value:.1}%"),
    }
}

pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

pub fn render_text_table(
    table: &ProjectionTable,
    names: ClientNames<'_>,
    highlight: Highlight,
) -> String {
    let headers = header_cells(table.layout, names, highlight);
    let body = table
        .rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| body_cells(row, row_index, table.layout, highlight))
        .collect::<Vec<_>>();

    let mark = |text: &str, highlighted: bool| {
        if highlighted {
            format!("*{text}*")
        } else {
            text.to_string()
        }
    };

    let header_texts = headers
        .iter()
        .map(|cell| mark(&cell.label, cell.highlighted))
        .collect::<Vec<_>>();
    let body_texts = body
        .iter()
        .map(|cells| {
            cells
                .iter()
                .map(|cell| mark(&cell.text, cell.highlighted))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut group_texts = Vec::with_capacity(headers.len());
    let mut previous = None;
    for cell in &headers {
        let text = if previous == Some(cell.group) {
            ""
        } else {
            cell.group_label
        };
        group_texts.push(text.to_string());
        previous = Some(cell.group);
    }

    let widths = (0..headers.len())
        .map(|col| {
            std::iter::once(&header_texts[col])
                .chain(body_texts.iter().map(|cells| &cells[col]))
                .map(|text| text.chars().count())
                .max()
                .unwrap_or(0)
                .max(group_texts[col].chars().count())
        })
        .collect::<Vec<_>>();

    let line = |cells: &[String], left: bool| {
        cells
            .iter()
            .zip(&widths)
            .map(|(text, &width)| {
                if left {
                    format!("{text:<width$}")
                } else {
                    format!("{text:>width$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&group_texts, true));
    out.push('\n');
    out.push_str(&line(&header_texts, false));
    out.push('\n');
    let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');
    for cells in &body_texts {
        out.push_str(&line(cells, false));
        out.push('\n');
    }
    out
}
