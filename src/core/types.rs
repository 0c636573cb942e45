use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const CAPITAL_ASSETS: &str = "capital_assets";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalculatorInstance {
    #[serde(
        rename = "calculatorType",
        alias = "calculator_type",
        deserialize_with = "lenient"
    )]
    pub calculator_type: Option<String>,
    #[serde(alias = "stateData", deserialize_with = "lenient")]
    pub state_data: Option<StateData>,
    #[serde(rename = "mainView", alias = "main_view", deserialize_with = "lenient")]
    pub main_view: Option<MainView>,
    #[serde(rename = "formData", alias = "form_data", deserialize_with = "lenient")]
    pub form_data: Option<Map<String, Value>>,
}

impl CalculatorInstance {
    pub fn is_capital_assets(&self) -> bool {
        self.calculator_type.as_deref() == Some(CAPITAL_ASSETS)
    }

    pub fn projection(&self) -> &[YearProjection] {
        self.state_data
            .as_ref()
            .map(|state| state.projection.as_slice())
            .unwrap_or(&[])
    }

    pub fn projection_entry(&self, year: i32) -> Option<&YearProjection> {
        self.projection()
            .iter()
            .find(|entry| entry.year == Some(year))
    }

    pub fn projection_entry_or_insert(&mut self, year: i32) -> &mut YearProjection {
        let projection = &mut self.state_data.get_or_insert_with(StateData::default).projection;
        let position = match projection.iter().position(|entry| entry.year == Some(year)) {
            Some(position) => position,
            None => {
                let at = projection.partition_point(|entry| entry.year.is_some_and(|y| y < year));
                projection.insert(
                    at,
                    YearProjection {
                        year: Some(year),
                        ..YearProjection::default()
                    },
                );
                at
            }
        };
        &mut projection[position]
    }

    pub fn totals(&self) -> Option<&Totals> {
        self.state_data.as_ref()?.totals.as_ref()
    }

    pub fn summary_asset_class(&self) -> Option<&AssetClass> {
        self.main_view.as_ref()?.summary.as_ref()?.asset_class.as_ref()
    }

    pub fn form_value(&self, key: &str) -> Option<f64> {
        self.form_data.as_ref()?.get(key).and_then(number_from_value)
    }
}

pub fn instances_from_value(value: Value) -> Vec<CalculatorInstance> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        Value::Object(_) => serde_json::from_value(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

pub fn select_capital_assets(instances: &[CalculatorInstance]) -> Option<&CalculatorInstance> {
    instances.iter().find(|instance| instance.is_capital_assets())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StateData {
    #[serde(deserialize_with = "lenient_list")]
    pub projection: Vec<YearProjection>,
    #[serde(deserialize_with = "lenient")]
    pub totals: Option<Totals>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Totals {
    #[serde(rename = "assetClass", alias = "asset_class", deserialize_with = "lenient")]
    pub asset_class: Option<AssetClass>,
    #[serde(
        rename = "byAssetClass",
        alias = "by_asset_class",
        deserialize_with = "lenient"
    )]
    pub by_asset_class: Option<AssetClass>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MainView {
    #[serde(deserialize_with = "lenient")]
    pub summary: Option<Summary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Summary {
    #[serde(rename = "assetClass", alias = "asset_class", deserialize_with = "lenient")]
    pub asset_class: Option<AssetClass>,
}

// Per-asset-class breakdown. Older calculators wrote the fixed income record
// under `fixed_income`; both keys are kept so the resolver can tier them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssetClass {
    #[serde(rename = "fixedIncome", deserialize_with = "lenient")]
    pub fixed_income: Option<FixedIncomeRecord>,
    #[serde(rename = "fixed_income", deserialize_with = "lenient")]
    pub legacy_fixed_income: Option<FixedIncomeRecord>,
}

impl AssetClass {
    pub fn any_fixed_income(&self) -> Option<&FixedIncomeRecord> {
        self.fixed_income
            .as_ref()
            .or(self.legacy_fixed_income.as_ref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct FixedIncomeRecord {
    pub start_balance: Option<f64>,
    pub contributions: Option<f64>,
    pub lump_sum_contribution: Option<f64>,
    pub withdrawals: Option<f64>,
    pub lump_sum_redemption: Option<f64>,
    pub total_income: Option<f64>,
    pub end_balance: Option<f64>,
}

impl From<Map<String, Value>> for FixedIncomeRecord {
    fn from(map: Map<String, Value>) -> Self {
        let pick = |camel: &str, snake: &str| {
            map.get(camel)
                .and_then(number_from_value)
                .or_else(|| map.get(snake).and_then(number_from_value))
        };
        Self {
            start_balance: pick("startBalance", "start_balance"),
            contributions: pick("contributions", "contributions"),
            lump_sum_contribution: pick("lumpSumContribution", "lump_sum_contribution"),
            withdrawals: pick("withdrawals", "withdrawals"),
            lump_sum_redemption: pick("lumpSumRedemption", "lump_sum_redemption"),
            total_income: pick("totalIncome", "total_income"),
            end_balance: pick("endBalance", "end_balance"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YearProjection {
    #[serde(deserialize_with = "lenient_integer")]
    pub year: Option<i32>,
    #[serde(deserialize_with = "lenient_number")]
    pub age: Option<f64>,
    #[serde(alias = "asset_class", deserialize_with = "lenient")]
    pub asset_class: Option<AssetClass>,
    #[serde(alias = "manual_target_income", deserialize_with = "lenient_number")]
    pub manual_target_income: Option<f64>,
    #[serde(flatten)]
    pub figures: YearFigures,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YearFigures {
    #[serde(alias = "variable_income", deserialize_with = "lenient_number")]
    pub variable_income: Option<f64>,
    #[serde(alias = "total_income", deserialize_with = "lenient_number")]
    pub total_income: Option<f64>,
    #[serde(alias = "tax_estimate", deserialize_with = "lenient_number")]
    pub tax_estimate: Option<f64>,
    #[serde(alias = "after_tax_income", deserialize_with = "lenient_number")]
    pub after_tax_income: Option<f64>,

    #[serde(alias = "registered_in", deserialize_with = "lenient_number")]
    pub registered_in: Option<f64>,
    #[serde(alias = "registered_out", deserialize_with = "lenient_number")]
    pub registered_out: Option<f64>,
    #[serde(alias = "registered_balance", deserialize_with = "lenient_number")]
    pub registered_balance: Option<f64>,
    #[serde(alias = "tfsa_in", deserialize_with = "lenient_number")]
    pub tfsa_in: Option<f64>,
    #[serde(alias = "tfsa_out", deserialize_with = "lenient_number")]
    pub tfsa_out: Option<f64>,
    #[serde(alias = "tfsa_balance", deserialize_with = "lenient_number")]
    pub tfsa_balance: Option<f64>,
    #[serde(alias = "non_registered_in", deserialize_with = "lenient_number")]
    pub non_registered_in: Option<f64>,
    #[serde(alias = "non_registered_out", deserialize_with = "lenient_number")]
    pub non_registered_out: Option<f64>,
    #[serde(alias = "non_registered_balance", deserialize_with = "lenient_number")]
    pub non_registered_balance: Option<f64>,

    #[serde(alias = "principal_residence", deserialize_with = "lenient_number")]
    pub principal_residence: Option<f64>,
    #[serde(alias = "investment_real_estate", deserialize_with = "lenient_number")]
    pub investment_real_estate: Option<f64>,
    #[serde(alias = "other_real_estate", deserialize_with = "lenient_number")]
    pub other_real_estate: Option<f64>,
    #[serde(alias = "net_sale_proceeds", deserialize_with = "lenient_number")]
    pub net_sale_proceeds: Option<f64>,

    #[serde(alias = "principal_mortgage", deserialize_with = "lenient_number")]
    pub principal_mortgage: Option<f64>,
    #[serde(alias = "long_term_debt", deserialize_with = "lenient_number")]
    pub long_term_debt: Option<f64>,
    #[serde(alias = "short_term_debt", deserialize_with = "lenient_number")]
    pub short_term_debt: Option<f64>,

    #[serde(alias = "net_worth", deserialize_with = "lenient_number")]
    pub net_worth: Option<f64>,
    #[serde(alias = "inflation_adjusted_net_worth", deserialize_with = "lenient_number")]
    pub inflation_adjusted_net_worth: Option<f64>,
    #[serde(alias = "actual_net_worth", deserialize_with = "lenient_number")]
    pub actual_net_worth: Option<f64>,

    #[serde(alias = "probate_estimate", deserialize_with = "lenient_number")]
    pub probate_estimate: Option<f64>,
    #[serde(alias = "final_tax_on_registered", deserialize_with = "lenient_number")]
    pub final_tax_on_registered: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedIncomeFigures {
    pub start: f64,
    pub contributions: f64,
    pub withdrawals: f64,
    pub income: f64,
    pub end_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedYearRow {
    pub year: i32,
    pub age: Option<u32>,
    pub associated_client_age: Option<u32>,
    pub fixed_income: FixedIncomeFigures,
    pub inflated_target_income: f64,
    pub manual_target_income: Option<f64>,
    pub percent_achieved: f64,
    pub shortfall_surplus: f64,
    #[serde(flatten)]
    pub figures: YearFigures,
    // Edits need a capital assets instance to land on.
    #[serde(skip)]
    pub has_capital_assets: bool,
}

#[derive(Debug, Clone)]
pub struct TableInputs {
    pub start_year: i32,
    pub projection_years: u32,
    pub target_income: f64,
    pub inflation_rate: f64,
    pub associated_client_start_age: Option<u32>,
    pub primary_client_name: String,
    pub associated_client_name: Option<String>,
}

impl TableInputs {
    pub fn row_count(&self) -> usize {
        self.projection_years as usize + 1
    }
}

pub fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value)
        .filter(|v| v.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(v))
        .map(|v| v as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance(value: Value) -> CalculatorInstance {
        serde_json::from_value(value).expect("instance should decode")
    }

    #[test]
    fn fixed_income_record_reads_either_naming() {
        let camel: FixedIncomeRecord =
            serde_json::from_value(json!({ "startBalance": 10, "endBalance": 12 }))
                .expect("camel record");
        let snake: FixedIncomeRecord =
            serde_json::from_value(json!({ "start_balance": 10, "end_balance": 12 }))
                .expect("snake record");
        assert_eq!(camel, snake);
        assert_eq!(camel.start_balance, Some(10.0));
        assert_eq!(camel.end_balance, Some(12.0));
    }

    #[test]
    fn fixed_income_record_prefers_camel_key_when_both_present() {
        let record: FixedIncomeRecord =
            serde_json::from_value(json!({ "endBalance": 5, "end_balance": 9 }))
                .expect("record");
        assert_eq!(record.end_balance, Some(5.0));
    }

    #[test]
    fn instance_lists_drop_entries_that_are_not_objects() {
        let instances = instances_from_value(json!([
            null,
            "capital_assets",
            42,
            { "calculatorType": "capital_assets" }
        ]));
        assert_eq!(instances.len(), 1);
        assert!(instances[0].is_capital_assets());

        let single = instances_from_value(json!({ "calculatorType": "capital_assets" }));
        assert_eq!(single.len(), 1);
        assert!(instances_from_value(json!("nothing")).is_empty());
    }

    #[test]
    fn missing_projection_year_is_inserted_in_order() {
        let mut inst = instance(json!({
            "calculatorType": "capital_assets",
            "state_data": { "projection": [ { "year": 2024 }, { "year": 2026 } ] }
        }));
        inst.projection_entry_or_insert(2025).manual_target_income = Some(1.0);
        inst.projection_entry_or_insert(2024).manual_target_income = Some(2.0);

        let years = inst.projection().iter().map(|e| e.year).collect::<Vec<_>>();
        assert_eq!(years, vec![Some(2024), Some(2025), Some(2026)]);
        assert_eq!(
            inst.projection_entry(2025).and_then(|e| e.manual_target_income),
            Some(1.0)
        );

        let mut empty = CalculatorInstance::default();
        empty.projection_entry_or_insert(2030);
        assert_eq!(empty.projection().len(), 1);
    }

    #[test]
    fn numeric_strings_parse_and_junk_is_absent() {
        assert_eq!(number_from_value(&json!("1250.5")), Some(1250.5));
        assert_eq!(number_from_value(&json!(" 7 ")), Some(7.0));
        assert_eq!(number_from_value(&json!("n/a")), None);
        assert_eq!(number_from_value(&json!(null)), None);
        assert_eq!(number_from_value(&json!(true)), None);
        assert_eq!(number_from_value(&json!({ "x": 1 })), None);
    }

    #[test]
    fn malformed_sections_degrade_to_absent() {
        let inst = instance(json!({
            "calculatorType": "capital_assets",
            "state_data": {
                "projection": [
                    { "year": 2024, "age": 60, "totalIncome": "41000" },
                    null,
                    "garbage",
                    { "year": "2025", "assetClass": 3 }
                ],
                "totals": "none"
            },
            "mainView": "broken",
            "formData": null
        }));

        assert!(inst.is_capital_assets());
        assert_eq!(inst.projection().len(), 2);
        assert!(inst.totals().is_none());
        assert!(inst.summary_asset_class().is_none());
        assert!(inst.form_value("anything").is_none());

        let first = inst.projection_entry(2024).expect("2024 entry");
        assert_eq!(first.age, Some(60.0));
        assert_eq!(first.figures.total_income, Some(41_000.0));

        let second = inst.projection_entry(2025).expect("2025 entry");
        assert!(second.asset_class.is_none());
    }

    #[test]
    fn fractional_year_never_matches() {
        let inst = instance(json!({
            "state_data": { "projection": [{ "year": 2024.5 }] }
        }));
        assert!(inst.projection_entry(2024).is_none());
        assert!(inst.projection_entry(2025).is_none());
    }

    #[test]
    fn flat_figures_accept_snake_case_aliases() {
        let inst = instance(json!({
            "state_data": {
                "projection": [{
                    "year": 2030,
                    "non_registered_balance": 1500,
                    "tfsaBalance": 800,
                    "actual_net_worth": 99
                }]
            }
        }));
        let entry = inst.projection_entry(2030).expect("entry");
        assert_eq!(entry.figures.non_registered_balance, Some(1_500.0));
        assert_eq!(entry.figures.tfsa_balance, Some(800.0));
        assert_eq!(entry.figures.actual_net_worth, Some(99.0));
    }

    #[test]
    fn select_capital_assets_skips_other_calculators() {
        let instances = vec![
            instance(json!({ "calculatorType": "retirement_income" })),
            instance(json!({ "calculatorType": "capital_assets", "formData": { "k": 1 } })),
        ];
        let selected = select_capital_assets(&instances).expect("capital assets");
        assert_eq!(selected.form_value("k"), Some(1.0));
        assert!(select_capital_assets(&[]).is_none());
    }
}
