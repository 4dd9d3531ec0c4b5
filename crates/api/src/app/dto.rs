use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use stockpulse_ai::{Classification, ForecastResult};
use stockpulse_core::{AbcCategory, DomainError, DomainResult, ItemId, Month};
use stockpulse_inventory::{Item, MonthlyAggregate};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub item_name: String,
    pub category: String,
    pub annual_usage_rate: f64,
    pub stock_turnover_rate: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopDemandsQuery {
    pub k: Option<usize>,
}

/// One month of caller-supplied history; demand is derived, never accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMonth {
    pub month: Month,
    #[serde(default)]
    pub restock_quantity: f64,
    pub beginning_inventory: f64,
    pub ending_inventory: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastRequest {
    pub item_id: Option<String>,
    pub item_name: Option<String>,
    pub history: Option<Vec<HistoryMonth>>,
}

/// Turn request history into ascending monthly aggregates for `item_id`.
///
/// Months may arrive in any order; a month given twice is rejected.
pub fn history_to_aggregates(item_id: ItemId, history: Vec<HistoryMonth>) -> DomainResult<Vec<MonthlyAggregate>> {
    let mut out = history
        .into_iter()
        .map(|h| {
            MonthlyAggregate::from_inventory(
                item_id,
                h.month,
                h.restock_quantity,
                h.beginning_inventory,
                h.ending_inventory,
            )
        })
        .collect::<DomainResult<Vec<_>>>()?;

    out.sort_by_key(|agg| agg.month);
    if let Some(pair) = out.windows(2).find(|w| w[0].month == w[1].month) {
        return Err(DomainError::validation(format!("month {} appears more than once in history", pair[0].month)));
    }
    Ok(out)
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub item_name: String,
    #[serde(rename = "ABC_category")]
    pub abc_category: AbcCategory,
}

impl From<Classification> for ClassifyResponse {
    fn from(c: Classification) -> Self {
        Self {
            item_name: c.item_name,
            abc_category: c.abc_category,
        }
    }
}

/// `{title: demand}` with keys emitted in ranking order (highest demand first).
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDemands(pub Vec<(String, f64)>);

impl Serialize for RankedDemands {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (title, demand) in &self.0 {
            map.serialize_entry(title, demand)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
pub struct ForecastEntry {
    #[serde(rename = "previousDemand")]
    pub previous_demand: Vec<f64>,
    pub forecast: Vec<f64>,
}

impl From<ForecastResult> for ForecastEntry {
    fn from(r: ForecastResult) -> Self {
        Self {
            previous_demand: r.previous_demand,
            forecast: r.forecast,
        }
    }
}

pub fn forecast_map(results: BTreeMap<String, ForecastResult>) -> BTreeMap<String, ForecastEntry> {
    results.into_iter().map(|(title, r)| (title, r.into())).collect()
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    #[serde(rename = "itemName")]
    pub item_name: String,
    #[serde(rename = "previousDemand")]
    pub previous_demand: Vec<f64>,
    pub forecast: Vec<f64>,
}

impl From<ForecastResult> for ForecastResponse {
    fn from(r: ForecastResult) -> Self {
        Self {
            item_name: r.item_name,
            previous_demand: r.previous_demand,
            forecast: r.forecast,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonthlyFigures {
    pub month: Month,
    pub restock_quantity: f64,
    pub beginning_inventory: f64,
    pub ending_inventory: f64,
    pub demand: f64,
}

#[derive(Debug, Serialize)]
pub struct ItemMonthlyResponse {
    pub item_id: ItemId,
    pub title: String,
    pub abc_category: Option<AbcCategory>,
    pub months: Vec<MonthlyFigures>,
}

impl ItemMonthlyResponse {
    pub fn new(item: Item, history: Vec<MonthlyAggregate>) -> Self {
        Self {
            item_id: item.id,
            title: item.title,
            abc_category: item.abc_category,
            months: history
                .into_iter()
                .map(|agg| MonthlyFigures {
                    month: agg.month,
                    restock_quantity: agg.restock_quantity,
                    beginning_inventory: agg.beginning_inventory,
                    ending_inventory: agg.ending_inventory,
                    demand: agg.demand,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(raw: &str) -> Month {
        raw.parse().unwrap()
    }

    fn entry(m: &str, restock: f64, begin: f64, end: f64) -> HistoryMonth {
        HistoryMonth {
            month: month(m),
            restock_quantity: restock,
            beginning_inventory: begin,
            ending_inventory: end,
        }
    }

    #[test]
    fn history_is_sorted_and_demand_derived() {
        let id = ItemId::new();
        let aggs = history_to_aggregates(id, vec![entry("2024-03", 5.0, 10.0, 12.0), entry("2024-01", 0.0, 4.0, 4.0)]).unwrap();

        assert_eq!(aggs.iter().map(|a| a.month.to_string()).collect::<Vec<_>>(), vec!["2024-01", "2024-03"]);
        assert_eq!(aggs[1].demand, 17.0);
        assert!(aggs.iter().all(|a| a.item_id == id));
    }

    #[test]
    fn duplicate_months_are_rejected() {
        let err = history_to_aggregates(ItemId::new(), vec![entry("2024-03", 0.0, 1.0, 1.0), entry("2024-03", 0.0, 2.0, 2.0)])
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_figures_are_rejected() {
        assert!(history_to_aggregates(ItemId::new(), vec![entry("2024-03", -1.0, 1.0, 1.0)]).is_err());
    }

    #[test]
    fn ranked_demands_keep_ranking_order() {
        let ranked = RankedDemands(vec![("Syringe".to_string(), 100.0), ("Gloves".to_string(), 17.0)]);
        assert_eq!(serde_json::to_string(&ranked).unwrap(), r#"{"Syringe":100.0,"Gloves":17.0}"#);
    }

    #[test]
    fn classify_response_uses_wire_names() {
        let body = serde_json::to_value(ClassifyResponse {
            item_name: "Gloves".to_string(),
            abc_category: AbcCategory::A,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "item_name": "Gloves", "ABC_category": "A" }));
    }

    #[test]
    fn history_month_parses_wire_shape() {
        let h: HistoryMonth = serde_json::from_value(serde_json::json!({
            "month": "2024-02", "beginning_inventory": 3, "ending_inventory": 4
        }))
        .unwrap();
        assert_eq!(h.month, month("2024-02"));
        assert_eq!(h.restock_quantity, 0.0);
    }
}
