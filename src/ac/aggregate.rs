use std::cmp::Ordering;

use ahash::AHashSet;
use anyhow::{anyhow, Context, Result};
use polars::{frame::DataFrame, prelude::*, series::Series};

use crate::{
    config::Schema,
    map::{numeric_values, text_values, JoinCardinality, VillageLayer},
};

const GROUP: &str = "__group";
const TOTAL: &str = "__total";

/// Round to two decimal places, halves to even.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Column name of a demographic field's turnout-weighted average.
pub fn weighted_column(field: &str) -> String {
    format!("{field}_weighted")
}

/// Statistics of one constituency.
#[derive(Debug, Clone, PartialEq)]
pub struct AcStats {
    /// Grouping key; `None` collects rows without one.
    pub key: Option<String>,
    pub total_votes: f64,
    /// Summed counts, in schema party order.
    pub party_votes: Vec<f64>,
    /// Shares recomputed from the sums; 0 when the total is 0.
    pub party_shares: Vec<f64>,
    /// Turnout-weighted demographic averages; `None` without valid rows.
    pub weighted: Vec<Option<f64>>,
}

/// Per-constituency statistics, sorted by key with the missing key last.
#[derive(Debug, Clone)]
pub struct AcAggregate {
    group_column: String,
    schema: Schema,
    demographics: Vec<String>,
    stats: Vec<AcStats>,
}

impl AcAggregate {
    /// Aggregate a merged village layer.
    ///
    /// A village split over several polygons carries its sheet row on each
    /// part; such repeats are counted once.
    pub fn from_layer(layer: &VillageLayer, group_column: &str) -> Result<Self> {
        let data = match layer.cardinality() {
            JoinCardinality::OneToOne => layer.data().clone(),
            JoinCardinality::ManyToOne => {
                let mut seen = AHashSet::new();
                let mask = layer.keys()?.into_iter()
                    .map(|key| Some(key.is_none_or(|key| seen.insert(key))))
                    .collect::<BooleanChunked>();
                layer.data().filter(&mask)?
            }
        };
        aggregate(&data, layer.schema(), group_column, layer.demographics())
    }

    #[inline] pub fn group_column(&self) -> &str { &self.group_column }

    #[inline] pub fn schema(&self) -> &Schema { &self.schema }

    #[inline] pub fn demographics(&self) -> &[String] { &self.demographics }

    #[inline] pub fn stats(&self) -> &[AcStats] { &self.stats }

    #[inline] pub fn len(&self) -> usize { self.stats.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.stats.is_empty() }

    /// Index of the row for `key`, if the group exists.
    pub fn position(&self, key: Option<&str>) -> Option<usize> {
        self.stats.iter().position(|s| s.key.as_deref() == key)
    }

    pub fn get(&self, key: Option<&str>) -> Option<&AcStats> {
        self.position(key).map(|i| &self.stats[i])
    }

    /// Columns: group key, total, party counts, `<party>_share`, `<field>_weighted`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        stats_frame(
            &self.group_column,
            &self.schema,
            &self.demographics,
            self.stats.iter().map(|s| (s.key.clone(), Some(s))).collect(),
        )
    }
}

/// Group village rows of `data` by `group_column` and summarise each group.
///
/// Counts are summed with missing values ignored. Each party share is
/// recomputed from the sums, rounded to two decimals, and is 0 when the
/// summed total is 0. Each demographic field is averaged weighted by total
/// votes over rows where both are present, rounded to two decimals, and is
/// missing when no such row exists or their turnout sums to 0. Rows with a
/// missing group key form their own group.
pub fn aggregate(data: &DataFrame, schema: &Schema, group_column: &str, demographics: &[String]) -> Result<AcAggregate> {
    let height = data.height();
    let numeric = |name: &str, alias: String| -> Result<Column> {
        Ok(match data.get_column_index(name) {
            Some(_) => numeric_values(data.column(name)?)?.with_name(alias.into()).into_series().into(),
            None => Series::full_null(alias.into(), height, &DataType::Float64).into(),
        })
    };

    let groups = data.column(group_column)
        .with_context(|| format!("[aggregate] missing group column {group_column:?}"))?;

    let mut columns = vec![
        Series::new(GROUP.into(), text_values(groups)?).into(),
        numeric(&schema.total_votes, TOTAL.to_string())?,
    ];
    for (i, party) in schema.parties.iter().enumerate() {
        columns.push(numeric(&party.votes, format!("__votes_{i}"))?);
    }
    for (i, field) in demographics.iter().enumerate() {
        columns.push(numeric(field, format!("__demo_{i}"))?);
    }
    let work = DataFrame::new(columns)?;

    let mut exprs = vec![col(TOTAL).sum().alias(TOTAL)];
    for i in 0..schema.parties.len() {
        let name = format!("__votes_{i}");
        exprs.push(col(name.as_str()).sum().alias(name.as_str()));
    }
    for i in 0..demographics.len() {
        let field = format!("__demo_{i}");
        let valid = col(field.as_str()).is_not_null().and(col(TOTAL).is_not_null());
        exprs.push((col(field.as_str()) * col(TOTAL)).sum().alias(format!("__num_{i}").as_str()));
        exprs.push(when(valid.clone()).then(col(TOTAL)).otherwise(lit(0.0)).sum().alias(format!("__den_{i}").as_str()));
        exprs.push(when(valid).then(lit(1.0)).otherwise(lit(0.0)).sum().alias(format!("__cnt_{i}").as_str()));
    }

    let grouped = work.lazy()
        .group_by([col(GROUP)])
        .agg(exprs)
        .collect()?;

    let floats = |name: &str| -> Result<Vec<f64>> {
        let column = grouped.column(name)?.cast(&DataType::Float64)?;
        Ok(column.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect())
    };

    let keys = text_values(grouped.column(GROUP)?)?;
    let totals = floats(TOTAL)?;
    let votes = (0..schema.parties.len())
        .map(|i| floats(&format!("__votes_{i}")))
        .collect::<Result<Vec<_>>>()?;
    let weights = (0..demographics.len())
        .map(|i| -> Result<_> {
            Ok((
                floats(&format!("__num_{i}"))?,
                floats(&format!("__den_{i}"))?,
                floats(&format!("__cnt_{i}"))?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut stats = keys.into_iter().enumerate()
        .map(|(row, key)| {
            let total = totals[row];
            let party_votes = votes.iter().map(|v| v[row]).collect::<Vec<_>>();
            let party_shares = party_votes.iter()
                .map(|&count| share(count, total))
                .collect();
            let weighted = weights.iter()
                .map(|(num, den, cnt)| weighted_average(num[row], den[row], cnt[row]))
                .collect();
            AcStats { key, total_votes: total, party_votes, party_shares, weighted }
        })
        .collect::<Vec<_>>();
    stats.sort_by(|a, b| compare_keys(a.key.as_deref(), b.key.as_deref()));

    log::info!("[aggregate] {height} village rows into {} groups by {group_column:?}", stats.len());

    Ok(AcAggregate {
        group_column: group_column.to_string(),
        schema: schema.clone(),
        demographics: demographics.to_vec(),
        stats,
    })
}

#[inline]
fn share(count: f64, total: f64) -> f64 {
    if total == 0.0 { return 0.0 }
    let share = count / total * 100.0;
    if share.is_finite() { round2(share) } else { 0.0 }
}

#[inline]
fn weighted_average(numerator: f64, denominator: f64, rows: f64) -> Option<f64> {
    if rows == 0.0 || denominator == 0.0 { return None }
    Some(numerator / denominator).filter(|v| v.is_finite()).map(round2)
}

/// Key order: present keys ascending, then the missing key.
pub(crate) fn compare_keys(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Statistics frame with one row per `(key, stats)`; rows without stats are null.
pub(crate) fn stats_frame(
    group_column: &str,
    schema: &Schema,
    demographics: &[String],
    rows: Vec<(Option<String>, Option<&AcStats>)>,
) -> Result<DataFrame> {
    let numbers = |name: String, pick: &dyn Fn(&AcStats) -> Option<f64>| -> Column {
        let values = rows.iter()
            .map(|(_, stats)| stats.and_then(pick))
            .collect::<Vec<_>>();
        Series::new(name.into(), values).into()
    };

    let mut columns = vec![
        Series::new(group_column.into(), rows.iter().map(|(key, _)| key.clone()).collect::<Vec<_>>()).into(),
        numbers(schema.total_votes.clone(), &|s: &AcStats| Some(s.total_votes)),
    ];
    for (i, party) in schema.parties.iter().enumerate() {
        columns.push(numbers(party.votes.clone(), &|s: &AcStats| s.party_votes.get(i).copied()));
    }
    for (i, party) in schema.parties.iter().enumerate() {
        columns.push(numbers(party.aggregate_share(), &|s: &AcStats| s.party_shares.get(i).copied()));
    }
    for (i, field) in demographics.iter().enumerate() {
        columns.push(numbers(weighted_column(field), &|s: &AcStats| s.weighted.get(i).copied().flatten()));
    }

    DataFrame::new(columns).map_err(|e| anyhow!("[aggregate] failed to build statistics frame: {e}"))
}
