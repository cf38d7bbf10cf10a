use anyhow::Result;
use chartfuse_common::chart::{ChartCreate, ChartFilters};
use chartfuse_common::types::AggOp;
use chartfuse_common::value::Row;
use chartfuse_data::csv::read_csv_bytes;
use chartfuse_data::error::DataError;
use chartfuse_engine::{FusionEngine, FusionError};
use serde_json::{json, Value};

const SALES: &[u8] = b"State,Region,Product,Revenue,Income
CA,West,A,100.0,70.5
CA,West,B,50.0,80.0
NY,East,A,80.0,
TX,South,B,60.0,55.0
TX,South,A,40.0,62.5
";

fn sales_engine() -> Result<(FusionEngine, String)> {
    let engine = FusionEngine::in_memory();
    let dataset = engine.add_dataset("sales.csv", read_csv_bytes(SALES)?)?;
    Ok((engine, dataset.dataset_id.clone()))
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn rows(value: Value) -> Vec<Row> {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_dataset_columns_are_categorized() -> Result<()> {
    let (engine, ds) = sales_engine()?;
    let dataset = engine.dataset(&ds)?;
    assert_eq!(dataset.name, "sales.csv");
    assert_eq!(
        dataset.columns.dimensions,
        vec!["State", "Region", "Product"]
    );
    assert_eq!(dataset.columns.measures, vec!["Revenue", "Income"]);
    assert_eq!(engine.datasets().ids(), vec![ds]);
    Ok(())
}

#[tokio::test]
async fn test_count_chart_without_measures() -> Result<()> {
    let (engine, ds) = sales_engine()?;
    let chart = engine
        .create_chart(ChartCreate {
            dataset_id: ds,
            dimensions: strings(&["Region"]),
            agg: AggOp::Count,
            ..Default::default()
        })
        .await?;

    assert_eq!(chart.measures, vec!["count"]);
    assert_eq!(chart.agg, Some(AggOp::Count));
    assert_eq!(chart.title, "Distribution by Region");
    assert_eq!(
        chart.table,
        rows(json!([
            {"Region": "East", "count": 1},
            {"Region": "South", "count": 2},
            {"Region": "West", "count": 2},
        ]))
    );
    Ok(())
}

#[tokio::test]
async fn test_filters_apply_before_aggregation() -> Result<()> {
    let (engine, ds) = sales_engine()?;
    let mut filters = ChartFilters::new();
    filters.insert("Region".to_string(), strings(&["West"]));

    let chart = engine
        .create_chart(ChartCreate {
            dataset_id: ds,
            dimensions: strings(&["Product"]),
            measures: strings(&["Revenue"]),
            title: Some("West revenue".to_string()),
            filters: Some(filters.clone()),
            ..Default::default()
        })
        .await?;

    assert_eq!(chart.title, "West revenue");
    assert_eq!(chart.filters, filters);
    assert_eq!(
        chart.table,
        rows(json!([
            {"Product": "A", "Revenue": 100.0},
            {"Product": "B", "Revenue": 50.0},
        ]))
    );
    Ok(())
}

#[tokio::test]
async fn test_precomputed_table_is_stored_verbatim() -> Result<()> {
    let (engine, ds) = sales_engine()?;
    let table = rows(json!([
        {"bin": 10, "count": 3},
        {"bin": 2, "count": 1},
        {"bin": null, "count": 4},
        {"bin": 2, "count": 5},
    ]));
    let chart = engine
        .create_chart(ChartCreate {
            dataset_id: ds,
            dimensions: strings(&["bin"]),
            measures: strings(&["count"]),
            agg: AggOp::Count,
            table: Some(table.clone()),
            original_measure: Some("Revenue".to_string()),
            ..Default::default()
        })
        .await?;

    assert_eq!(chart.table, table);
    assert_eq!(chart.original_measure.as_deref(), Some("Revenue"));
    assert_eq!(chart.title, "count by bin");
    assert_eq!(
        engine.chart_dimension_values(&chart.chart_id, "bin")?,
        vec![json!(2), json!(10)]
    );
    assert!(engine
        .chart_dimension_values(&chart.chart_id, "missing")?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn test_create_chart_errors() -> Result<()> {
    let (engine, ds) = sales_engine()?;

    let err = engine
        .create_chart(ChartCreate {
            dataset_id: "nope".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FusionError::DatasetNotFound(_)));

    let err = engine
        .create_chart(ChartCreate {
            dataset_id: ds.clone(),
            dimensions: strings(&["Region"]),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FusionError::DataError(DataError::MissingMeasure)
    ));

    let err = engine
        .create_chart(ChartCreate {
            dataset_id: ds,
            dimensions: strings(&["Country"]),
            measures: strings(&["Revenue"]),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FusionError::MissingColumn { ref column, .. } if column == "Country"));

    assert!(engine.charts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_chart_table_view_formats_cells() -> Result<()> {
    let (engine, ds) = sales_engine()?;
    let chart = engine
        .create_chart(ChartCreate {
            dataset_id: ds,
            dimensions: strings(&["State"]),
            measures: strings(&["Income"]),
            agg: AggOp::Avg,
            ..Default::default()
        })
        .await?;

    let view = engine.chart_table(&chart.chart_id)?;
    assert_eq!(view.chart_id, chart.chart_id);
    assert_eq!(view.title, "Income by State");
    assert_eq!(view.headers, vec!["State", "Income"]);
    assert_eq!(
        view.rows,
        vec![
            vec![json!("CA"), json!(75.25)],
            vec![json!("NY"), json!("N/A")],
            vec![json!("TX"), json!(58.75)],
        ]
    );
    assert_eq!(view.total_rows, 3);

    assert!(matches!(
        engine.chart_table("missing"),
        Err(FusionError::ChartNotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_dataset_profiles() -> Result<()> {
    let (engine, ds) = sales_engine()?;

    let histogram = engine.histogram(&ds, "Income")?;
    assert_eq!(histogram.values, vec![70.5, 80.0, 55.0, 62.5]);
    assert_eq!(histogram.stats.count, 4);
    assert_eq!(histogram.stats.max, Some(80.0));

    let counts = engine.dimension_counts(&ds, "Region").await?;
    assert_eq!(counts.labels, vec!["South", "West", "East"]);
    assert_eq!(counts.counts, vec![2, 2, 1]);
    assert_eq!(counts.total, 5);
    Ok(())
}
