//! Chart.js configurations for the report and dashboard pages.
//!
//! The browser only instantiates `new Chart(canvas, config)`; everything
//! data-dependent is decided here.

use serde_json::{json, Value};

use crate::models::ChartSeries;

pub const PALETTE: [&str; 8] = [
    "#667eea", "#764ba2", "#f093fb", "#4facfe", "#43e97b", "#fa709a", "#fee140", "#30cfd0",
];

/// Revenue over time.
pub fn line_chart(series: &ChartSeries, label: &str) -> Value {
    json!({
        "type": "line",
        "data": {
            "labels": series.labels,
            "datasets": [{
                "label": label,
                "data": series.values,
                "borderColor": PALETTE[0],
                "backgroundColor": "rgba(102, 126, 234, 0.1)",
                "tension": 0.4,
                "fill": true
            }]
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": true,
            "plugins": { "legend": { "display": false } },
            "scales": { "y": { "beginAtZero": true } }
        }
    })
}

/// Share per label. An empty series renders as a single `No Data` slice.
pub fn pie_chart(series: &ChartSeries) -> Value {
    let (labels, values) = if series.is_empty() {
        (vec!["No Data".to_string()], vec![1.0])
    } else {
        (series.labels.clone(), series.values.clone())
    };
    let colors: Vec<&str> = PALETTE.iter().copied().cycle().take(labels.len()).collect();

    json!({
        "type": "pie",
        "data": {
            "labels": labels,
            "datasets": [{
                "data": values,
                "backgroundColor": colors
            }]
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": true,
            "plugins": { "legend": { "position": "bottom" } }
        }
    })
}

/// Serializes a config for embedding inside a `<script>` element.
pub fn to_script_json(config: &Value) -> String {
    config.to_string().replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(pairs: &[(&str, f64)]) -> ChartSeries {
        let mut s = ChartSeries::default();
        for (label, value) in pairs {
            s.push(*label, *value);
        }
        s
    }

    #[test]
    fn line_chart_carries_labels_and_values() {
        let config = line_chart(&series(&[("2026-10", 120.0), ("2026-11", 80.5)]), "Sales");
        assert_eq!(config["type"], "line");
        assert_eq!(config["data"]["labels"], json!(["2026-10", "2026-11"]));
        assert_eq!(config["data"]["datasets"][0]["data"], json!([120.0, 80.5]));
        assert_eq!(config["data"]["datasets"][0]["label"], "Sales");
    }

    #[test]
    fn empty_pie_shows_no_data() {
        let config = pie_chart(&ChartSeries::default());
        assert_eq!(config["data"]["labels"], json!(["No Data"]));
        assert_eq!(config["data"]["datasets"][0]["data"], json!([1.0]));
    }

    #[test]
    fn pie_colors_cycle_through_the_palette() {
        let pairs: Vec<(String, f64)> = (0..10).map(|i| (format!("s{}", i), 1.0)).collect();
        let refs: Vec<(&str, f64)> = pairs.iter().map(|(l, v)| (l.as_str(), *v)).collect();
        let config = pie_chart(&series(&refs));
        let colors = config["data"]["datasets"][0]["backgroundColor"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(colors.len(), 10);
        assert_eq!(colors[8], json!(PALETTE[0]));
    }

    #[test]
    fn script_json_cannot_close_the_script_tag() {
        let config = pie_chart(&series(&[("</script><b>", 1.0)]));
        let text = to_script_json(&config);
        assert!(!text.contains("</script>"));
        assert!(text.contains("<\\/script>"));
    }
}
