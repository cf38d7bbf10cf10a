/// Join names as `a`, `a and b`, `a, b and c`
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Build a readable title from a chart's dimensions and measures
///
/// - `["State"]`, `["Revenue"]` -> `Revenue by State`
/// - `[]`, `["Revenue"]` -> `Total Revenue`
/// - `["State"]`, `[]` -> `Distribution by State`
pub fn generate_chart_title(dimensions: &[String], measures: &[String]) -> String {
    if dimensions.is_empty() && measures.is_empty() {
        return "Empty Chart".to_string();
    }

    let measure_text = join_names(measures);
    if dimensions.is_empty() {
        return format!("Total {measure_text}");
    }

    let dimension_text = format!("by {}", join_names(dimensions));
    if measures.is_empty() {
        format!("Distribution {dimension_text}")
    } else {
        format!("{measure_text} {dimension_text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_titles() {
        assert_eq!(generate_chart_title(&[], &[]), "Empty Chart");
        assert_eq!(
            generate_chart_title(&names(&["State"]), &names(&["Revenue"])),
            "Revenue by State"
        );
        assert_eq!(
            generate_chart_title(&names(&["State", "Year"]), &names(&["Revenue", "Cost"])),
            "Revenue and Cost by State and Year"
        );
        assert_eq!(
            generate_chart_title(&names(&["A", "B", "C"]), &names(&["M"])),
            "M by A, B and C"
        );
        assert_eq!(generate_chart_title(&[], &names(&["Revenue"])), "Total Revenue");
        assert_eq!(
            generate_chart_title(&names(&["Region"]), &[]),
            "Distribution by Region"
        );
    }
}
