use crate::error::ReportError;
use crate::model::{GasRange, ResultTable};
use crate::render::{PercentMode, RenderOptions};

/// Render the gas comparison table as a self-contained HTML document.
///
/// Layout: two label columns (test, action) followed by one column per
/// market. Each test is a `<tbody>` whose first cell spans all its action
/// rows. Measured cells carry the gas value, a relative-cost annotation and a
/// background color from the row's gradient; unmeasured cells show a dash.
///
/// The template holds CSS braces, so it is filled with `replace` rather than
/// `format!()`.
pub fn render_html_report(
    table: &ResultTable,
    opts: &RenderOptions,
) -> Result<String, ReportError> {
    if table.is_empty() {
        return Err(ReportError::EmptyResultSet);
    }
    let markets: Vec<&str> = table.markets().collect();

    let mut head = String::from("      <th>Test</th>\n      <th>Action</th>\n");
    for market in &markets {
        head.push_str(&format!("      <th class=\"num\">{}</th>\n", escape_html(market)));
    }

    let mut body = String::new();
    for test in table.test_names() {
        let row = table.row(test);
        body.push_str("  <tbody>\n");
        for (i, action) in row.iter().enumerate() {
            body.push_str("    <tr>\n");
            if i == 0 {
                body.push_str(&format!(
                    "      <th class=\"test\" rowspan=\"{}\">{}</th>\n",
                    row.len(),
                    escape_html(test)
                ));
            }
            body.push_str(&format!("      <td class=\"action\">{}</td>\n", escape_html(action)));

            let range = table.gas_range(test, action);
            for market in &markets {
                body.push_str(&render_cell(table.gas(market, test, action), range, opts));
            }
            body.push_str("    </tr>\n");
        }
        body.push_str("  </tbody>\n");
    }

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Gas report</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 16px; }
  table { border-collapse: collapse; }
  th, td { border: 1px solid #ccc; padding: 4px 8px; font-size: 14px; }
  th.test { text-align: left; vertical-align: top; }
  td.action { color: #333; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
  .pct { color: #222; font-size: 12px; margin-left: 6px; }
  .miss { color: #999; text-align: center; }
  caption { caption-side: bottom; color: #777; font-size: 12px; padding-top: 6px; }
</style>
</head>
<body>
<table>
  <caption>__CAPTION__</caption>
  <thead>
    <tr>
__HEAD__    </tr>
  </thead>
__BODY__</table>
</body>
</html>
"#;

    let caption = match opts.percent {
        PercentMode::AboveMinimum => "gas used; percentage above the cheapest market",
        PercentMode::OfMaximum => "gas used; percentage of the most expensive market",
    };

    Ok(TEMPLATE
        .replace("__CAPTION__", caption)
        .replace("__HEAD__", &head)
        .replace("__BODY__", &body))
}

fn render_cell(gas: u64, range: Option<GasRange>, opts: &RenderOptions) -> String {
    match (gas, range) {
        (0, _) | (_, None) => "      <td class=\"miss\">&ndash;</td>\n".to_string(),
        (gas, Some(range)) => format!(
            "      <td class=\"num\" style=\"background-color: {}\">{}<span class=\"pct\">{}</span></td>\n",
            opts.colors.color_for(gas, Some(range)),
            gas,
            annotate(gas, range, opts.percent)
        ),
    }
}

/// Relative-cost label of a measured cell.
pub fn annotate(gas: u64, range: GasRange, mode: PercentMode) -> String {
    match mode {
        PercentMode::AboveMinimum => {
            let above = (gas.saturating_sub(range.min)) as f64 / range.min.max(1) as f64;
            format!("+{}%", (above * 100.0).round() as u64)
        }
        PercentMode::OfMaximum => {
            let of = gas as f64 / range.max.max(1) as f64;
            format!("{}%", (of * 100.0).round() as u64)
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CallMode, aggregate};
    use crate::render::Rgb;
    use crate::testlog::parse_output;
    use pretty_assertions::assert_eq;

    fn report(text: &str, opts: &RenderOptions) -> Result<String, ReportError> {
        let table = aggregate(parse_output(text).unwrap(), CallMode::Unfiltered);
        render_html_report(&table, opts)
    }

    const SWAP: &str = "\
Logs:
  [M1] (testSwap) (swap) gas: 1000
  [M2] (testSwap) (swap) gas: 2000
";

    #[test]
    fn cheapest_is_low_color_most_expensive_is_high_color() {
        let html = report(SWAP, &RenderOptions::default()).unwrap();
        let green = format!(
            "background-color: {}\">1000<span class=\"pct\">+0%</span>",
            Rgb::GREEN
        );
        let red = format!(
            "background-color: {}\">2000<span class=\"pct\">+100%</span>",
            Rgb::RED
        );
        assert!(html.contains(&green), "{html}");
        assert!(html.contains(&red), "{html}");
    }

    #[test]
    fn of_maximum_annotation() {
        let opts = RenderOptions {
            percent: PercentMode::OfMaximum,
            ..RenderOptions::default()
        };
        let html = report(SWAP, &opts).unwrap();
        assert!(html.contains("1000<span class=\"pct\">50%</span>"));
        assert!(html.contains("2000<span class=\"pct\">100%</span>"));
    }

    #[test]
    fn annotate_rounds_percentages() {
        let range = GasRange { min: 300, max: 400 };
        assert_eq!(annotate(400, range, PercentMode::AboveMinimum), "+33%");
        assert_eq!(annotate(300, range, PercentMode::OfMaximum), "75%");
    }

    #[test]
    fn unmeasured_and_absent_cells_render_as_no_data() {
        let text = "\
Logs:
  [M1] (testSwap) (swap) gas: 1000
  [M1] (testSwap) (approve) gas: 50
  [M2] (testSwap) (swap)
";
        let html = report(text, &RenderOptions::default()).unwrap();
        // M2 swap is unmeasured and M2 approve is absent.
        assert_eq!(html.matches("class=\"miss\"").count(), 2);
        // A lone measured value sits at the low end of its own row.
        assert_eq!(html.matches(&Rgb::GREEN.to_string()).count(), 2);
        assert!(!html.contains(&Rgb::RED.to_string()));
    }

    #[test]
    fn one_cell_per_market_per_action_row() {
        let text = "\
Logs:
  [A] (testBorrow) (supply) gas: 10
  [A] (testBorrow) (borrow) gas: 20
  [B] (testBorrow) (supply) gas: 15
  [C] (testRepay) (repay) gas: 5
";
        let html = report(text, &RenderOptions::default()).unwrap();
        assert_eq!(html.matches("<tbody>").count(), 2);
        assert_eq!(html.matches("<tr>").count(), 1 + 3);
        assert!(html.contains("rowspan=\"2\">testBorrow</th>"));
        assert!(html.contains("rowspan=\"1\">testRepay</th>"));
        // 3 markets on each of 3 action rows.
        let cells = html.matches("<td class=\"num\"").count()
            + html.matches("class=\"miss\"").count();
        assert_eq!(cells, 9);
        assert!(html.find("testBorrow").unwrap() < html.find("testRepay").unwrap());
    }

    #[test]
    fn labels_are_escaped() {
        let html = report("Logs:\n[A<b>] (t&u) (a) gas: 1\n", &RenderOptions::default()).unwrap();
        assert!(html.contains("A&lt;b&gt;"));
        assert!(html.contains("t&amp;u"));
    }

    #[test]
    fn no_measurements_is_an_error() {
        let err = report("Compiling 3 files\nLogs:\n  nothing useful\n", &RenderOptions::default())
            .unwrap_err();
        assert_eq!(err, ReportError::EmptyResultSet);
    }
}
