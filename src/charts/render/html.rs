use serde_json::json;

use crate::error::Result;
use crate::figure::Figure;

/// plotly.js bundle the generated pages load.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Standalone HTML page drawing `fig` with plotly.js.
pub fn figure_to_html(fig: &Figure, page_title: Option<&str>) -> Result<String> {
    let doc = fig.to_json()?;
    // "</" inside a string literal would end the script block early
    let doc = serde_json::to_string(&doc)?.replace("</", "<\\/");

    let config = json!({
        "responsive": true,
        "displaylogo": false,
        "scrollZoom": fig.layout.dragmode.is_some(),
    });

    let title = page_title
        .or(fig.layout.title.as_deref())
        .unwrap_or("financeplotter");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:100vh;"></div>
<script>
var figure = {doc};
Plotly.newPlot("chart", figure.data, figure.layout, {config});
</script>
</body>
</html>
"#,
        title = escape_html(title),
        cdn = PLOTLY_CDN,
        doc = doc,
        config = config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{AxisValues, Scatter};

    #[test]
    fn test_html_embeds_figure() {
        let mut fig = Figure::new();
        fig.layout.set_title(Some("A & B"));
        fig.add_trace(Scatter::new("</script>", AxisValues::Numbers(vec![0.0]), vec![1.0]));

        let html = figure_to_html(&fig, None).unwrap();
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains("<\\/script>"));
        assert!(!html.contains("\"name\":\"</script>\""));
        assert!(html.contains("\"scrollZoom\":false"));
    }
}
