//! HTML for the single-page form

use super::currency::format_price;
use super::options::{FieldKind, FormSpec};
use crate::data::CarQuery;
use crate::error::PriceError;

/// Outcome of one prediction as shown under the form
#[derive(Debug, Clone, PartialEq)]
pub enum PriceView {
    /// Formatted price
    Price(String),
    /// Message shown in place of the price
    Error(String),
}

impl PriceView {
    pub fn from_result(result: &Result<f64, PriceError>, symbol: &str) -> Self {
        match result {
            Ok(price) => PriceView::Price(format_price(*price, symbol)),
            Err(e) => PriceView::Error(e.to_string()),
        }
    }
}

/// Escape text for element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// The price fragment swapped in after every change
pub fn render_price(view: &PriceView) -> String {
    match view {
        PriceView::Price(price) => format!(
            r#"<div id="price" class="predicted-price">Predicted Car Price: {}</div>"#,
            escape_html(price)
        ),
        PriceView::Error(message) => format!(
            r#"<div id="price" class="price-error" role="alert">{}</div>"#,
            escape_html(message)
        ),
    }
}

fn render_fields(spec: &FormSpec, query: &CarQuery) -> String {
    let mut html = String::new();

    for field in spec.fields() {
        let key = field.id.key();
        let label = escape_html(field.id.label());
        let current = field.id.value_of(query);

        let control = match field.kind {
            FieldKind::Select(options) => {
                let opts: String = options
                    .iter()
                    .map(|o| {
                        let selected = if *o == current { " selected" } else { "" };
                        format!(r#"<option value="{0}"{1}>{0}</option>"#, escape_html(o), selected)
                    })
                    .collect();
                format!(r#"<label for="{key}">{label}</label><select id="{key}" name="{key}">{opts}</select>"#)
            }
            FieldKind::Radio(options) => {
                let opts: String = options
                    .iter()
                    .map(|o| {
                        let checked = if *o == current { " checked" } else { "" };
                        format!(
                            r#"<label class="radio"><input type="radio" name="{key}" value="{0}"{1}> {0}</label>"#,
                            escape_html(o),
                            checked
                        )
                    })
                    .collect();
                format!(r#"<fieldset><legend>{label}</legend><div class="radios">{opts}</div></fieldset>"#)
            }
            FieldKind::Number(range) => format!(
                r#"<label for="{key}">{label}</label><input type="number" id="{key}" name="{key}" min="{}" max="{}" step="1" value="{}">"#,
                range.min,
                range.max,
                escape_html(&current)
            ),
            FieldKind::Fixed(value) => format!(r#"<p class="fixed">{label} (Fixed to {value}): {value}</p>"#),
        };

        html.push_str(r#"<div class="field">"#);
        html.push_str(&control);
        html.push_str("</div>\n");
    }

    html
}

/// Full page with the form filled from `query`
pub fn render_page(spec: &FormSpec, query: &CarQuery, price: Option<&PriceView>) -> String {
    let fields = render_fields(spec, query);
    let price_html = match price {
        Some(view) => render_price(view),
        None => r#"<div id="price" class="predicted-price"></div>"#.to_string(),
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Car Price Predictor</title>
<script src="https://unpkg.com/htmx.org@1.9.12"></script>
<style>
  body {{ background-color: #f5f5f5; font-family: system-ui, sans-serif; max-width: 640px; margin: 0 auto; padding: 24px; }}
  .title {{ text-align: center; color: #2a9df4; font-size: 36px; font-weight: bold; margin-bottom: 40px; }}
  .field {{ margin-bottom: 16px; }}
  .field label, .field legend {{ display: block; font-size: 14px; margin-bottom: 4px; }}
  .field select, .field input[type=number] {{ width: 100%; padding: 6px; font-size: 14px; }}
  fieldset {{ border: none; padding: 0; margin: 0; }}
  .radios {{ display: flex; flex-wrap: wrap; gap: 10px; }}
  .radios label.radio {{ display: inline; }}
  .predicted-price {{ color: #ff5722; font-weight: bold; font-size: 24px; margin-top: 20px; }}
  .price-error {{ color: #b00020; font-size: 16px; margin-top: 20px; }}
</style>
</head>
<body>
<div class="title">Find the Best Price for Your Car</div>
<form id="car-form" hx-post="/predict" hx-trigger="change, input delay:300ms" hx-target="#price" hx-swap="outerHTML">
{fields}</form>
{price_html}
</body>
</html>"##
    )
}
