//! The nine-input form: option sets, submission handling and rendering

mod currency;
mod options;
mod render;

pub use currency::format_price;
pub use options::{Field, FieldId, FieldKind, FormInput, FormSpec, NumericRange, VocabularyGap};
pub use render::{escape_html, render_page, render_price, PriceView};
