//! Turning stylesheet rules into inline styles.
//!
//! [`apply_styles`] inlines ordinary rules, [`materialize_pseudo_elements`]
//! turns `::before`/`::after` rules into real spans, and
//! [`inherited_value`] answers "what colour does the preview show here".

mod apply;
mod computed;
mod pseudo;

pub use apply::{ROOT_SELECTOR, apply_styles};
pub use computed::inherited_value;
pub use pseudo::{PseudoKind, PseudoUrl, build_pseudo_span, materialize_pseudo_elements};
