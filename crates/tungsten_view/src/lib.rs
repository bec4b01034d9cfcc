//! # tungsten_view
//!
//! Templated views for tungsten.
//!
//! A view resolves a pending data source, turns the data into markup with
//! its template hook, and optionally injects that markup into every element
//! of a document matching a selector list.
//!
//! # Architecture
//!
//! - **View**: the trait with the `template` hook and the shared `render`
//! - **Request**: constructors for pending data sources
//! - **Document**: the page capability a view writes into, plus an
//!   in-memory HTML implementation built on `scraper`
//! - **Literal**: a view interpolating `${path}` placeholders from JSON
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tungsten_view::{request, HtmlDocument, LiteralView, Mount, View};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let page = HtmlDocument::parse(r#"<ul><li class="who"></li><li class="who"></li></ul>"#);
//! let view = LiteralView::new("<b>${name}</b>");
//!
//! let data = request::from_json_str(r#"{"name": "A"}"#);
//! let rendered = view.render(data, Some(Mount::new(&page, ".who"))).await?;
//!
//! assert_eq!(rendered, "<b>A</b>");
//! assert_eq!(
//!     page.to_html(),
//!     r#"<ul><li class="who"><b>A</b></li><li class="who"><b>A</b></li></ul>"#
//! );
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod literal;
pub mod request;
pub mod view;

// Re-export main types for convenience
pub use document::{Document, HtmlDocument, NodeId};
pub use error::{DomError, DomResult, RenderError, RequestError, TemplateError, TemplateResult};
pub use literal::LiteralView;
pub use view::{render, BaseView, FnView, Mount, View};
