//! The view abstraction.
//!
//! A view turns the data of a pending request into markup. Concrete views
//! differ only in how markup is produced, so [`View`] has one hook to
//! implement ([`View::template`]) and one orchestration routine that every
//! view shares ([`View::render`]).
//!
//! # Render Lifecycle
//!
//! 1. **Await**: the request is awaited exactly once.
//! 2. **Template**: on success, `template` runs once with the resolved data.
//! 3. **Mount**: if a [`Mount`] was given, every element matching its
//!    selectors has its content replaced by the rendered markup.
//! 4. **Settle**: the rendered string is returned.
//!
//! A failed request, a failed template and a failed document update all
//! settle the render with an error; nothing is retried.
//!
//! # Example
//!
//! ```rust
//! use tungsten_view::{request, FnView, HtmlDocument, Mount, View};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! struct Greeting {
//!     name: String,
//! }
//!
//! let view = FnView::new(|data: &Greeting| Ok(format!("Hello, {}", data.name)));
//! let page = HtmlDocument::parse(r#"<div id="out"></div>"#);
//!
//! let request = request::resolved::<_, std::io::Error>(Greeting { name: "A".into() });
//! let rendered = view.render(request, Some(Mount::new(&page, "#out"))).await.unwrap();
//!
//! assert_eq!(rendered, "Hello, A");
//! assert_eq!(page.to_html(), r#"<div id="out">Hello, A</div>"#);
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::document::Document;
use crate::error::{DomResult, RenderError, TemplateResult};

/// Where rendered markup is injected: a document and a selector list.
///
/// Passing `None` instead of a mount renders without touching any document.
#[derive(Clone, Copy)]
pub struct Mount<'a> {
    document: &'a dyn Document,
    selectors: &'a str,
}

impl<'a> Mount<'a> {
    pub fn new(document: &'a dyn Document, selectors: &'a str) -> Self {
        Self {
            document,
            selectors,
        }
    }

    pub fn selectors(&self) -> &'a str {
        self.selectors
    }

    /// Replace the content of every matching element with `markup`.
    ///
    /// Elements are written in the order the document reports them.
    /// Returns how many elements were written; an empty selector string
    /// disables the mount and queries nothing.
    pub fn apply(&self, markup: &str) -> DomResult<usize> {
        if self.selectors.is_empty() {
            return Ok(0);
        }

        let nodes = self.document.query_selector_all(self.selectors)?;
        for &node in &nodes {
            debug!(node = %node, selectors = self.selectors, "Replacing element content");
            self.document.set_inner_html(node, markup)?;
        }
        Ok(nodes.len())
    }
}

impl fmt::Debug for Mount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("selectors", &self.selectors)
            .finish_non_exhaustive()
    }
}

/// Trait for view implementations.
///
/// Implement [`template`](View::template) to plug in a templating
/// mechanism; [`render`](View::render) is inherited.
///
/// # Threading
///
/// Renders run where the document lives, on one thread, so neither views
/// nor the futures returned by `render` have to be `Send`.
#[async_trait(?Send)]
pub trait View {
    /// Shape of the data this view renders.
    type Data;

    /// Name of a view type, without an instance.
    fn type_reference() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    /// Name of the concrete view type handling the call.
    ///
    /// Inside default methods `Self` already is the most-derived view, so
    /// this never needs a lookup and cannot fail.
    fn class_reference(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Produce markup from resolved data.
    ///
    /// Default: the empty string.
    fn template(&self, _data: &Self::Data) -> TemplateResult<String> {
        debug!(
            view = self.class_reference(),
            "{}",
            trace_label(self.class_reference(), "template")
        );
        Ok(String::new())
    }

    /// Await `request`, render its data and optionally mount the result.
    ///
    /// An error from `request` is returned unchanged as
    /// [`RenderError::Upstream`].
    async fn render<R, E>(
        &self,
        request: R,
        mount: Option<Mount<'_>>,
    ) -> Result<String, RenderError<E>>
    where
        R: Future<Output = Result<Self::Data, E>>,
    {
        info!(
            view = self.class_reference(),
            selectors = mount.as_ref().map(Mount::selectors),
            "{}",
            trace_label(self.class_reference(), "render")
        );

        let data = request.await.map_err(RenderError::Upstream)?;
        let rendered = self.template(&data)?;

        if let Some(mount) = mount {
            mount.apply(&rendered)?;
        }

        Ok(rendered)
    }
}

/// `Type.op()` for a type path such as `crate::module::Type<Args>`.
pub(crate) fn trace_label(type_name: &str, op: &str) -> String {
    let path = type_name.split('<').next().unwrap_or(type_name);
    let name = path.rsplit("::").next().unwrap_or(path);
    format!("{}.{}()", name, op)
}

/// Render through a borrowed view.
pub async fn render<V, R, E>(
    view: &V,
    request: R,
    mount: Option<Mount<'_>>,
) -> Result<String, RenderError<E>>
where
    V: View,
    R: Future<Output = Result<V::Data, E>>,
{
    view.render(request, mount).await
}

/// The base view: any JSON data, rendered as the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseView;

#[async_trait(?Send)]
impl View for BaseView {
    type Data = serde_json::Value;
}

/// A view whose template is a closure.
pub struct FnView<D, F> {
    template: F,
    _data: PhantomData<fn(&D)>,
}

impl<D, F> FnView<D, F>
where
    F: Fn(&D) -> TemplateResult<String>,
{
    pub fn new(template: F) -> Self {
        Self {
            template,
            _data: PhantomData,
        }
    }
}

#[async_trait(?Send)]
impl<D, F> View for FnView<D, F>
where
    F: Fn(&D) -> TemplateResult<String>,
{
    type Data = D;

    fn template(&self, data: &D) -> TemplateResult<String> {
        (self.template)(data)
    }
}
