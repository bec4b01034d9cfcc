//! Render command - Render JSON data through a template literal.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::{debug, info};

use tungsten_view::{render, request, HtmlDocument, LiteralView, Mount};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// JSON file holding the data to render
    #[arg(short, long, env = "TUNGSTEN_DATA")]
    data: PathBuf,

    /// Template literal source, or @path to read it from a file
    #[arg(short, long, env = "TUNGSTEN_TEMPLATE")]
    template: String,

    /// HTML document to render into
    #[arg(long, env = "TUNGSTEN_DOCUMENT", requires = "selectors")]
    document: Option<PathBuf>,

    /// Selectors of the elements whose content is replaced
    #[arg(short, long, env = "TUNGSTEN_SELECTORS", requires = "document")]
    selectors: Option<String>,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Hold the data back for this many milliseconds before rendering
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

pub async fn execute(args: RenderArgs) -> Result<()> {
    let source = load_template(&args.template).await?;
    let view = LiteralView::new(source);
    debug!("Template placeholders: {:?}", view.placeholders());

    let document = match &args.document {
        Some(path) => Some(load_document(path).await?),
        None => None,
    };
    let mount = match (&document, &args.selectors) {
        (Some(document), Some(selectors)) => Some(Mount::new(document, selectors.as_str())),
        _ => None,
    };

    info!("Rendering {:?}", args.data);
    let delay = Duration::from_millis(args.delay_ms);
    let pending = request::from_json_file::<Value>(&args.data);
    let data = async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        pending.await
    };

    let rendered = render(&view, data, mount)
        .await
        .context("Failed to render view")?;

    let output = match &document {
        Some(document) => document.to_html(),
        None => rendered,
    };

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &output)
                .await
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!("Wrote {:?}", path);
        }
        None => println!("{}", output),
    }

    Ok(())
}

/// Read the template from `@path`, or take the argument as the source.
async fn load_template(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read template {}", path)),
        None => Ok(arg.to_string()),
    }
}

/// Load a document, as a whole page when it starts with a doctype or an
/// `html` tag and as a fragment otherwise.
pub(crate) async fn load_document(path: &Path) -> Result<HtmlDocument> {
    let markup = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read document {:?}", path))?;
    if is_full_page(&markup) {
        debug!("Parsing {:?} as a full page", path);
        Ok(HtmlDocument::parse_document(&markup))
    } else {
        Ok(HtmlDocument::parse(&markup))
    }
}

fn is_full_page(markup: &str) -> bool {
    let head: String = markup
        .trim_start()
        .chars()
        .take(9)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tungsten_view::{RenderError, RequestError};

    fn args(dir: &TempDir, template: &str) -> RenderArgs {
        RenderArgs {
            data: dir.path().join("data.json"),
            template: template.to_string(),
            document: None,
            selectors: None,
            output: Some(dir.path().join("out.html")),
            delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_render_to_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data.json"), r#"{"name": "A"}"#).unwrap();

        execute(args(&dir, "Hello, ${name}")).await.unwrap();

        let out = fs::read_to_string(dir.path().join("out.html")).unwrap();
        assert_eq!(out, "Hello, A");
    }

    #[tokio::test]
    async fn test_render_into_document() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data.json"), r#"{"name": "A"}"#).unwrap();
        fs::write(dir.path().join("page.html"), r#"<div id="out"></div><p>x</p>"#).unwrap();
        fs::write(dir.path().join("greeting.tpl"), "<b>${name}</b>").unwrap();

        let mut render_args = args(
            &dir,
            &format!("@{}", dir.path().join("greeting.tpl").display()),
        );
        render_args.document = Some(dir.path().join("page.html"));
        render_args.selectors = Some("#out".to_string());
        execute(render_args).await.unwrap();

        let out = fs::read_to_string(dir.path().join("out.html")).unwrap();
        assert_eq!(out, r#"<div id="out"><b>A</b></div><p>x</p>"#);
    }

    #[tokio::test]
    async fn test_render_into_full_page() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data.json"), r#"{"name": "A"}"#).unwrap();
        fs::write(
            dir.path().join("page.html"),
            "<!DOCTYPE html>\n<html><head><title>Page</title></head><body><main></main></body></html>",
        )
        .unwrap();

        let mut render_args = args(&dir, "${name}");
        render_args.document = Some(dir.path().join("page.html"));
        render_args.selectors = Some("main".to_string());
        execute(render_args).await.unwrap();

        let out = fs::read_to_string(dir.path().join("out.html")).unwrap();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<head><title>Page</title></head>"));
        assert!(out.contains("<main>A</main>"));
    }

    #[test]
    fn test_full_page_detection() {
        assert!(is_full_page("<!DOCTYPE html><p></p>"));
        assert!(is_full_page("  \n<HTML lang=\"en\">"));
        assert!(!is_full_page(r#"<div id="out"></div>"#));
        assert!(!is_full_page(""));
    }

    #[tokio::test]
    async fn test_missing_data_file_is_upstream_error() {
        let dir = TempDir::new().unwrap();
        let err = execute(args(&dir, "x")).await.unwrap_err();

        let render = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<RenderError<RequestError>>())
            .unwrap();
        assert!(render.is_upstream());
        assert!(!dir.path().join("out.html").exists());
    }
}
