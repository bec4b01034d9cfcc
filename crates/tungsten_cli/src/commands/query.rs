//! Query command - List elements matching a selector list.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use tungsten_view::{Document, HtmlDocument};

use super::render::load_document;

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// HTML document to search
    #[arg(long, env = "TUNGSTEN_DOCUMENT")]
    document: PathBuf,

    /// Selector list to match
    #[arg(short, long, env = "TUNGSTEN_SELECTORS")]
    selectors: String,

    /// Print matches as JSON
    #[arg(long)]
    json: bool,
}

/// One matched element.
#[derive(Debug, Serialize, PartialEq)]
pub struct ElementMatch {
    pub node: usize,
    pub tag: String,
    pub id: Option<String>,
    pub html: String,
}

pub async fn execute(args: QueryArgs) -> Result<()> {
    let document = load_document(&args.document).await?;
    let matches = find_matches(&document, &args.selectors)?;
    info!("{} element(s) match {:?}", matches.len(), args.selectors);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No elements match {}", args.selectors);
    }
    for m in &matches {
        match &m.id {
            Some(id) => println!("[{}] <{} id=\"{}\">", m.node, m.tag, id),
            None => println!("[{}] <{}>", m.node, m.tag),
        }
    }

    Ok(())
}

fn find_matches(document: &HtmlDocument, selectors: &str) -> Result<Vec<ElementMatch>> {
    let nodes = document
        .query_selector_all(selectors)
        .context("Failed to query document")?;

    nodes
        .into_iter()
        .map(|node| -> Result<ElementMatch> {
            Ok(ElementMatch {
                node: node.index(),
                tag: document.tag_name(node)?,
                id: document.attribute(node, "id")?,
                html: document.outer_html(node)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matches() {
        let document =
            HtmlDocument::parse(r#"<nav id="menu"><a href="/">Home</a></nav><a>Out</a>"#);
        let matches = find_matches(&document, "#menu, nav a").unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].tag, "nav");
        assert_eq!(matches[0].id.as_deref(), Some("menu"));
        assert_eq!(matches[1].html, r#"<a href="/">Home</a>"#);
    }

    #[test]
    fn test_invalid_selector() {
        let document = HtmlDocument::parse("<p></p>");
        let err = find_matches(&document, "p[").unwrap_err();
        assert!(err
            .chain()
            .any(|cause| cause.is::<tungsten_view::DomError>()));
    }
}
