//! Structural extraction over a browser-rendered DOM.
//!
//! The walk keeps headings, prose, images, figures, lists, tables and quotes in
//! document order and rewrites each into a small styled fragment. Every node is
//! emitted at most once: when a block element is rendered, its whole subtree is
//! marked as consumed so nested matches (a `<p>` inside a `<li>`, an `<img>`
//! inside a figure wrapper) are skipped.

use std::collections::HashSet;

use ego_tree::NodeId;
use lazy_static::lazy_static;
use sb_core::{ExtractionConfig, ExtractedContent};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::filters::is_unwanted_text;
use crate::html::{
    char_len, consume_subtree, css, element_text, escape_attr, escape_text, remove_matching, DIV,
    IMAGE, PARAGRAPH, TABLE, TABLE_CELL, TABLE_HEADER, TABLE_ROW,
};

/// Main content candidates, article-specific first.
pub const MAIN_CONTAINER_SELECTORS: &[&str] = &[
    "article",
    "div.article",
    "div.pmc-articlecontent",
    "div.article-body",
    "div.tsec",
    "div.sec",
    "div.article-content",
    "main",
    "div.content",
    "div.main-content",
    "div.entry-content",
    "[role=\"main\"]",
];

/// Selectors removed from the page before its DOM is captured.
pub const PAGE_NOISE_SELECTORS: &[&str] = &[".advertisement", ".ads", ".social-share", ".comments"];

/// Class tokens marking a `div` that wraps a figure image or a table.
pub const WRAPPER_CLASSES: &[&str] = &["fig", "figure", "table-wrap"];

/// A candidate container must hold more than this many paragraphs.
pub const MIN_CONTAINER_PARAGRAPHS: usize = 2;

pub const NO_READABLE_CONTENT: &str = "<p>No readable content found.</p>";
pub const NO_MAIN_CONTENT: &str = "<p>Could not identify main content area.</p>";

const HEADING_STYLE: &str = "color: #333; margin: 20px 0 10px 0;";
const PARAGRAPH_STYLE: &str = "line-height: 1.6; margin: 15px 0;";
const LIST_STYLE: &str = "margin: 15px 0; padding-left: 30px;";
const LIST_ITEM_STYLE: &str = "margin: 5px 0;";
const BLOCKQUOTE_STYLE: &str =
    "border-left: 4px solid #ccc; padding-left: 20px; margin: 20px 0; font-style: italic;";
const IMAGE_WRAPPER_STYLE: &str = "text-align: center; margin: 20px 0;";
const IMAGE_STYLE: &str = "max-width: 100%; height: auto; border: 1px solid #ddd; border-radius: 4px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);";
const IMAGE_CAPTION_STYLE: &str = "font-size: 0.9em; color: #666; margin-top: 8px; font-style: italic;";
const FIGURE_STYLE: &str = "margin: 25px 0; text-align: center;";
const FIGCAPTION_STYLE: &str = "font-size: 0.9em; color: #555; margin-top: 10px; font-style: italic; max-width: 80%; margin-left: auto; margin-right: auto;";
const TABLE_WRAPPER_STYLE: &str = "overflow-x: auto; margin: 20px 0;";
const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%; border: 1px solid #ddd;";
const THEAD_STYLE: &str = "background-color: #f3f4f6;";
const TH_STYLE: &str = "border: 1px solid #ddd; padding: 12px; text-align: left;";
const TD_STYLE: &str = "border: 1px solid #ddd; padding: 12px;";

lazy_static! {
    static ref NOISE: Selector = css(&format!("script, style, noscript, {}", PAGE_NOISE_SELECTORS.join(", ")));
    static ref MAIN_CONTAINERS: Vec<(&'static str, Selector)> =
        MAIN_CONTAINER_SELECTORS.iter().map(|s| (*s, css(s))).collect();
    static ref WALK: Selector =
        css("h1, h2, h3, h4, h5, h6, p, img, figure, ul, ol, table, blockquote, div");
    static ref FIGURE_CAPTION: Selector = css("figcaption, caption");
    static ref WRAPPER_CAPTION: Selector = css(
        "figcaption.caption, figcaption.fig-caption, caption.caption, caption.fig-caption, div.caption, div.fig-caption"
    );
}

/// How the main content container was chosen.
#[derive(Debug, Clone, Copy)]
pub enum ContainerChoice<'a> {
    Selector(&'static str, ElementRef<'a>),
    LargestDiv(ElementRef<'a>),
}

impl<'a> ContainerChoice<'a> {
    pub fn element(&self) -> ElementRef<'a> {
        match self {
            ContainerChoice::Selector(_, element) | ContainerChoice::LargestDiv(element) => *element,
        }
    }
}

/// Pick the element holding the article body.
///
/// Each selector contributes its first match. That match is accepted when it
/// holds more than [`MIN_CONTAINER_PARAGRAPHS`] paragraphs. Failing that, the
/// `div` with the most text wins, the first one on ties.
pub fn find_main_container(document: &Html) -> Option<ContainerChoice<'_>> {
    for (name, selector) in MAIN_CONTAINERS.iter() {
        if let Some(candidate) = document.select(selector).next() {
            if candidate.select(&PARAGRAPH).count() > MIN_CONTAINER_PARAGRAPHS {
                return Some(ContainerChoice::Selector(*name, candidate));
            }
        }
    }
    largest_text_div(document).map(ContainerChoice::LargestDiv)
}

fn largest_text_div(document: &Html) -> Option<ElementRef<'_>> {
    let mut best: Option<(usize, ElementRef)> = None;
    for div in document.select(&DIV) {
        let len: usize = div.text().map(char_len).sum();
        if best.map_or(true, |(best_len, _)| len > best_len) {
            best = Some((len, div));
        }
    }
    best.map(|(_, div)| div)
}

/// Extract styled content from a rendered page. `base_url` resolves relative image sources.
pub fn extract_rendered(html: &str, base_url: &str, config: &ExtractionConfig) -> ExtractedContent {
    let mut document = Html::parse_document(html);
    remove_matching(&mut document, &NOISE);

    let Some(container) = find_main_container(&document) else {
        return ExtractedContent::message(NO_MAIN_CONTENT);
    };

    let base = Url::parse(base_url).ok();
    let mut walker = Walker::new(config, base.as_ref());
    walker.walk(container.element());
    walker.finish()
}

struct Walker<'c> {
    config: &'c ExtractionConfig,
    base: Option<&'c Url>,
    processed: HashSet<NodeId>,
    content: String,
    tables: Vec<String>,
}

impl<'c> Walker<'c> {
    fn new(config: &'c ExtractionConfig, base: Option<&'c Url>) -> Self {
        Self {
            config,
            base,
            processed: HashSet::new(),
            content: String::new(),
            tables: Vec::new(),
        }
    }

    fn walk(&mut self, container: ElementRef) {
        for element in container.select(&WALK) {
            if !self.processed.insert(element.id()) {
                continue;
            }
            match element.value().name() {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.heading(element),
                "p" => self.paragraph(element),
                "img" => {
                    if let Some(html) = render_image(element, self.base, self.config) {
                        self.content.push_str(&html);
                    }
                }
                "figure" => self.figure(element),
                "table" => self.table(element),
                "ul" | "ol" => self.list(element),
                "blockquote" => self.blockquote(element),
                "div" => self.wrapper(element),
                _ => {}
            }
        }
    }

    fn finish(self) -> ExtractedContent {
        if self.content.is_empty() {
            return ExtractedContent::message(NO_READABLE_CONTENT);
        }
        ExtractedContent::new(self.content, self.tables)
    }

    fn heading(&mut self, element: ElementRef) {
        let text = element_text(&element);
        if char_len(&text) > self.config.min_heading_len && !is_unwanted_text(&text) {
            let tag = element.value().name();
            self.content.push_str(&format!(
                "<{tag} style='{HEADING_STYLE}'>{}</{tag}>",
                escape_text(&text)
            ));
        }
    }

    fn paragraph(&mut self, element: ElementRef) {
        let text = element_text(&element);
        if char_len(&text) > self.config.rendered_min_paragraph_len && !is_unwanted_text(&text) {
            self.content.push_str(&format!(
                "<p style='{PARAGRAPH_STYLE}'>{}</p>",
                escape_text(&text)
            ));
        }
    }

    fn figure(&mut self, element: ElementRef) {
        if let Some(html) = render_figure(element, self.base, self.config) {
            self.content.push_str(&html);
            consume_subtree(&element, &mut self.processed);
        }
    }

    fn table(&mut self, element: ElementRef) {
        if let Some(html) = render_table(element) {
            self.content.push_str(&html);
            self.tables.push(html);
        }
        consume_subtree(&element, &mut self.processed);
    }

    fn list(&mut self, element: ElementRef) {
        if let Some(html) = render_list(element) {
            self.content.push_str(&html);
            consume_subtree(&element, &mut self.processed);
        }
    }

    fn blockquote(&mut self, element: ElementRef) {
        let text = element_text(&element);
        if char_len(&text) > self.config.min_blockquote_len {
            self.content.push_str(&format!(
                "<blockquote style='{BLOCKQUOTE_STYLE}'>{}</blockquote>",
                escape_text(&text)
            ));
            consume_subtree(&element, &mut self.processed);
        }
    }

    /// Plain divs are only opened when they wrap a figure image or a table.
    fn wrapper(&mut self, element: ElementRef) {
        if !is_wrapper(&element) {
            return;
        }
        let mut emitted = false;

        if let Some(img) = element.select(&IMAGE).next() {
            if let Some(img_html) = render_image(img, self.base, self.config) {
                let caption = element
                    .select(&WRAPPER_CAPTION)
                    .next()
                    .map(|c| element_text(&c))
                    .unwrap_or_default();
                if caption.is_empty() {
                    self.content.push_str(&img_html);
                } else {
                    self.content.push_str(&format!(
                        "<figure style='margin: 25px 0;'>{}<figcaption style='{FIGCAPTION_STYLE}'>{}</figcaption></figure>",
                        img_html,
                        escape_text(&caption)
                    ));
                }
                emitted = true;
            }
        }

        if let Some(table) = element.select(&TABLE).next() {
            if let Some(table_html) = render_table(table) {
                self.content.push_str(&table_html);
                self.tables.push(table_html);
                emitted = true;
            }
        }

        if emitted {
            consume_subtree(&element, &mut self.processed);
        }
    }
}

fn is_wrapper(element: &ElementRef) -> bool {
    element.value().classes().any(|class| WRAPPER_CLASSES.contains(&class))
}

/// Turn an image `src` into an absolute URL.
///
/// Protocol-relative sources get `https:`; anything else relative is joined
/// onto the page URL. Returns `None` when no absolute URL can be formed.
pub fn resolve_image_src(src: &str, base: Option<&Url>) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    if let Some(rest) = src.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }
    if let Ok(absolute) = Url::parse(src) {
        return Some(absolute.to_string());
    }
    base.and_then(|base| base.join(src).ok()).map(|url| url.to_string())
}

/// Declared pixel size, tolerating a `px` suffix. Percentages and junk yield `None`.
fn declared_dimension(value: Option<&str>) -> Option<u32> {
    let value = value?.trim();
    let value = value.strip_suffix("px").unwrap_or(value).trim();
    value
        .parse::<u32>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u32))
}

fn render_image(img: ElementRef, base: Option<&Url>, config: &ExtractionConfig) -> Option<String> {
    let attrs = img.value();
    let src = attrs
        .attr("src")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| attrs.attr("data-src"))?;
    let src = resolve_image_src(src, base)?;

    let too_small = [attrs.attr("width"), attrs.attr("height")]
        .into_iter()
        .filter_map(declared_dimension)
        .any(|d| d < config.min_image_dimension);
    if too_small {
        return None;
    }

    let alt = attrs.attr("alt").unwrap_or("").trim();
    let title = attrs.attr("title").unwrap_or(alt);
    let caption = if alt.is_empty() {
        String::new()
    } else {
        format!("<p style='{IMAGE_CAPTION_STYLE}'>{}</p>", escape_text(alt))
    };

    Some(format!(
        "<div style='{IMAGE_WRAPPER_STYLE}'><img src=\"{}\" alt=\"{}\" title=\"{}\" style='{IMAGE_STYLE}'>{}</div>",
        escape_attr(&src),
        escape_attr(alt),
        escape_attr(title),
        caption
    ))
}

fn render_figure(figure: ElementRef, base: Option<&Url>, config: &ExtractionConfig) -> Option<String> {
    let img = figure.select(&IMAGE).next()?;
    let img_html = render_image(img, base, config)?;
    let caption = figure
        .select(&FIGURE_CAPTION)
        .next()
        .map(|c| element_text(&c))
        .unwrap_or_default();

    if caption.is_empty() {
        Some(format!("<figure style='margin: 25px 0;'>{}</figure>", img_html))
    } else {
        Some(format!(
            "<figure style='{FIGURE_STYLE}'>{}<figcaption style='{FIGCAPTION_STYLE}'>{}</figcaption></figure>",
            img_html,
            escape_text(&caption)
        ))
    }
}

/// Rebuild a table from its header cells and data rows, dropping everything else.
fn render_table(table: ElementRef) -> Option<String> {
    let headers: Vec<String> = table.select(&TABLE_HEADER).map(|th| element_text(&th)).collect();
    let rows: Vec<Vec<String>> = table
        .select(&TABLE_ROW)
        .map(|row| row.select(&TABLE_CELL).map(|td| element_text(&td)).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();

    if headers.is_empty() && rows.is_empty() {
        return None;
    }

    let mut html = format!("<div style='{TABLE_WRAPPER_STYLE}'><table style='{TABLE_STYLE}'>");
    if !headers.is_empty() {
        html.push_str(&format!("<thead style='{THEAD_STYLE}'><tr>"));
        for header in &headers {
            html.push_str(&format!("<th style='{TH_STYLE}'>{}</th>", escape_text(header)));
        }
        html.push_str("</tr></thead>");
    }
    html.push_str("<tbody>");
    for row in &rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td style='{TD_STYLE}'>{}</td>", escape_text(cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></div>");
    Some(html)
}

fn render_list(list: ElementRef) -> Option<String> {
    let items: Vec<String> = list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .map(|li| element_text(&li))
        .filter(|text| !text.is_empty() && !is_unwanted_text(text))
        .collect();
    if items.is_empty() {
        return None;
    }

    let tag = list.value().name();
    let mut html = format!("<{tag} style='{LIST_STYLE}'>");
    for item in &items {
        html.push_str(&format!("<li style='{LIST_ITEM_STYLE}'>{}</li>", escape_text(item)));
    }
    html.push_str(&format!("</{tag}>"));
    Some(html)
}
