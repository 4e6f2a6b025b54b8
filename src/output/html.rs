//! Human-readable HTML sitemap
//!
//! Lists every included URL in one styled table, independent of how the XML
//! output was partitioned.

use crate::output::traits::SitemapEntry;
use quick_xml::escape::escape;
use std::fmt::Write;

const STYLE: &str = "\
    body { font-family: Arial, sans-serif; margin: 20px; }
    h1 { text-align: center; }
    table { width: 100%; border-collapse: collapse; margin-top: 20px; }
    th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
    th { background-color: #f2f2f2; }
    tr:nth-child(even) { background-color: #f9f9f9; }
    a { color: #0066cc; text-decoration: none; }
    a:hover { text-decoration: underline; }
    @media (max-width: 600px) { table, th, td { font-size: 14px; } }";

/// Renders the HTML listing for the given entries, in the order given
pub fn render_html(entries: &[SitemapEntry]) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Sitemap</title>\n");
    let _ = writeln!(html, "<style>\n{}\n</style>", STYLE);
    html.push_str("</head>\n<body>\n<h1>Sitemap</h1>\n");
    let _ = writeln!(html, "<p>{} URLs</p>", entries.len());
    html.push_str("<table>\n");
    html.push_str(
        "<tr><th>URL</th><th>Last Modified</th><th>Change Frequency</th><th>Priority</th></tr>\n",
    );

    for entry in entries {
        let loc = escape(entry.loc.as_str());
        let lastmod = entry
            .lastmod
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            html,
            "<tr><td><a href=\"{loc}\">{loc}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            lastmod,
            entry.changefreq,
            entry.priority_str(),
        );
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}
