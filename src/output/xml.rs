//! Sitemap protocol 0.9 XML rendering and reading
//!
//! `<urlset>` documents carry `loc`, `lastmod`, `changefreq` and `priority`
//! per entry; `<sitemapindex>` documents carry `loc` and `lastmod` per file.

use crate::output::traits::{
    OutputError, OutputResult, SitemapDocument, SitemapEntry, SitemapFile, SitemapIndex,
};
use chrono::SecondsFormat;
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// Namespace of the sitemap protocol 0.9
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

fn new_writer() -> OutputResult<Writer<Cursor<Vec<u8>>>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

fn write_entry(writer: &mut Writer<Cursor<Vec<u8>>>, entry: &SitemapEntry) -> quick_xml::Result<()> {
    writer.create_element("url").write_inner_content(|w| {
        w.create_element("loc")
            .write_text_content(BytesText::new(entry.loc.as_str()))?;
        if let Some(lastmod) = entry.lastmod {
            w.create_element("lastmod")
                .write_text_content(BytesText::new(&lastmod.format("%Y-%m-%d").to_string()))?;
        }
        w.create_element("changefreq")
            .write_text_content(BytesText::new(entry.changefreq.as_str()))?;
        w.create_element("priority")
            .write_text_content(BytesText::new(&entry.priority_str()))?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

/// Renders one `<urlset>` document
pub fn render_urlset(entries: &[SitemapEntry]) -> OutputResult<Vec<u8>> {
    let mut writer = new_writer()?;
    writer
        .create_element("urlset")
        .with_attribute(("xmlns", SITEMAP_NAMESPACE))
        .write_inner_content(|w| {
            for entry in entries {
                write_entry(w, entry)?;
            }
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(writer.into_inner().into_inner())
}

/// Renders a `<sitemapindex>` document
pub fn render_index(index: &SitemapIndex) -> OutputResult<Vec<u8>> {
    let mut writer = new_writer()?;
    writer
        .create_element("sitemapindex")
        .with_attribute(("xmlns", SITEMAP_NAMESPACE))
        .write_inner_content(|w| {
            for entry in &index.entries {
                w.create_element("sitemap").write_inner_content(|w| {
                    w.create_element("loc")
                        .write_text_content(BytesText::new(&entry.loc))?;
                    let lastmod = entry.lastmod.to_rfc3339_opts(SecondsFormat::Secs, true);
                    w.create_element("lastmod")
                        .write_text_content(BytesText::new(&lastmod))?;
                    Ok::<(), quick_xml::Error>(())
                })?;
            }
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(writer.into_inner().into_inner())
}

impl SitemapDocument for SitemapFile {
    fn file_name(&self) -> String {
        SitemapFile::file_name(self)
    }

    fn render(&self) -> OutputResult<Vec<u8>> {
        render_urlset(&self.entries)
    }
}

impl SitemapDocument for SitemapIndex {
    fn file_name(&self) -> String {
        SitemapIndex::file_name(self)
    }

    fn render(&self) -> OutputResult<Vec<u8>> {
        render_index(self)
    }
}

/// Reads every `<loc>` value of a urlset or sitemapindex document, in order
pub fn parse_sitemap_locs(xml: &str) -> OutputResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_loc = false;
    let mut saw_root = false;
    let mut locs = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"urlset" | b"sitemapindex" => saw_root = true,
                    b"loc" => in_loc = true,
                    _ => {}
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                }
            }
            Event::Text(t) if in_loc => {
                locs.push(t.unescape()?.into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(OutputError::Format(
            "document has no <urlset> or <sitemapindex> root".to_string(),
        ));
    }
    Ok(locs)
}
