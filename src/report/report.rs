use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

use crate::error::Result;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// One titled block of the report: free markup and inline plots, rendered in
/// the order they were added.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.content.push(content);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        let div_id = format!(
            "{}-plot-{}",
            self.title.to_lowercase().replace(' ', "-"),
            self.content.len()
        );
        let html = plot.to_inline_html(Some(div_id.as_str()));
        self.content.push(html! {
            div class="plot" { (PreEscaped(html)) }
        });
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    (block)
                }
            }
        }
    }
}

/// Self-contained HTML report.
pub struct Report {
    software_name: String,
    version: String,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(software_name: &str, version: &str, title: &str) -> Self {
        Report {
            software_name: software_name.to_string(),
            version: version.to_string(),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> String {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let page = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em auto; max-width: 1100px; }"
                        "section { margin-bottom: 2em; }"
                        "table { border-collapse: collapse; }"
                        "td, th { border: 1px solid #ccc; padding: 0.3em 0.8em; text-align: right; }"
                    }
                }
                body {
                    header {
                        h1 { (self.title) }
                        p class="meta" {
                            (self.software_name) " v" (self.version) " | generated " (generated)
                        }
                    }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        };
        page.into_string()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path.as_ref())?;
        file.write_all(self.render().as_bytes())?;
        log::info!("Report written to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sections_in_order() {
        let mut report = Report::new("edgesim", "0.1.0", "Test report");
        let mut first = ReportSection::new("First");
        first.add_content(html! { p { "alpha" } });
        let mut second = ReportSection::new("Second");
        second.add_content(html! { p { "beta" } });
        report.add_section(first);
        report.add_section(second);

        let out = report.render();
        assert!(out.starts_with("<!DOCTYPE html>"));
        let a = out.find("alpha").unwrap();
        let b = out.find("beta").unwrap();
        assert!(a < b);
        assert!(out.contains("<h1>Test report</h1>"));
    }
}
