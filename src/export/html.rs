use std::fmt::Write;

use super::segments::Segment;
use crate::config::EngineConfig;
use crate::decoration::DecorationStyle;
use crate::utils::escape_html;

const STYLE: &str = "\
.tracked-document { white-space: pre-wrap; font-family: serif; line-height: 1.6; }
ins { color: #1a7f37; text-decoration: underline; }
del { color: #cf222e; text-decoration: line-through; }
.issue-comment { color: #6e7781; font-size: 0.85em; margin-left: 0.25em; }
.issue-comment::before { content: \"[\"; }
.issue-comment::after { content: \"]\"; }";

/// 渲染为 HTML 修订稿
pub fn render(title: &str, segments: &[Segment], config: &EngineConfig) -> String {
    let mut out = String::new();

    // 写入 String 不会失败
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html>");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{}</title>", escape_html(title));
    let _ = writeln!(out, "<style>\n{}\n</style>", STYLE);
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    out.push_str("<div class=\"tracked-document\">");

    for segment in segments {
        render_segment(&mut out, segment, config);
    }

    out.push_str("</div>\n</body>\n</html>\n");
    out
}

fn render_segment(out: &mut String, segment: &Segment, config: &EngineConfig) {
    match segment {
        Segment::Unchanged { text } => out.push_str(&escape_html(text)),
        Segment::Inserted {
            id,
            original,
            text,
            comment,
            merged,
        } => {
            let _ = write!(
                out,
                "<ins class=\"{}\" data-issue-id=\"{}\"",
                escape_html(DecorationStyle::Applied.css_class(config)),
                escape_html(id)
            );
            if !merged.is_empty() {
                let _ = write!(out, " data-merged-ids=\"{}\"", escape_html(&merged.join(" ")));
            }
            let _ = write!(
                out,
                " title=\"{}\">{}</ins>",
                escape_html(original),
                escape_html(text)
            );
            render_comment(out, comment);
        }
        Segment::Proposed {
            id,
            status,
            original,
            proposed,
            comment,
        } => {
            let class = DecorationStyle::from_status(*status)
                .unwrap_or(DecorationStyle::Pending)
                .css_class(config);
            let _ = write!(
                out,
                "<span class=\"{}\" data-issue-id=\"{}\"><del>{}</del><ins>{}</ins>",
                escape_html(class),
                escape_html(id),
                escape_html(original),
                escape_html(proposed)
            );
            render_comment(out, comment);
            out.push_str("</span>");
        }
    }
}

fn render_comment(out: &mut String, comment: &str) {
    if !comment.is_empty() {
        let _ = write!(out, "<span class=\"issue-comment\">{}</span>", escape_html(comment));
    }
}
