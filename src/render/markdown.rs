use comrak::{markdown_to_html, Options};

fn options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.parse.smart = true;
    // Doc comments may carry raw HTML, including the <pre> spans and
    // anchored headings produced before this step.
    options.render.unsafe_ = true;
    options
}

/// Renders one section's (already preprocessed) doc text to HTML.
pub fn render_markdown(doc_text: &str) -> String {
    markdown_to_html(&dedent(doc_text), &options())
}

/// Removes the indentation shared by all non-blank lines.
fn dedent(text: &str) -> String {
    let common = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    if common == 0 {
        return text.to_string();
    }

    text.lines()
        .map(|line| line.get(common..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
