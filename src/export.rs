use crate::types::Memo;

/// Width of the hyphen rule between exported records
pub const SEPARATOR_WIDTH: usize = 50;

/// Render memos as plain text, one labeled block per memo.
///
/// Consecutive blocks are separated by a rule of hyphens; there is no rule
/// after the last block.
pub fn render<'a>(memos: impl IntoIterator<Item = &'a Memo>) -> String {
    let rule = "-".repeat(SEPARATOR_WIDTH);
    let mut out = String::new();

    for (i, memo) in memos.into_iter().enumerate() {
        if i > 0 {
            out.push_str(&rule);
            out.push('\n');
        }
        out.push_str(&format!(
            "Title: {}\nDate: {}\nTags: {}\nContent:\n{}\n",
            memo.title(),
            memo.date(),
            memo.joined_tags(", "),
            memo.content()
        ));
    }

    out
}
