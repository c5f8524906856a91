/// Option names are matched case-insensitively by storing them lowercased.
#[must_use]
pub(crate) fn fold_key(key: &str) -> String {
    key.to_lowercase()
}

/// Removes the leading whitespace shared by every non-blank line of `text`.
///
/// Lines made only of whitespace are reduced to their line ending and do not take part in
/// choosing the margin.
#[must_use]
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;

    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        let indent = &line[..line.len() - line.trim_start().len()];

        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }

    let margin = margin.unwrap_or_default();
    let mut result = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        let (content, ending) = split_ending(line);

        if content.trim().is_empty() {
            result.push_str(ending);
        } else {
            result.push_str(content.strip_prefix(margin).unwrap_or(content));
            result.push_str(ending);
        }
    }

    result
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .find(|&((_, x), y)| x != y)
        .map_or_else(|| a.len().min(b.len()), |((i, _), _)| i);

    &a[..len]
}

fn split_ending(line: &str) -> (&str, &str) {
    let content = line
        .strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line);

    (content, &line[content.len()..])
}
