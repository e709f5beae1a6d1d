//! Word lists for `contains_any` / `contains_all` arguments.
//!
//! Words are comma separated. A comma preceded by a backslash belongs to the
//! word (`a\,b` is the single word `a,b`).

/// Split on commas not preceded by a backslash. Escapes are kept.
pub fn split_unescaped(list: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut prev = None;
    for (idx, c) in list.char_indices() {
        if c == ',' && prev != Some('\\') {
            words.push(&list[start..idx]);
            start = idx + 1;
        }
        prev = Some(c);
    }
    words.push(&list[start..]);
    words
}

/// `a\,b` -> `a,b`
pub fn unescape(word: &str) -> String {
    word.replace("\\,", ",")
}

/// `a,b` -> `a\,b`
pub fn escape(word: &str) -> String {
    word.replace(',', "\\,")
}

/// Split a list argument into literal words.
pub fn split_words(list: &str) -> Vec<String> {
    split_unescaped(list).into_iter().map(unescape).collect()
}
