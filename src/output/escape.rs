//! Escaping helpers
//!
//! HTML本文・属性値のエスケープと、`<script>`要素内に埋め込むJSONのエスケープ。

/// HTMLの特殊文字をエスケープ
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// `<script>`要素内に置くJSONをエスケープ
///
/// `<`、`>`、`&`、U+2028、U+2029をJSONの`\uXXXX`形式に置き換えます。
/// JSON文字列リテラルの外にはこれらの文字が現れないため、値は変わりません。
pub(crate) fn escape_script_json(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            c => escaped.push(c),
        }
    }
    escaped
}
