//! Small text and HTML helpers for the scraped-site source.
//!
//! Meta tags and result links are read with regexes, not a DOM.

use std::sync::LazyLock;

use regex::Regex;

static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("static pattern"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("static pattern")
});

static DETAIL_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="[^"]*?/title/(tt\d{5,})"#).expect("static pattern"));

static TITLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^tt\d+$").expect("static pattern"));

static SIZE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)_V1_[^/]*?\.(jpe?g|png|webp)$").expect("static pattern")
});

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("static pattern"));

/// Lowercase, trim, and drop diacritics and punctuation from a title so it
/// can be used as a suggestion-endpoint key.
///
/// `"Amélie: O Fabuloso Destino"` becomes `"amelie o fabuloso destino"`.
pub fn normalize_title(title: &str) -> String {
    let mut folded = String::with_capacity(title.len());
    for c in title.chars() {
        if matches!(c, '\'' | '\u{2019}') {
            continue;
        }
        match fold_diacritic(c) {
            Folded::Char(c) if c.is_alphanumeric() => folded.push(c),
            Folded::Char(_) => folded.push(' '),
            Folded::Pair(a, b) => {
                folded.push(a);
                folded.push(b);
            }
        }
    }
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

enum Folded {
    Char(char),
    Pair(char, char),
}

/// Map an accented Latin letter to its base letter, or a ligature to its
/// two-letter spelling.
fn fold_diacritic(c: char) -> Folded {
    let base = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => 'A',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' | 'ė' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' | 'Ē' | 'Ę' | 'Ě' | 'Ė' => 'E',
        'í' | 'ì' | 'î' | 'ï' | 'ī' | 'ı' | 'į' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' | 'Ī' | 'İ' | 'Į' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ő' => 'O',
        'ú' | 'ù' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' | 'Ų' => 'U',
        'ç' | 'ć' | 'č' => 'c',
        'Ç' | 'Ć' | 'Č' => 'C',
        'ď' | 'đ' | 'ð' => 'd',
        'Ď' | 'Đ' | 'Ð' => 'D',
        'ğ' => 'g',
        'Ğ' => 'G',
        'ł' | 'ľ' | 'ĺ' => 'l',
        'Ł' | 'Ľ' | 'Ĺ' => 'L',
        'ñ' | 'ń' | 'ň' => 'n',
        'Ñ' | 'Ń' | 'Ň' => 'N',
        'ř' | 'ŕ' => 'r',
        'Ř' | 'Ŕ' => 'R',
        'š' | 'ś' | 'ş' | 'ș' => 's',
        'Š' | 'Ś' | 'Ş' | 'Ș' => 'S',
        'ť' | 'ţ' | 'ț' => 't',
        'Ť' | 'Ţ' | 'Ț' => 'T',
        'ý' | 'ÿ' => 'y',
        'Ý' | 'Ÿ' => 'Y',
        'ž' | 'ź' | 'ż' => 'z',
        'Ž' | 'Ź' | 'Ż' => 'Z',
        'ß' => return Folded::Pair('s', 's'),
        'æ' => return Folded::Pair('a', 'e'),
        'Æ' => return Folded::Pair('A', 'E'),
        'œ' => return Folded::Pair('o', 'e'),
        'Œ' => return Folded::Pair('O', 'E'),
        'þ' => return Folded::Pair('t', 'h'),
        'Þ' => return Folded::Pair('T', 'H'),
        other => other,
    };
    Folded::Char(base)
}

/// Whether an identifier looks like an IMDb title id (`tt` + digits).
pub fn is_title_id(id: &str) -> bool {
    TITLE_ID.is_match(id)
}

/// Rewrite a sized IMDb image URL to its full-size variant.
///
/// `..._V1_UX182_.jpg` becomes `..._V1_.jpg`. URLs without a size suffix
/// are returned unchanged.
pub fn upscale_image_url(url: &str) -> String {
    SIZE_SUFFIX.replace(url, "_V1_.$1").into_owned()
}

/// Id of the first detail-page link (`/title/tt...`) in a search page.
pub fn first_detail_id(html: &str) -> Option<String> {
    DETAIL_HREF
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Content of the first `<meta>` tag whose `property` or `name` equals `key`.
pub fn meta_content(html: &str, key: &str) -> Option<String> {
    for tag in META_TAG.find_iter(html) {
        let mut matched = false;
        let mut content = None;
        for caps in ATTRIBUTE.captures_iter(tag.as_str()) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if name.eq_ignore_ascii_case("property") || name.eq_ignore_ascii_case("name") {
                matched |= value.eq_ignore_ascii_case(key);
            } else if name.eq_ignore_ascii_case("content") {
                content = Some(value);
            }
        }
        if matched {
            if let Some(value) = content.map(decode_entities) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Best-effort synopsis of a page: the social-preview description, falling
/// back to the plain meta description.
pub fn extract_synopsis(html: &str) -> Option<String> {
    meta_content(html, "og:description").or_else(|| meta_content(html, "description"))
}

/// Decode the handful of HTML entities that show up in meta attributes.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
