//! Turns display titles into unique, URL-safe slugs. Titles are written in
//! Cyrillic (with the occasional Latin word, digit, or punctuation mark), so
//! slug generation starts with a fixed transliteration table and then runs a
//! small sanitization pipeline. Uniqueness against the rest of the collection
//! is resolved separately by [`ensure_unique`], so the maintenance batch in
//! [`crate::rewrite`] can thread one growing set of taken slugs through an
//! entire run.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cyrillic-to-Latin transliteration table. Characters missing from the table
/// pass through [`transliterate`] unchanged; the hard sign and soft sign map
/// to the empty string.
static TRANSLIT: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    vec![
        ('а', "a"),
        ('б', "b"),
        ('в', "v"),
        ('г', "g"),
        ('д', "d"),
        ('е', "e"),
        ('ё', "yo"),
        ('ж', "zh"),
        ('з', "z"),
        ('и', "i"),
        ('й', "y"),
        ('к', "k"),
        ('л', "l"),
        ('м', "m"),
        ('н', "n"),
        ('о', "o"),
        ('п', "p"),
        ('р', "r"),
        ('с', "s"),
        ('т', "t"),
        ('у', "u"),
        ('ф', "f"),
        ('х', "h"),
        ('ц', "ts"),
        ('ч', "ch"),
        ('ш', "sh"),
        ('щ', "sch"),
        ('ъ', ""),
        ('ы', "y"),
        ('ь', ""),
        ('э', "e"),
        ('ю', "yu"),
        ('я', "ya"),
        ('А', "A"),
        ('Б', "B"),
        ('В', "V"),
        ('Г', "G"),
        ('Д', "D"),
        ('Е', "E"),
        ('Ё', "Yo"),
        ('Ж', "Zh"),
        ('З', "Z"),
        ('И', "I"),
        ('Й', "Y"),
        ('К', "K"),
        ('Л', "L"),
        ('М', "M"),
        ('Н', "N"),
        ('О', "O"),
        ('П', "P"),
        ('Р', "R"),
        ('С', "S"),
        ('Т', "T"),
        ('У', "U"),
        ('Ф', "F"),
        ('Х', "H"),
        ('Ц', "Ts"),
        ('Ч', "Ch"),
        ('Ш', "Sh"),
        ('Щ', "Sch"),
        ('Ъ', ""),
        ('Ы', "Y"),
        ('Ь', ""),
        ('Э', "E"),
        ('Ю', "Yu"),
        ('Я', "Ya"),
    ]
    .into_iter()
    .collect()
});

/// Maps each character through the transliteration table, passing unmapped
/// characters (Latin letters, digits, punctuation) through unchanged.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match TRANSLIT.get(&c) {
            Some(mapped) => out.push_str(mapped),
            None => out.push(c),
        }
    }
    out
}

/// Converts a display title into a raw slug: transliterate, lowercase, strip
/// everything that isn't a lowercase Latin letter, digit, whitespace, or
/// hyphen, collapse whitespace runs and hyphen runs to single hyphens, and
/// trim leading/trailing hyphens.
///
/// The function is total: a title with no transliterable or alphanumeric
/// content produces an empty string, which callers must treat as an error
/// condition (e.g. fall back to the entry's numeric id).
pub fn slugify(title: &str) -> String {
    let lowered = transliterate(title).to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for c in lowered.chars() {
        let c = match c {
            'a'..='z' | '0'..='9' => c,
            c if c.is_whitespace() => '-',
            '-' => '-',
            _ => continue,
        };
        if c == '-' {
            pending_hyphen = !out.is_empty();
        } else {
            if pending_hyphen {
                out.push('-');
                pending_hyphen = false;
            }
            out.push(c);
        }
    }
    out
}

/// Default maximum slug length for [`shorten`].
pub const MAX_SLUG_LENGTH: usize = 50;

/// Truncates a slug to at most `max_len` bytes, cutting at the last hyphen
/// before the limit so no word is split mid-way. Slugs without a hyphen in
/// the truncated prefix are hard-truncated. Slugs already within the limit
/// are returned unchanged.
pub fn shorten(slug: &str, max_len: usize) -> String {
    if slug.len() <= max_len {
        return slug.to_owned();
    }

    // Slugs are pure ASCII by construction, so byte indexing is safe.
    let truncated = &slug[..max_len];
    match truncated.rfind('-') {
        Some(i) if i > 0 => truncated[..i].to_owned(),
        _ => truncated.to_owned(),
    }
}

/// Resolves a freshly generated slug against the set of slugs already
/// assigned to other entries. An unused slug is returned unchanged; a taken
/// slug gets `-1`, `-2`, `-3`, … appended until an unused candidate is found.
/// The counter is unbounded, so termination is guaranteed by construction.
pub fn ensure_unique<S: std::hash::BuildHasher>(
    slug: &str,
    existing: &std::collections::HashSet<String, S>,
) -> String {
    if !existing.contains(slug) {
        return slug.to_owned();
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{}-{}", slug, counter);
        if !existing.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
