// derive the url slug of a post from its title
//
// "Hello, World!" and "hello world" both become "hello-world": anything that is
// not an ascii letter, digit, whitespace or hyphen is dropped, then runs of
// whitespace and hyphens collapse into a single hyphen. A run at either edge is
// kept as one hyphen, and a title without any of these characters gives "".
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());

    for char in title.to_lowercase().chars() {
        if char.is_ascii_lowercase() || char.is_ascii_digit() {
            slug.push(char);
        } else if (char.is_whitespace() || char == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug
}

// build a case-insensitive `ILIKE` pattern matching any value containing `needle`
pub fn contains_pattern(needle: &str) -> String {
    let mut s = String::with_capacity(needle.len() + 2);
    s.push('%');
    for char in needle.chars() {
        if matches!(char, '%' | '_' | '\\') {
            s.push('\\');
        }
        s.push(char);
    }
    s.push('%');
    s
}

// case-insensitive substring match, the in-memory counterpart of `contains_pattern`
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
