//! Identifier case conversions used for titles and JSON field names.

/// Split an identifier into words.
///
/// Underscores, hyphens and whitespace always separate words. Inside a chunk a
/// boundary is placed before an uppercase letter that follows a lowercase
/// letter or digit (`userId` -> `user`, `Id`), and before the last capital of
/// an uppercase run when a lowercase letter follows it (`HTTPServer` ->
/// `HTTP`, `Server`).
fn words(s: &str) -> Vec<String> {
    let mut words = Vec::new();

    for chunk in s
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|chunk| !chunk.is_empty())
    {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                if prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower)
                {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert an identifier to `snake_case`.
pub fn to_snake_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert an identifier to "Split Case", the form used for default titles.
///
/// ```
/// use protoc_gen_jsonschema::to_split_case;
///
/// assert_eq!(to_split_case("first_name"), "First Name");
/// assert_eq!(to_split_case("HTTPServer"), "HTTP Server");
/// assert_eq!(to_split_case("userID"), "User ID");
/// ```
pub fn to_split_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| capitalize(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert an identifier to `PascalCase`.
pub fn to_pascal_case(s: &str) -> String {
    words(s).iter().map(|w| capitalize(w)).collect()
}

/// Derive the JSON name protoc assigns to a field: underscores are dropped
/// and the character following each one is uppercased.
pub fn to_lower_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;

    for c in s.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }

    result
}
