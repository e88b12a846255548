/// Split `s` on `separator`, map each segment through `transform`, and join
/// the segments back in reverse order with `.`.
///
/// Empty segments are kept, so `"a..b"` reverses to `"b..a"`. The output is
/// always dot-joined whatever `separator` was.
pub fn reverse_split(
    s: &str,
    separator: &str,
    transform: Option<&dyn Fn(&str) -> String>,
) -> String {
    let segments: Vec<&str> = if separator.is_empty() {
        s.char_indices()
            .map(|(i, c)| &s[i..i + c.len_utf8()])
            .collect()
    } else {
        s.split(separator).collect()
    };

    segments
        .into_iter()
        .rev()
        .map(|segment| match transform {
            Some(transform) => transform(segment),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Reverse the labels of a host name into a package-style namespace,
/// e.g. `api.example.com` becomes `com.example.api`.
pub fn host_namespace(host: &str) -> String {
    reverse_split(host, ".", Some(&|label: &str| crate::case::to_snake(label)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper_first(s: &str) -> String {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    #[test]
    fn test_reverse_without_transform() {
        assert_eq!(reverse_split("a.b.c", ".", None), "c.b.a");
        assert_eq!(reverse_split("example.com", ".", None), "com.example");
        assert_eq!(reverse_split("single", ".", None), "single");
    }

    #[test]
    fn test_reverse_with_transform() {
        assert_eq!(
            reverse_split("example.co.mz", ".", Some(&upper_first)),
            "Mz.Co.Example"
        );
    }

    #[test]
    fn test_empty_segments_are_preserved() {
        assert_eq!(reverse_split("a..b", ".", None), "b..a");
        assert_eq!(reverse_split("", ".", None), "");
        assert_eq!(reverse_split(".a", ".", None), "a.");
    }

    #[test]
    fn test_output_is_always_dot_joined() {
        assert_eq!(reverse_split("a/b/c", "/", None), "c.b.a");
        assert_eq!(reverse_split("one::two", "::", None), "two.one");
        assert_eq!(reverse_split("abc", "", None), "c.b.a");
    }

    #[test]
    fn test_host_namespace() {
        assert_eq!(host_namespace("api.example.com"), "com.example.api");
        assert_eq!(host_namespace("my-api.example.io"), "io.example.my_api");
    }
}
