//! Identifier case conversion.
//!
//! Every form is built from the same word segmentation. Scanning left to
//! right, a new word starts when
//!
//! - an uppercase character follows a lowercase one (`getUser`),
//! - a digit follows a non-digit or a non-digit follows a digit (`v2beta`),
//! - a character that is neither a letter nor a digit is seen. That
//!   character is dropped.
//!
//! Digits are the ASCII `0-9`; other numeric characters such as `²` are
//! separators.
//!
//! The first character never opens a boundary, and runs of punctuation
//! collapse into a single boundary, so `a__b` and `a_b` segment the same.

use serde::Serialize;

/// The identifier forms, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Kebab,
    Snake,
    Camel,
    Pascal,
    Flag,
    Enum,
}

impl Case {
    pub const ALL: [Case; 6] = [
        Case::Kebab,
        Case::Snake,
        Case::Camel,
        Case::Pascal,
        Case::Flag,
        Case::Enum,
    ];
}

/// All six forms of one source identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identifiers {
    pub kebab: String,
    pub snake: String,
    pub camel: String,
    pub pascal: String,
    pub flag: String,
    #[serde(rename = "enum")]
    pub enum_constant: String,
}

impl Identifiers {
    pub fn new(source: &str) -> Self {
        Self {
            kebab: to_kebab(source),
            snake: to_snake(source),
            camel: to_camel(source),
            pascal: to_pascal(source),
            flag: to_flag(source),
            enum_constant: to_enum(source),
        }
    }

    pub fn get(&self, case: Case) -> &str {
        match case {
            Case::Kebab => &self.kebab,
            Case::Snake => &self.snake,
            Case::Camel => &self.camel,
            Case::Pascal => &self.pascal,
            Case::Flag => &self.flag,
            Case::Enum => &self.enum_constant,
        }
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_boundary(prev: char, c: char) -> bool {
    (c.is_uppercase() && prev.is_lowercase()) || (is_digit(c) != is_digit(prev))
}

fn words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for c in s.chars() {
        if !(c.is_alphabetic() || is_digit(c)) {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            if is_boundary(prev, c) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn to_kebab(s: &str) -> String {
    words(s).join("-").to_lowercase()
}

pub fn to_snake(s: &str) -> String {
    words(s).join("_").to_lowercase()
}

/// The first character keeps its case; lowercase the input first for
/// strict camelCase.
pub fn to_camel(s: &str) -> String {
    let mut output = String::with_capacity(s.len());
    for (i, word) in words(s).iter().enumerate() {
        if i == 0 {
            output.push_str(word);
        } else {
            output.push_str(&upper_first(word));
        }
    }
    output
}

pub fn to_pascal(s: &str) -> String {
    upper_first(&to_camel(s))
}

/// Empty input stays empty rather than becoming a bare `--`.
pub fn to_flag(s: &str) -> String {
    let kebab = to_kebab(s);
    if kebab.is_empty() {
        kebab
    } else {
        format!("--{kebab}")
    }
}

pub fn to_enum(s: &str) -> String {
    to_snake(s).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "getUserByID123",
        "listPets",
        "create_user",
        "delete-pet-by-id",
        "v2beta",
        "HTTPServer",
        "x.operation.name",
        "already_snake_case_1",
        "__leading",
        "trailing__",
        "a  b",
        "élanVital",
    ];

    #[test]
    fn test_documented_examples() {
        assert_eq!(to_kebab("getUserByID123"), "get-user-by-id-123");
        assert_eq!(to_snake("getUserByID123"), "get_user_by_id_123");
        assert_eq!(to_camel("getUserByID123"), "getUserByID123");
        assert_eq!(to_pascal("getUserByID123"), "GetUserByID123");
        assert_eq!(to_flag("getUserByID123"), "--get-user-by-id-123");
        assert_eq!(to_enum("getUserByID123"), "GET_USER_BY_ID_123");
    }

    #[test]
    fn test_punctuation_boundaries() {
        assert_eq!(to_kebab("create_user"), "create-user");
        assert_eq!(to_snake("delete-pet-by-id"), "delete_pet_by_id");
        assert_eq!(to_camel("list-all pets"), "listAllPets");
        assert_eq!(to_pascal("x.operation.name"), "XOperationName");
        assert_eq!(to_kebab("a__b"), "a-b");
        assert_eq!(to_snake("trailing__"), "trailing");
        assert_eq!(to_kebab("__leading"), "leading");
    }

    #[test]
    fn test_digit_boundaries() {
        assert_eq!(to_kebab("v2beta"), "v-2-beta");
        assert_eq!(to_camel("v2beta"), "v2Beta");
        assert_eq!(to_snake("page10Size"), "page_10_size");
    }

    #[test]
    fn test_camel_keeps_first_character() {
        assert_eq!(to_camel("GetUser"), "GetUser");
        assert_eq!(to_camel("get_user"), "getUser");
        assert_eq!(to_pascal("get_user"), "GetUser");
    }

    #[test]
    fn test_uppercase_runs_stay_together() {
        assert_eq!(to_kebab("HTTPServer"), "httpserver");
        assert_eq!(to_kebab("userID"), "user-id");
    }

    #[test]
    fn test_empty_and_separator_only_input() {
        for input in ["", "-_-"] {
            let ids = Identifiers::new(input);
            for case in Case::ALL {
                assert_eq!(ids.get(case), "", "{case:?} of {input:?}");
            }
        }
    }

    #[test]
    fn test_only_decimal_digits_split_words() {
        assert_eq!(to_kebab("x²"), "x");
        assert_eq!(to_kebab("area²Size"), "area-size");
        assert_eq!(to_snake("level3"), "level_3");
    }

    #[test]
    fn test_pascal_is_camel_with_upper_first() {
        for sample in SAMPLES {
            let camel = to_camel(sample);
            let pascal = to_pascal(sample);
            assert_eq!(pascal.to_lowercase(), camel.to_lowercase(), "{sample}");
            assert_eq!(
                pascal.chars().skip(1).collect::<String>(),
                camel.chars().skip(1).collect::<String>(),
                "{sample}"
            );
            assert!(pascal.chars().next().is_none_or(|c| !c.is_lowercase()));
        }
    }

    #[test]
    fn test_derived_forms() {
        for sample in SAMPLES {
            assert_eq!(to_enum(sample), to_snake(sample).to_uppercase());
            assert_eq!(to_flag(sample), format!("--{}", to_kebab(sample)));
        }
    }

    #[test]
    fn test_idempotent_on_own_output() {
        for sample in ["get-user-by-id-123", "list-pets", "v-2-beta", "a"] {
            assert_eq!(to_kebab(sample), sample);
        }
        for sample in SAMPLES {
            let kebab = to_kebab(sample);
            assert_eq!(to_kebab(&kebab), kebab);
            let snake = to_snake(sample);
            assert_eq!(to_snake(&snake), snake);
        }
    }

    #[test]
    fn test_identifiers_cover_every_case() {
        let ids = Identifiers::new("listPets");
        assert_eq!(ids.get(Case::Kebab), "list-pets");
        assert_eq!(ids.get(Case::Snake), "list_pets");
        assert_eq!(ids.get(Case::Camel), "listPets");
        assert_eq!(ids.get(Case::Pascal), "ListPets");
        assert_eq!(ids.get(Case::Flag), "--list-pets");
        assert_eq!(ids.get(Case::Enum), "LIST_PETS");

        let json = serde_json::to_value(&ids).unwrap();
        assert_eq!(json["enum"], "LIST_PETS");
    }
}
