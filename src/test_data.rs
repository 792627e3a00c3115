//! Shared fixtures for unit tests.

pub fn string_items() -> Vec<String> {
    vec![
        "axolotl".to_string(),
        "badger".to_string(),
        "civet".to_string(),
        "dormouse".to_string(),
    ]
}
