#![allow(dead_code)]

use std::collections::HashMap;

use lwf_forms::FieldValue;

pub fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

pub fn values(pairs: Vec<(&str, FieldValue)>) -> HashMap<String, FieldValue> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
