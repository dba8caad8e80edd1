use std::collections::BTreeMap;

/// Поддерживаемые валюты: код -> название, например `"USD" -> "United States Dollar"`
pub type SupportedCurrencies = BTreeMap<String, String>;
