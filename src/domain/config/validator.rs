// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use regex::Regex;
use std::sync::OnceLock;

fn dns_label_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").ok())
        .as_ref()
}

/// RFC 1123 label: at most 63 lowercase alphanumerics or '-', alphanumeric at both ends.
pub fn is_valid_dns_label(name: &str) -> bool {
    name.len() <= 63 && dns_label_regex().is_some_and(|re| re.is_match(name))
}

fn dns_1035_label_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").ok())
        .as_ref()
}

/// RFC 1035 label (required for Service names): like an RFC 1123 label but
/// must start with a letter.
pub fn is_valid_dns_1035_label(name: &str) -> bool {
    name.len() <= 63 && dns_1035_label_regex().is_some_and(|re| re.is_match(name))
}

/// RFC 1123 subdomain: dot-separated labels, at most 253 characters.
pub fn is_valid_dns_subdomain(name: &str) -> bool {
    !name.is_empty() && name.len() <= 253 && name.split('.').all(is_valid_dns_label)
}

/// True when `domain` equals `zone` or sits underneath it.
pub fn is_subdomain_of(domain: &str, zone: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    let zone = zone.trim_end_matches('.');
    if !is_valid_dns_subdomain(domain) || !is_valid_dns_subdomain(zone) {
        return false;
    }
    domain == zone || domain.ends_with(&format!(".{}", zone))
}
