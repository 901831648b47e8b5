//! Target domain detection for result links.
//!
//! A link matches when the lower-cased target is a substring of the link's
//! lower-cased host. There is no label-boundary check, so `notexample.com`
//! and `example.com.evil.net` both match a target of `example.com`.
//! Internationalized hosts are compared in both their punycode and Unicode
//! forms. Scheme-relative links (`//host/path`) are read as `https`.

use url::Url;

/// Check whether `link`'s host contains `target_domain` (case-insensitive).
///
/// Unparseable links and links without a host never match.
pub fn host_matches(link: &str, target_domain: &str) -> bool {
    let parsed = match link.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{rest}")),
        None => Url::parse(link),
    };
    let Ok(parsed) = parsed else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    let target = target_domain.to_lowercase();
    let ascii = host.to_lowercase();
    if ascii.contains(&target) {
        return true;
    }

    // `Url` stores non-ASCII hosts as punycode.
    let (unicode, _) = idna::domain_to_unicode(&ascii);
    unicode.to_lowercase().contains(&target)
}
