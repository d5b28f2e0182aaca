use url::Url;

/// Query parameter that carries the device token to the remote site.
pub const TOKEN_QUERY_KEY: &str = "fcm";

/// Merge `token` into the query of `base`.
///
/// An absent or empty token, or a base that does not parse as a URL, yields
/// `base` unchanged. Any existing `fcm` parameter (matched case-insensitively)
/// is replaced, so applying the same token twice is a no-op.
pub fn resolve(base: &str, token: Option<&str>) -> String {
    let Some(token) = token.filter(|token| !token.is_empty()) else {
        return base.to_string();
    };
    let Ok(mut url) = Url::parse(base) else {
        return base.to_string();
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(TOKEN_QUERY_KEY))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(TOKEN_QUERY_KEY, token);
    url.into()
}
