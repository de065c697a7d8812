//! `#block=<slug>` links to a single block.

pub(crate) const HIGHLIGHT_MS: i32 = 2000;

/// The block slug carried by a location fragment such as `#block=abc` or
/// `#view=x&block=abc`.
pub(crate) fn parse_block_slug(hash: &str) -> Option<String> {
    hash.trim_start_matches('#')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "block")
        .and_then(|(_, v)| urlencoding::decode(v).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Shareable URL that opens `page_id` and scrolls to the linked block.
pub(crate) fn link_url(origin: &str, page_id: &str, slug: &str) -> String {
    format!(
        "{}/p/{}#block={}",
        origin.trim_end_matches('/'),
        urlencoding::encode(page_id),
        urlencoding::encode(slug)
    )
}

pub(crate) fn current_hash() -> Option<String> {
    web_sys::window()?.location().hash().ok()
}

pub(crate) fn current_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}
