//! Weighted tweet length calculation.
//!
//! Twitter/X does not count raw characters against the 280 limit. Each code
//! point carries a weight from the platform's parsing configuration, and URLs
//! count as a fixed cost regardless of their literal length. This module
//! mirrors the v3 configuration of the platform's reference text parser.

use regex::Regex;

/// Maximum weighted length of a single tweet.
pub const MAX_TWEET_WEIGHT: usize = 280;

/// Weighted cost of a URL, independent of its literal length.
const URL_WEIGHT: usize = 23;

/// Computes the platform-defined weighted length of tweet text.
///
/// The weigher is used both for the truncation-threshold check and for sizing
/// the ellipsis suffix when a reply must be shortened.
pub trait TweetWeigher {
    /// Returns the weighted length of `text` in platform units.
    fn weighted_length(&self, text: &str) -> usize;
}

/// Default weigher mirroring the platform's v3 parsing configuration.
///
/// Code points in the ranges U+0000..=U+10FF, U+2000..=U+200D,
/// U+2010..=U+201F and U+2032..=U+2037 weigh one unit; everything else
/// (CJK, emoji, ...) weighs two. Strings matching `http://` or `https://`
/// URLs weigh a fixed 23 units.
///
/// Bare domains without a scheme are not recognized as URLs, and weights are
/// accumulated per code point; both are simplifications relative to the
/// platform's full parser.
#[derive(Debug, Clone)]
pub struct StandardWeigher {
    url_pattern: Regex,
}

impl StandardWeigher {
    /// Creates the default weigher.
    pub fn new() -> Self {
        StandardWeigher {
            url_pattern: Regex::new(r"https?://[^\s]+").expect("URL pattern is valid"),
        }
    }
}

impl Default for StandardWeigher {
    fn default() -> Self {
        StandardWeigher::new()
    }
}

/// Weight of a single code point outside of a URL.
fn char_weight(c: char) -> usize {
    match c as u32 {
        0x0000..=0x10FF | 0x2000..=0x200D | 0x2010..=0x201F | 0x2032..=0x2037 => 1,
        _ => 2,
    }
}

/// Sums per-code-point weights over a URL-free span.
fn weigh_span(span: &str) -> usize {
    span.chars().map(char_weight).sum()
}

impl TweetWeigher for StandardWeigher {
    fn weighted_length(&self, text: &str) -> usize {
        let mut total = 0;
        let mut consumed = 0;
        for url in self.url_pattern.find_iter(text) {
            total += weigh_span(&text[consumed..url.start()]);
            total += URL_WEIGHT;
            consumed = url.end();
        }
        total + weigh_span(&text[consumed..])
    }
}
