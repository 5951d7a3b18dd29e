// src/config/defaults.rs
//! Built-in tuning used when no `config/sentiment.toml` is present.

use super::{FeedCfg, KeywordRuleCfg};

pub const RELEVANCE_PATTERN: &str = r"stock|market|dow|nasdaq|s&p|spx|fed|rate|inflation|yield|treasury|vix|volatility|earnings|cpi|ppi|fomc|powell|bond|10-?year";

pub const URGENCY_PATTERN: &str = r"breaking|urgent|flash|\blive\b";

/// Weight buckets, most bearish first. Short words carry word boundaries so
/// that e.g. "war" does not fire on "award" or "warning".
const KEYWORDS: &[(i32, &[&str])] = &[
    (
        -6,
        &[r"vix.?spike", r"contagion", r"circuit.?breaker", r"margin.?call"],
    ),
    (
        -5,
        &[r"crash", r"plunge", r"meltdown", r"liquidation.?cascade", r"systemic"],
    ),
    (
        -4,
        &[r"hard.?landing", r"\bdefault", r"credit.?event", r"bank.?run"],
    ),
    (
        -3,
        &[
            r"\bwar\b",
            r"missile",
            r"\bstrike",
            r"attack.?on",
            r"nuclear",
            r"government.?shutdown",
            r"hawkish.?surprise",
        ],
    ),
    (
        -2,
        &[r"hot.?cpi", r"hot.?ppi", r"rate.?hike", r"hawkish.?powell"],
    ),
    (
        -1,
        &[r"volatility", r"uncertainty", r"risk-?off", r"safe.?haven"],
    ),
    (
        1,
        &[r"\bbeat", r"strong", r"resilient", r"soft.?landing", r"cooling.?inflation"],
    ),
    (
        2,
        &[r"risk-?on", r"vix.?crush", r"rally", r"bullish.?momentum", r"fed.?pivot"],
    ),
    (
        3,
        &[r"dovish.?surprise", r"rate.?cut.?50", r"\bqe\b", r"stimulus"],
    ),
    (5, &[r"melt-?up", r"euphoria", r"fomo", r"vix.?termination"]),
];

/// Primary, secondary and backup sources, in that order.
/// Google News topic feeds are not listed; only search feeds are.
const FEEDS: &[(&str, &str)] = &[
    ("zerohedge", "https://feeds.feedburner.com/zerohedge"),
    (
        "cnbc-markets",
        "https://www.cnbc.com/id/100003114/device/rss/rss.html",
    ),
    ("wsj-markets", "https://feeds.a.dj.com/rss/RSSMarketsMain.xml"),
    (
        "reuters-markets",
        "https://www.reuters.com/pf/resources/rss/markets.xml",
    ),
    (
        "seekingalpha",
        "https://seekingalpha.com/api/v3/news/rss?limit=30",
    ),
    ("investing-25", "https://www.investing.com/rss/news_25.rss"),
    ("investing-285", "https://www.investing.com/rss/news_285.rss"),
    ("fxstreet", "https://www.fxstreet.com/rss/news"),
    (
        "kitco-calendar",
        "https://www.kitco.com/rss/economic_calendar.rss",
    ),
    ("kitco-news", "https://www.kitco.com/rss/news.rss"),
    (
        "gnews-nasdaq",
        "https://news.google.com/rss/search?q=nasdaq&hl=en-US&gl=US&ceid=US:en",
    ),
    (
        "gnews-stock-market",
        "https://news.google.com/rss/search?q=stock+market&hl=en-US&gl=US&ceid=US:en",
    ),
];

pub fn keywords() -> Vec<KeywordRuleCfg> {
    KEYWORDS
        .iter()
        .map(|(weight, patterns)| KeywordRuleCfg {
            weight: *weight,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        })
        .collect()
}

pub fn feeds() -> Vec<FeedCfg> {
    FEEDS
        .iter()
        .map(|(id, url)| FeedCfg {
            id: id.to_string(),
            url: url.to_string(),
        })
        .collect()
}
